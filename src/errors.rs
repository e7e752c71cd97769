//! Emo Error Handling
//!
//! Every failure the pipeline can report is an [`EmoError`]: what went wrong
//! ([`ErrorKind`]), where it happened ([`SourceInfo`]) and how to help
//! ([`DiagnosticInfo`]). Errors are built through an [`ErrorReporting`] context
//! so that source and error code are attached consistently.

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceSpan};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::syntax::Span;

// ============================================================================
// SOURCE CONTEXT - Error reporting infrastructure
// ============================================================================

/// A named piece of source text, usually one `.emo` file.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    /// Create a source context from real file content
    pub fn from_file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Create a fallback when real source is unavailable
    pub fn fallback(context: &str) -> Self {
        Self {
            name: "fallback".to_string(),
            content: format!("💩 {}", context),
        }
    }

    /// Convert to NamedSource for use with miette error reporting
    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::new(NamedSource::new(self.name.clone(), self.content.clone()))
    }
}

impl Default for SourceContext {
    fn default() -> Self {
        Self::fallback("default context")
    }
}

// ============================================================================
// ERROR TYPES
// ============================================================================

/// The single error type
#[derive(Debug)]
pub struct EmoError {
    /// What went wrong
    pub kind: ErrorKind,
    /// Where it happened
    pub source_info: SourceInfo,
    /// How to help
    pub diagnostic_info: DiagnosticInfo,
}

/// All error kinds, grouped by the pipeline stage that raises them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    // Parse errors
    #[error("Parse error: {message}")]
    Syntax { message: String },
    #[error("Parse error: invalid {literal_type} '{value}'")]
    InvalidLiteral { literal_type: String, value: String },

    // Normalization errors
    #[error("Normalization error: no canonical form for '{token}' in {rule}")]
    UnknownOperator { rule: String, token: String },

    // Runtime errors
    #[error("Runtime error: '{symbol}' is undeclared")]
    UndefinedSymbol { symbol: String },
    #[error("Runtime error: redeclaration in same scope of '{symbol}'")]
    Redeclaration { symbol: String },
    #[error("Runtime error: assignment of undeclared variable '{symbol}'")]
    UndeclaredAssignment { symbol: String },
    #[error("Type error: '{operation}' expected {expected}, got {actual}")]
    TypeMismatch {
        operation: String,
        expected: String,
        actual: String,
    },
    #[error("Runtime error: division by zero")]
    DivisionByZero,
    #[error("Runtime error: integer overflow in '{operation}'")]
    Overflow { operation: String },
    #[error("Runtime error: token '{token}' in {rule} was never normalized")]
    UnnormalizedToken { rule: String, token: String },
    #[error("Runtime error: malformed {rule} node")]
    MalformedNode { rule: String },

    // File handling errors
    #[error("Please give a valid file to execute ...that ends with .{extension}: '{path}'")]
    InvalidExtension { path: String, extension: String },
    #[error("error in reading the file {path}: {reason}")]
    ReadFailure { path: String, reason: String },
}

impl ErrorKind {
    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Syntax { .. } | Self::InvalidLiteral { .. } => ErrorCategory::Parse,

            Self::UnknownOperator { .. } => ErrorCategory::Normalize,

            Self::UndefinedSymbol { .. }
            | Self::Redeclaration { .. }
            | Self::UndeclaredAssignment { .. }
            | Self::TypeMismatch { .. }
            | Self::DivisionByZero
            | Self::Overflow { .. }
            | Self::UnnormalizedToken { .. }
            | Self::MalformedNode { .. } => ErrorCategory::Runtime,

            Self::InvalidExtension { .. } | Self::ReadFailure { .. } => ErrorCategory::Io,
        }
    }

    /// Get error code suffix for diagnostic codes
    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::Syntax { .. } => "syntax",
            Self::InvalidLiteral { .. } => "invalid_literal",
            Self::UnknownOperator { .. } => "unknown_operator",
            Self::UndefinedSymbol { .. } => "undefined_symbol",
            Self::Redeclaration { .. } => "redeclaration",
            Self::UndeclaredAssignment { .. } => "undeclared_assignment",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::DivisionByZero => "division_by_zero",
            Self::Overflow { .. } => "overflow",
            Self::UnnormalizedToken { .. } => "unnormalized_token",
            Self::MalformedNode { .. } => "malformed_node",
            Self::InvalidExtension { .. } => "invalid_extension",
            Self::ReadFailure { .. } => "read_failure",
        }
    }

    fn primary_label(&self) -> &'static str {
        match self {
            Self::Syntax { .. } => "unexpected input",
            Self::InvalidLiteral { .. } => "invalid literal",
            Self::UnknownOperator { .. } => "unknown operator",
            Self::UndefinedSymbol { .. } => "undeclared here",
            Self::Redeclaration { .. } => "already declared in this scope",
            Self::UndeclaredAssignment { .. } => "not declared",
            Self::TypeMismatch { .. } => "type mismatch",
            Self::DivisionByZero => "divisor is zero",
            Self::Overflow { .. } => "overflows",
            Self::UnnormalizedToken { .. } => "symbolic token",
            Self::MalformedNode { .. } => "malformed node",
            Self::InvalidExtension { .. } | Self::ReadFailure { .. } => "here",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Parse,
    Normalize,
    Runtime,
    Io,
}

impl ErrorCategory {
    /// Parse and file errors stop a batch; the rest only fail the current file.
    pub fn is_fatal(self) -> bool {
        matches!(self, Self::Parse | Self::Io)
    }
}

/// Context-specific source information
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub source: Arc<NamedSource<String>>,
    pub primary_span: SourceSpan,
    pub phase: String,
}

/// Diagnostic enhancement data
#[derive(Debug, Clone)]
pub struct DiagnosticInfo {
    pub help: Option<String>,
    pub error_code: String,
}

impl EmoError {
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.diagnostic_info.help = Some(help.into());
        self
    }
}

impl std::error::Error for EmoError {}

impl fmt::Display for EmoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind, f)
    }
}

impl Diagnostic for EmoError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.diagnostic_info.error_code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diagnostic_info
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = vec![LabeledSpan::new_with_span(
            Some(self.kind.primary_label().to_string()),
            self.source_info.primary_span,
        )];
        Some(Box::new(labels.into_iter()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&*self.source_info.source)
    }
}

// ============================================================================
// REPORTING CONTEXTS
// ============================================================================

/// Context-aware error creation
pub trait ErrorReporting {
    /// Create an error with context-appropriate enhancements
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> EmoError;

    fn report_at(&self, kind: ErrorKind, span: Span) -> EmoError {
        self.report(kind, to_source_span(span))
    }

    /// Errors that indicate a bug in the interpreter rather than in the program.
    fn internal_error(&self, rule: &str, span: Span) -> EmoError {
        self.report_at(
            ErrorKind::MalformedNode { rule: rule.into() },
            span,
        )
        .with_help("This is an internal interpreter error. Please report this as a bug.")
    }
}

/// General-purpose error creation context for one pipeline phase.
pub struct PhaseContext {
    pub source: SourceContext,
    pub phase: String,
}

impl PhaseContext {
    pub fn new(source: SourceContext, phase: impl Into<String>) -> Self {
        Self {
            source,
            phase: phase.into(),
        }
    }
}

impl ErrorReporting for PhaseContext {
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> EmoError {
        let error_code = format!("emo::{}::{}", self.phase, kind.code_suffix());

        EmoError {
            kind,
            source_info: SourceInfo {
                source: self.source.to_named_source(),
                primary_span: span,
                phase: self.phase.clone(),
            },
            diagnostic_info: DiagnosticInfo {
                help: None,
                error_code,
            },
        }
    }
}

/// Creates a placeholder span for errors not tied to a source location,
/// such as I/O errors.
pub fn unspanned() -> SourceSpan {
    SourceSpan::from(0..0)
}

/// Converts a syntax [`Span`] to a miette SourceSpan.
pub fn to_source_span(span: Span) -> SourceSpan {
    SourceSpan::from(span.start..span.end)
}

// ============================================================================
// ERROR FORMATTING UTILITIES
// ============================================================================

/// Prints an EmoError with full miette diagnostics to stderr.
pub fn print_error(error: EmoError) {
    use miette::Report;
    let report = Report::new(error);
    eprintln!("{report:?}");
}
