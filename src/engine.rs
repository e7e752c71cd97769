//! Pipeline driver: load, parse, normalize and execute one program at a time.
//!
//! Each stage is exposed on its own so the CLI can report progress between them.
//! Nothing is shared between programs except the read-only rewrite table.

use std::fs;
use std::path::Path;

use crate::errors::{
    unspanned, EmoError, ErrorKind, ErrorReporting, PhaseContext, SourceContext,
};
use crate::normalizer::{Normalizer, RewriteTable};
use crate::runtime::{evaluate, OutputSink};
use crate::syntax::{parser, SyntaxTree};

/// File extension of Emo source files.
pub const SOURCE_EXTENSION: &str = "emo";

/// Reads an `.emo` file into a [`SourceContext`].
///
/// A trailing newline is appended so a final comment or statement is always
/// terminated.
pub fn load_source(path: &Path) -> Result<SourceContext, EmoError> {
    let name = path.display().to_string();
    let ctx = PhaseContext::new(SourceContext::fallback(&name), "io");

    if !has_source_extension(path) {
        return Err(ctx.report(
            ErrorKind::InvalidExtension {
                path: name,
                extension: SOURCE_EXTENSION.into(),
            },
            unspanned(),
        ));
    }

    let mut content = fs::read_to_string(path).map_err(|e| {
        ctx.report(
            ErrorKind::ReadFailure {
                path: name.clone(),
                reason: e.to_string(),
            },
            unspanned(),
        )
    })?;
    content.push('\n');

    Ok(SourceContext::from_file(name, content))
}

pub fn has_source_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION)
}

/// Runs programs through parse → normalize → execute.
#[derive(Debug, Clone, Copy)]
pub struct Engine<'t> {
    table: &'t RewriteTable,
}

impl Engine<'static> {
    /// An engine using the process-wide rewrite table.
    pub fn standard() -> Self {
        Self::new(RewriteTable::standard())
    }
}

impl Default for Engine<'static> {
    fn default() -> Self {
        Self::standard()
    }
}

impl<'t> Engine<'t> {
    pub fn new(table: &'t RewriteTable) -> Self {
        Self { table }
    }

    pub fn parse(&self, source: &SourceContext) -> Result<SyntaxTree, EmoError> {
        parser::parse(source)
    }

    /// Rewrites symbolic tokens to canonical ones. Consumes the tree; on failure
    /// no tree is returned.
    pub fn normalize(
        &self,
        tree: SyntaxTree,
        source: &SourceContext,
    ) -> Result<SyntaxTree, EmoError> {
        Normalizer::new(self.table).normalize(tree).map_err(|e| {
            PhaseContext::new(source.clone(), "normalize")
                .report_at(
                    ErrorKind::UnknownOperator {
                        rule: e.rule.to_string(),
                        token: e.token,
                    },
                    e.span,
                )
                .with_help("The grammar produced an operator the normalizer has no mapping for.")
        })
    }

    pub fn execute(
        &self,
        tree: &SyntaxTree,
        source: &SourceContext,
        output: &mut dyn OutputSink,
    ) -> Result<(), EmoError> {
        evaluate(tree, source.clone(), output)
    }

    /// All three stages; returns the normalized tree.
    pub fn run(
        &self,
        source: &SourceContext,
        output: &mut dyn OutputSink,
    ) -> Result<SyntaxTree, EmoError> {
        let tree = self.parse(source)?;
        let tree = self.normalize(tree, source)?;
        self.execute(&tree, source, output)?;
        Ok(tree)
    }
}
