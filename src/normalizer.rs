//! Token normalization.
//!
//! The parser keeps the symbolic glyphs of the source ("➕", "🚩", "😁😌"). Before
//! evaluation, one pass over the tree rewrites every operator and conditional
//! keyword to its canonical spelling ("+", "if", ">="), so the evaluator only ever
//! dispatches on canonical tokens.
//!
//! ## Invariants
//! - Tree topology and child order are never changed; only token text is replaced.
//! - Every node is visited exactly once, at every depth.
//! - The rewrite of a node depends only on its own rule and tokens, never on
//!   whether its children have been rewritten already.
//! - The pass is not idempotent. Relational tokens have no identity entries, so a
//!   second pass over the same tree fails. Run it exactly once per tree.

use once_cell::sync::Lazy;
use thiserror::Error;

use crate::syntax::{Child, RuleId, Span, SyntaxTree};

/// Child 0 of a binary operator node is always an operand, operators start here.
pub const FIRST_OPERATOR_INDEX: usize = 1;

/// Raised when a relational node holds a token the table does not know.
///
/// By grammar construction this cannot happen on a freshly parsed tree, so it
/// signals a grammar/normalizer mismatch or a tree normalized twice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no canonical form for `{token}` in {rule}")]
pub struct RewriteError {
    pub rule: RuleId,
    pub token: String,
    pub span: Span,
}

// ============================================================================
// REWRITE TABLE
// ============================================================================

/// Which child slots of a node are candidates for rewriting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scan {
    /// Every child; keywords are interleaved with sub-trees.
    All,
    /// Children from the given index to the end.
    From(usize),
    /// Child 0 only.
    First,
    /// Child 0, and only when the node has exactly two children
    /// (operator, operand). A single-child node carries no operator.
    UnaryPrefix,
}

impl Scan {
    fn range(self, len: usize) -> std::ops::Range<usize> {
        match self {
            Scan::All => 0..len,
            Scan::From(start) => start.min(len)..len,
            Scan::First => 0..len.min(1),
            Scan::UnaryPrefix if len == 2 => 0..1,
            Scan::UnaryPrefix => 0..0,
        }
    }
}

/// How a scanned token is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mapping {
    /// Exact matches are rewritten, anything else is left as is.
    Partial(&'static [(&'static str, &'static str)]),
    /// Two-way: `symbol` becomes `matched`, every other token becomes `otherwise`.
    Binary {
        symbol: &'static str,
        matched: &'static str,
        otherwise: &'static str,
    },
    /// Exact matches are rewritten, anything else is a [`RewriteError`].
    Strict(&'static [(&'static str, &'static str)]),
}

enum Lookup {
    Rewrite(&'static str),
    Keep,
    Unknown,
}

impl Mapping {
    fn lookup(&self, symbol: &str) -> Lookup {
        match *self {
            Mapping::Partial(pairs) => find(pairs, symbol).map_or(Lookup::Keep, Lookup::Rewrite),
            Mapping::Binary {
                symbol: expected,
                matched,
                otherwise,
            } => Lookup::Rewrite(if symbol == expected { matched } else { otherwise }),
            Mapping::Strict(pairs) => find(pairs, symbol).map_or(Lookup::Unknown, Lookup::Rewrite),
        }
    }
}

fn find(pairs: &[(&'static str, &'static str)], symbol: &str) -> Option<&'static str> {
    pairs
        .iter()
        .find(|(from, _)| *from == symbol)
        .map(|(_, to)| *to)
}

/// The rewrite a single rule applies to its own children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleRewrite {
    pub scan: Scan,
    pub mapping: Mapping,
}

impl RuleRewrite {
    const fn new(scan: Scan, mapping: Mapping) -> Self {
        Self { scan, mapping }
    }

    /// Operator tokens of a binary node: everything after the first operand.
    const fn operators(pairs: &'static [(&'static str, &'static str)]) -> Self {
        Self::new(Scan::From(FIRST_OPERATOR_INDEX), Mapping::Partial(pairs))
    }

    /// Rewrites the scanned token children of `tree`. Sub-tree children are skipped.
    pub fn apply(&self, tree: &mut SyntaxTree) -> Result<(), RewriteError> {
        let range = self.scan.range(tree.children.len());
        for child in &mut tree.children[range] {
            let Child::Token(token) = child else {
                continue;
            };
            match self.mapping.lookup(&token.text) {
                Lookup::Rewrite(canonical) => token.text = canonical.to_string(),
                Lookup::Keep => {}
                Lookup::Unknown => {
                    return Err(RewriteError {
                        rule: tree.rule,
                        token: token.text.clone(),
                        span: token.span,
                    })
                }
            }
        }
        Ok(())
    }
}

const CONDITIONAL_KEYWORDS: &[(&str, &str)] = &[("🚩", "if"), ("🏳", "elif"), ("🏁", "else")];
const MULTIPLICATIVE_OPERATORS: &[(&str, &str)] = &[("✖", "*"), ("➗", "/"), ("📎", "%")];
const ADDITIVE_OPERATORS: &[(&str, &str)] = &[("➕", "+"), ("➖", "-")];
// Two-glyph entries are keyed on the whole adjacent glyph sequence.
const RELATIONAL_OPERATORS: &[(&str, &str)] = &[
    ("😭", "<"),
    ("😁", ">"),
    ("😁😌", ">="),
    ("😭😌", "<="),
    ("😌😌", "=="),
    ("❗😌", "!="),
];
const BITWISE_AND_OPERATORS: &[(&str, &str)] = &[("⚛", "&")];
const BITWISE_XOR_OPERATORS: &[(&str, &str)] = &[("⚓", "xor")];
const BITWISE_OR_OPERATORS: &[(&str, &str)] = &[("☯", "|")];
const LOGICAL_AND_OPERATORS: &[(&str, &str)] = &[("😠", "and")];
const LOGICAL_OR_OPERATORS: &[(&str, &str)] = &[("😇", "or")];

static STANDARD: Lazy<RewriteTable> = Lazy::new(RewriteTable::new);

/// Symbol-to-canonical mappings for every rule the normalizer acts on.
///
/// Read-only once built; share the process-wide instance from
/// [`RewriteTable::standard`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteTable {
    conditional: RuleRewrite,
    boolean: RuleRewrite,
    cast: RuleRewrite,
    multiplicative: RuleRewrite,
    additive: RuleRewrite,
    relational: RuleRewrite,
    bitwise_and: RuleRewrite,
    bitwise_xor: RuleRewrite,
    bitwise_or: RuleRewrite,
    logical_and: RuleRewrite,
    logical_or: RuleRewrite,
}

impl RewriteTable {
    pub fn new() -> Self {
        Self {
            conditional: RuleRewrite::new(Scan::All, Mapping::Partial(CONDITIONAL_KEYWORDS)),
            boolean: RuleRewrite::new(
                Scan::First,
                Mapping::Binary {
                    symbol: "✔",
                    matched: "true",
                    otherwise: "false",
                },
            ),
            cast: RuleRewrite::new(
                Scan::UnaryPrefix,
                Mapping::Binary {
                    symbol: "❗",
                    matched: "!",
                    otherwise: "~",
                },
            ),
            multiplicative: RuleRewrite::operators(MULTIPLICATIVE_OPERATORS),
            additive: RuleRewrite::operators(ADDITIVE_OPERATORS),
            relational: RuleRewrite::new(
                Scan::From(FIRST_OPERATOR_INDEX),
                Mapping::Strict(RELATIONAL_OPERATORS),
            ),
            bitwise_and: RuleRewrite::operators(BITWISE_AND_OPERATORS),
            bitwise_xor: RuleRewrite::operators(BITWISE_XOR_OPERATORS),
            bitwise_or: RuleRewrite::operators(BITWISE_OR_OPERATORS),
            logical_and: RuleRewrite::operators(LOGICAL_AND_OPERATORS),
            logical_or: RuleRewrite::operators(LOGICAL_OR_OPERATORS),
        }
    }

    /// The process-wide table, built on first use.
    pub fn standard() -> &'static RewriteTable {
        &STANDARD
    }

    /// The rewrite for `rule`, or `None` for rules that pass through untouched.
    pub fn for_rule(&self, rule: RuleId) -> Option<&RuleRewrite> {
        match rule {
            RuleId::IfStmt => Some(&self.conditional),
            RuleId::Boolean => Some(&self.boolean),
            RuleId::CastExpression => Some(&self.cast),
            RuleId::MultiplicativeExpression => Some(&self.multiplicative),
            RuleId::AdditiveExpression => Some(&self.additive),
            RuleId::EqualityExpression => Some(&self.relational),
            RuleId::AndExpression => Some(&self.bitwise_and),
            RuleId::ExclusiveOrExpression => Some(&self.bitwise_xor),
            RuleId::InclusiveOrExpression => Some(&self.bitwise_or),
            RuleId::LogicalAndExpression => Some(&self.logical_and),
            RuleId::LogicalOrExpression => Some(&self.logical_or),
            _ => None,
        }
    }
}

impl Default for RewriteTable {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TRAVERSAL
// ============================================================================

/// Walks a tree and rewrites symbolic tokens using a [`RewriteTable`].
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'t> {
    table: &'t RewriteTable,
}

impl<'t> Normalizer<'t> {
    pub fn new(table: &'t RewriteTable) -> Self {
        Self { table }
    }

    /// Takes the tree, rewrites it in place and hands it back.
    ///
    /// On failure the tree is dropped, so a partially rewritten tree never
    /// reaches the caller.
    pub fn normalize(&self, mut tree: SyntaxTree) -> Result<SyntaxTree, RewriteError> {
        self.visit(&mut tree)?;
        Ok(tree)
    }

    fn visit(&self, tree: &mut SyntaxTree) -> Result<(), RewriteError> {
        if let Some(rewrite) = self.table.for_rule(tree.rule) {
            rewrite.apply(tree)?;
        }
        for child in &mut tree.children {
            if let Child::Tree(subtree) = child {
                self.visit(subtree)?;
            }
        }
        Ok(())
    }
}

/// Normalizes `tree` with the standard table.
pub fn normalize(tree: SyntaxTree) -> Result<SyntaxTree, RewriteError> {
    Normalizer::new(RewriteTable::standard()).normalize(tree)
}
