//! Emo: a small imperative language written in emoji.
//!
//! Source text is parsed by a pest grammar into a [`SyntaxTree`], the
//! [`normalizer`] rewrites every emoji operator to a canonical ASCII token, and
//! the [`runtime`] walks the normalized tree.

pub use crate::errors::{EmoError, ErrorKind, SourceContext};
pub use crate::normalizer::{normalize, Normalizer, RewriteTable};
pub use crate::syntax::{Child, RuleId, Span, SyntaxTree, Token};

pub mod cli;
pub mod discovery;
pub mod engine;
pub mod errors;
pub mod normalizer;
pub mod runtime;
pub mod syntax;
