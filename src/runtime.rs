//! Runtime for normalized Emo trees: values, scopes and the tree-walking evaluator.

pub mod eval;
pub mod scope;
pub mod value;

pub use eval::{evaluate, Evaluator};
pub use scope::Scopes;
pub use value::Value;

use crate::syntax::Span;

/// Destination for program output (`🖨`).
///
/// Implemented by the CLI's stdout sink and by in-memory buffers in tests.
pub trait OutputSink {
    fn emit(&mut self, text: &str, span: Option<&Span>);
}
