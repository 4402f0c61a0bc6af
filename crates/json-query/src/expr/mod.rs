//! The query expression language: tokenizer and fused parser/evaluator.

mod eval;
mod tokenizer;

pub use eval::{Evaluated, ExprEvaluator};
pub use tokenizer::{ExprToken, ExprTokenKind, ExprTokenizer};
