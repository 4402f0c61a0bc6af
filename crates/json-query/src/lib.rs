//! Path-style queries over JSON documents.
//!
//! An expression walks a parsed document with field access (`a.b`), array
//! indexing (`a[0]`, where the index may itself be an expression) and three
//! built-in functions: `min`, `max` and `size`.
//!
//! # Example
//!
//! ```
//! use json_query::{evaluate, JsonValue};
//!
//! let doc = r#"{"a": {"b": [1, 2, {"c": "test"}, [11, 12]]}}"#;
//!
//! assert_eq!(evaluate(doc, "a.b[2].c").unwrap().render(), "\"test\"");
//! assert_eq!(evaluate(doc, "a.b[a.b[1]].c").unwrap().render(), "\"test\"");
//! assert_eq!(evaluate(doc, "max(a.b[0], 10)").unwrap(), JsonValue::Int(10));
//! assert_eq!(evaluate(doc, "size(a.b)").unwrap(), JsonValue::Int(4));
//! assert!(evaluate(doc, "min(a)").is_err());
//! ```
//!
//! The JSON grammar accepted is standard JSON without string escapes, Unicode
//! escapes or exponents.

pub mod error;
pub mod expr;
pub mod json;
pub mod token;
pub mod value;

pub use error::{Error, ExprParseError, JsonParseError, OperationError};
pub use expr::{Evaluated, ExprEvaluator};
pub use json::JsonParser;
pub use token::Token;
pub use value::JsonValue;

/// Deepest nesting accepted, counting JSON arrays/objects and expression
/// sub-expressions. Deeper input is rejected with a `NestingTooDeep` error
/// instead of exhausting the stack.
pub const MAX_DEPTH: usize = 128;

/// Parse JSON text into a document.
pub fn parse_json(json_text: &str) -> Result<JsonValue, JsonParseError> {
    JsonParser::parse(json_text)
}

/// Evaluate an expression against an already parsed document.
///
/// Values found in the document are returned borrowed.
pub fn evaluate_expr<'doc>(doc: &'doc JsonValue, expr_text: &str) -> Result<Evaluated<'doc>, Error> {
    ExprEvaluator::evaluate(doc, expr_text)
}

/// Parse `json_text` and evaluate `expr_text` against it.
pub fn evaluate(json_text: &str, expr_text: &str) -> Result<JsonValue, Error> {
    let doc = parse_json(json_text)?;
    Ok(evaluate_expr(&doc, expr_text)?.into_owned())
}
