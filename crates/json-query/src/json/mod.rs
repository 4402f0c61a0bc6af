//! JSON text to [`JsonValue`](crate::JsonValue): tokenizer and parser.
//!
//! The accepted grammar is standard JSON without string escapes, Unicode
//! escapes or exponent notation.

mod parser;
mod tokenizer;

pub use parser::JsonParser;
pub use tokenizer::{JsonToken, JsonTokenKind, JsonTokenizer};
