//! Error types for JSON parsing, expression parsing and value operations.

use thiserror::Error;

use crate::expr::ExprTokenKind;
use crate::json::JsonTokenKind;

/// Malformed JSON text. Offsets are byte positions into the JSON source.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum JsonParseError {
    #[error("invalid keyword at offset {0}")]
    InvalidKeyword(usize),
    #[error("unterminated string starting at offset {0}")]
    UnterminatedString(usize),
    #[error("unexpected character {ch:?} at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },
    #[error("invalid number {text:?} at offset {offset}")]
    InvalidNumber { text: String, offset: usize },
    #[error("unexpected {found} at offset {offset}")]
    UnexpectedToken { found: JsonTokenKind, offset: usize },
    #[error("comma expected between elements of {container}, found {found} at offset {offset}")]
    ExpectedComma {
        container: &'static str,
        found: JsonTokenKind,
        offset: usize,
    },
    #[error("colon expected after object key, found {found} at offset {offset}")]
    ExpectedColon { found: JsonTokenKind, offset: usize },
    #[error("expected string key, found {found} at offset {offset}")]
    ExpectedStringKey { found: JsonTokenKind, offset: usize },
    #[error("unexpected trailing {found} at offset {offset}")]
    TrailingContent { found: JsonTokenKind, offset: usize },
    #[error("nesting deeper than {max} levels at offset {offset}", max = crate::MAX_DEPTH)]
    NestingTooDeep { offset: usize },
}

/// Malformed expression text. Offsets are byte positions into the expression.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExprParseError {
    #[error("invalid keyword at offset {0}")]
    InvalidKeyword(usize),
    #[error("unexpected character {ch:?} at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },
    #[error("invalid number {text:?} at offset {offset}")]
    InvalidNumber { text: String, offset: usize },
    #[error("unexpected {found} at offset {offset}")]
    UnexpectedToken { found: ExprTokenKind, offset: usize },
    #[error("unexpected identifier at offset {0}")]
    UnexpectedIdentifier(usize),
    #[error("unexpected dot at offset {0}")]
    UnexpectedDot(usize),
    #[error("expected identifier after dot at offset {0}")]
    ExpectedIdentifier(usize),
    #[error("unexpected {name} at offset {offset}")]
    MisplacedFunction { name: ExprTokenKind, offset: usize },
    #[error("expected bracket after {name}, found {found} at offset {offset}")]
    ExpectedOpenParen {
        name: ExprTokenKind,
        found: ExprTokenKind,
        offset: usize,
    },
    #[error("expected closing bracket after argument, found {found} at offset {offset}")]
    ExpectedCloseParen { found: ExprTokenKind, offset: usize },
    #[error("expected comma after argument, found {found} at offset {offset}")]
    ExpectedCommaOrParen { found: ExprTokenKind, offset: usize },
    #[error("expected closing bracket for subscript, found {found} at offset {offset}")]
    ExpectedClosingSquare { found: ExprTokenKind, offset: usize },
    #[error("expected index at offset {0}")]
    MissingIndex(usize),
    #[error("empty expression at offset {0}")]
    EmptyExpression(usize),
    #[error("nesting deeper than {max} levels at offset {0}", max = crate::MAX_DEPTH)]
    NestingTooDeep(usize),
}

/// An operation that is not valid for the value it was applied to.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OperationError {
    #[error("{0}")]
    TypeError(String),
    #[error("invalid index to array: {index} (length {len})")]
    IndexError { index: i64, len: usize },
    #[error("key not in object: {0}")]
    KeyError(String),
    #[error("{0} called on empty array")]
    EmptyCollection(&'static str),
}

/// Any failure of [`crate::evaluate`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("Json Parse Error: {0}")]
    Json(#[from] JsonParseError),
    #[error("Expr Parse Error: {0}")]
    Expr(#[from] ExprParseError),
    #[error("Invalid Operation: {0}")]
    InvalidOperation(#[from] OperationError),
}

impl Error {
    /// The user-facing category name, as used in the `Display` prefix.
    pub fn category(&self) -> &'static str {
        match self {
            Error::Json(_) => "Json Parse Error",
            Error::Expr(_) => "Expr Parse Error",
            Error::InvalidOperation(_) => "Invalid Operation",
        }
    }
}
