//! Recursive-descent JSON parser over the token stream from [`JsonTokenizer`].

use indexmap::IndexMap;
use log::debug;

use super::tokenizer::{JsonToken, JsonTokenKind, JsonTokenizer};
use crate::error::JsonParseError;
use crate::token::Token;
use crate::value::JsonValue;
use crate::MAX_DEPTH;

/// JSON parser.
pub struct JsonParser<'a> {
    input: &'a str,
    tokens: Vec<JsonToken>,
    pos: usize,
    depth: usize,
}

impl<'a> JsonParser<'a> {
    /// Parse a complete JSON document. Anything after the top-level value is an error.
    pub fn parse(input: &'a str) -> Result<JsonValue, JsonParseError> {
        let tokens = JsonTokenizer::tokenize(input)?;
        let mut parser = Self {
            input,
            tokens,
            pos: 0,
            depth: 0,
        };
        let value = parser.parse_value()?;
        let trailing = parser.peek();
        if trailing.kind != JsonTokenKind::Eof {
            return Err(JsonParseError::TrailingContent {
                found: trailing.kind,
                offset: trailing.start,
            });
        }
        debug!("parsed JSON document: {} ({} bytes)", value.kind(), input.len());
        Ok(value)
    }

    fn peek(&self) -> JsonToken {
        self.tokens.get(self.pos).copied().unwrap_or(Token::new(
            JsonTokenKind::Eof,
            self.input.len(),
            self.input.len(),
        ))
    }

    fn next(&mut self) -> JsonToken {
        let token = self.peek();
        self.pos += 1;
        token
    }

    fn parse_value(&mut self) -> Result<JsonValue, JsonParseError> {
        let token = self.next();
        match token.kind {
            JsonTokenKind::True => Ok(JsonValue::Bool(true)),
            JsonTokenKind::False => Ok(JsonValue::Bool(false)),
            JsonTokenKind::Null => Ok(JsonValue::Null),
            JsonTokenKind::Int => {
                let text = token.lexeme(self.input);
                text.parse().map(JsonValue::Int).map_err(|_| JsonParseError::InvalidNumber {
                    text: text.to_string(),
                    offset: token.start,
                })
            }
            JsonTokenKind::Number => {
                let text = token.lexeme(self.input);
                text.parse().map(JsonValue::Float).map_err(|_| JsonParseError::InvalidNumber {
                    text: text.to_string(),
                    offset: token.start,
                })
            }
            JsonTokenKind::String => Ok(JsonValue::String(self.string_contents(token).to_string())),
            JsonTokenKind::LeftSquare | JsonTokenKind::LeftCurly => {
                if self.depth == MAX_DEPTH {
                    return Err(JsonParseError::NestingTooDeep {
                        offset: token.start,
                    });
                }
                self.depth += 1;
                let value = if token.kind == JsonTokenKind::LeftSquare {
                    self.parse_array()
                } else {
                    self.parse_object()
                };
                self.depth -= 1;
                value
            }
            JsonTokenKind::RightSquare
            | JsonTokenKind::RightCurly
            | JsonTokenKind::Comma
            | JsonTokenKind::Colon
            | JsonTokenKind::Eof => Err(JsonParseError::UnexpectedToken {
                found: token.kind,
                offset: token.start,
            }),
        }
    }

    /// Text between the quotes of a string token.
    fn string_contents(&self, token: JsonToken) -> &'a str {
        self.input.get(token.start + 1..token.end).unwrap_or("")
    }

    fn parse_array(&mut self) -> Result<JsonValue, JsonParseError> {
        let mut arr = Vec::new();
        if self.peek().kind == JsonTokenKind::RightSquare {
            self.pos += 1;
            return Ok(JsonValue::Array(arr));
        }

        // Trailing commas are not allowed: the element after a comma is mandatory.
        loop {
            arr.push(self.parse_value()?);
            let token = self.next();
            match token.kind {
                JsonTokenKind::RightSquare => return Ok(JsonValue::Array(arr)),
                JsonTokenKind::Comma => {}
                found => {
                    return Err(JsonParseError::ExpectedComma {
                        container: "array",
                        found,
                        offset: token.start,
                    })
                }
            }
        }
    }

    fn parse_object(&mut self) -> Result<JsonValue, JsonParseError> {
        let mut map = IndexMap::new();
        if self.peek().kind == JsonTokenKind::RightCurly {
            self.pos += 1;
            return Ok(JsonValue::Object(map));
        }

        loop {
            let key = self.next();
            if key.kind != JsonTokenKind::String {
                return Err(JsonParseError::ExpectedStringKey {
                    found: key.kind,
                    offset: key.start,
                });
            }
            let colon = self.next();
            if colon.kind != JsonTokenKind::Colon {
                return Err(JsonParseError::ExpectedColon {
                    found: colon.kind,
                    offset: colon.start,
                });
            }
            let value = self.parse_value()?;
            // Repeated keys: the last value wins.
            map.insert(self.string_contents(key).to_string(), value);

            let token = self.next();
            match token.kind {
                JsonTokenKind::RightCurly => return Ok(JsonValue::Object(map)),
                JsonTokenKind::Comma => {}
                found => {
                    return Err(JsonParseError::ExpectedComma {
                        container: "object",
                        found,
                        offset: token.start,
                    })
                }
            }
        }
    }
}
