//! JSON tokenizer: one left-to-right pass over the source bytes.

use std::fmt;

use log::trace;

use crate::error::JsonParseError;
use crate::token::{char_at, scan_number, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonTokenKind {
    True,
    False,
    Null,
    /// Number without a decimal point.
    Int,
    /// Number with a decimal point.
    Number,
    /// Quoted string; the span includes both quotes.
    String,
    LeftSquare,
    RightSquare,
    LeftCurly,
    RightCurly,
    Comma,
    Colon,
    Eof,
}

impl fmt::Display for JsonTokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JsonTokenKind::True => "TRUE",
            JsonTokenKind::False => "FALSE",
            JsonTokenKind::Null => "NULL",
            JsonTokenKind::Int => "INT",
            JsonTokenKind::Number => "NUMBER",
            JsonTokenKind::String => "STRING",
            JsonTokenKind::LeftSquare => "LEFT_SQUARE",
            JsonTokenKind::RightSquare => "RIGHT_SQUARE",
            JsonTokenKind::LeftCurly => "LEFT_CURLY",
            JsonTokenKind::RightCurly => "RIGHT_CURLY",
            JsonTokenKind::Comma => "COMMA",
            JsonTokenKind::Colon => "COLON",
            JsonTokenKind::Eof => "EOF",
        })
    }
}

pub type JsonToken = Token<JsonTokenKind>;

/// Splits JSON text into tokens, ending with [`JsonTokenKind::Eof`].
///
/// Strings are scanned up to the next `"` with no escape handling.
pub struct JsonTokenizer<'a> {
    input: &'a str,
    pos: usize,
    tokens: Vec<JsonToken>,
}

impl<'a> JsonTokenizer<'a> {
    pub fn tokenize(input: &'a str) -> Result<Vec<JsonToken>, JsonParseError> {
        let mut tokenizer = Self {
            input,
            pos: 0,
            tokens: Vec::new(),
        };
        tokenizer.run()?;
        trace!("tokenized {} JSON tokens", tokenizer.tokens.len());
        Ok(tokenizer.tokens)
    }

    fn run(&mut self) -> Result<(), JsonParseError> {
        let bytes = self.input.as_bytes();
        while let Some(&byte) = bytes.get(self.pos) {
            match byte {
                b' ' | b'\t' | b'\n' | b'\r' => self.pos += 1,
                b't' => self.keyword(b"true", JsonTokenKind::True)?,
                b'f' => self.keyword(b"false", JsonTokenKind::False)?,
                b'n' => self.keyword(b"null", JsonTokenKind::Null)?,
                b'[' => self.single(JsonTokenKind::LeftSquare),
                b']' => self.single(JsonTokenKind::RightSquare),
                b'{' => self.single(JsonTokenKind::LeftCurly),
                b'}' => self.single(JsonTokenKind::RightCurly),
                b',' => self.single(JsonTokenKind::Comma),
                b':' => self.single(JsonTokenKind::Colon),
                b'"' => self.string()?,
                b'-' | b'0'..=b'9' => {
                    let (end, is_float) = scan_number(bytes, self.pos);
                    let kind = if is_float {
                        JsonTokenKind::Number
                    } else {
                        JsonTokenKind::Int
                    };
                    self.tokens.push(Token::new(kind, self.pos, end));
                    self.pos = end + 1;
                }
                _ => {
                    return Err(JsonParseError::UnexpectedChar {
                        ch: char_at(self.input, self.pos),
                        offset: self.pos,
                    })
                }
            }
        }
        self.tokens
            .push(Token::new(JsonTokenKind::Eof, self.pos, self.pos));
        Ok(())
    }

    fn single(&mut self, kind: JsonTokenKind) {
        self.tokens.push(Token::new(kind, self.pos, self.pos));
        self.pos += 1;
    }

    fn keyword(&mut self, word: &[u8], kind: JsonTokenKind) -> Result<(), JsonParseError> {
        if !self.input.as_bytes()[self.pos..].starts_with(word) {
            return Err(JsonParseError::InvalidKeyword(self.pos));
        }
        self.tokens
            .push(Token::new(kind, self.pos, self.pos + word.len() - 1));
        self.pos += word.len();
        Ok(())
    }

    fn string(&mut self) -> Result<(), JsonParseError> {
        let start = self.pos;
        let rest = &self.input.as_bytes()[start + 1..];
        let len = rest
            .iter()
            .position(|&b| b == b'"')
            .ok_or(JsonParseError::UnterminatedString(start))?;
        let end = start + 1 + len;
        self.tokens.push(Token::new(JsonTokenKind::String, start, end));
        self.pos = end + 1;
        Ok(())
    }
}
