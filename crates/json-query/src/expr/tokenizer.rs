//! Expression tokenizer.
//!
//! `min`, `max` and `size` are reserved: any word starting with `m` or `s`
//! must begin with one of them.

use std::fmt;

use log::trace;

use crate::error::ExprParseError;
use crate::token::{char_at, scan_number, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprTokenKind {
    Min,
    Max,
    Size,
    LeftSquare,
    RightSquare,
    LeftRound,
    RightRound,
    Int,
    Number,
    Dot,
    Comma,
    Ident,
    Eof,
}

impl fmt::Display for ExprTokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExprTokenKind::Min => "MIN",
            ExprTokenKind::Max => "MAX",
            ExprTokenKind::Size => "SIZE",
            ExprTokenKind::LeftSquare => "LEFT_SQUARE",
            ExprTokenKind::RightSquare => "RIGHT_SQUARE",
            ExprTokenKind::LeftRound => "LEFT_ROUND",
            ExprTokenKind::RightRound => "RIGHT_ROUND",
            ExprTokenKind::Int => "INT",
            ExprTokenKind::Number => "NUMBER",
            ExprTokenKind::Dot => "DOT",
            ExprTokenKind::Comma => "COMMA",
            ExprTokenKind::Ident => "IDENT",
            ExprTokenKind::Eof => "EOF",
        })
    }
}

pub type ExprToken = Token<ExprTokenKind>;

pub struct ExprTokenizer<'a> {
    input: &'a str,
    pos: usize,
    tokens: Vec<ExprToken>,
}

impl<'a> ExprTokenizer<'a> {
    pub fn tokenize(input: &'a str) -> Result<Vec<ExprToken>, ExprParseError> {
        let mut tokenizer = Self {
            input,
            pos: 0,
            tokens: Vec::new(),
        };
        tokenizer.run()?;
        trace!("tokenized {} expression tokens", tokenizer.tokens.len());
        Ok(tokenizer.tokens)
    }

    fn run(&mut self) -> Result<(), ExprParseError> {
        let bytes = self.input.as_bytes();
        while let Some(&byte) = bytes.get(self.pos) {
            match byte {
                b' ' | b'\t' | b'\n' | b'\r' => self.pos += 1,
                b'm' => {
                    let rest = &bytes[self.pos..];
                    let kind = if rest.starts_with(b"min") {
                        ExprTokenKind::Min
                    } else if rest.starts_with(b"max") {
                        ExprTokenKind::Max
                    } else {
                        return Err(ExprParseError::InvalidKeyword(self.pos));
                    };
                    self.word(kind, 3);
                }
                b's' => {
                    if !bytes[self.pos..].starts_with(b"size") {
                        return Err(ExprParseError::InvalidKeyword(self.pos));
                    }
                    self.word(ExprTokenKind::Size, 4);
                }
                b'[' => self.word(ExprTokenKind::LeftSquare, 1),
                b']' => self.word(ExprTokenKind::RightSquare, 1),
                b'(' => self.word(ExprTokenKind::LeftRound, 1),
                b')' => self.word(ExprTokenKind::RightRound, 1),
                b'.' => self.word(ExprTokenKind::Dot, 1),
                b',' => self.word(ExprTokenKind::Comma, 1),
                b'-' | b'0'..=b'9' => {
                    let (end, is_float) = scan_number(bytes, self.pos);
                    let kind = if is_float {
                        ExprTokenKind::Number
                    } else {
                        ExprTokenKind::Int
                    };
                    self.tokens.push(Token::new(kind, self.pos, end));
                    self.pos = end + 1;
                }
                b if b.is_ascii_alphabetic() => {
                    let len = bytes[self.pos..]
                        .iter()
                        .take_while(|b| b.is_ascii_alphabetic())
                        .count();
                    self.word(ExprTokenKind::Ident, len);
                }
                _ => {
                    return Err(ExprParseError::UnexpectedChar {
                        ch: char_at(self.input, self.pos),
                        offset: self.pos,
                    })
                }
            }
        }
        self.tokens
            .push(Token::new(ExprTokenKind::Eof, self.pos, self.pos));
        Ok(())
    }

    fn word(&mut self, kind: ExprTokenKind, len: usize) {
        self.tokens
            .push(Token::new(kind, self.pos, self.pos + len - 1));
        self.pos += len;
    }
}
