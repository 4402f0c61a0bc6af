//! Expression parser and evaluator.
//!
//! There is no syntax tree: each construct is evaluated against the document
//! as soon as it is recognized. Values looked up in the document are borrowed
//! from it; literals and `size` results are new scalars.

use std::borrow::Cow;

use log::debug;

use super::tokenizer::{ExprToken, ExprTokenKind, ExprTokenizer};
use crate::error::{Error, ExprParseError, OperationError};
use crate::token::Token;
use crate::value::{extremum_position, JsonValue};
use crate::MAX_DEPTH;

/// Result of evaluating an expression against a document borrowed for `'doc`.
pub type Evaluated<'doc> = Cow<'doc, JsonValue>;

/// Fused recursive-descent parser and evaluator.
///
/// ```text
/// expr := term (('.' IDENT) | ('[' expr ']'))*
/// term := INT | NUMBER | IDENT | 'min(' args ')' | 'max(' args ')' | 'size(' expr ')'
/// args := expr (',' expr)*
/// ```
pub struct ExprEvaluator<'doc, 'src> {
    source: &'src str,
    tokens: Vec<ExprToken>,
    pos: usize,
    depth: usize,
    global: &'doc JsonValue,
}

impl<'doc, 'src> ExprEvaluator<'doc, 'src> {
    /// Evaluate `source` against `global`, the document root.
    pub fn evaluate(global: &'doc JsonValue, source: &'src str) -> Result<Evaluated<'doc>, Error> {
        let tokens = ExprTokenizer::tokenize(source)?;
        let mut evaluator = Self {
            source,
            tokens,
            pos: 0,
            depth: 0,
            global,
        };
        let result = evaluator.parse_expr()?;
        let end = evaluator.peek();
        if end.kind != ExprTokenKind::Eof {
            return Err(ExprParseError::UnexpectedToken {
                found: end.kind,
                offset: end.start,
            }
            .into());
        }
        let result = result.ok_or(ExprParseError::EmptyExpression(end.start))?;
        debug!("evaluated {source:?} to {}", result.kind());
        Ok(result)
    }

    fn peek_at(&self, ahead: usize) -> ExprToken {
        self.tokens.get(self.pos + ahead).copied().unwrap_or(Token::new(
            ExprTokenKind::Eof,
            self.source.len(),
            self.source.len(),
        ))
    }

    fn peek(&self) -> ExprToken {
        self.peek_at(0)
    }

    fn next(&mut self) -> ExprToken {
        let token = self.peek();
        self.pos += 1;
        token
    }

    /// Evaluates one expression, stopping in front of `,`, `)`, `]` or the end.
    ///
    /// Returns `None` when the expression is empty.
    fn parse_expr(&mut self) -> Result<Option<Evaluated<'doc>>, Error> {
        if self.depth == MAX_DEPTH {
            return Err(ExprParseError::NestingTooDeep(self.peek().start).into());
        }
        self.depth += 1;
        let result = self.parse_chain();
        self.depth -= 1;
        result
    }

    fn parse_chain(&mut self) -> Result<Option<Evaluated<'doc>>, Error> {
        let first = self.pos;
        let mut current: Option<Evaluated<'doc>> = None;
        loop {
            let token = self.peek();
            match token.kind {
                ExprTokenKind::Min | ExprTokenKind::Max | ExprTokenKind::Size => {
                    if self.pos != first {
                        return Err(ExprParseError::MisplacedFunction {
                            name: token.kind,
                            offset: token.start,
                        }
                        .into());
                    }
                    self.pos += 1;
                    current = Some(match token.kind {
                        ExprTokenKind::Size => self.parse_size()?,
                        name => self.parse_extremum(name)?,
                    });
                }
                ExprTokenKind::LeftSquare => {
                    self.pos += 1;
                    let index = self.parse_expr()?;
                    let close = self.next();
                    if close.kind != ExprTokenKind::RightSquare {
                        return Err(ExprParseError::ExpectedClosingSquare {
                            found: close.kind,
                            offset: close.start,
                        }
                        .into());
                    }
                    let index = index
                        .ok_or(ExprParseError::MissingIndex(token.start))?
                        .as_int()?;
                    let target = current.take().unwrap_or(Cow::Borrowed(self.global));
                    current = Some(index_into(target, index)?);
                }
                ExprTokenKind::Dot => {
                    let Some(target) = current.take() else {
                        return Err(ExprParseError::UnexpectedDot(token.start).into());
                    };
                    let ident = self.peek_at(1);
                    if ident.kind != ExprTokenKind::Ident {
                        return Err(ExprParseError::ExpectedIdentifier(ident.start).into());
                    }
                    self.pos += 2;
                    current = Some(key_into(target, ident.lexeme(self.source))?);
                }
                ExprTokenKind::Ident => {
                    // Only the leading identifier is looked up on the root;
                    // later ones need a dot.
                    if current.is_some() {
                        return Err(ExprParseError::UnexpectedIdentifier(token.start).into());
                    }
                    self.pos += 1;
                    current = Some(Cow::Borrowed(
                        self.global.key(token.lexeme(self.source))?,
                    ));
                }
                ExprTokenKind::Int | ExprTokenKind::Number => {
                    if current.is_some() {
                        return Err(ExprParseError::UnexpectedToken {
                            found: token.kind,
                            offset: token.start,
                        }
                        .into());
                    }
                    self.pos += 1;
                    current = Some(Cow::Owned(self.literal(token)?));
                }
                ExprTokenKind::LeftRound => {
                    return Err(ExprParseError::UnexpectedToken {
                        found: token.kind,
                        offset: token.start,
                    }
                    .into())
                }
                ExprTokenKind::Comma
                | ExprTokenKind::RightRound
                | ExprTokenKind::RightSquare
                | ExprTokenKind::Eof => return Ok(current),
            }
        }
    }

    fn expect_open_paren(&mut self, name: ExprTokenKind) -> Result<ExprToken, ExprParseError> {
        let token = self.next();
        if token.kind != ExprTokenKind::LeftRound {
            return Err(ExprParseError::ExpectedOpenParen {
                name,
                found: token.kind,
                offset: token.start,
            });
        }
        Ok(token)
    }

    /// `min(...)` / `max(...)`, with the keyword already consumed.
    fn parse_extremum(&mut self, name: ExprTokenKind) -> Result<Evaluated<'doc>, Error> {
        let open = self.expect_open_paren(name)?;
        let mut args = Vec::new();
        loop {
            let at = self.peek().start;
            let arg = self
                .parse_expr()?
                .ok_or(ExprParseError::EmptyExpression(at))?;
            args.push(arg);
            let token = self.next();
            match token.kind {
                ExprTokenKind::RightRound => break,
                ExprTokenKind::Comma => {}
                found => {
                    return Err(ExprParseError::ExpectedCommaOrParen {
                        found,
                        offset: token.start,
                    }
                    .into())
                }
            }
        }

        let is_min = name == ExprTokenKind::Min;
        if args.len() > 1 {
            let best = extremum_position(args.iter().map(|arg| &**arg), is_min)?;
            return Ok(args.swap_remove(best));
        }
        // A single argument must be an array, reduced over its elements.
        let array = args
            .pop()
            .ok_or(ExprParseError::EmptyExpression(open.end + 1))?;
        Ok(match array {
            Cow::Borrowed(array) => Cow::Borrowed(reduce(array, is_min)?),
            // Owned values are scalars, so this only produces the type error.
            Cow::Owned(array) => Cow::Owned(reduce(&array, is_min)?.clone()),
        })
    }

    /// `size(...)`, with the keyword already consumed.
    fn parse_size(&mut self) -> Result<Evaluated<'doc>, Error> {
        self.expect_open_paren(ExprTokenKind::Size)?;
        let at = self.peek().start;
        let arg = self
            .parse_expr()?
            .ok_or(ExprParseError::EmptyExpression(at))?;
        let close = self.next();
        if close.kind != ExprTokenKind::RightRound {
            return Err(ExprParseError::ExpectedCloseParen {
                found: close.kind,
                offset: close.start,
            }
            .into());
        }
        let size = i64::try_from(arg.size()?).unwrap_or(i64::MAX);
        Ok(Cow::Owned(JsonValue::Int(size)))
    }

    fn literal(&self, token: ExprToken) -> Result<JsonValue, ExprParseError> {
        let text = token.lexeme(self.source);
        let invalid = || ExprParseError::InvalidNumber {
            text: text.to_string(),
            offset: token.start,
        };
        match token.kind {
            ExprTokenKind::Int => text.parse().map(JsonValue::Int).map_err(|_| invalid()),
            _ => text.parse().map(JsonValue::Float).map_err(|_| invalid()),
        }
    }
}

fn reduce(array: &JsonValue, is_min: bool) -> Result<&JsonValue, OperationError> {
    if is_min {
        array.min()
    } else {
        array.max()
    }
}

// Owned targets are literals or `size` results, always scalars: the `Owned`
// arms below only ever return the operation's type error.
fn index_into(target: Evaluated<'_>, index: i64) -> Result<Evaluated<'_>, OperationError> {
    Ok(match target {
        Cow::Borrowed(value) => Cow::Borrowed(value.index(index)?),
        Cow::Owned(value) => Cow::Owned(value.index(index)?.clone()),
    })
}

fn key_into<'doc>(target: Evaluated<'doc>, key: &str) -> Result<Evaluated<'doc>, OperationError> {
    Ok(match target {
        Cow::Borrowed(value) => Cow::Borrowed(value.key(key)?),
        Cow::Owned(value) => Cow::Owned(value.key(key)?.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> JsonValue {
        JsonValue::from(json!({"a": {"b": [1, 2, {"c": "test"}, [11, 12]]}}))
    }

    fn eval(expr: &str) -> Result<JsonValue, Error> {
        let doc = doc();
        ExprEvaluator::evaluate(&doc, expr).map(Cow::into_owned)
    }

    fn parse_err(expr: &str) -> ExprParseError {
        match eval(expr) {
            Err(Error::Expr(err)) => err,
            other => panic!("expected parse error for {expr:?}, got {other:?}"),
        }
    }

    fn op_err(expr: &str) -> OperationError {
        match eval(expr) {
            Err(Error::InvalidOperation(err)) => err,
            other => panic!("expected operation error for {expr:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_field_and_index_chain() {
        assert_eq!(eval("a.b[1]"), Ok(JsonValue::Int(2)));
        assert_eq!(eval("a.b[2].c"), Ok(JsonValue::String("test".into())));
        assert_eq!(eval("a.b[3][0]"), Ok(JsonValue::Int(11)));
        assert_eq!(eval(" a . b [ 3 ] [ 1 ] "), Ok(JsonValue::Int(12)));
    }

    #[test]
    fn test_nested_subscript() {
        assert_eq!(eval("a.b[a.b[1]].c"), Ok(JsonValue::String("test".into())));
        assert_eq!(eval("a.b[3][a.b[0]]"), Ok(JsonValue::Int(12)));
    }

    #[test]
    fn test_lookups_borrow_from_document() {
        let doc = doc();
        let result = ExprEvaluator::evaluate(&doc, "a.b[3]").unwrap();
        let expected = doc.key("a").unwrap().key("b").unwrap().index(3).unwrap();
        assert!(matches!(result, Cow::Borrowed(v) if std::ptr::eq(v, expected)));
    }

    #[test]
    fn test_subscript_without_value_indexes_root() {
        let doc = JsonValue::from(json!([[5, 6], 7]));
        let result = ExprEvaluator::evaluate(&doc, "[0][1]").unwrap();
        assert_eq!(*result, JsonValue::Int(6));
    }

    #[test]
    fn test_literals() {
        assert_eq!(eval("42"), Ok(JsonValue::Int(42)));
        assert_eq!(eval("-3"), Ok(JsonValue::Int(-3)));
        assert_eq!(eval("1.5"), Ok(JsonValue::Float(1.5)));
        let doc = doc();
        assert!(matches!(
            ExprEvaluator::evaluate(&doc, "7"),
            Ok(Cow::Owned(JsonValue::Int(7)))
        ));
    }

    #[test]
    fn test_min_max_over_arguments() {
        assert_eq!(eval("max(a.b[0], a.b[1])"), Ok(JsonValue::Int(2)));
        assert_eq!(eval("min(a.b[0], a.b[1])"), Ok(JsonValue::Int(1)));
        assert_eq!(eval("max(a.b[0], 10, a.b[1], 15)"), Ok(JsonValue::Int(15)));
        assert_eq!(eval("min(3, -1.5, 2)"), Ok(JsonValue::Float(-1.5)));
    }

    #[test]
    fn test_min_max_ties_keep_first_argument() {
        assert_eq!(eval("max(2, 2.0)"), Ok(JsonValue::Int(2)));
        assert_eq!(eval("min(2.0, 2)"), Ok(JsonValue::Float(2.0)));
    }

    #[test]
    fn test_min_max_over_array() {
        assert_eq!(eval("min(a.b[3])"), Ok(JsonValue::Int(11)));
        assert_eq!(eval("max(a.b[3])"), Ok(JsonValue::Int(12)));
        assert_eq!(eval("a.b[min(a.b[0], 2)]"), Ok(JsonValue::Int(2)));
    }

    #[test]
    fn test_size() {
        assert_eq!(eval("size(a)"), Ok(JsonValue::Int(1)));
        assert_eq!(eval("size(a.b)"), Ok(JsonValue::Int(4)));
        assert_eq!(eval("size(a.b[a.b[1]].c)"), Ok(JsonValue::Int(4)));
        assert_eq!(eval("a.b[size(a.b[3])].c"), Ok(JsonValue::String("test".into())));
    }

    #[test]
    fn test_function_results_can_be_subscripted_further() {
        let doc = JsonValue::from(json!({"xs": [[1, 2]], "n": 0}));
        let result = ExprEvaluator::evaluate(&doc, "max(n, 0)").unwrap();
        assert_eq!(*result, JsonValue::Int(0));
        assert!(matches!(
            ExprEvaluator::evaluate(&doc, "size(xs)[0]"),
            Err(Error::InvalidOperation(OperationError::TypeError(_)))
        ));
    }

    #[test]
    fn test_operation_errors() {
        assert_eq!(
            op_err("min(a)"),
            OperationError::TypeError("cannot take min of object".into())
        );
        assert_eq!(
            op_err("max(1, a)"),
            OperationError::TypeError("cannot treat object as number".into())
        );
        assert_eq!(
            op_err("max(a.b)"),
            OperationError::TypeError("cannot treat object as number".into())
        );
        assert_eq!(op_err("a.b[4]"), OperationError::IndexError { index: 4, len: 4 });
        assert_eq!(op_err("a.b[-1]"), OperationError::IndexError { index: -1, len: 4 });
        assert_eq!(op_err("a.x"), OperationError::KeyError("x".into()));
        assert_eq!(op_err("x"), OperationError::KeyError("x".into()));
        assert_eq!(
            op_err("a.b[1.0]"),
            OperationError::TypeError("cannot treat float as int".into())
        );
        assert_eq!(
            op_err("size(a.b[0])"),
            OperationError::TypeError("cannot take size of int".into())
        );
        assert_eq!(
            op_err("a.b[0].c"),
            OperationError::TypeError("cannot index int by key".into())
        );
    }

    #[test]
    fn test_empty_array_reduction() {
        let doc = JsonValue::from(json!({"e": []}));
        assert_eq!(
            ExprEvaluator::evaluate(&doc, "max(e)"),
            Err(Error::InvalidOperation(OperationError::EmptyCollection("max")))
        );
    }

    #[test]
    fn test_structural_errors() {
        assert_eq!(parse_err(""), ExprParseError::EmptyExpression(0));
        assert_eq!(parse_err(".a"), ExprParseError::UnexpectedDot(0));
        assert_eq!(parse_err("a."), ExprParseError::ExpectedIdentifier(2));
        assert_eq!(parse_err("a.[0]"), ExprParseError::ExpectedIdentifier(2));
        assert_eq!(parse_err("a b"), ExprParseError::UnexpectedIdentifier(2));
        assert_eq!(
            parse_err("a 1"),
            ExprParseError::UnexpectedToken {
                found: ExprTokenKind::Int,
                offset: 2
            }
        );
        assert_eq!(
            parse_err("a)"),
            ExprParseError::UnexpectedToken {
                found: ExprTokenKind::RightRound,
                offset: 1
            }
        );
        assert_eq!(
            parse_err("(a)"),
            ExprParseError::UnexpectedToken {
                found: ExprTokenKind::LeftRound,
                offset: 0
            }
        );
    }

    #[test]
    fn test_subscript_errors() {
        assert_eq!(
            parse_err("a.b[1"),
            ExprParseError::ExpectedClosingSquare {
                found: ExprTokenKind::Eof,
                offset: 5
            }
        );
        assert_eq!(parse_err("a.b[]"), ExprParseError::MissingIndex(3));
        assert_eq!(
            parse_err("a.b[1, 2]"),
            ExprParseError::ExpectedClosingSquare {
                found: ExprTokenKind::Comma,
                offset: 5
            }
        );
    }

    #[test]
    fn test_function_errors() {
        assert_eq!(
            parse_err("a.b min(1, 2)"),
            ExprParseError::MisplacedFunction {
                name: ExprTokenKind::Min,
                offset: 4
            }
        );
        assert_eq!(
            parse_err("max 1"),
            ExprParseError::ExpectedOpenParen {
                name: ExprTokenKind::Max,
                found: ExprTokenKind::Int,
                offset: 4
            }
        );
        assert_eq!(parse_err("max()"), ExprParseError::EmptyExpression(4));
        assert_eq!(parse_err("max(1,"), ExprParseError::EmptyExpression(6));
        assert_eq!(
            parse_err("max(1 2)"),
            ExprParseError::UnexpectedToken {
                found: ExprTokenKind::Int,
                offset: 6
            }
        );
        assert_eq!(
            parse_err("max(1]"),
            ExprParseError::ExpectedCommaOrParen {
                found: ExprTokenKind::RightSquare,
                offset: 5
            }
        );
        assert_eq!(
            parse_err("size(a, a)"),
            ExprParseError::ExpectedCloseParen {
                found: ExprTokenKind::Comma,
                offset: 6
            }
        );
        assert_eq!(parse_err("size()"), ExprParseError::EmptyExpression(5));
    }

    #[test]
    fn test_owned_scalars_cannot_be_navigated() {
        assert!(matches!(op_err("1[0]"), OperationError::TypeError(_)));
        assert!(matches!(op_err("size(a.b).c"), OperationError::TypeError(_)));
        assert!(matches!(op_err("max(2.5)"), OperationError::TypeError(_)));
    }

    #[test]
    fn test_nesting_limit() {
        let doc = JsonValue::from(json!({"x": [0]}));
        let nested = |n: usize| format!("{}0{}", "x[".repeat(n), "]".repeat(n));

        let ok = ExprEvaluator::evaluate(&doc, &nested(MAX_DEPTH - 1)).map(Cow::into_owned);
        assert_eq!(ok, Ok(JsonValue::Int(0)));
        for n in [MAX_DEPTH, 200_000] {
            assert_eq!(
                ExprEvaluator::evaluate(&doc, &nested(n)),
                Err(Error::Expr(ExprParseError::NestingTooDeep(2 * MAX_DEPTH)))
            );
        }

        let calls = format!("{}1{}", "size(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert_eq!(
            ExprEvaluator::evaluate(&doc, &calls),
            Err(Error::Expr(ExprParseError::NestingTooDeep(5 * MAX_DEPTH)))
        );
    }

    #[test]
    fn test_lexical_errors_surface_as_parse_errors() {
        assert_eq!(parse_err("a.b[0] + 1"), ExprParseError::UnexpectedChar { ch: '+', offset: 7 });
        assert_eq!(parse_err("sum(a)"), ExprParseError::InvalidKeyword(0));
    }
}
