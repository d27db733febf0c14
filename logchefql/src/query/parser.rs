//! Recursive-descent parser for LogchefQL.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! query      := filter? ( "|" field+ )?
//! filter     := and ( "or" and )*
//! and        := term ( "and" term )*
//! term       := "(" filter ")" | comparison
//! comparison := field operator value
//! ```
//!
//! AND binds tighter than OR, so `a=1 or b=2 and c=3` parses as
//! `a=1 or (b=2 and c=3)`.

use super::ast::{BoolOp, Expression, FieldPath, Node, Operator, Query, Value};
use super::error::{ErrorCode, ParseError};
use super::token::{Position, Token, TokenKind};
use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, take_while1},
    character::complete::{anychar, char},
    combinator::{map, opt, value},
    multi::separated_list1,
    sequence::delimited,
    IResult, Parser as _,
};

/// Deepest allowed nesting of parenthesized groups. Parsing, generation
/// and `Display` recurse once per level.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Knobs for literal coercion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Treat unquoted words that look like numbers (`1e3`, `0.5`) as numbers
    /// instead of bare strings.
    pub numeric_bare_words: bool,
}

/// Parses a token stream into a [`Query`].
///
/// # Errors
///
/// Returns the first structural error found. This does not run the
/// missing-boolean-operator scan; see [`detect_missing_boolean_operator`].
///
/// # Examples
///
/// ```
/// use logchefql::query::{parse, tokenize};
///
/// let tokens = tokenize(r#"a="1" or b="2" and c="3""#).tokens;
/// let query = parse(&tokens).unwrap();
/// assert_eq!(query.where_clause.unwrap().to_string(), r#"a="1" or b="2" and c="3""#);
/// ```
pub fn parse(tokens: &[Token]) -> Result<Query, ParseError> {
    Parser::new(tokens).parse()
}

/// Token-stream parser.
#[derive(Debug)]
pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    options: ParseOptions,
}

impl<'a> Parser<'a> {
    /// Creates a parser with default options.
    #[must_use]
    pub fn new(tokens: &'a [Token]) -> Self {
        Self::with_options(tokens, ParseOptions::default())
    }

    /// Creates a parser with explicit options.
    #[must_use]
    pub fn with_options(tokens: &'a [Token], options: ParseOptions) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            options,
        }
    }

    /// Parses the whole token stream.
    ///
    /// # Errors
    ///
    /// Returns the first structural error.
    pub fn parse(mut self) -> Result<Query, ParseError> {
        let all = self.tokens;
        let pipe = all.iter().position(|t| t.kind == TokenKind::Pipe);
        let (filter, projection) = match pipe {
            Some(i) => (&all[..i], Some((&all[i], &all[i + 1..]))),
            None => (all, None),
        };

        self.tokens = filter;
        self.pos = 0;
        let where_clause = if filter.is_empty() {
            None
        } else {
            let node = self.parse_or()?;
            if let Some(extra) = self.peek() {
                return Err(unexpected(extra));
            }
            Some(node)
        };

        let select = match projection {
            Some((pipe, fields)) => parse_select(pipe, fields)?,
            None => Vec::new(),
        };

        Ok(Query {
            where_clause,
            select,
        })
    }

    // ========================================================================
    // Cursor helpers
    // ========================================================================

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn end_position(&self) -> Option<Position> {
        self.tokens.last().map(|t| t.position)
    }

    fn unexpected_end(&self, message: impl Into<String>) -> ParseError {
        error_near(ErrorCode::UnexpectedEnd, message, self.end_position())
    }

    // ========================================================================
    // Boolean expressions
    // ========================================================================

    fn parse_or(&mut self) -> Result<Node, ParseError> {
        let first = self.parse_and()?;
        let mut rest = Vec::new();
        while self.eat_bool(BoolOp::Or)? {
            rest.push(self.parse_and()?);
        }
        Ok(Node::combine(BoolOp::Or, first, rest))
    }

    fn parse_and(&mut self) -> Result<Node, ParseError> {
        let first = self.parse_term()?;
        let mut rest = Vec::new();
        while self.eat_bool(BoolOp::And)? {
            rest.push(self.parse_term()?);
        }
        Ok(Node::combine(BoolOp::And, first, rest))
    }

    /// Consumes the next token if it is the boolean keyword `op`.
    fn eat_bool(&mut self, op: BoolOp) -> Result<bool, ParseError> {
        let Some(token) = self.peek() else {
            return Ok(false);
        };
        if token.kind != TokenKind::BoolWord {
            return Ok(false);
        }
        match BoolOp::from_keyword(&token.text) {
            Some(found) if found == op => {
                self.pos += 1;
                if self.peek().is_none() {
                    return Err(self.unexpected_end(format!(
                        "expected an expression after '{}'",
                        op.keyword()
                    )));
                }
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(ParseError::at(
                ErrorCode::UnknownBooleanOperator,
                format!("unknown boolean operator '{}', expected 'and' or 'or'", token.text),
                token.position,
            )),
        }
    }

    fn parse_term(&mut self) -> Result<Node, ParseError> {
        let Some(token) = self.peek() else {
            return Err(self.unexpected_end("expected an expression"));
        };

        match token.kind {
            TokenKind::Paren if token.is_paren('(') => {
                if self.depth >= MAX_NESTING_DEPTH {
                    return Err(ParseError::at(
                        ErrorCode::UnexpectedToken,
                        format!("groups nested too deep, at most {MAX_NESTING_DEPTH} levels are allowed"),
                        token.position,
                    ));
                }
                self.pos += 1;
                if self.peek().is_none() {
                    return Err(self.unexpected_end("expected an expression after '('"));
                }
                self.depth += 1;
                let inner = self.parse_or();
                self.depth -= 1;
                let inner = inner?;
                match self.next() {
                    Some(close) if close.is_paren(')') => Ok(Node::group(inner)),
                    Some(other) => Err(ParseError::at(
                        ErrorCode::ExpectedClosingParen,
                        format!(
                            "expected ')' to close the group opened at line {}, column {}, found '{}'",
                            token.position.line, token.position.column, other.text
                        ),
                        other.position,
                    )),
                    None => Err(ParseError::at(
                        ErrorCode::ExpectedClosingParen,
                        "expected ')' to close the group",
                        token.position,
                    )),
                }
            }
            TokenKind::Key => self.parse_comparison(),
            _ => Err(unexpected(token)),
        }
    }

    fn parse_comparison(&mut self) -> Result<Node, ParseError> {
        let Some(key) = self.next() else {
            return Err(self.unexpected_end("expected a field name"));
        };
        let field = parse_field_path(&key.text);

        let operator = match self.next() {
            Some(op) if op.kind == TokenKind::Operator => Operator::parse(&op.text).ok_or_else(|| {
                ParseError::at(
                    ErrorCode::UnknownOperator,
                    format!(
                        "unknown operator '{}', expected one of =, !=, ~, !~, >, <, >=, <=",
                        op.text
                    ),
                    op.position,
                )
            })?,
            Some(other) => {
                return Err(ParseError::at(
                    ErrorCode::ExpectedOperator,
                    format!("expected an operator after '{}', found '{}'", key.text, other.text),
                    other.position,
                ))
            }
            None => {
                return Err(ParseError::at(
                    ErrorCode::ExpectedOperator,
                    format!("expected an operator after '{}'", key.text),
                    key.position,
                ))
            }
        };

        let value_token = match self.next() {
            Some(t) if matches!(t.kind, TokenKind::Value | TokenKind::Number) => t,
            Some(other) => {
                return Err(ParseError::at(
                    ErrorCode::ExpectedValue,
                    format!("expected a value after '{operator}', found '{}'", other.text),
                    other.position,
                ))
            }
            None => {
                return Err(error_near(
                    ErrorCode::ExpectedValue,
                    format!("expected a value after '{operator}'"),
                    self.end_position(),
                ))
            }
        };

        Ok(Node::Expression(Expression {
            field,
            operator,
            value: self.coerce(value_token),
            quoted: value_token.quoted,
        }))
    }

    fn coerce(&self, token: &Token) -> Value {
        if token.quoted {
            return Value::Str(token.text.clone());
        }
        if token.kind == TokenKind::Number {
            return match token.text.parse::<f64>() {
                Ok(n) if n.is_finite() => Value::Num(n),
                _ => Value::Bare(token.text.clone()),
            };
        }
        match token.text.as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "null" => Value::Null,
            text => match text.parse::<f64>() {
                Ok(n) if self.options.numeric_bare_words && n.is_finite() => Value::Num(n),
                _ => Value::Bare(text.to_string()),
            },
        }
    }
}

fn unexpected(token: &Token) -> ParseError {
    ParseError::at(
        ErrorCode::UnexpectedToken,
        format!("unexpected {} '{}'", token.kind, token.text),
        token.position,
    )
}

fn error_near(code: ErrorCode, message: impl Into<String>, position: Option<Position>) -> ParseError {
    ParseError {
        code,
        message: message.into(),
        position,
    }
}

// ============================================================================
// Projection (after the pipe)
// ============================================================================

fn parse_select(pipe: &Token, fields: &[Token]) -> Result<Vec<FieldPath>, ParseError> {
    if fields.is_empty() {
        return Err(ParseError::at(
            ErrorCode::UnexpectedEnd,
            "expected at least one field name after '|'",
            pipe.position,
        ));
    }

    fields
        .iter()
        .map(|token| match token.kind {
            TokenKind::Key => Ok(parse_field_path(&token.text)),
            TokenKind::Number => Err(ParseError::at(
                ErrorCode::UnexpectedToken,
                format!("'{}' is not a valid field name after '|'", token.text),
                token.position,
            )),
            _ => Err(ParseError::at(
                ErrorCode::UnexpectedToken,
                format!(
                    "unexpected {} '{}' after '|', only field names are allowed",
                    token.kind, token.text
                ),
                token.position,
            )),
        })
        .collect()
}

// ============================================================================
// Missing boolean operator detection
// ============================================================================

/// Scans raw tokens for two comparisons written next to each other without
/// `and`/`or` between them, such as `a="1" b="2"` or `(a="1") (b="2")`.
///
/// Returns an error naming both fields, positioned at the second one.
#[must_use]
pub fn detect_missing_boolean_operator(tokens: &[Token]) -> Option<ParseError> {
    tokens.windows(3).enumerate().find_map(|(i, window)| {
        let [key, op, value] = window else {
            return None;
        };
        let is_comparison = key.kind == TokenKind::Key
            && op.kind == TokenKind::Operator
            && matches!(
                value.kind,
                TokenKind::Value | TokenKind::Number | TokenKind::Key
            );
        if !is_comparison {
            return None;
        }

        let next = tokens[i + 3..]
            .iter()
            .find(|t| t.kind != TokenKind::Paren)?;
        (next.kind == TokenKind::Key).then(|| {
            ParseError::at(
                ErrorCode::MissingBooleanOperator,
                format!(
                    "missing boolean operator (and/or) between '{}' and '{}'",
                    key.text, next.text
                ),
                next.position,
            )
        })
    })
}

// ============================================================================
// Field paths
// ============================================================================

/// Splits raw key text (`log."foo bar".x`) into a [`FieldPath`], unquoting
/// quoted segments.
#[must_use]
pub fn parse_field_path(text: &str) -> FieldPath {
    let segments = match field_segments(text) {
        Ok(("", segments)) => segments,
        _ => text
            .split('.')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    };
    FieldPath::from_segments(segments).unwrap_or_else(|| FieldPath::Name(text.to_string()))
}

fn field_segments(input: &str) -> IResult<&str, Vec<String>> {
    separated_list1(char('.'), segment).parse(input)
}

fn segment(input: &str) -> IResult<&str, String> {
    alt((
        quoted_segment('"'),
        quoted_segment('\''),
        map(
            take_while1(|c: char| c != '.' && c != '"' && c != '\''),
            str::to_string,
        ),
    ))
    .parse(input)
}

fn quoted_segment<'a>(quote: char) -> impl FnMut(&'a str) -> IResult<&'a str, String> {
    let stop = if quote == '"' { "\\\"" } else { "\\'" };
    move |input: &'a str| {
        map(
            delimited(
                char(quote),
                opt(escaped_transform(
                    is_not(stop),
                    '\\',
                    alt((
                        value('\n', char('n')),
                        value('\t', char('t')),
                        value('\r', char('r')),
                        anychar,
                    )),
                )),
                char(quote),
            ),
            Option::unwrap_or_default,
        )
        .parse(input)
    }
}
