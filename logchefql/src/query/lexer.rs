//! Hand-written lexer for LogchefQL.
//!
//! The scan is a single left-to-right pass. Every character decision (quoting,
//! escapes, keyword boundaries) is made here so the parser only ever sees
//! whole tokens. Scanning is lenient: characters with no special meaning are
//! absorbed into the surrounding key or value, leaving it to the parser to
//! reject malformed input.

use super::error::{ErrorCode, ParseError};
use super::token::{Position, Token, TokenKind};
use nom::{
    character::complete::{char, digit1, one_of},
    combinator::{opt, recognize},
    IResult, Parser,
};

/// Longest string-literal prefix quoted back in an unterminated-string error.
const PREVIEW_LEN: usize = 20;

/// Output of [`tokenize`]: the token stream plus any lexical errors.
///
/// The stream is returned even when errors are present so callers can still
/// extract metadata from a half-typed query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokenized {
    /// Tokens in source order.
    pub tokens: Vec<Token>,
    /// Lexical errors in source order.
    pub errors: Vec<ParseError>,
}

impl Tokenized {
    /// Returns the first lexical error, if any.
    #[must_use]
    pub fn first_error(&self) -> Option<&ParseError> {
        self.errors.first()
    }

    fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    fn last_is_operator(&self) -> bool {
        self.tokens
            .last()
            .is_some_and(|t| t.kind == TokenKind::Operator)
    }
}

/// Converts query text into tokens.
///
/// # Examples
///
/// ```
/// use logchefql::query::{tokenize, TokenKind};
///
/// let out = tokenize(r#"level="error" and status>=500"#);
/// let kinds: Vec<_> = out.tokens.iter().map(|t| t.kind).collect();
/// assert_eq!(
///     kinds,
///     vec![
///         TokenKind::Key,
///         TokenKind::Operator,
///         TokenKind::Value,
///         TokenKind::BoolWord,
///         TokenKind::Key,
///         TokenKind::Operator,
///         TokenKind::Number,
///     ]
/// );
/// assert!(out.errors.is_empty());
/// ```
#[must_use]
pub fn tokenize(input: &str) -> Tokenized {
    Lexer::new(input).run(Tokenized::default())
}

fn is_operator_char(c: char) -> bool {
    matches!(c, '=' | '!' | '~' | '>' | '<')
}

fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}

/// Characters that may legally surround a keyword or terminate a number.
fn is_boundary(c: char) -> bool {
    c.is_whitespace() || is_operator_char(c) || matches!(c, '(' | ')' | '|')
}

fn number_literal(input: &str) -> IResult<&str, &str> {
    recognize((opt(one_of("+-")), digit1, opt((char('.'), digit1)))).parse(input)
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn run(mut self, mut acc: Tokenized) -> Tokenized {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
                continue;
            }

            let start = self.position();
            match c {
                '(' | ')' | '|' => {
                    self.bump();
                    let kind = if c == '|' {
                        TokenKind::Pipe
                    } else {
                        TokenKind::Paren
                    };
                    acc.push(Token::new(kind, c.to_string(), start));
                }
                c if is_operator_char(c) => {
                    let text = self.take_while(is_operator_char);
                    acc.push(Token::new(TokenKind::Operator, text, start));
                }
                c if is_quote(c) && acc.last_is_operator() => {
                    self.scan_string(c, start, &mut acc);
                }
                _ => {
                    if let Some(word) = self.boolean_word() {
                        self.advance(word.len());
                        acc.push(Token::new(
                            TokenKind::BoolWord,
                            word.to_ascii_lowercase(),
                            start,
                        ));
                    } else if let Some(number) = self.number() {
                        self.advance(number.len());
                        acc.push(Token::new(TokenKind::Number, number, start));
                    } else {
                        self.scan_word(start, &mut acc);
                    }
                }
            }
        }
        acc
    }

    // ========================================================================
    // Cursor helpers
    // ========================================================================

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn prev_char(&self) -> Option<char> {
        self.input[..self.pos].chars().next_back()
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Advances over `bytes` bytes of input, which must end on a char boundary.
    fn advance(&mut self, bytes: usize) {
        let target = self.pos + bytes;
        while self.pos < target && self.bump().is_some() {}
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        &self.input[start..self.pos]
    }

    // ========================================================================
    // Token scanners
    // ========================================================================

    /// Recognizes `and`/`or` only when delimited on both sides, so words such
    /// as `order`, `android` or `sandbox` stay ordinary keys and values.
    fn boolean_word(&self) -> Option<&'a str> {
        let rest = self.rest();
        let end = rest
            .find(|c: char| !c.is_alphabetic())
            .unwrap_or(rest.len());
        let word = &rest[..end];
        if !(word.eq_ignore_ascii_case("and") || word.eq_ignore_ascii_case("or")) {
            return None;
        }

        let prev_ok = self.prev_char().is_none_or(is_boundary);
        let next_ok = rest[end..].chars().next().is_none_or(is_boundary);
        (prev_ok && next_ok).then_some(word)
    }

    /// A numeric literal counts only if it ends at a token boundary, so IP
    /// addresses and versions like `1.2.3` lex as words.
    fn number(&self) -> Option<&'a str> {
        let (remaining, literal) = number_literal(self.rest()).ok()?;
        remaining
            .chars()
            .next()
            .is_none_or(is_boundary)
            .then_some(literal)
    }

    fn scan_string(&mut self, delimiter: char, start: Position, acc: &mut Tokenized) {
        self.bump();
        let mut text = String::new();

        loop {
            match self.bump() {
                Some('\\') => match self.bump() {
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some('r') => text.push('\r'),
                    Some(other) => text.push(other),
                    None => break,
                },
                Some(c) if c == delimiter => {
                    acc.push(Token::new(TokenKind::Value, text, start).quoted());
                    return;
                }
                Some(c) => text.push(c),
                None => break,
            }
        }

        acc.errors.push(unterminated(delimiter, &text, start));
        let mut token = Token::new(TokenKind::Value, text, start).quoted();
        token.incomplete = true;
        acc.push(token);
    }

    /// Scans a bare key or value, absorbing quoted path segments whole.
    fn scan_word(&mut self, start: Position, acc: &mut Tokenized) {
        let kind = if acc.last_is_operator() {
            TokenKind::Value
        } else {
            TokenKind::Key
        };
        let mut text = String::new();
        let mut quoted = false;
        let mut incomplete = false;

        while let Some(c) = self.peek() {
            if is_boundary(c) {
                break;
            }
            if !is_quote(c) {
                text.push(c);
                self.bump();
                continue;
            }

            let segment_start = self.position();
            let segment_offset = text.len();
            text.push(c);
            self.bump();
            quoted = true;

            let mut closed = false;
            while let Some(inner) = self.bump() {
                text.push(inner);
                if inner == '\\' {
                    if let Some(escaped) = self.bump() {
                        text.push(escaped);
                    }
                } else if inner == c {
                    closed = true;
                    break;
                }
            }
            if !closed {
                incomplete = true;
                acc.errors
                    .push(unterminated(c, &text[segment_offset + 1..], segment_start));
            }
        }

        let mut token = Token::new(kind, text, start);
        token.quoted = quoted && kind == TokenKind::Key;
        token.incomplete = incomplete;
        acc.push(token);
    }
}

fn unterminated(delimiter: char, contents: &str, position: Position) -> ParseError {
    let mut preview: String = contents.chars().take(PREVIEW_LEN).collect();
    if contents.chars().count() > PREVIEW_LEN {
        preview.push_str("...");
    }
    ParseError::at(
        ErrorCode::UnterminatedString,
        format!(
            "unterminated string literal starting with {delimiter}{preview}: missing closing {delimiter}"
        ),
        position,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).tokens.iter().map(|t| t.kind).collect()
    }

    fn texts(input: &str) -> Vec<String> {
        tokenize(input).tokens.into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_simple_comparison() {
        let out = tokenize(r#"level="error""#);
        assert!(out.errors.is_empty());
        assert_eq!(
            kinds(r#"level="error""#),
            vec![TokenKind::Key, TokenKind::Operator, TokenKind::Value]
        );
        assert_eq!(out.tokens[2].text, "error");
        assert!(out.tokens[2].quoted);
    }

    #[test]
    fn test_compound_operators() {
        assert_eq!(
            texts("a!=1 b!~x c>=2 d<=3 e>4 f<5 g~y"),
            vec![
                "a", "!=", "1", "b", "!~", "x", "c", ">=", "2", "d", "<=", "3", "e", ">", "4",
                "f", "<", "5", "g", "~", "y"
            ]
        );
    }

    #[test]
    fn test_operator_run_is_kept_whole() {
        let out = tokenize("a=!1");
        assert_eq!(out.tokens[1].kind, TokenKind::Operator);
        assert_eq!(out.tokens[1].text, "=!");
    }

    #[test]
    fn test_boolean_keywords_case_insensitive() {
        let out = tokenize("a=1 AND b=2 Or c=3");
        let bools: Vec<_> = out
            .tokens
            .iter()
            .filter(|t| t.kind == TokenKind::BoolWord)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(bools, vec!["and", "or"]);
    }

    #[test]
    fn test_keyword_fragments_are_not_booleans() {
        for word in ["order", "android", "sandbox", "coral", "oracle", "band"] {
            let query = format!("{word}={word}");
            assert!(
                !kinds(&query).contains(&TokenKind::BoolWord),
                "{word} was split into a keyword"
            );
        }
    }

    #[test]
    fn test_keyword_next_to_parens() {
        assert_eq!(
            kinds("(a=1)or(b=2)"),
            vec![
                TokenKind::Paren,
                TokenKind::Key,
                TokenKind::Operator,
                TokenKind::Number,
                TokenKind::Paren,
                TokenKind::BoolWord,
                TokenKind::Paren,
                TokenKind::Key,
                TokenKind::Operator,
                TokenKind::Number,
                TokenKind::Paren,
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        let out = tokenize(r#"msg="a\"b\\c\nd\te\rf\qg""#);
        assert!(out.errors.is_empty());
        assert_eq!(out.tokens[2].text, "a\"b\\c\nd\te\rfqg");
    }

    #[test]
    fn test_single_quoted_string() {
        let out = tokenize(r"msg='it\'s'");
        assert_eq!(out.tokens[2].text, "it's");
        assert!(out.tokens[2].quoted);
    }

    #[test]
    fn test_unterminated_string_recovers() {
        let out = tokenize(r#"a="hello"#);
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].code, ErrorCode::UnterminatedString);
        assert_eq!(out.errors[0].position, Some(Position::new(1, 3)));
        let last = out.tokens.last().unwrap();
        assert_eq!(last.text, "hello");
        assert!(last.incomplete);
    }

    #[test]
    fn test_nested_key_with_quoted_segment() {
        let out = tokenize(r#"log.attributes."foo bar"="x""#);
        assert!(out.errors.is_empty());
        assert_eq!(out.tokens[0].kind, TokenKind::Key);
        assert_eq!(out.tokens[0].text, r#"log.attributes."foo bar""#);
        assert!(out.tokens[0].quoted);
        assert_eq!(out.tokens[1].kind, TokenKind::Operator);
    }

    #[test]
    fn test_quoted_key_at_start() {
        let out = tokenize(r#""my field"="v""#);
        assert_eq!(out.tokens[0].kind, TokenKind::Key);
        assert_eq!(out.tokens[0].text, r#""my field""#);
        assert_eq!(out.tokens[2].kind, TokenKind::Value);
    }

    #[test]
    fn test_numbers() {
        let out = tokenize("a=-1.5 b=42 c=10.0.0.1 d=1.2.3");
        let values: Vec<_> = out
            .tokens
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::Number | TokenKind::Value))
            .map(|t| (t.kind, t.text.as_str()))
            .collect();
        assert_eq!(
            values,
            vec![
                (TokenKind::Number, "-1.5"),
                (TokenKind::Number, "42"),
                (TokenKind::Value, "10.0.0.1"),
                (TokenKind::Value, "1.2.3"),
            ]
        );
    }

    #[test]
    fn test_bare_value_keeps_odd_characters() {
        let out = tokenize("path=/api/v1?x#y");
        assert_eq!(out.tokens[2].kind, TokenKind::Value);
        assert_eq!(out.tokens[2].text, "/api/v1?x#y");
    }

    #[test]
    fn test_pipe_and_select_fields() {
        assert_eq!(
            kinds(r#"ns="prod" | service body"#),
            vec![
                TokenKind::Key,
                TokenKind::Operator,
                TokenKind::Value,
                TokenKind::Pipe,
                TokenKind::Key,
                TokenKind::Key,
            ]
        );
    }

    #[test]
    fn test_line_and_column_tracking() {
        let out = tokenize("a=1\n  and b=2");
        let and = &out.tokens[3];
        assert_eq!(and.kind, TokenKind::BoolWord);
        assert_eq!(and.position, Position::new(2, 3));
        assert_eq!(out.tokens[4].position, Position::new(2, 7));
    }

    #[test]
    fn test_at_prefixed_key() {
        let out = tokenize("@timestamp>0");
        assert_eq!(out.tokens[0].kind, TokenKind::Key);
        assert_eq!(out.tokens[0].text, "@timestamp");
    }

    #[test]
    fn test_empty_input() {
        let out = tokenize("   \n\t ");
        assert!(out.tokens.is_empty());
        assert!(out.errors.is_empty());
    }
}
