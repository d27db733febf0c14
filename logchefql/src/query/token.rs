//! Token types produced by the lexer.

use serde::{Deserialize, Serialize};

/// A 1-based line/column location in the query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Line number, starting at 1.
    pub line: usize,
    /// Column number in characters, starting at 1.
    pub column: usize,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// Lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// A field name, possibly dotted with quoted segments.
    Key,
    /// A run of operator characters (`=`, `!=`, `>=`, ...).
    Operator,
    /// A string literal or bare word in value position.
    Value,
    /// A numeric literal.
    Number,
    /// `(` or `)`.
    Paren,
    /// `and` / `or`, lowercased.
    #[serde(rename = "bool")]
    BoolWord,
    /// The projection pipe `|`.
    Pipe,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Key => write!(f, "key"),
            Self::Operator => write!(f, "operator"),
            Self::Value => write!(f, "value"),
            Self::Number => write!(f, "number"),
            Self::Paren => write!(f, "parenthesis"),
            Self::BoolWord => write!(f, "boolean operator"),
            Self::Pipe => write!(f, "pipe"),
        }
    }
}

/// A single lexical token.
///
/// For string literals `text` holds the unescaped contents without the
/// surrounding quotes. Key tokens keep their raw text, quotes included, so the
/// parser can split the dotted path itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Token category.
    pub kind: TokenKind,
    /// Token text.
    pub text: String,
    /// Location of the first character of the token.
    pub position: Position,
    /// For values: the token was a string literal. For keys: some path
    /// segment was quoted.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub quoted: bool,
    /// The token was cut short by an unterminated string.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub incomplete: bool,
}

impl Token {
    /// Creates a plain token.
    pub fn new(kind: TokenKind, text: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
            quoted: false,
            incomplete: false,
        }
    }

    /// Marks the token as quoted.
    #[must_use]
    pub fn quoted(mut self) -> Self {
        self.quoted = true;
        self
    }

    /// Returns true if this is the given parenthesis.
    #[must_use]
    pub fn is_paren(&self, paren: char) -> bool {
        self.kind == TokenKind::Paren && self.text.starts_with(paren)
    }
}
