//! Error taxonomy shared by every stage of the compiler.

use super::token::Position;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable error code, serialized as `SCREAMING_SNAKE_CASE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A string literal was opened but never closed.
    UnterminatedString,
    /// The input ended where more tokens were required.
    UnexpectedEnd,
    /// A token appeared where it is not allowed.
    UnexpectedToken,
    /// A field name was not followed by a comparison operator.
    ExpectedOperator,
    /// A comparison operator was not followed by a value.
    ExpectedValue,
    /// A `(` was never closed.
    ExpectedClosingParen,
    /// Operator characters that do not form a known operator.
    UnknownOperator,
    /// A boolean keyword other than `and`/`or`.
    UnknownBooleanOperator,
    /// Two comparisons next to each other without `and`/`or`.
    MissingBooleanOperator,
    /// A time bound is not `YYYY-MM-DD HH:MM:SS` or not a real instant.
    InvalidTimeFormat,
    /// A timezone is neither an IANA name nor a UTC offset.
    InvalidTimezone,
    /// A table name failed the identifier allow-list.
    InvalidTableName,
    /// A timestamp column name failed the identifier allow-list.
    InvalidTimestampField,
}

impl ErrorCode {
    /// Returns the wire representation of the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnterminatedString => "UNTERMINATED_STRING",
            Self::UnexpectedEnd => "UNEXPECTED_END",
            Self::UnexpectedToken => "UNEXPECTED_TOKEN",
            Self::ExpectedOperator => "EXPECTED_OPERATOR",
            Self::ExpectedValue => "EXPECTED_VALUE",
            Self::ExpectedClosingParen => "EXPECTED_CLOSING_PAREN",
            Self::UnknownOperator => "UNKNOWN_OPERATOR",
            Self::UnknownBooleanOperator => "UNKNOWN_BOOLEAN_OPERATOR",
            Self::MissingBooleanOperator => "MISSING_BOOLEAN_OPERATOR",
            Self::InvalidTimeFormat => "INVALID_TIME_FORMAT",
            Self::InvalidTimezone => "INVALID_TIMEZONE",
            Self::InvalidTableName => "INVALID_TABLE_NAME",
            Self::InvalidTimestampField => "INVALID_TIMESTAMP_FIELD",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error produced while tokenizing, parsing or assembling a query.
///
/// Errors are plain values; nothing in this crate panics on bad input.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub struct ParseError {
    /// Error category.
    pub code: ErrorCode,
    /// Human readable description.
    pub message: String,
    /// Where in the input the error was detected, if known.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub position: Option<Position>,
}

impl ParseError {
    /// Creates an error without position information.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            position: None,
        }
    }

    /// Creates an error anchored at `position`.
    pub fn at(code: ErrorCode, message: impl Into<String>, position: Position) -> Self {
        Self {
            code,
            message: message.into(),
            position: Some(position),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.position {
            Some(pos) => write!(f, "{} (line {}, column {})", self.message, pos.line, pos.column),
            None => f.write_str(&self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_without_position() {
        let err = ParseError::new(ErrorCode::InvalidTimezone, "timezone cannot be empty");
        assert_eq!(err.to_string(), "timezone cannot be empty");
    }

    #[test]
    fn test_display_with_position() {
        let err = ParseError::at(
            ErrorCode::ExpectedValue,
            "expected value after '='",
            Position::new(2, 7),
        );
        assert_eq!(
            err.to_string(),
            "expected value after '=' (line 2, column 7)"
        );
    }

    #[test]
    fn test_code_serializes_screaming_snake_case() {
        let err = ParseError::new(ErrorCode::MissingBooleanOperator, "x");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "MISSING_BOOLEAN_OPERATOR");
        assert!(json.get("position").is_none());
        assert_eq!(
            ErrorCode::ExpectedClosingParen.to_string(),
            "EXPECTED_CLOSING_PAREN"
        );
    }
}
