//! The LogchefQL front end: tokens, lexer, AST and parser.
//!
//! # Supported Syntax
//!
//! ```text
//! level="error"
//! status>=500 and service!="healthcheck"
//! (level="error" or level="warn") and body~"timeout"
//! log_attributes.http.method="GET"
//! namespace="prod" | service body
//! ```
//!
//! # Example
//!
//! ```
//! use logchefql::query::{parse_query, FieldPath};
//!
//! let query = parse_query(r#"namespace="prod" | service body"#).unwrap();
//! assert_eq!(query.select[0], FieldPath::Name("service".to_string()));
//! ```

mod ast;
mod error;
mod lexer;
mod parser;
mod token;

pub use ast::*;
pub use error::{ErrorCode, ParseError};
pub use lexer::{tokenize, Tokenized};
pub use parser::{
    detect_missing_boolean_operator, parse, parse_field_path, ParseOptions, Parser,
    MAX_NESTING_DEPTH,
};
pub use token::{Position, Token, TokenKind};

/// Tokenizes and parses `input`, reporting the first error in pipeline
/// order: lexer, then the missing-boolean-operator scan, then the parser.
///
/// # Errors
///
/// Returns the first [`ParseError`] encountered.
pub fn parse_query(input: &str) -> Result<Query, ParseError> {
    parse_query_with(input, ParseOptions::default())
}

/// Like [`parse_query`] with explicit [`ParseOptions`].
///
/// # Errors
///
/// Returns the first [`ParseError`] encountered.
pub fn parse_query_with(input: &str, options: ParseOptions) -> Result<Query, ParseError> {
    let tokenized = tokenize(input);
    check_tokens(&tokenized)?;
    Parser::with_options(&tokenized.tokens, options).parse()
}

/// Runs the checks that come before grammar parsing on an already
/// tokenized query.
pub(crate) fn check_tokens(tokenized: &Tokenized) -> Result<(), ParseError> {
    if let Some(err) = tokenized.first_error() {
        return Err(err.clone());
    }
    match detect_missing_boolean_operator(&tokenized.tokens) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
