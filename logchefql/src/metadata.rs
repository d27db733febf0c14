//! Metadata extraction for editor highlighting and the field sidebar.
//!
//! This works on the token stream rather than the AST so it reflects what
//! the user typed, even where the parser folds or regroups expressions.

use crate::query::{parse_field_path, Token, TokenKind};
use serde::{Deserialize, Serialize};

/// A flat `field operator value` condition as written in the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCondition {
    /// Dotted field name, quotes removed.
    pub field: String,
    /// Operator text, e.g. `!=`.
    pub operator: String,
    /// Value text; string literals are unescaped.
    pub value: String,
    /// True for `~` and `!~`.
    pub is_regex: bool,
}

fn comparisons(tokens: &[Token]) -> impl Iterator<Item = (&Token, &Token, &Token)> {
    tokens.windows(3).filter_map(|window| match window {
        [key, op, value]
            if key.kind == TokenKind::Key
                && op.kind == TokenKind::Operator
                && matches!(
                    value.kind,
                    TokenKind::Value | TokenKind::Number | TokenKind::Key
                ) =>
        {
            Some((key, op, value))
        }
        _ => None,
    })
}

/// Base names of the fields used in comparisons, unique, in order of first
/// appearance. `log.level` contributes `log`.
///
/// # Examples
///
/// ```
/// use logchefql::metadata::extract_fields_used;
/// use logchefql::query::tokenize;
///
/// let tokens = tokenize(r#"log.level="error" and service="api" or log.msg~"x""#).tokens;
/// assert_eq!(extract_fields_used(&tokens), vec!["log", "service"]);
/// ```
#[must_use]
pub fn extract_fields_used(tokens: &[Token]) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    let keys = tokens.windows(2).filter_map(|w| match w {
        [key, op] if key.kind == TokenKind::Key && op.kind == TokenKind::Operator => Some(key),
        _ => None,
    });
    for key in keys {
        let path = parse_field_path(&key.text);
        let base = path.base();
        if !base.is_empty() && !fields.iter().any(|f| f == base) {
            fields.push(base.to_string());
        }
    }
    fields
}

/// Every `key operator value` triplet, in source order.
#[must_use]
pub fn extract_conditions(tokens: &[Token]) -> Vec<FilterCondition> {
    comparisons(tokens)
        .map(|(key, op, value)| FilterCondition {
            field: parse_field_path(&key.text).dotted(),
            operator: op.text.clone(),
            value: value.text.clone(),
            is_regex: matches!(op.text.as_str(), "~" | "!~"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::tokenize;

    #[test]
    fn test_fields_used_unique_in_order() {
        let tokens = tokenize(r#"b="1" and a="2" or b="3" | c d"#).tokens;
        assert_eq!(extract_fields_used(&tokens), vec!["b", "a"]);
    }

    #[test]
    fn test_fields_used_reduces_nested_and_quoted() {
        let tokens = tokenize(r#""my field"="x" and attrs."k.v"="y""#).tokens;
        assert_eq!(extract_fields_used(&tokens), vec!["my field", "attrs"]);
    }

    #[test]
    fn test_conditions() {
        let tokens = tokenize(r#"level="error" and body~"time out" and status>=500"#).tokens;
        let conditions = extract_conditions(&tokens);
        assert_eq!(
            conditions,
            vec![
                FilterCondition {
                    field: "level".into(),
                    operator: "=".into(),
                    value: "error".into(),
                    is_regex: false,
                },
                FilterCondition {
                    field: "body".into(),
                    operator: "~".into(),
                    value: "time out".into(),
                    is_regex: true,
                },
                FilterCondition {
                    field: "status".into(),
                    operator: ">=".into(),
                    value: "500".into(),
                    is_regex: false,
                },
            ]
        );
    }

    #[test]
    fn test_conditions_nested_field_is_dotted() {
        let tokens = tokenize(r#"log_attributes."user id"!~"bot""#).tokens;
        let conditions = extract_conditions(&tokens);
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].field, "log_attributes.user id");
        assert!(conditions[0].is_regex);
    }

    #[test]
    fn test_condition_serializes_snake_case() {
        let json = serde_json::to_value(FilterCondition {
            field: "a".into(),
            operator: "=".into(),
            value: "1".into(),
            is_regex: false,
        })
        .unwrap();
        assert_eq!(json["is_regex"], false);
    }
}
