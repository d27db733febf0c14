//! VictoriaLogs LogsQL generation.
//!
//! AND is implicit in LogsQL, so AND-joined children are simply separated by
//! spaces. OR-joined children are joined with `or` and the whole group is
//! wrapped in one pair of parentheses.

use super::QueryGenerator;
use crate::query::{BoolOp, Expression, FieldPath, Node, Value};

/// Returns true if `value` must be double-quoted to be read back verbatim.
#[must_use]
pub fn needs_quoting(value: &str) -> bool {
    value.is_empty()
        || value.chars().any(|c| {
            matches!(
                c,
                ' ' | '"' | '\'' | '(' | ')' | ':' | '|' | '\\' | '\n' | '\r' | '\t'
            )
        })
}

/// Escapes the body of a double-quoted LogsQL string.
#[must_use]
pub fn escape_logsql_string(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

fn format_text(text: &str) -> String {
    if needs_quoting(text) {
        format!("\"{}\"", escape_logsql_string(text))
    } else {
        text.to_string()
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Str(s) | Value::Bare(s) => format_text(s),
        Value::Num(n) => format!("{n}"),
        Value::Bool(b) => b.to_string(),
        Value::Null => "\"\"".to_string(),
    }
}

fn format_field(field: &FieldPath) -> String {
    format_text(&field.dotted())
}

/// Generates LogsQL filters from LogchefQL ASTs.
///
/// LogsQL addresses nested fields by their dotted name, so unlike
/// [`SqlGenerator`](super::SqlGenerator) no schema is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogsqlGenerator;

impl LogsqlGenerator {
    /// Creates a generator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn expression(expr: &Expression) -> String {
        format!(
            "{}:{}{}",
            format_field(&expr.field),
            expr.operator,
            format_value(&expr.value)
        )
    }
}

impl QueryGenerator for LogsqlGenerator {
    fn generate_node(&self, node: &Node) -> String {
        match node {
            Node::Expression(expr) => Self::expression(expr),
            Node::Group(inner) => self.generate_node(inner),
            Node::Logical(logical) => {
                let parts: Vec<String> = logical
                    .children()
                    .iter()
                    .map(|child| self.generate_node(child))
                    .collect();
                match logical.op() {
                    BoolOp::And => parts.join(" "),
                    BoolOp::Or => format!("({})", parts.join(" or ")),
                }
            }
        }
    }

    fn select_clause(&self, fields: &[FieldPath]) -> Option<String> {
        if fields.is_empty() {
            return None;
        }
        Some(
            fields
                .iter()
                .map(format_field)
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}
