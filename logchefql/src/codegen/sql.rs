//! ClickHouse SQL generation.

use super::QueryGenerator;
use crate::query::{BoolOp, Expression, FieldPath, Node, Operator, Value};
use crate::schema::{ColumnKind, Schema};

/// Quotes an identifier with backticks, doubling embedded backticks.
///
/// ```
/// assert_eq!(logchefql::codegen::escape_identifier("a`b"), "`a``b`");
/// ```
#[must_use]
pub fn escape_identifier(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}

/// Escapes the body of a single-quoted SQL string literal.
///
/// Backslashes go first so the escapes added afterwards are not doubled.
#[must_use]
pub fn escape_string(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\'', "''")
        .replace('\0', "\\0")
        .replace('\r', "\\r")
        .replace('\n', "\\n")
}

fn quote_string(value: &str) -> String {
    format!("'{}'", escape_string(value))
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Str(s) | Value::Bare(s) => quote_string(s),
        Value::Num(n) => format!("{n}"),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        Value::Null => "NULL".to_string(),
    }
}

fn comparison(column: &str, operator: Operator, value: &str) -> String {
    match operator {
        Operator::Match => format!("positionCaseInsensitive({column}, {value}) > 0"),
        Operator::NotMatch => format!("positionCaseInsensitive({column}, {value}) = 0"),
        op => format!("{column} {op} {value}"),
    }
}

/// Generates ClickHouse SQL conditions from LogchefQL ASTs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlGenerator<'a> {
    schema: Option<&'a Schema>,
}

impl<'a> SqlGenerator<'a> {
    /// Creates a generator; `schema` drives nested field access.
    #[must_use]
    pub fn new(schema: Option<&'a Schema>) -> Self {
        Self { schema }
    }

    fn column_kind(&self, name: &str) -> Option<ColumnKind> {
        self.schema.and_then(|s| s.column_kind(name))
    }

    /// The SQL expression that reads `field`.
    ///
    /// Nested paths into a `Map` column become a single subscript with the
    /// dotted key; every other column kind, and a missing schema, falls back
    /// to `JSONExtractString` with one argument per segment.
    #[must_use]
    pub fn column_expression(&self, field: &FieldPath) -> String {
        let (base, path) = match field {
            FieldPath::Name(name) => return escape_identifier(name),
            FieldPath::Nested { base, path } => (base, path),
        };

        if self.column_kind(base) == Some(ColumnKind::Map) {
            let key = path.join(".");
            format!("{}[{}]", escape_identifier(base), quote_string(&key))
        } else {
            let args: Vec<String> = path.iter().map(|s| quote_string(s)).collect();
            format!(
                "JSONExtractString({}, {})",
                escape_identifier(base),
                args.join(", ")
            )
        }
    }

    fn expression(&self, expr: &Expression) -> String {
        comparison(
            &self.column_expression(&expr.field),
            expr.operator,
            &format_value(&expr.value),
        )
    }

    /// One projected column. Nested fields are aliased `base_seg1_seg2`;
    /// plain names missing from the schema are read from the first map
    /// column when the schema has one.
    fn select_expression(&self, field: &FieldPath) -> String {
        match field {
            FieldPath::Name(name) => match self.schema {
                Some(schema) if !schema.has_column(name) => match schema.first_map_column() {
                    Some(map) => format!(
                        "{}[{}] AS {}",
                        escape_identifier(&map.name),
                        quote_string(name),
                        escape_identifier(name)
                    ),
                    None => escape_identifier(name),
                },
                _ => escape_identifier(name),
            },
            FieldPath::Nested { base, path } => {
                let alias = format!("{base}_{}", path.join("_"));
                format!(
                    "{} AS {}",
                    self.column_expression(field),
                    escape_identifier(&alias)
                )
            }
        }
    }

    /// Projection list with the timestamp column first.
    ///
    /// When `fields` already names the timestamp column it is not prepended
    /// again and keeps its position.
    #[must_use]
    pub fn select_clause_with_timestamp(
        &self,
        fields: &[FieldPath],
        timestamp_field: Option<&str>,
    ) -> Option<String> {
        if fields.is_empty() {
            return None;
        }

        let mut columns = Vec::with_capacity(fields.len() + 1);
        if let Some(ts) = timestamp_field.filter(|ts| !ts.is_empty()) {
            let explicit = fields
                .iter()
                .any(|f| matches!(f, FieldPath::Name(name) if name == ts));
            if !explicit {
                columns.push(escape_identifier(ts));
            }
        }
        columns.extend(fields.iter().map(|f| self.select_expression(f)));
        Some(columns.join(", "))
    }
}

impl QueryGenerator for SqlGenerator<'_> {
    fn generate_node(&self, node: &Node) -> String {
        match node {
            Node::Expression(expr) => self.expression(expr),
            Node::Group(inner) => self.generate_node(inner),
            Node::Logical(logical) => {
                let joiner = match logical.op() {
                    BoolOp::And => " AND ",
                    BoolOp::Or => " OR ",
                };
                logical
                    .children()
                    .iter()
                    .map(|child| format!("({})", self.generate_node(child)))
                    .collect::<Vec<_>>()
                    .join(joiner)
            }
        }
    }

    fn select_clause(&self, fields: &[FieldPath]) -> Option<String> {
        self.select_clause_with_timestamp(fields, None)
    }
}
