//! Abstract Syntax Tree definitions for LogchefQL.
//!
//! Every type renders back to canonical LogchefQL through `Display`, which is
//! what diagnostics and the CLI print.

use serde::{Deserialize, Serialize};

/// A field reference, either a plain column name or a dotted path into a
/// nested column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldPath {
    /// A plain column name (e.g., `level`).
    Name(String),
    /// A dotted path (e.g., `log_attributes.user."first name"`).
    Nested {
        /// The column the path starts from.
        base: String,
        /// Path segments below the base column, unquoted.
        path: Vec<String>,
    },
}

impl FieldPath {
    /// Builds a field path from already unquoted segments.
    ///
    /// Returns `None` when `segments` is empty.
    #[must_use]
    pub fn from_segments(mut segments: Vec<String>) -> Option<Self> {
        if segments.is_empty() {
            return None;
        }
        let base = segments.remove(0);
        Some(if segments.is_empty() {
            Self::Name(base)
        } else {
            Self::Nested {
                base,
                path: segments,
            }
        })
    }

    /// The column this field lives in.
    #[must_use]
    pub fn base(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Nested { base, .. } => base,
        }
    }

    /// Path segments below the base column; empty for plain names.
    #[must_use]
    pub fn path(&self) -> &[String] {
        match self {
            Self::Name(_) => &[],
            Self::Nested { path, .. } => path,
        }
    }

    /// Returns true for dotted paths.
    #[must_use]
    pub fn is_nested(&self) -> bool {
        matches!(self, Self::Nested { .. })
    }

    /// The unquoted segments joined with dots (`log.level`).
    #[must_use]
    pub fn dotted(&self) -> String {
        match self {
            Self::Name(name) => name.clone(),
            Self::Nested { base, path } => {
                let mut out = base.clone();
                for segment in path {
                    out.push('.');
                    out.push_str(segment);
                }
                out
            }
        }
    }
}

fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | ':' | '@'))
}

fn write_quoted(f: &mut std::fmt::Formatter<'_>, s: &str) -> std::fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '"' => f.write_str("\\\"")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            other => write!(f, "{other}")?,
        }
    }
    f.write_str("\"")
}

fn write_segment(f: &mut std::fmt::Formatter<'_>, segment: &str) -> std::fmt::Result {
    if is_plain_segment(segment) {
        f.write_str(segment)
    } else {
        write_quoted(f, segment)
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_segment(f, self.base())?;
        for segment in self.path() {
            f.write_str(".")?;
            write_segment(f, segment)?;
        }
        Ok(())
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// Equal (=)
    #[serde(rename = "=")]
    Eq,
    /// Not equal (!=)
    #[serde(rename = "!=")]
    NotEq,
    /// Case-insensitive contains (~)
    #[serde(rename = "~")]
    Match,
    /// Does not contain (!~)
    #[serde(rename = "!~")]
    NotMatch,
    /// Greater than (>)
    #[serde(rename = ">")]
    Gt,
    /// Less than (<)
    #[serde(rename = "<")]
    Lt,
    /// Greater than or equal (>=)
    #[serde(rename = ">=")]
    GtEq,
    /// Less than or equal (<=)
    #[serde(rename = "<=")]
    LtEq,
}

impl Operator {
    /// Parses operator text, returning `None` for unknown operators.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "=" => Self::Eq,
            "!=" => Self::NotEq,
            "~" => Self::Match,
            "!~" => Self::NotMatch,
            ">" => Self::Gt,
            "<" => Self::Lt,
            ">=" => Self::GtEq,
            "<=" => Self::LtEq,
            _ => return None,
        })
    }

    /// The operator as written in LogchefQL.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Match => "~",
            Self::NotMatch => "!~",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::GtEq => ">=",
            Self::LtEq => "<=",
        }
    }

    /// Returns true for `~` and `!~`.
    #[must_use]
    pub const fn is_match(self) -> bool {
        matches!(self, Self::Match | Self::NotMatch)
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boolean operators for combining conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BoolOp {
    /// Logical AND
    And,
    /// Logical OR
    Or,
}

impl BoolOp {
    /// Parses a boolean keyword, case-insensitively.
    #[must_use]
    pub fn from_keyword(word: &str) -> Option<Self> {
        if word.eq_ignore_ascii_case("and") {
            Some(Self::And)
        } else if word.eq_ignore_ascii_case("or") {
            Some(Self::Or)
        } else {
            None
        }
    }

    /// The lowercase LogchefQL keyword.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

impl std::fmt::Display for BoolOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
        }
    }
}

/// A literal on the right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    /// A quoted string literal, already unescaped.
    Str(String),
    /// A numeric literal.
    Num(f64),
    /// `true` or `false`.
    Bool(bool),
    /// `null`.
    Null,
    /// An unquoted word that is not a recognized literal.
    Bare(String),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Str(s) => write_quoted(f, s),
            Self::Num(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Null => write!(f, "null"),
            Self::Bare(s) => f.write_str(s),
        }
    }
}

/// A single comparison (e.g., `level="error"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    /// The field being compared.
    pub field: FieldPath,
    /// The comparison operator.
    pub operator: Operator,
    /// The value compared against.
    pub value: Value,
    /// The value was written as a string literal.
    pub quoted: bool,
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.field, self.operator, self.value)
    }
}

/// Two or more nodes joined by the same boolean operator.
///
/// Only constructed through [`Node::combine`], which guarantees at least two
/// children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogicalNode {
    op: BoolOp,
    children: Vec<Node>,
}

impl LogicalNode {
    /// The joining operator.
    #[must_use]
    pub fn op(&self) -> BoolOp {
        self.op
    }

    /// The joined nodes, always two or more.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }
}

/// A node of the filter expression tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Node {
    /// A single comparison.
    Expression(Expression),
    /// Children joined by AND or OR.
    Logical(LogicalNode),
    /// A parenthesized sub-expression.
    Group(Box<Node>),
}

impl Node {
    /// Joins `first` and `rest` with `op`.
    ///
    /// With an empty `rest` this returns `first` unchanged, and children that
    /// are themselves `op` nodes are spliced in, so the result never holds a
    /// single-child or same-operator logical node.
    #[must_use]
    pub fn combine(op: BoolOp, first: Node, rest: Vec<Node>) -> Node {
        if rest.is_empty() {
            return first;
        }
        let mut children = Vec::with_capacity(rest.len() + 1);
        for node in std::iter::once(first).chain(rest) {
            match node {
                Node::Logical(inner) if inner.op == op => children.extend(inner.children),
                other => children.push(other),
            }
        }
        Node::Logical(LogicalNode { op, children })
    }

    /// Wraps `inner` in a group.
    #[must_use]
    pub fn group(inner: Node) -> Node {
        Node::Group(Box::new(inner))
    }

    /// Visits every comparison in source order.
    pub fn for_each_expression<'a>(&'a self, f: &mut impl FnMut(&'a Expression)) {
        match self {
            Node::Expression(expr) => f(expr),
            Node::Logical(logical) => {
                for child in &logical.children {
                    child.for_each_expression(f);
                }
            }
            Node::Group(inner) => inner.for_each_expression(f),
        }
    }
}

impl From<Expression> for Node {
    fn from(expr: Expression) -> Self {
        Node::Expression(expr)
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Expression(expr) => write!(f, "{expr}"),
            Node::Group(inner) => write!(f, "({inner})"),
            Node::Logical(logical) => {
                for (i, child) in logical.children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", logical.op.keyword())?;
                    }
                    match child {
                        Node::Logical(inner) if logical.op == BoolOp::And && inner.op == BoolOp::Or => {
                            write!(f, "({child})")?;
                        }
                        _ => write!(f, "{child}")?,
                    }
                }
                Ok(())
            }
        }
    }
}

/// A parsed LogchefQL query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Query {
    /// The filter expression, absent for an empty filter.
    pub where_clause: Option<Node>,
    /// Fields listed after the pipe, empty without a pipe.
    pub select: Vec<FieldPath>,
}

impl Query {
    /// Returns true if the query neither filters nor projects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.where_clause.is_none() && self.select.is_empty()
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref where_clause) = self.where_clause {
            write!(f, "{where_clause}")?;
        }
        if !self.select.is_empty() {
            if self.where_clause.is_some() {
                f.write_str(" ")?;
            }
            f.write_str("|")?;
            for field in &self.select {
                write!(f, " {field}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(field: &str, operator: Operator, value: Value) -> Node {
        Node::Expression(Expression {
            field: FieldPath::Name(field.to_string()),
            operator,
            value,
            quoted: false,
        })
    }

    #[test]
    fn test_combine_single_child_collapses() {
        let node = Node::combine(BoolOp::And, expr("a", Operator::Eq, Value::Num(1.0)), vec![]);
        assert!(matches!(node, Node::Expression(_)));
    }

    #[test]
    fn test_combine_flattens_same_operator() {
        let inner = Node::combine(
            BoolOp::Or,
            expr("a", Operator::Eq, Value::Num(1.0)),
            vec![expr("b", Operator::Eq, Value::Num(2.0))],
        );
        let outer = Node::combine(BoolOp::Or, inner, vec![expr("c", Operator::Eq, Value::Num(3.0))]);
        match outer {
            Node::Logical(l) => {
                assert_eq!(l.op(), BoolOp::Or);
                assert_eq!(l.children().len(), 3);
            }
            other => panic!("expected logical node, got {other:?}"),
        }
    }

    #[test]
    fn test_field_path_from_segments() {
        assert_eq!(
            FieldPath::from_segments(vec!["level".into()]),
            Some(FieldPath::Name("level".into()))
        );
        let nested = FieldPath::from_segments(vec!["log".into(), "a b".into()]).unwrap();
        assert_eq!(nested.base(), "log");
        assert_eq!(nested.path(), ["a b".to_string()]);
        assert_eq!(nested.dotted(), "log.a b");
        assert_eq!(nested.to_string(), r#"log."a b""#);
        assert_eq!(FieldPath::from_segments(vec![]), None);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Str("say \"hi\"".into()).to_string(), r#""say \"hi\"""#);
        assert_eq!(Value::Num(500.0).to_string(), "500");
        assert_eq!(Value::Num(1.5).to_string(), "1.5");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Bare("abc".into()).to_string(), "abc");
    }

    #[test]
    fn test_node_display_keeps_precedence() {
        let or = Node::combine(
            BoolOp::Or,
            expr("a", Operator::Eq, Value::Num(1.0)),
            vec![expr("b", Operator::Eq, Value::Num(2.0))],
        );
        let and = Node::combine(BoolOp::And, or, vec![expr("c", Operator::Gt, Value::Num(3.0))]);
        assert_eq!(and.to_string(), "(a=1 or b=2) and c>3");
    }

    #[test]
    fn test_query_display() {
        let query = Query {
            where_clause: Some(expr("ns", Operator::Eq, Value::Str("prod".into()))),
            select: vec![FieldPath::Name("service".into()), FieldPath::Name("body".into())],
        };
        assert_eq!(query.to_string(), r#"ns="prod" | service body"#);
        assert!(Query::default().is_empty());
    }

    #[test]
    fn test_operator_roundtrip() {
        for op in ["=", "!=", "~", "!~", ">", "<", ">=", "<="] {
            assert_eq!(Operator::parse(op).unwrap().as_str(), op);
        }
        assert_eq!(Operator::parse("=="), None);
        assert!(Operator::NotMatch.is_match());
        assert!(!Operator::GtEq.is_match());
    }

    #[test]
    fn test_bool_op_keywords() {
        assert_eq!(BoolOp::from_keyword("AND"), Some(BoolOp::And));
        assert_eq!(BoolOp::from_keyword("or"), Some(BoolOp::Or));
        assert_eq!(BoolOp::from_keyword("xor"), None);
        assert_eq!(BoolOp::And.to_string(), "AND");
    }
}
