//! Backend code generators.
//!
//! Both generators walk the same AST. [`SqlGenerator`] targets ClickHouse SQL
//! and [`LogsqlGenerator`] targets the VictoriaLogs LogsQL filter syntax.

mod logsql;
mod sql;

pub use logsql::{escape_logsql_string, needs_quoting, LogsqlGenerator};
pub use sql::{escape_identifier, escape_string, SqlGenerator};

use crate::query::{FieldPath, Node, Query};

/// Common interface of the backend generators.
pub trait QueryGenerator {
    /// Renders a filter expression.
    fn generate_node(&self, node: &Node) -> String;

    /// Renders the projection list, or `None` when there is nothing to
    /// project.
    fn select_clause(&self, fields: &[FieldPath]) -> Option<String>;

    /// Renders the filter part of a query; empty when the query has no
    /// filter.
    fn generate(&self, query: &Query) -> String {
        query
            .where_clause
            .as_ref()
            .map(|node| self.generate_node(node))
            .unwrap_or_default()
    }
}
