//! LogchefQL compiler
//!
//! This crate compiles LogchefQL, a compact log filter language, into
//! ClickHouse SQL and VictoriaLogs LogsQL.
//!
//! # Modules
//!
//! - [`query`] - Tokens, lexer, AST and parser
//! - [`schema`] - Table schema used for nested field access
//! - [`codegen`] - SQL and LogsQL generators
//! - [`builder`] - Full query assembly with input validation
//! - [`metadata`] - Field and condition extraction for the editor
//! - [`detect`] - SQL vs LogchefQL input classification
//!
//! # Example
//!
//! ```
//! use logchefql::schema::Schema;
//! use logchefql::translate;
//!
//! let schema = Schema::from_pairs([
//!     ("severity", "LowCardinality(String)"),
//!     ("status", "Int32"),
//! ]);
//! let result = translate(r#"severity="ERROR" and status>=500"#, Some(&schema));
//!
//! assert!(result.valid);
//! assert_eq!(result.sql, "(`severity` = 'ERROR') AND (`status` >= 500)");
//! assert_eq!(result.fields_used, vec!["severity", "status"]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod builder;
pub mod codegen;
pub mod detect;
pub mod metadata;
pub mod query;
pub mod schema;
mod translate;

pub use translate::{
    conditions_from_query, translate, translate_logsql, translate_to_sql_conditions, validate,
    LogsqlTranslateResult, TranslateResult, ValidateResult,
};

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde;
pub use serde_json;
