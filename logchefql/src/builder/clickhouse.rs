//! ClickHouse `SELECT` assembly.

use super::validate::{validate_table_name, validate_time, validate_timestamp_field, validate_timezone};
use crate::codegen::{escape_identifier, QueryGenerator, SqlGenerator};
use crate::query::{parse_query, ParseError};
use crate::schema::Schema;

/// Inputs for [`build_full_query`].
#[derive(Debug, Clone, Copy)]
pub struct SqlQueryParams<'a> {
    /// The LogchefQL filter, possibly empty.
    pub query: &'a str,
    /// Optional schema for type-aware nested field access.
    pub schema: Option<&'a Schema>,
    /// `table` or `database.table`.
    pub table: &'a str,
    /// Timestamp column used for the time range and ordering.
    pub timestamp_field: &'a str,
    /// Inclusive lower bound, `YYYY-MM-DD HH:MM:SS`.
    pub start_time: &'a str,
    /// Inclusive upper bound, `YYYY-MM-DD HH:MM:SS`.
    pub end_time: &'a str,
    /// Timezone the bounds are expressed in.
    pub timezone: &'a str,
    /// Row limit; `0` or less omits the `LIMIT` clause.
    pub limit: i64,
    /// Columns to select when the query has no pipe projection.
    pub columns: Option<&'a [String]>,
}

/// Builds a complete ClickHouse query:
///
/// ```text
/// SELECT <columns>
/// FROM <table>
/// WHERE `<ts>` BETWEEN toDateTime('<start>', '<tz>') AND toDateTime('<end>', '<tz>')
///   AND (<filter>)
/// ORDER BY `<ts>` DESC
/// LIMIT <n>
/// ```
///
/// The columns are the pipe projection (timestamp first), else
/// `params.columns`, else `*`.
///
/// # Errors
///
/// Returns the query's parse error unchanged, or an assembler error
/// (`INVALID_TIME_FORMAT`, `INVALID_TIMEZONE`, `INVALID_TABLE_NAME`,
/// `INVALID_TIMESTAMP_FIELD`) for rejected inputs. A parse error wins when
/// both apply.
///
/// # Examples
///
/// ```
/// use logchefql::builder::{build_full_query, SqlQueryParams};
///
/// let sql = build_full_query(&SqlQueryParams {
///     query: r#"level="error""#,
///     schema: None,
///     table: "logs.app",
///     timestamp_field: "timestamp",
///     start_time: "2025-01-01 00:00:00",
///     end_time: "2025-01-01 23:59:59",
///     timezone: "UTC",
///     limit: 100,
///     columns: None,
/// })
/// .unwrap();
/// assert!(sql.starts_with("SELECT *\nFROM logs.app\n"));
/// assert!(sql.ends_with("ORDER BY `timestamp` DESC\nLIMIT 100"));
/// ```
pub fn build_full_query(params: &SqlQueryParams<'_>) -> Result<String, ParseError> {
    let query = parse_query(params.query)?;

    validate_time(params.start_time)?;
    validate_time(params.end_time)?;
    validate_timezone(params.timezone)?;
    validate_table_name(params.table)?;
    validate_timestamp_field(params.timestamp_field)?;
    let generator = SqlGenerator::new(params.schema);
    let filter = generator.generate(&query);

    let columns = generator
        .select_clause_with_timestamp(&query.select, Some(params.timestamp_field))
        .or_else(|| {
            params.columns.filter(|c| !c.is_empty()).map(|cols| {
                cols.iter()
                    .map(|c| escape_identifier(c))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
        })
        .unwrap_or_else(|| "*".to_string());

    let ts = escape_identifier(params.timestamp_field);
    let tz = params.timezone;
    let mut sql = format!(
        "SELECT {columns}\nFROM {table}\nWHERE {ts} BETWEEN toDateTime('{start}', '{tz}') AND toDateTime('{end}', '{tz}')",
        table = params.table,
        start = params.start_time,
        end = params.end_time,
    );
    if !filter.is_empty() {
        sql.push_str(&format!("\n  AND ({filter})"));
    }
    sql.push_str(&format!("\nORDER BY {ts} DESC"));
    if params.limit > 0 {
        sql.push_str(&format!("\nLIMIT {}", params.limit));
    }
    Ok(sql)
}
