//! Full query assembly.
//!
//! Wraps a translated filter with the time range, projection, ordering and
//! row limit needed to run it. Every caller-supplied identifier and time
//! bound is validated before anything is generated.

mod clickhouse;
mod validate;
mod victorialogs;

pub use clickhouse::{build_full_query, SqlQueryParams};
pub use validate::{
    validate_table_name, validate_time, validate_timestamp_field, validate_timezone, TIME_FORMAT,
};
pub use victorialogs::{build_full_logsql_query, parse_time_bound, LogsqlQueryParams};
