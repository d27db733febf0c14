//! VictoriaLogs LogsQL assembly.

use super::validate::validate_time;
use crate::codegen::{LogsqlGenerator, QueryGenerator};
use crate::query::{parse_query, ErrorCode, FieldPath, ParseError};
use chrono::{DateTime, SecondsFormat, Utc};

/// Inputs for [`build_full_logsql_query`].
#[derive(Debug, Clone, Copy)]
pub struct LogsqlQueryParams<'a> {
    /// The LogchefQL filter, possibly empty.
    pub query: &'a str,
    /// Inclusive lower bound.
    pub start: DateTime<Utc>,
    /// Inclusive upper bound.
    pub end: DateTime<Utc>,
    /// Row limit; `0` or less omits the `limit` pipe.
    pub limit: i64,
}

fn rfc3339(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Builds a complete LogsQL query:
///
/// ```text
/// <filter> _time:[<start>, <end>] | fields _time, <fields> | sort by (_time desc) | limit <n>
/// ```
///
/// The filter is omitted when empty, the `fields` pipe only appears with a
/// pipe projection, and the `limit` pipe is omitted when `limit <= 0`.
///
/// # Errors
///
/// Returns the query's parse error unchanged.
pub fn build_full_logsql_query(params: &LogsqlQueryParams<'_>) -> Result<String, ParseError> {
    let query = parse_query(params.query)?;
    let generator = LogsqlGenerator::new();
    let filter = generator.generate(&query);

    let range = format!("_time:[{}, {}]", rfc3339(params.start), rfc3339(params.end));
    let mut out = if filter.is_empty() {
        range
    } else {
        format!("{filter} {range}")
    };

    if let Some(fields) = generator.select_clause(&query.select) {
        let has_time = query
            .select
            .iter()
            .any(|f| matches!(f, FieldPath::Name(name) if name == "_time"));
        if has_time {
            out.push_str(&format!(" | fields {fields}"));
        } else {
            out.push_str(&format!(" | fields _time, {fields}"));
        }
    }

    out.push_str(" | sort by (_time desc)");
    if params.limit > 0 {
        out.push_str(&format!(" | limit {}", params.limit));
    }
    Ok(out)
}

/// Parses a time bound given as RFC 3339 or `YYYY-MM-DD HH:MM:SS` (UTC).
///
/// # Errors
///
/// Returns [`ErrorCode::InvalidTimeFormat`] when neither format matches.
pub fn parse_time_bound(value: &str) -> Result<DateTime<Utc>, ParseError> {
    if let Ok(t) = DateTime::parse_from_rfc3339(value) {
        return Ok(t.with_timezone(&Utc));
    }
    validate_time(value)
        .map(|naive| naive.and_utc())
        .map_err(|_| {
            ParseError::new(
                ErrorCode::InvalidTimeFormat,
                "invalid time format: expected RFC 3339 or 'YYYY-MM-DD HH:MM:SS'",
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(query: &str, limit: i64) -> LogsqlQueryParams<'_> {
        LogsqlQueryParams {
            query,
            start: parse_time_bound("2025-01-01 00:00:00").unwrap(),
            end: parse_time_bound("2025-01-01T23:59:59Z").unwrap(),
            limit,
        }
    }

    #[test]
    fn test_full_logsql_query() {
        let out = build_full_logsql_query(&params(r#"level="error" and service="api""#, 100)).unwrap();
        assert_eq!(
            out,
            "level:=error service:=api _time:[2025-01-01T00:00:00Z, 2025-01-01T23:59:59Z] \
             | sort by (_time desc) | limit 100"
        );
    }

    #[test]
    fn test_empty_filter_and_no_limit() {
        let out = build_full_logsql_query(&params("", 0)).unwrap();
        assert_eq!(
            out,
            "_time:[2025-01-01T00:00:00Z, 2025-01-01T23:59:59Z] | sort by (_time desc)"
        );
    }

    #[test]
    fn test_projection_adds_fields_pipe() {
        let out = build_full_logsql_query(&params(r#"ns="prod" | service body"#, 10)).unwrap();
        assert!(out.contains(" | fields _time, service, body | sort by (_time desc) | limit 10"));

        let out = build_full_logsql_query(&params("| _time body", 10)).unwrap();
        assert!(out.contains(" | fields _time, body |"));
    }

    #[test]
    fn test_parse_error_propagates() {
        let err = build_full_logsql_query(&params("level=", 10)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ExpectedValue);
    }

    #[test]
    fn test_parse_time_bound() {
        let t = parse_time_bound("2025-06-01T10:00:00+02:00").unwrap();
        assert_eq!(rfc3339(t), "2025-06-01T08:00:00Z");
        assert_eq!(
            parse_time_bound("yesterday").unwrap_err().code,
            ErrorCode::InvalidTimeFormat
        );
    }
}
