//! Allow-list validation for caller-supplied identifiers and time bounds.
//!
//! Everything checked here ends up interpolated into query text, so values
//! are matched against narrow patterns instead of being escaped.

use crate::query::{ErrorCode, ParseError};
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

/// Format accepted for SQL time bounds.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const MAX_TIMEZONE_LEN: usize = 64;

/// Words that are never accepted as a table or column name.
const RESERVED_WORDS: &[&str] = &[
    "alter", "and", "attach", "create", "delete", "detach", "drop", "exec", "from", "grant",
    "insert", "into", "kill", "or", "rename", "revoke", "select", "system", "truncate", "union",
    "update", "where",
];

static TIME_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}$").expect("valid regex"));

static TABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$").expect("valid regex")
});

static TIMESTAMP_FIELD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_@][A-Za-z0-9_.@:]*$").expect("valid regex"));

static IANA_TZ_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_+-]*(/[A-Za-z0-9_+-]+)*$").expect("valid regex")
});

static OFFSET_TZ_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(UTC|GMT)?[+-]\d{1,2}(:?\d{2})?$").expect("valid regex")
});

fn is_reserved(name: &str) -> bool {
    name.split(['.', ':'])
        .any(|part| RESERVED_WORDS.iter().any(|w| w.eq_ignore_ascii_case(part)))
}

/// Checks a `table` or `database.table` name.
///
/// # Errors
///
/// Returns [`ErrorCode::InvalidTableName`] for anything outside the
/// identifier allow-list or containing a reserved SQL word.
pub fn validate_table_name(name: &str) -> Result<(), ParseError> {
    if !TABLE_RE.is_match(name) || is_reserved(name) {
        tracing::warn!(table = %name, "rejected table name");
        return Err(ParseError::new(
            ErrorCode::InvalidTableName,
            "invalid table name: expected 'table' or 'database.table' made of letters, digits and underscores",
        ));
    }
    Ok(())
}

/// Checks the timestamp column name. Letters, digits, `_`, `.`, `@` and `:`
/// are allowed, so ELK-style `@timestamp` passes.
///
/// # Errors
///
/// Returns [`ErrorCode::InvalidTimestampField`] on rejection.
pub fn validate_timestamp_field(name: &str) -> Result<(), ParseError> {
    if !TIMESTAMP_FIELD_RE.is_match(name) || is_reserved(name) {
        tracing::warn!(field = %name, "rejected timestamp field");
        return Err(ParseError::new(
            ErrorCode::InvalidTimestampField,
            "invalid timestamp field: must start with a letter, '_' or '@' and contain only letters, digits, '_', '.', '@' or ':'",
        ));
    }
    Ok(())
}

/// Checks a timezone: an IANA name (`Asia/Kolkata`, `UTC`) or a UTC offset
/// (`+05:30`, `UTC-3`).
///
/// # Errors
///
/// Returns [`ErrorCode::InvalidTimezone`] on rejection.
pub fn validate_timezone(tz: &str) -> Result<(), ParseError> {
    if tz.is_empty() {
        return Err(ParseError::new(
            ErrorCode::InvalidTimezone,
            "timezone cannot be empty",
        ));
    }
    if tz.len() > MAX_TIMEZONE_LEN {
        return Err(ParseError::new(
            ErrorCode::InvalidTimezone,
            "invalid timezone: too long",
        ));
    }
    if !(IANA_TZ_RE.is_match(tz) || OFFSET_TZ_RE.is_match(tz)) {
        tracing::warn!(timezone = %tz, "rejected timezone");
        return Err(ParseError::new(
            ErrorCode::InvalidTimezone,
            "invalid timezone: expected an IANA name or a UTC offset",
        ));
    }
    Ok(())
}

/// Checks a `YYYY-MM-DD HH:MM:SS` time bound and returns it parsed.
///
/// # Errors
///
/// Returns [`ErrorCode::InvalidTimeFormat`] for malformed strings and for
/// impossible calendar values such as month 13 or hour 25.
pub fn validate_time(value: &str) -> Result<NaiveDateTime, ParseError> {
    if !TIME_SHAPE_RE.is_match(value) {
        tracing::warn!(time = %value, "rejected time bound");
        return Err(ParseError::new(
            ErrorCode::InvalidTimeFormat,
            "invalid time format: expected 'YYYY-MM-DD HH:MM:SS'",
        ));
    }
    NaiveDateTime::parse_from_str(value, TIME_FORMAT).map_err(|_| {
        ParseError::new(
            ErrorCode::InvalidTimeFormat,
            format!("invalid time format: '{value}' is not a valid date and time"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names() {
        assert!(validate_table_name("logs").is_ok());
        assert!(validate_table_name("default.otel_logs").is_ok());
        assert!(validate_table_name("_db.t1").is_ok());

        for bad in [
            "logs'; DROP TABLE users; --",
            "logs;",
            "a.b.c",
            "1logs",
            "",
            "logs`",
            "db.select",
            "DROP",
            "logs union",
        ] {
            let err = validate_table_name(bad).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidTableName, "{bad}");
            assert!(!err.message.contains(bad) || bad.is_empty());
        }
    }

    #[test]
    fn test_timestamp_fields() {
        for ok in ["timestamp", "@timestamp", "_ts", "event.time", "ts:utc"] {
            assert!(validate_timestamp_field(ok).is_ok(), "{ok}");
        }
        for bad in ["", "ts;", "ts'", "1ts", "ts DESC", "select", "ts`"] {
            assert_eq!(
                validate_timestamp_field(bad).unwrap_err().code,
                ErrorCode::InvalidTimestampField,
                "{bad}"
            );
        }
    }

    #[test]
    fn test_timezones() {
        for ok in [
            "UTC",
            "Asia/Kolkata",
            "America/Argentina/Buenos_Aires",
            "Etc/GMT+5",
            "+05:30",
            "-0800",
            "UTC+05:30",
            "GMT-3",
        ] {
            assert!(validate_timezone(ok).is_ok(), "{ok}");
        }
        for bad in ["", "UTC'); DROP", "Asia/Kolkata'", "a b", "/etc"] {
            assert_eq!(
                validate_timezone(bad).unwrap_err().code,
                ErrorCode::InvalidTimezone,
                "{bad}"
            );
        }
        assert!(validate_timezone(&"A".repeat(65)).is_err());
    }

    #[test]
    fn test_times() {
        assert!(validate_time("2025-01-31 23:59:59").is_ok());
        for bad in [
            "2025-01-01",
            "2025-01-01T00:00:00",
            "2025-99-01 00:00:00",
            "2025-01-01 25:00:00",
            "2025-02-30 00:00:00",
            "2025-01-01 00:00:00'",
        ] {
            assert_eq!(
                validate_time(bad).unwrap_err().code,
                ErrorCode::InvalidTimeFormat,
                "{bad}"
            );
        }
    }
}
