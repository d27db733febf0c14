//! End-to-end tests of the public translation API.

use logchefql::builder::{build_full_query, SqlQueryParams};
use logchefql::codegen::escape_string;
use logchefql::query::ErrorCode;
use logchefql::schema::Schema;
use logchefql::{translate, translate_logsql, validate};

/// Reverses `escape_string` for checking round trips.
fn unescape_sql(literal: &str) -> String {
    let mut out = String::new();
    let mut chars = literal.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek().copied()) {
            ('\\', Some(next)) => {
                chars.next();
                out.push(match next {
                    '0' => '\0',
                    'n' => '\n',
                    'r' => '\r',
                    other => other,
                });
            }
            ('\'', Some('\'')) => {
                chars.next();
                out.push('\'');
            }
            _ => out.push(c),
        }
    }
    out
}

fn params<'a>(query: &'a str, table: &'a str) -> SqlQueryParams<'a> {
    SqlQueryParams {
        query,
        schema: None,
        table,
        timestamp_field: "timestamp",
        start_time: "2025-01-01 00:00:00",
        end_time: "2025-01-01 23:59:59",
        timezone: "UTC",
        limit: 100,
        columns: None,
    }
}

// ============================================================================
// EMPTY INPUT AND PRECEDENCE
// ============================================================================

mod grammar {
    use super::*;

    #[test]
    fn test_empty_input_for_any_schema() {
        let schemas = [
            None,
            Some(Schema::default()),
            Some(Schema::from_pairs([("log_attributes", "Map(String, String)")])),
        ];
        for schema in &schemas {
            let result = translate("", schema.as_ref());
            assert!(result.valid);
            assert_eq!(result.sql, "");
        }
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let result = translate("a=1 or b=2 and c=3", None);
        assert_eq!(result.sql, "(`a` = 1) OR ((`b` = 2) AND (`c` = 3))");

        let result = translate_logsql("a=1 or b=2 and c=3");
        assert_eq!(result.logsql, "(a:=1 or b:=2 c:=3)");
    }

    #[test]
    fn test_boolean_words_inside_values_and_keys() {
        assert!(translate(r#"body ~ "order""#, None).valid);
        assert!(translate(r#"field = "android""#, None).valid);
        assert!(translate(r#"brand="x" and orders>1"#, None).valid);
    }

    #[test]
    fn test_missing_boolean_operator_names_both_fields() {
        let result = validate(r#"a="1" b="2""#);
        assert!(!result.valid);
        let err = result.error.unwrap();
        assert_eq!(err.code, ErrorCode::MissingBooleanOperator);
        assert!(err.message.contains("'a'"));
        assert!(err.message.contains("'b'"));
    }
}

// ============================================================================
// CODE GENERATION
// ============================================================================

mod codegen {
    use super::*;

    #[test]
    fn test_escaped_literal_round_trips() {
        for value in ["it's", r"C:\temp", "line\nbreak", "cr\rlf", "nul\0byte", r"\'mixed\''"] {
            assert_eq!(unescape_sql(&escape_string(value)), value);
        }
    }

    #[test]
    fn test_query_literal_round_trips() {
        let result = translate(r#"msg="it's a \\ path\nnext""#, None);
        let sql = result.sql;
        let literal = sql
            .strip_prefix("`msg` = '")
            .and_then(|s| s.strip_suffix('\''))
            .unwrap();
        assert_eq!(unescape_sql(literal), "it's a \\ path\nnext");
    }

    #[test]
    fn test_map_versus_json_access() {
        let schema = Schema::from_pairs([("log_attributes", "Map(String,String)")]);
        let query = r#"log_attributes.level="x""#;

        assert!(translate(query, Some(&schema)).sql.contains("['level']"));
        assert!(translate(query, None).sql.contains("JSONExtractString"));
    }

    #[test]
    fn test_typed_schema_scenario() {
        let schema = Schema::from_pairs([
            ("severity", "LowCardinality(String)"),
            ("status", "Int32"),
        ]);
        let result = translate(r#"severity="ERROR" and status>=500"#, Some(&schema));
        assert_eq!(result.sql, "(`severity` = 'ERROR') AND (`status` >= 500)");
    }
}

// ============================================================================
// FULL QUERY ASSEMBLY
// ============================================================================

mod assembly {
    use super::*;

    #[test]
    fn test_injected_table_is_rejected() {
        let table = "logs'; DROP TABLE users; --";
        let err = build_full_query(&params("a=1", table)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTableName);
        assert!(!err.to_string().contains("DROP"));
    }

    #[test]
    fn test_projection_puts_timestamp_first() {
        let sql = build_full_query(&SqlQueryParams {
            timestamp_field: "ts",
            ..params(r#"namespace="prod" | service body"#, "logs")
        })
        .unwrap();
        assert!(sql.starts_with("SELECT `ts`, `service`, `body`\nFROM logs\n"));
        assert!(sql.contains("  AND (`namespace` = 'prod')\n"));
    }

    #[test]
    fn test_parse_error_propagates_from_builder() {
        let err = build_full_query(&params("level=", "logs")).unwrap_err();
        assert_eq!(err.code, ErrorCode::ExpectedValue);
    }
}
