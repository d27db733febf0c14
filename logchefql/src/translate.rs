//! Translation entry points.
//!
//! These wrap the whole pipeline (lexer, missing-operator scan, parser,
//! generator, metadata) and report failures inside the result instead of as
//! `Err`, matching the JSON shape the editor consumes.

use crate::codegen::{LogsqlGenerator, QueryGenerator, SqlGenerator};
use crate::metadata::{extract_conditions, extract_fields_used, FilterCondition};
use crate::query::{check_tokens, parse, tokenize, ParseError};
use crate::schema::Schema;
use serde::{Deserialize, Serialize};

/// Result of translating LogchefQL to ClickHouse SQL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslateResult {
    /// Whether the query parsed.
    pub valid: bool,
    /// The WHERE-clause conditions; empty for an empty query or on error.
    pub sql: String,
    /// Projection from the pipe operator, if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub select_clause: Option<String>,
    /// Flat conditions for the field sidebar.
    pub conditions: Vec<FilterCondition>,
    /// Base names of the fields the filter references.
    pub fields_used: Vec<String>,
    /// The first error, when `valid` is false.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<ParseError>,
}

/// Result of translating LogchefQL to LogsQL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogsqlTranslateResult {
    /// Whether the query parsed.
    pub valid: bool,
    /// The LogsQL filter; empty for an empty query or on error.
    pub logsql: String,
    /// Projection from the pipe operator, if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub select_clause: Option<String>,
    /// Flat conditions for the field sidebar.
    pub conditions: Vec<FilterCondition>,
    /// Base names of the fields the filter references.
    pub fields_used: Vec<String>,
    /// The first error, when `valid` is false.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<ParseError>,
}

/// Result of a syntax-only check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateResult {
    /// Whether the query parsed.
    pub valid: bool,
    /// The first error, when `valid` is false.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<ParseError>,
}

struct Translation {
    body: String,
    select_clause: Option<String>,
    conditions: Vec<FilterCondition>,
    fields_used: Vec<String>,
}

fn run<G: QueryGenerator>(input: &str, generator: &G) -> Result<Translation, ParseError> {
    if input.trim().is_empty() {
        return Ok(Translation {
            body: String::new(),
            select_clause: None,
            conditions: Vec::new(),
            fields_used: Vec::new(),
        });
    }

    let tokenized = tokenize(input);
    let query = check_tokens(&tokenized).and_then(|()| parse(&tokenized.tokens));
    let query = match query {
        Ok(query) => query,
        Err(err) => {
            tracing::debug!(code = %err.code, error = %err, "rejected LogchefQL query");
            return Err(err);
        }
    };

    Ok(Translation {
        body: generator.generate(&query),
        select_clause: generator.select_clause(&query.select),
        conditions: extract_conditions(&tokenized.tokens),
        fields_used: extract_fields_used(&tokenized.tokens),
    })
}

/// Translates a LogchefQL query into ClickHouse SQL conditions.
///
/// An empty or whitespace-only query is valid and yields empty SQL.
///
/// # Examples
///
/// ```
/// use logchefql::schema::Schema;
/// use logchefql::translate;
///
/// let schema = Schema::from_pairs([("log_attributes", "Map(String, String)")]);
/// let result = translate(r#"log_attributes.level="x""#, Some(&schema));
/// assert!(result.valid);
/// assert_eq!(result.sql, "`log_attributes`['level'] = 'x'");
/// assert_eq!(result.fields_used, vec!["log_attributes"]);
/// ```
#[must_use]
pub fn translate(query: &str, schema: Option<&Schema>) -> TranslateResult {
    match run(query, &SqlGenerator::new(schema)) {
        Ok(t) => TranslateResult {
            valid: true,
            sql: t.body,
            select_clause: t.select_clause,
            conditions: t.conditions,
            fields_used: t.fields_used,
            error: None,
        },
        Err(err) => TranslateResult {
            error: Some(err),
            ..TranslateResult::default()
        },
    }
}

/// Translates a LogchefQL query into a LogsQL filter.
#[must_use]
pub fn translate_logsql(query: &str) -> LogsqlTranslateResult {
    match run(query, &LogsqlGenerator::new()) {
        Ok(t) => LogsqlTranslateResult {
            valid: true,
            logsql: t.body,
            select_clause: t.select_clause,
            conditions: t.conditions,
            fields_used: t.fields_used,
            error: None,
        },
        Err(err) => LogsqlTranslateResult {
            error: Some(err),
            ..LogsqlTranslateResult::default()
        },
    }
}

/// Checks a query's syntax without generating anything.
#[must_use]
pub fn validate(query: &str) -> ValidateResult {
    if query.trim().is_empty() {
        return ValidateResult {
            valid: true,
            error: None,
        };
    }
    let tokenized = tokenize(query);
    match check_tokens(&tokenized).and_then(|()| parse(&tokenized.tokens)) {
        Ok(_) => ValidateResult {
            valid: true,
            error: None,
        },
        Err(err) => ValidateResult {
            valid: false,
            error: Some(err),
        },
    }
}

/// Returns only the SQL conditions, or an empty string for invalid input.
#[must_use]
pub fn translate_to_sql_conditions(query: &str, schema: Option<&Schema>) -> String {
    let result = translate(query, schema);
    if result.valid {
        result.sql
    } else {
        String::new()
    }
}

/// Returns the flat conditions of a query, or nothing for invalid input.
#[must_use]
pub fn conditions_from_query(query: &str) -> Vec<FilterCondition> {
    let tokenized = tokenize(query);
    match check_tokens(&tokenized).and_then(|()| parse(&tokenized.tokens)) {
        Ok(_) => extract_conditions(&tokenized.tokens),
        Err(_) => Vec::new(),
    }
}
