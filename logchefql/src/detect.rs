//! Best-effort routing between raw SQL and LogchefQL input.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static SQL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)^\s*SELECT\s+",
        r"(?i)^\s*WITH\s+",
        r"(?i)\s+FROM\s+",
        r"(?i)\s+GROUP\s+BY\s+",
        r"(?i)\s+ORDER\s+BY\s+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// The language a piece of free-form input is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryType {
    /// Raw ClickHouse SQL.
    #[serde(rename = "sql")]
    Sql,
    /// A LogchefQL filter.
    #[serde(rename = "logchefql")]
    LogchefQl,
}

impl QueryType {
    /// Wire name of the query type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sql => "sql",
            Self::LogchefQl => "logchefql",
        }
    }
}

impl std::fmt::Display for QueryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies `text` as SQL or LogchefQL.
///
/// SQL keywords (`SELECT`, `WITH`, `FROM`, `GROUP BY`, `ORDER BY`) win;
/// anything else, including empty input, is treated as LogchefQL.
///
/// ```
/// use logchefql::detect::{detect_query_type, QueryType};
///
/// assert_eq!(detect_query_type("SELECT * FROM logs"), QueryType::Sql);
/// assert_eq!(detect_query_type(r#"level="error""#), QueryType::LogchefQl);
/// ```
#[must_use]
pub fn detect_query_type(text: &str) -> QueryType {
    let text = text.trim();
    if !text.is_empty() && SQL_PATTERNS.iter().any(|re| re.is_match(text)) {
        QueryType::Sql
    } else {
        QueryType::LogchefQl
    }
}
