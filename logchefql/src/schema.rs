//! Table schema used for type-aware code generation.
//!
//! The schema only influences how nested fields are accessed; a missing
//! schema is legal and selects the generic JSON extraction strategy.

use serde::{Deserialize, Serialize};

/// A column name with its ClickHouse type string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// ClickHouse type, e.g. `Map(LowCardinality(String), String)`.
    #[serde(rename = "type")]
    pub column_type: String,
}

impl ColumnInfo {
    /// Creates a column description.
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
        }
    }

    /// Storage class of this column.
    #[must_use]
    pub fn kind(&self) -> ColumnKind {
        ColumnKind::classify(&self.column_type)
    }
}

/// Ordered list of columns of the queried table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Columns in table order.
    pub columns: Vec<ColumnInfo>,
}

impl Schema {
    /// Creates a schema from `(name, type)` pairs.
    ///
    /// # Examples
    ///
    /// ```
    /// use logchefql::schema::{ColumnKind, Schema};
    ///
    /// let schema = Schema::from_pairs([("log_attributes", "Map(String, String)")]);
    /// assert_eq!(schema.column_kind("log_attributes"), Some(ColumnKind::Map));
    /// ```
    pub fn from_pairs<I, N, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, T)>,
        N: Into<String>,
        T: Into<String>,
    {
        Self {
            columns: pairs
                .into_iter()
                .map(|(name, ty)| ColumnInfo::new(name, ty))
                .collect(),
        }
    }

    /// Looks up a column by exact name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns true if the schema has a column called `name`.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Type string of the named column.
    #[must_use]
    pub fn column_type(&self, name: &str) -> Option<&str> {
        self.column(name).map(|c| c.column_type.as_str())
    }

    /// Storage class of the named column.
    #[must_use]
    pub fn column_kind(&self, name: &str) -> Option<ColumnKind> {
        self.column(name).map(ColumnInfo::kind)
    }

    /// The first `Map(...)` column in table order.
    #[must_use]
    pub fn first_map_column(&self) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.kind() == ColumnKind::Map)
    }
}

/// How a column stores nested data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// `Map(K, V)`: nested keys are subscripts.
    Map,
    /// `JSON`/`Object('json')`: nested keys go through JSON extraction.
    Json,
    /// `String`/`FixedString(N)`: may hold serialized JSON.
    String,
    /// Anything else.
    Other,
}

impl ColumnKind {
    /// Classifies a ClickHouse type string, looking through `Nullable(...)`
    /// and `LowCardinality(...)` wrappers.
    #[must_use]
    pub fn classify(column_type: &str) -> Self {
        let mut ty = column_type.trim().to_ascii_lowercase();
        while let Some(inner) = ["nullable(", "lowcardinality("].iter().find_map(|wrapper| {
            ty.strip_prefix(wrapper)
                .and_then(|rest| rest.strip_suffix(')'))
                .map(str::to_string)
        }) {
            ty = inner.trim().to_string();
        }

        if ty.starts_with("map(") {
            Self::Map
        } else if ty == "json" || ty == "newjson" || ty.starts_with("json(") || ty.starts_with("object(") {
            Self::Json
        } else if ty == "string" || ty.starts_with("string(") || ty.starts_with("fixedstring(") {
            Self::String
        } else {
            Self::Other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_column_types() {
        assert_eq!(ColumnKind::classify("Map(String, String)"), ColumnKind::Map);
        assert_eq!(
            ColumnKind::classify("Map(LowCardinality(String), String)"),
            ColumnKind::Map
        );
        assert_eq!(ColumnKind::classify("JSON"), ColumnKind::Json);
        assert_eq!(ColumnKind::classify("JSON(max_dynamic_paths=8)"), ColumnKind::Json);
        assert_eq!(ColumnKind::classify("Object('json')"), ColumnKind::Json);
        assert_eq!(ColumnKind::classify("String"), ColumnKind::String);
        assert_eq!(ColumnKind::classify("LowCardinality(String)"), ColumnKind::String);
        assert_eq!(
            ColumnKind::classify("Nullable(LowCardinality(String))"),
            ColumnKind::String
        );
        assert_eq!(ColumnKind::classify("FixedString(16)"), ColumnKind::String);
        assert_eq!(ColumnKind::classify("DateTime64(3)"), ColumnKind::Other);
        assert_eq!(ColumnKind::classify("Int32"), ColumnKind::Other);
    }

    #[test]
    fn test_schema_lookups() {
        let schema = Schema::from_pairs([
            ("timestamp", "DateTime64(3)"),
            ("body", "String"),
            ("resource_attributes", "Map(String, String)"),
            ("log_attributes", "Map(LowCardinality(String), String)"),
        ]);
        assert!(schema.has_column("body"));
        assert!(!schema.has_column("missing"));
        assert_eq!(schema.column_type("timestamp"), Some("DateTime64(3)"));
        assert_eq!(
            schema.first_map_column().map(|c| c.name.as_str()),
            Some("resource_attributes")
        );
    }

    #[test]
    fn test_schema_json_shape() {
        let schema: Schema = serde_json::from_str(
            r#"{"columns":[{"name":"body","type":"String"},{"name":"attrs","type":"JSON"}]}"#,
        )
        .unwrap();
        assert_eq!(schema.column_kind("attrs"), Some(ColumnKind::Json));
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["columns"][0]["type"], "String");
    }
}
