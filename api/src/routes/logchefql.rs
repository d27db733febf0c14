//! LogchefQL endpoints.
//!
//! Translation, validation and query-type detection for the query editor.
//! A query that fails to parse is not an HTTP error: the result carries
//! `valid: false` and the positioned error so the editor can underline it.
//! Only malformed requests and rejected assembler inputs return 400.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use logchefql::builder::{
    build_full_logsql_query, build_full_query, parse_time_bound, LogsqlQueryParams,
    SqlQueryParams,
};
use logchefql::detect::{detect_query_type, QueryType};
use logchefql::query::{ErrorCode, ParseError};
use logchefql::schema::Schema;
use logchefql::{
    translate, translate_logsql, validate, LogsqlTranslateResult, TranslateResult,
    ValidateResult,
};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

/// Longest query text accepted, in characters (`validator` counts chars,
/// not bytes). Keep in step with the `length(max)` attributes below.
pub const MAX_QUERY_LEN: usize = 16_384;

/// Timestamp column used when a full SQL request does not name one.
const DEFAULT_TIMESTAMP_FIELD: &str = "timestamp";

/// Target language of a translation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// ClickHouse SQL.
    #[default]
    ClickHouse,
    /// VictoriaLogs LogsQL.
    VictoriaLogs,
}

/// Request body for translation.
///
/// When both time bounds are present the response also carries the complete
/// backend query.
#[derive(Debug, Deserialize, Validate)]
pub struct TranslateRequest {
    /// The LogchefQL query; may be empty.
    #[validate(length(max = 16_384, message = "Query is too long"))]
    pub query: String,

    /// Target language (default: clickhouse).
    #[serde(default)]
    pub dialect: Dialect,

    /// Table schema for type-aware nested field access (ClickHouse only).
    pub schema: Option<Schema>,

    /// `table` or `database.table` (required for a full SQL query).
    pub table: Option<String>,

    /// Timestamp column (default: `timestamp`).
    pub timestamp_field: Option<String>,

    /// Lower time bound.
    pub start_time: Option<String>,

    /// Upper time bound.
    pub end_time: Option<String>,

    /// Timezone of the time bounds (default: the server's configured timezone).
    pub timezone: Option<String>,

    /// Row limit; missing or non-positive values use the configured default.
    pub limit: Option<i64>,

    /// Columns to select when the query has no pipe projection.
    pub columns: Option<Vec<String>>,
}

/// Translation response, flattened so the fields match the library result.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum TranslateResponse {
    /// ClickHouse translation.
    ClickHouse {
        /// Translation result.
        #[serde(flatten)]
        result: TranslateResult,
        /// Complete `SELECT` statement, when time bounds were given.
        #[serde(skip_serializing_if = "Option::is_none")]
        full_sql: Option<String>,
    },
    /// VictoriaLogs translation.
    VictoriaLogs {
        /// Translation result.
        #[serde(flatten)]
        result: LogsqlTranslateResult,
        /// Complete LogsQL query, when time bounds were given.
        #[serde(skip_serializing_if = "Option::is_none")]
        full_logsql: Option<String>,
    },
}

/// Request body carrying only a query.
#[derive(Debug, Deserialize, Validate)]
pub struct QueryRequest {
    /// The query text.
    #[validate(length(max = 16_384, message = "Query is too long"))]
    pub query: String,
}

/// Response of the detection endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct DetectResponse {
    /// The detected language.
    pub query_type: QueryType,
}

/// Error response for LogchefQL operations.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    /// Error type.
    pub error: String,
    /// Detailed error message.
    pub message: String,
    /// Library error code, when the error came from the translator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
}

impl ApiError {
    fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            error: "invalid_request".to_string(),
            message: message.into(),
            code: None,
        }
    }
}

impl From<ParseError> for ApiError {
    fn from(e: ParseError) -> Self {
        Self {
            error: "invalid_parameter".to_string(),
            message: e.to_string(),
            code: Some(e.code),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(e: ValidationErrors) -> Self {
        Self {
            error: "validation_failed".to_string(),
            message: e.to_string(),
            code: None,
        }
    }
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

fn bad_request(error: impl Into<ApiError>) -> (StatusCode, Json<ApiError>) {
    (StatusCode::BAD_REQUEST, Json(error.into()))
}

/// Creates the LogchefQL routes with application state.
pub fn logchefql_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/logchefql/translate", post(translate_query))
        .route("/api/v1/logchefql/validate", post(validate_query))
        .route("/api/v1/logchefql/detect", post(detect_query))
        .with_state(state)
}

/// Returns both time bounds, `None` when neither is set.
fn time_bounds(request: &TranslateRequest) -> Result<Option<(&str, &str)>, ApiError> {
    match (request.start_time.as_deref(), request.end_time.as_deref()) {
        (Some(start), Some(end)) => Ok(Some((start, end))),
        (None, None) => Ok(None),
        _ => Err(ApiError::invalid_request(
            "start_time and end_time must be given together",
        )),
    }
}

/// Handler for translation.
async fn translate_query(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> ApiResult<TranslateResponse> {
    request.validate().map_err(bad_request)?;
    let bounds = time_bounds(&request).map_err(bad_request)?;
    let config = state.config();
    let limit = config.effective_limit(request.limit);

    let response = match request.dialect {
        Dialect::ClickHouse => {
            let result = translate(&request.query, request.schema.as_ref());
            let full_sql = match bounds {
                Some((start_time, end_time)) if result.valid => {
                    let table = request.table.as_deref().ok_or_else(|| {
                        bad_request(ApiError::invalid_request(
                            "table is required when time bounds are given",
                        ))
                    })?;
                    let params = SqlQueryParams {
                        query: &request.query,
                        schema: request.schema.as_ref(),
                        table,
                        timestamp_field: request
                            .timestamp_field
                            .as_deref()
                            .unwrap_or(DEFAULT_TIMESTAMP_FIELD),
                        start_time,
                        end_time,
                        timezone: request
                            .timezone
                            .as_deref()
                            .unwrap_or(config.default_timezone.as_str()),
                        limit,
                        columns: request.columns.as_deref(),
                    };
                    let sql = build_full_query(&params).map_err(|e| {
                        tracing::debug!(query = %request.query, error = %e, "Failed to build SQL query");
                        bad_request(e)
                    })?;
                    Some(sql)
                }
                _ => None,
            };
            TranslateResponse::ClickHouse { result, full_sql }
        }
        Dialect::VictoriaLogs => {
            let result = translate_logsql(&request.query);
            let full_logsql = match bounds {
                Some((start_time, end_time)) if result.valid => {
                    let params = LogsqlQueryParams {
                        query: &request.query,
                        start: parse_time_bound(start_time).map_err(bad_request)?,
                        end: parse_time_bound(end_time).map_err(bad_request)?,
                        limit,
                    };
                    let logsql = build_full_logsql_query(&params).map_err(|e| {
                        tracing::debug!(query = %request.query, error = %e, "Failed to build LogsQL query");
                        bad_request(e)
                    })?;
                    Some(logsql)
                }
                _ => None,
            };
            TranslateResponse::VictoriaLogs {
                result,
                full_logsql,
            }
        }
    };

    Ok(Json(response))
}

/// Handler for syntax validation.
async fn validate_query(Json(request): Json<QueryRequest>) -> ApiResult<ValidateResult> {
    request.validate().map_err(bad_request)?;
    Ok(Json(validate(&request.query)))
}

/// Handler for query-type detection.
async fn detect_query(Json(request): Json<QueryRequest>) -> ApiResult<DetectResponse> {
    request.validate().map_err(bad_request)?;
    Ok(Json(DetectResponse {
        query_type: detect_query_type(&request.query),
    }))
}
