//! Protocol types for worker communication.
//!
//! One JSON object per line in each direction. Requests carry a unique id
//! which the worker echoes back on the matching response.

use serde::{Deserialize, Serialize};

// ============================================================================
// Request/Response Envelope
// ============================================================================

/// Request envelope sent to the worker.
#[derive(Debug, Clone, Serialize)]
pub struct RequestEnvelope {
    /// Unique request ID for correlation.
    pub id: String,
    /// Method name (e.g., "query.execute").
    pub method: String,
    /// Method-specific parameters.
    pub params: serde_json::Value,
}

/// Response envelope received from the worker.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseEnvelope {
    /// Request ID this response corresponds to.
    pub id: String,
    /// Whether the request succeeded.
    pub success: bool,
    /// Result data (present if success = true).
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    /// Error information (present if success = false).
    #[serde(default)]
    pub error: Option<ErrorInfo>,
}

/// Error information in a failed response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorInfo {
    /// Error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

// ============================================================================
// Request Parameters
// ============================================================================

/// Database connection parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionParams {
    /// Database driver name (e.g., "postgres", "mssql").
    pub driver: String,
    /// Driver-specific connection string.
    pub connection_string: String,
}

/// Parameters for `query.execute`.
#[derive(Debug, Clone, Serialize)]
pub struct ExecuteQueryParams {
    #[serde(flatten)]
    pub connection: ConnectionParams,
    /// SQL query to execute.
    pub sql: String,
    /// Positional bind values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<serde_json::Value>>,
}

/// Parameters for `health.ping`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthPingParams {
    #[serde(flatten)]
    pub connection: ConnectionParams,
}

// ============================================================================
// Response Types
// ============================================================================

/// Column information in query results.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResultColumn {
    /// Column name or alias.
    pub name: String,
    /// Database-specific type.
    pub data_type: String,
}

/// Response from `query.execute`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteQueryResponse {
    /// Result column descriptions.
    pub columns: Vec<QueryResultColumn>,
    /// Result data rows.
    pub rows: Vec<Vec<serde_json::Value>>,
    /// Number of rows returned.
    pub row_count: i32,
}

impl ExecuteQueryResponse {
    /// Zip each positional row with the column names.
    pub fn into_objects(self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        let names: Vec<String> = self.columns.into_iter().map(|c| c.name).collect();
        self.rows
            .into_iter()
            .map(|row| names.iter().cloned().zip(row).collect())
            .collect()
    }
}

/// Response from `health.ping`.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthPingResponse {
    pub ok: bool,
}

// ============================================================================
// Method Names
// ============================================================================

/// Worker method names.
pub mod methods {
    pub const EXECUTE_QUERY: &str = "query.execute";
    pub const HEALTH_PING: &str = "health.ping";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute_params_flatten_connection() {
        let params = ExecuteQueryParams {
            connection: ConnectionParams {
                driver: "postgres".into(),
                connection_string: "postgres://localhost/retail".into(),
            },
            sql: "SELECT 1".into(),
            args: Some(vec![serde_json::json!("NCR"), serde_json::json!(5)]),
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["driver"], "postgres");
        assert_eq!(value["connection_string"], "postgres://localhost/retail");
        assert_eq!(value["args"][1], 5);
    }

    #[test]
    fn test_args_omitted_when_none() {
        let params = ExecuteQueryParams {
            connection: ConnectionParams {
                driver: "duckdb".into(),
                connection_string: ":memory:".into(),
            },
            sql: "SELECT 1".into(),
            args: None,
        };
        let json = serde_json::to_string(&params).unwrap();
        assert!(!json.contains("args"));
    }

    #[test]
    fn test_response_into_objects() {
        let json = r#"{
            "columns": [
                {"name": "region", "data_type": "TEXT"},
                {"name": "revenue", "data_type": "NUMERIC"}
            ],
            "rows": [["NCR", 1200.5], ["CAR", 300]],
            "row_count": 2
        }"#;
        let response: ExecuteQueryResponse = serde_json::from_str(json).unwrap();
        let rows = response.into_objects();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["region"], "NCR");
        assert_eq!(rows[1]["revenue"], 300);
        let keys: Vec<&String> = rows[0].keys().collect();
        assert_eq!(keys, ["region", "revenue"]);
    }
}
