//! The value every execution returns.

use std::time::Duration;

use serde::Serialize;

use super::engine::Row;
use super::error::ExecutionError;

/// Outcome of one execution. Exactly one of `rows` (possibly empty) and
/// `error` is meaningful; `rows` is empty whenever `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub rows: Vec<Row>,
    pub error: Option<ExecutionError>,
    pub sql_text: String,
    pub duration_ms: u64,
}

impl QueryResult {
    pub fn success(rows: Vec<Row>, sql_text: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            rows,
            error: None,
            sql_text: sql_text.into(),
            duration_ms: millis(elapsed),
        }
    }

    pub fn failure(error: ExecutionError, sql_text: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            rows: Vec::new(),
            error: Some(error),
            sql_text: sql_text.into(),
            duration_ms: millis(elapsed),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_serialization() {
        let result = QueryResult::failure(
            ExecutionError::Cancelled,
            "SELECT 1",
            Duration::from_millis(3),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["rows"], serde_json::json!([]));
        assert_eq!(json["sqlText"], "SELECT 1");
        assert_eq!(json["durationMs"], 3);
        assert_eq!(json["error"]["kind"], "Cancelled");
    }

    #[test]
    fn test_success_has_no_error() {
        let result = QueryResult::success(vec![Row::new()], "SELECT 1", Duration::ZERO);
        assert!(result.is_ok());
        assert_eq!(serde_json::to_value(&result).unwrap()["error"], serde_json::Value::Null);
    }
}
