//! Execution failures carried inside a [`QueryResult`](super::QueryResult).

use serde::ser::{Serialize, SerializeStruct, Serializer};
use thiserror::Error;

use crate::worker::WorkerError;

/// Result type for engine calls.
pub type ExecutionResult<T> = Result<T, ExecutionError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("connection failure: {0}")]
    ConnectionFailure(String),

    #[error("syntax error: {0}")]
    EngineSyntaxError(String),

    #[error("query timed out after {0} ms")]
    Timeout(u128),

    #[error("query cancelled")]
    Cancelled,

    #[error("engine error: {0}")]
    Engine(String),
}

/// Fieldless category of an [`ExecutionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ExecutionErrorKind {
    ConnectionFailure,
    EngineSyntaxError,
    Timeout,
    Cancelled,
    Engine,
}

impl ExecutionError {
    pub fn kind(&self) -> ExecutionErrorKind {
        match self {
            Self::ConnectionFailure(_) => ExecutionErrorKind::ConnectionFailure,
            Self::EngineSyntaxError(_) => ExecutionErrorKind::EngineSyntaxError,
            Self::Timeout(_) => ExecutionErrorKind::Timeout,
            Self::Cancelled => ExecutionErrorKind::Cancelled,
            Self::Engine(_) => ExecutionErrorKind::Engine,
        }
    }
}

/// `{ "kind": "Timeout", "message": "query timed out after 50 ms" }`
impl Serialize for ExecutionError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ExecutionError", 2)?;
        state.serialize_field("kind", &self.kind())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

impl From<rusqlite::Error> for ExecutionError {
    fn from(err: rusqlite::Error) -> Self {
        use rusqlite::ffi::ErrorCode;

        match &err {
            rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::OperationInterrupted => {
                Self::Cancelled
            }
            rusqlite::Error::SqliteFailure(e, _)
                if matches!(
                    e.code,
                    ErrorCode::CannotOpen | ErrorCode::NotADatabase | ErrorCode::PermissionDenied
                ) =>
            {
                Self::ConnectionFailure(err.to_string())
            }
            _ if err.to_string().contains("syntax error") => {
                Self::EngineSyntaxError(err.to_string())
            }
            _ => Self::Engine(err.to_string()),
        }
    }
}

impl From<WorkerError> for ExecutionError {
    fn from(err: WorkerError) -> Self {
        match err {
            WorkerError::ConnectionFailed(msg) => Self::ConnectionFailure(msg),
            WorkerError::SyntaxError(msg) => Self::EngineSyntaxError(msg),
            WorkerError::Timeout(ms) => Self::Timeout(ms),
            e @ (WorkerError::SpawnFailed(_)
            | WorkerError::NotFound
            | WorkerError::WorkerExited
            | WorkerError::ChannelClosed
            | WorkerError::DriverNotFound(_)) => Self::ConnectionFailure(e.to_string()),
            other => Self::Engine(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_kind_and_message() {
        let json = serde_json::to_value(ExecutionError::Timeout(50)).unwrap();
        assert_eq!(json["kind"], "Timeout");
        assert_eq!(json["message"], "query timed out after 50 ms");
    }

    #[test]
    fn test_worker_error_mapping() {
        assert_eq!(
            ExecutionError::from(WorkerError::SyntaxError("near FROM".into())).kind(),
            ExecutionErrorKind::EngineSyntaxError
        );
        assert_eq!(
            ExecutionError::from(WorkerError::WorkerExited).kind(),
            ExecutionErrorKind::ConnectionFailure
        );
        assert_eq!(
            ExecutionError::from(WorkerError::remote("DEADLOCK", "retry")).kind(),
            ExecutionErrorKind::Engine
        );
    }
}
