//! Typed errors and HTTP mapping.
//!
//! Every failure a use case can report is one [`AppError`] variant. The closed
//! [`ErrorKind`] set decides the status, the stable code and whether the error
//! is escalated to the failure sink (logged at `error` level here).

use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
    #[error("validation: {0}")]
    Validation(String),
}

/// Closed set of error kinds shared by every use case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidParameter,
    Unauthorized,
    Forbidden,
    NotFound,
    PersistenceFailure,
    TransactionCommitFailure,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::InvalidParameter => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::PersistenceFailure | ErrorKind::TransactionCommitFailure => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable code clients branch on; independent of the message and root cause.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::InvalidParameter => "invalid_parameter",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not_found",
            ErrorKind::PersistenceFailure => "persistence_failure",
            ErrorKind::TransactionCommitFailure => "transaction_commit_failure",
        }
    }

    /// Whether the error should be forwarded to the failure-tracking sink.
    pub fn is_escalated(self) -> bool {
        matches!(
            self,
            ErrorKind::PersistenceFailure | ErrorKind::TransactionCommitFailure
        )
    }
}

/// Store operation a persistence failure happened in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Create => "create",
            Operation::Read => "get",
            Operation::Update => "update",
            Operation::Delete => "delete",
        })
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid parameter: `{param}`.")]
    InvalidParameter { param: String },
    #[error("Unauthorized.")]
    Unauthorized {
        #[source]
        source: Option<BoxError>,
    },
    #[error("No permission.")]
    Forbidden,
    #[error("{} not found.", capitalized(.resource))]
    NotFound { resource: &'static str },
    #[error("Failed to {op} {resource}.")]
    Persistence {
        op: Operation,
        resource: &'static str,
        #[source]
        source: StoreError,
    },
    #[error("Failed to commit transaction.")]
    TransactionCommit {
        #[source]
        source: StoreError,
    },
}

fn capitalized(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl AppError {
    pub fn invalid_parameter(param: impl Into<String>) -> Self {
        AppError::InvalidParameter { param: param.into() }
    }

    pub fn unauthorized(source: Option<BoxError>) -> Self {
        AppError::Unauthorized { source }
    }

    pub fn forbidden() -> Self {
        AppError::Forbidden
    }

    pub fn not_found(resource: &'static str) -> Self {
        AppError::NotFound { resource }
    }

    pub fn persistence(op: Operation, resource: &'static str, source: StoreError) -> Self {
        AppError::Persistence { op, resource, source }
    }

    pub fn commit(source: StoreError) -> Self {
        AppError::TransactionCommit { source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            AppError::Unauthorized { .. } => ErrorKind::Unauthorized,
            AppError::Forbidden => ErrorKind::Forbidden,
            AppError::NotFound { .. } => ErrorKind::NotFound,
            AppError::Persistence { .. } => ErrorKind::PersistenceFailure,
            AppError::TransactionCommit { .. } => ErrorKind::TransactionCommitFailure,
        }
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind() == kind
    }

    pub fn status(&self) -> StatusCode {
        self.kind().status()
    }

    pub fn code(&self) -> &'static str {
        self.kind().code()
    }

    pub fn is_escalated(&self) -> bool {
        self.kind().is_escalated()
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        if kind.is_escalated() {
            let cause = std::error::Error::source(&self).map(|c| c.to_string());
            tracing::error!(code = kind.code(), cause = ?cause, "{}", self);
        } else {
            tracing::debug!(code = kind.code(), "{}", self);
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: kind.code().to_string(),
                message: self.to_string(),
            },
        };
        (kind.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn kinds_map_to_status_code_and_escalation() {
        let cases = [
            (AppError::invalid_parameter("name_card"), 400, "invalid_parameter", false),
            (AppError::unauthorized(None), 401, "unauthorized", false),
            (AppError::forbidden(), 403, "forbidden", false),
            (AppError::not_found("Card"), 404, "not_found", false),
            (
                AppError::persistence(Operation::Create, "card", StoreError::Db(sqlx::Error::PoolTimedOut)),
                500,
                "persistence_failure",
                true,
            ),
            (
                AppError::commit(StoreError::Commit(sqlx::Error::PoolClosed)),
                500,
                "transaction_commit_failure",
                true,
            ),
        ];
        for (err, status, code, escalated) in cases {
            assert_eq!(err.status().as_u16(), status, "{err}");
            assert_eq!(err.code(), code);
            assert_eq!(err.is_escalated(), escalated);
        }
    }

    #[test]
    fn invalid_parameter_names_the_field() {
        let err = AppError::invalid_parameter("Username");
        assert_eq!(err.to_string(), "Invalid parameter: `Username`.");
        assert!(err.is(ErrorKind::InvalidParameter));
        assert!(!err.is(ErrorKind::NotFound));
    }

    #[test]
    fn persistence_keeps_root_cause() {
        let err = AppError::persistence(Operation::Read, "user", StoreError::Db(sqlx::Error::PoolTimedOut));
        assert_eq!(err.to_string(), "Failed to get user.");
        let cause = std::error::Error::source(&err).expect("root cause");
        assert!(cause.to_string().contains("pool timed out"));
    }

    #[tokio::test]
    async fn response_body_carries_code_and_message() {
        let response = AppError::not_found("user").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "not_found");
        assert_eq!(body["error"]["message"], "User not found.");
    }

    #[tokio::test]
    async fn escalated_response_hides_root_cause_text() {
        let err = AppError::persistence(
            Operation::Update,
            "card",
            StoreError::Unavailable("connection refused".into()),
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("Failed to update card."));
        assert!(!text.contains("connection refused"));
    }
}
