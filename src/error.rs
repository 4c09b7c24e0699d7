use serde_json::{json, Value};
use thiserror::Error;

/// Every gateway call resolves to exactly one of these; nothing panics or
/// propagates past the gateway boundary.
pub type ApiResult<T> = Result<T, ApiFailure>;

/// Failure taxonomy for the request pipeline.
///
/// `Network` covers transport-level problems (DNS, refused connection,
/// timeout). `Http` is any non-2xx response, carrying the status and the
/// parsed error body. `Validation` is client-side rejection before a request
/// is ever issued, and also covers a 2xx body that can't be decoded into the
/// expected shape.
#[derive(Debug, Error, Clone)]
pub enum ApiFailure {
    #[error("{message}")]
    Network { message: String },

    #[error("{message}")]
    Http {
        status: u16,
        message: String,
        details: Value,
    },

    #[error("{message}")]
    Validation { message: String },
}

impl ApiFailure {
    pub fn network(message: impl Into<String>) -> Self {
        ApiFailure::Network {
            message: message.into(),
        }
    }

    pub fn http(status: u16, message: impl Into<String>, details: Value) -> Self {
        ApiFailure::Http {
            status,
            message: message.into(),
            details,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiFailure::Validation {
            message: message.into(),
        }
    }

    /// Stable code for callers that branch on failure kind: the HTTP status
    /// as a string, or a symbolic code for local failures.
    pub fn code(&self) -> String {
        match self {
            ApiFailure::Network { .. } => "NETWORK_ERROR".to_string(),
            ApiFailure::Http { status, .. } => status.to_string(),
            ApiFailure::Validation { .. } => "VALIDATION_ERROR".to_string(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiFailure::Network { message } => message,
            ApiFailure::Http { message, .. } => message,
            ApiFailure::Validation { message } => message,
        }
    }

    /// Server-provided error body for `Http` failures, `Null` otherwise.
    pub fn details(&self) -> Value {
        match self {
            ApiFailure::Http { details, .. } => details.clone(),
            _ => Value::Null,
        }
    }

    /// JSON rendering used by the CLI's `--json` output mode.
    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "error": self.message(),
            "code": self.code(),
            "details": self.details(),
        })
    }
}
