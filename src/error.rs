// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use std::fmt;

/// Global Application Error Enum.
/// Every repository and engine operation fails with one of these tags;
/// the handler boundary turns it into the `{error: {name, code, message}}` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    // Requester is not the owner, or not authenticated at all
    Auth(String),

    // Caller-supplied version does not match the stored version
    VersionConflict(String),

    // Malformed payload or an answer type outside the allowed set
    Validation(String),

    // Document store read/write/query failure, including not-found
    Storage(String),

    // Student read attempted against a disabled quiz
    QuizDisabled(String),
}

impl AppError {
    /// Stable tag clients branch on.
    pub fn name(&self) -> &'static str {
        match self {
            AppError::Auth(_) => "AUTH",
            AppError::VersionConflict(_) => "VERSION",
            AppError::Validation(_) => "FORMAT",
            AppError::Storage(_) => "DATA",
            AppError::QuizDisabled(_) => "DISABLED",
        }
    }

    /// Stable numeric code, one per tag.
    pub fn code(&self) -> u16 {
        match self {
            AppError::Auth(_) => 401,
            AppError::VersionConflict(_) => 409,
            AppError::Validation(_) => 400,
            AppError::Storage(_) => 510,
            AppError::QuizDisabled(_) => 403,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Auth(msg)
            | AppError::VersionConflict(msg)
            | AppError::Validation(msg)
            | AppError::Storage(msg)
            | AppError::QuizDisabled(msg) => msg,
        }
    }

    pub fn not_found(what: &str, id: &str) -> Self {
        AppError::Storage(format!("{} '{}' not found", what, id))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name(), self.message())
    }
}

impl std::error::Error for AppError {}

impl AppError {
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// The `{name, code, message}` object. Storage details stay server-side;
    /// they are logged where the failure happens.
    pub fn to_json(&self) -> Value {
        let message = match self {
            AppError::Storage(_) => "Internal Datastore Error",
            other => other.message(),
        };

        json!({
            "name": self.name(),
            "code": self.code(),
            "message": message,
        })
    }
}

/// Implements `IntoResponse` for `AppError`.
/// Uses the tag's code as HTTP status.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_json(),
        }));

        (self.status(), body).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::Storage`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

/// Encoded documents that fail to decode are a storage fault, not a client one.
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}
