use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value as JsonValue, json};
use thiserror::Error;

use crate::core::StoreError;

use super::envelope::Envelope;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Duplicate key error: field '{field}' with value {value} already exists")]
    Duplicate { field: String, value: String },

    #[error("Unknown resource '{0}'")]
    UnknownResource(String),

    #[error("Too many requests, slow down")]
    RateLimited,

    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::CollectionNotFound(name) => Self::UnknownResource(name),
            StoreError::NotFound { collection, id } => {
                Self::NotFound(format!("No record '{id}' in '{collection}'"))
            }
            StoreError::DuplicateKey { field, value, .. } => Self::Duplicate { field, value },
            StoreError::Validation(message) => Self::Validation(message),
            StoreError::Lock(message) => Self::Internal(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, data) = match &self {
            Self::Validation(_) => (StatusCode::BAD_REQUEST, JsonValue::Null),
            Self::NotFound(_) | Self::UnknownResource(_) => {
                (StatusCode::NOT_FOUND, JsonValue::Null)
            }
            // The colliding field/value rides in the message for legacy
            // clients and as structured data for everyone else.
            Self::Duplicate { field, value } => (
                StatusCode::BAD_REQUEST,
                json!({ "field": field, "value": value }),
            ),
            Self::RateLimited => (StatusCode::TOO_MANY_REQUESTS, JsonValue::Null),
            Self::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, JsonValue::Null)
            }
        };

        Envelope::respond(status, data, message)
    }
}
