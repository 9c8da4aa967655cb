//! Error types for the SMS categorizer.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Model {model} answered with an unknown category: {raw:?}")]
    UnknownCategory { model: String, raw: String },
}

/// CRM update errors. Logged, never surfaced to webhook callers.
#[derive(Debug, thiserror::Error)]
pub enum CrmError {
    #[error("CRM request for contact {contact_id} failed: {reason}")]
    RequestFailed { contact_id: String, reason: String },

    #[error("CRM rejected update for contact {contact_id} with status {status}: {body}")]
    UpdateFailed {
        contact_id: String,
        status: u16,
        body: String,
    },
}

/// Errors returned to webhook callers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid JSON in request body")]
    InvalidJson,

    #[error("{0}")]
    MissingField(&'static str),

    #[error("{0}")]
    EmptyField(&'static str),

    #[error("Invalid owner_id provided")]
    UnknownOwner,

    #[error("An error occurred during message categorization")]
    Internal { details: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self {
            Self::Internal { details } => serde_json::json!({
                "status": "error",
                "error": self.to_string(),
                "details": details,
            }),
            _ => serde_json::json!({
                "status": "error",
                "error": self.to_string(),
            }),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_bad_request() {
        assert_eq!(ApiError::InvalidJson.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::UnknownOwner.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::MissingField("Please provide a 'message'").status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn internal_error_maps_to_500() {
        let err = ApiError::Internal {
            details: "task panicked".into(),
        };
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.to_string(),
            "An error occurred during message categorization"
        );
    }

    #[test]
    fn field_errors_display_their_message() {
        let err = ApiError::EmptyField("Please provide a non-empty 'message'");
        assert_eq!(err.to_string(), "Please provide a non-empty 'message'");
    }
}
