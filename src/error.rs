//! Error types for Recroute
//!
//! All errors implement `IntoResponse` for Axum handlers. Every variant
//! maps to a fixed 4xx or 5xx status, so an out-of-class status code is
//! unrepresentable; a unit test below pins that property.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Request missing {0}")]
    MissingField(String),

    #[error("Request data missing fields: {}", .0.join(", "))]
    MissingSessionFields(Vec<String>),

    #[error("Model with ID: {} is not supported. Available models: {}", .model_id, .available.join(", "))]
    UnsupportedModel {
        model_id: String,
        available: Vec<String>,
    },

    #[error("Tutor ID ({}) not supported. Available tutors: {}", .tutor_id, .available.join(", "))]
    UnsupportedTutor {
        tutor_id: String,
        available: Vec<String>,
    },

    #[error("KC ({0}) does not exist")]
    UnknownKnowledgeComponent(String),

    #[error("Model invocation failed: {0}")]
    ModelInvocation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error
    ///
    /// Client-caused failures map to 4xx, backend/internal failures to 5xx,
    /// matching the upstream proxy's error surface.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MissingField(_) => StatusCode::BAD_REQUEST,
            Self::MissingSessionFields(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedModel { .. } => StatusCode::NOT_FOUND,
            Self::UnsupportedTutor { .. } => StatusCode::BAD_REQUEST,
            Self::UnknownKnowledgeComponent(_) => StatusCode::BAD_REQUEST,
            Self::ModelInvocation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(serde_json::json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Convenience type alias for Results
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn all_variants() -> Vec<AppError> {
        vec![
            AppError::Config("test".to_string()),
            AppError::MissingField("model ID".to_string()),
            AppError::MissingSessionFields(vec!["hints".to_string()]),
            AppError::UnsupportedModel {
                model_id: "GPT-5".to_string(),
                available: vec!["GPT-4o".to_string()],
            },
            AppError::UnsupportedTutor {
                tutor_id: "unknown".to_string(),
                available: vec!["math-parent-tool".to_string()],
            },
            AppError::UnknownKnowledgeComponent("kc-x".to_string()),
            AppError::ModelInvocation("connection refused".to_string()),
            AppError::Internal("unexpected state".to_string()),
        ]
    }

    #[test]
    fn test_every_variant_maps_to_4xx_or_5xx() {
        for err in all_variants() {
            let status = err.status();
            assert!(
                status.is_client_error() || status.is_server_error(),
                "{err} mapped to out-of-class status {status}"
            );
        }
    }

    #[test]
    fn test_missing_field_error_message() {
        let err = AppError::MissingField("model ID".to_string());
        assert_eq!(err.to_string(), "Request missing model ID");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unsupported_model_enumerates_available() {
        let err = AppError::UnsupportedModel {
            model_id: "GPT-5".to_string(),
            available: vec!["Llama3-8B".to_string(), "GPT-4o".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("GPT-5"));
        assert!(msg.contains("Llama3-8B"));
        assert!(msg.contains("GPT-4o"));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_missing_session_fields_lists_names() {
        let err = AppError::MissingSessionFields(vec![
            "hints".to_string(),
            "curr_question".to_string(),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("hints"));
        assert!(msg.contains("curr_question"));
    }

    #[test]
    fn test_model_invocation_error_response_status() {
        let err = AppError::ModelInvocation("timeout".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
