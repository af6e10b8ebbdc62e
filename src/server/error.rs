//! Error types for the server

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Model not loaded")]
    ModelNotLoaded,

    #[error("Invalid request: {message}")]
    Validation { status: StatusCode, message: String },

    #[error("Prediction failed: {0}")]
    Prediction(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::Validation {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::ModelNotLoaded => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Model not loaded. Run the training stage first.".to_string(),
            ),
            ServerError::Validation { status, message } => (*status, message.clone()),
            ServerError::Prediction(msg) => {
                tracing::error!(detail = %msg, "Prediction error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error while processing the prediction".to_string())
            }
            ServerError::Internal(msg) => {
                tracing::error!(detail = %msg, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "An internal error occurred".to_string())
            }
        };

        let body = Json(json!({
            "error": true,
            "message": message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
