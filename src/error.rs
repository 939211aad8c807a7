use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Storage(anyhow::Error),
    #[error("Authentication failed")]
    Auth,
    #[error("Not found")]
    NotFound,
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Required field is missing")]
    MissingField,
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Storage(e) => {
                tracing::error!(error = ?e, "Storage error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
            Self::Auth => {
                tracing::debug!("Authentication failed");
                (StatusCode::UNAUTHORIZED, "invalid credentials".to_string())
            }
            // One message for every absent record; an expired id must read
            // exactly like one that never existed.
            Self::NotFound => {
                tracing::debug!("Message not found");
                (StatusCode::NOT_FOUND, "invalid message id".to_string())
            }
            Self::Validation(msg) => {
                tracing::debug!(reason = %msg, "Validation failed");
                (StatusCode::UNPROCESSABLE_ENTITY, msg.clone())
            }
            Self::MissingField => {
                tracing::debug!("Request body rejected");
                (StatusCode::UNPROCESSABLE_ENTITY, "required field is missing".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        let mut response = (status, body).into_response();
        if matches!(self, Self::Auth) {
            response.headers_mut().insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Basic"));
        }
        response
    }
}
