use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    Validation(String),
    NotFound(String),
    Conflict(String),
    Internal(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(err) => {
                tracing::error!("internal server error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<loja_core::Error> for AppError {
    fn from(err: loja_core::Error) -> Self {
        match err {
            loja_core::Error::Validation(msg) => AppError::Validation(msg),
            loja_core::Error::NotFound(msg) => AppError::NotFound(msg),
            loja_core::Error::Conflict(msg) => AppError::Conflict(msg),
            loja_core::Error::Internal(msg) => AppError::Internal(anyhow::anyhow!(msg)),
            loja_core::Error::Database(err) => AppError::Internal(err.into()),
        }
    }
}
