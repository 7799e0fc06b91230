//! HTTP error mapping. Every failure is answered as `{"error": "..."}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::error::{DbError, ErrorKind};

/// Message returned for storage failures; the cause only goes to the log.
const STORAGE_MESSAGE: &str = "Failed to access database";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error("Line number is required for {method}")]
    MissingLineNumber { method: &'static str },

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("{0}")]
    UnreadableBody(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Not found")]
    RouteNotFound,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Db(e) => match e.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::MissingLineNumber { .. } | Self::UnreadableBody(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::RouteNotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Db(e) if e.kind() == ErrorKind::Storage => {
                tracing::error!("storage failure: {e}");
                STORAGE_MESSAGE.to_string()
            }
            other => {
                tracing::debug!(status = status.as_u16(), "request rejected: {other}");
                other.to_string()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
