//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::{password::HashingError, patch::PatchError, validation::ValidationErrors};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("malformed request body: {0}")]
    Decode(String),
    #[error("invalid identifier: {0}")]
    InvalidId(String),
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    EmptyPatch(#[from] PatchError),
    #[error("no {entity} with id {id}")]
    NotFound { entity: &'static str, id: i64 },
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Hashing(#[from] HashingError),
    #[error("database: {0}")]
    Store(#[from] sqlx::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Decode(_)
            | AppError::InvalidId(_)
            | AppError::Validation(_)
            | AppError::EmptyPatch(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Hashing(_) | AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Decode(_) => "decode_error",
            AppError::InvalidId(_) => "invalid_id",
            AppError::Validation(_) => "validation_error",
            AppError::EmptyPatch(_) => "empty_patch",
            AppError::NotFound { .. } => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::Hashing(_) | AppError::Store(_) => "internal_error",
        }
    }

    /// Logs the failure with the operation and row id it belongs to.
    pub fn log(&self, operation: &'static str, id: Option<i64>) {
        if self.status().is_server_error() {
            error!(operation, id, error = %self, "request failed");
        } else {
            warn!(operation, id, error = %self, "request rejected");
        }
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        // store and hasher text stays in the logs
        let message = if status.is_server_error() {
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        let details = match &self {
            AppError::Validation(errs) => serde_json::to_value(errs.violations()).ok(),
            _ => None,
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code().to_string(),
                message,
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}
