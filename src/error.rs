use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{
    domain::shipping::ShippingError,
    response::ApiResponse,
    storage::StorageError,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden {0}")]
    Forbidden(String),

    #[error("Configuration error {0}")]
    Configuration(String),

    #[error("Storage error {0}")]
    Storage(String),

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn forbidden() -> Self {
        AppError::Forbidden("insufficient permissions".into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Configuration(_)
            | AppError::Storage(_)
            | AppError::DbError(_)
            | AppError::OrmError(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ShippingError> for AppError {
    fn from(err: ShippingError) -> Self {
        match err {
            ShippingError::NotConfigured => AppError::Configuration(err.to_string()),
            other => AppError::BadRequest(other.to_string()),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => AppError::NotFound,
            StorageError::InvalidPath(_) => AppError::BadRequest(err.to_string()),
            other => AppError::Storage(other.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            match &self {
                AppError::DbError(e) => tracing::error!(error = %e, "database failure"),
                AppError::OrmError(e) => tracing::error!(error = %e, "orm failure"),
                AppError::Internal(e) => tracing::error!(error = ?e, "internal failure"),
                other => tracing::error!(error = %other, "server failure"),
            }
            "Internal Server Error".to_string()
        } else {
            self.to_string()
        };

        // Among 5xx, only configuration errors expose their detail.
        let error = match &self {
            AppError::Configuration(_) => self.to_string(),
            _ if status.is_server_error() => message.clone(),
            _ => self.to_string(),
        };
        let body = ApiResponse::failure(message, ErrorData { error });

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
