//! Centralized error handling.
//!
//! Provides a unified error type for the entire application,
//! with automatic HTTP response conversion.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication
    #[error("authentication required")]
    Unauthorized,

    // Resource errors
    #[error("user with this id not found")]
    NotFound,

    #[error("user with this email already exists")]
    EmailConflict,

    // Client input
    #[error("validation failed")]
    Validation(Vec<String>),

    #[error("{0}")]
    BadRequest(String),

    // External service errors
    #[error("database error")]
    Database(#[from] sea_orm::DbErr),

    #[error("authentication error")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    // Internal
    #[error("internal server error")]
    Internal(String),
}

/// Error response body: one human-readable message per failure
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Failure messages, one per violated field or error condition
    pub errors: Vec<String>,
}

impl AppError {
    /// Get HTTP status code
    fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::EmailConflict | AppError::Validation(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get user-facing messages (hides internal details)
    fn user_messages(&self) -> Vec<String> {
        match self {
            // Show full messages for client errors
            AppError::Validation(messages) => messages.clone(),

            // Hide details for internal/security errors
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                vec!["an internal error occurred".to_string()]
            }
            AppError::Jwt(e) => {
                tracing::error!("JWT error: {:?}", e);
                vec!["invalid or expired token".to_string()]
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                vec!["an internal error occurred".to_string()]
            }

            // Use default message for others
            _ => vec![self.to_string()],
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            errors: self.user_messages(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}

/// Convenience constructors
impl AppError {
    pub fn validation(messages: Vec<String>) -> Self {
        AppError::Validation(messages)
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
