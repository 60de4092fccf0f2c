//! Error responses for the HTTP API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::error;

use crate::hero::validation::ValidationError;
use crate::shop::ShopError;
use crate::store::avatars::AvatarError;
use crate::store::SupabaseError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Too many requests")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Validation { message, .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, message.clone())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Slow down! Too many messages".to_string(),
            ),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = match &self {
            AppError::Validation { field, .. } => serde_json::json!({
                "error": message,
                "field": field,
            }),
            _ => serde_json::json!({ "error": message }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<SupabaseError> for AppError {
    fn from(e: SupabaseError) -> Self {
        if e.is_unique_violation() {
            AppError::Conflict("That record already exists".to_string())
        } else if e.is_rls_violation() {
            AppError::Forbidden("Permission denied by database policy".to_string())
        } else if e.is_missing_bucket() {
            error!(error = %e, "Avatar bucket missing");
            AppError::Internal("avatar storage is not configured".to_string())
        } else {
            error!(error = %e, "Supabase request failed");
            AppError::Internal("Database request failed".to_string())
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Validation {
            field: e.field,
            message: e.message,
        }
    }
}

impl From<ShopError> for AppError {
    fn from(e: ShopError) -> Self {
        match e {
            ShopError::UnknownItem(_) => AppError::NotFound(e.to_string()),
            ShopError::NotOwned => AppError::NotFound(e.to_string()),
            ShopError::LevelTooLow { .. }
            | ShopError::NotEnoughGold { .. }
            | ShopError::NotEquippable => AppError::BadRequest(e.to_string()),
        }
    }
}

impl From<AvatarError> for AppError {
    fn from(e: AvatarError) -> Self {
        match e {
            AvatarError::Storage(inner) => inner.into(),
            other => AppError::BadRequest(other.to_string()),
        }
    }
}
