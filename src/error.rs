use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::{ApiError, ApiErrorResponse};

pub type AppResult<T> = Result<T, AppError>;

/// Fixed message returned to callers whenever a write to the hosted database fails.
pub const PERSISTENCE_FAILED_MESSAGE: &str = "Failed to save data to the database.";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Too many failed attempts, retry in {0} seconds")]
    TooManyAttempts(i64),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Persistence failed: {0}")]
    PersistenceFailed(String),

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("Template rendering error: {0}")]
    TemplateError(#[from] askama::Error),
}

impl AppError {
    /// Message safe to show to an end user. Internal causes never leak.
    pub fn user_message(&self) -> String {
        match self {
            AppError::ValidationError(msg)
            | AppError::AuthError(msg)
            | AppError::NotFound(msg)
            | AppError::InvalidTransition(msg) => msg.clone(),
            AppError::TooManyAttempts(secs) => {
                format!("Too many failed attempts. Try again in {secs} seconds.")
            }
            AppError::PersistenceFailed(_) => PERSISTENCE_FAILED_MESSAGE.to_string(),
            _ => "Internal server error".to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::TooManyAttempts(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidTransition(_) => StatusCode::CONFLICT,
            AppError::ExternalApiError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_code = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                "VALIDATION_ERROR"
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                "AUTH_ERROR"
            }
            AppError::TooManyAttempts(secs) => {
                log::warn!("Admin login locked for another {secs}s");
                "TOO_MANY_ATTEMPTS"
            }
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidTransition(msg) => {
                log::warn!("Rejected session transition: {msg}");
                "INVALID_TRANSITION"
            }
            AppError::PersistenceFailed(cause) => {
                log::error!("Persistence failed: {cause}");
                "PERSISTENCE_ERROR"
            }
            AppError::ExternalApiError(msg) => {
                log::error!("External API error: {msg}");
                "EXTERNAL_API_ERROR"
            }
            _ => {
                log::error!("Internal error: {self}");
                "INTERNAL_ERROR"
            }
        };

        let message = match self {
            AppError::ExternalApiError(_) => "External service error".to_string(),
            _ => self.user_message(),
        };

        HttpResponse::build(self.status_code()).json(ApiErrorResponse {
            success: false,
            error: ApiError {
                code: error_code.to_string(),
                message,
            },
        })
    }
}
