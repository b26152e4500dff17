//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used by the HTTP layer.
//! Lower layers have their own error types (`StoreError`, `TokenError`) which are
//! classified here before anything reaches a client.
//!
//! `AppError` implements `actix_web::error::ResponseError`, producing the
//! `{"error": "..."}` envelope. Internal failures are logged and replaced with a
//! generic message so backend details never leak.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::auth::token::TokenError;
use crate::store::StoreError;

const INTERNAL_MESSAGE: &str = "internal server error";

/// Represents all possible errors that can occur while serving a request.
#[derive(Debug)]
pub enum AppError {
    /// Missing or invalid token, or bad login credentials (HTTP 401).
    Unauthorized(String),
    /// Malformed request: undecodable body, bad path parameter (HTTP 400).
    BadRequest(String),
    /// No such user or todo, or a todo owned by someone else (HTTP 404).
    NotFound(String),
    /// Username or email already taken (HTTP 409).
    Conflict(String),
    /// A store call exceeded its deadline (HTTP 504).
    Timeout,
    /// Unexpected server-side failure (HTTP 500). The message is only logged.
    InternalServerError(String),
    /// Database failure (HTTP 500). The message is only logged.
    DatabaseError(String),
    /// Input that decoded but broke a constraint (HTTP 400).
    ValidationError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Timeout => write!(f, "Timeout: store call exceeded its deadline"),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::ValidationError(msg) => msg.clone(),
            AppError::Timeout => {
                log::error!("{}", self);
                "request timed out".to_string()
            }
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                log::error!("{}", self);
                INTERNAL_MESSAGE.to_string()
            }
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        match error {
            StoreError::NotFound => AppError::NotFound("resource not found".into()),
            StoreError::DuplicateEmail | StoreError::DuplicateUsername => {
                AppError::Conflict(error.to_string())
            }
            StoreError::Timeout => AppError::Timeout,
            StoreError::Database(e) => AppError::DatabaseError(e.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// Token rejections are all 401s; the reason stays server-side.
impl From<TokenError> for AppError {
    fn from(error: TokenError) -> AppError {
        match error {
            TokenError::Signing(msg) => AppError::InternalServerError(msg),
            other => {
                log::debug!("token rejected: {}", other);
                AppError::Unauthorized("invalid or expired token".into())
            }
        }
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}
