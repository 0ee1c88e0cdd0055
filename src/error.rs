use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::PathRejection;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::config::ConfigError;
use crate::database::StoreError;

/// Failures of the authentication boundary.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Access denied, token missing.")]
    TokenMissing,
    #[error("Invalid token.")]
    TokenInvalid,
    #[error("Token expired.")]
    TokenExpired,
    #[error("Invalid email or password.")]
    InvalidCredentials,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Email already registered.")]
    DuplicateEmail,
    #[error("Property not found.")]
    NotFoundOrNotOwned,
    #[error("store error: {0}")]
    Store(#[source] sqlx::Error),
    #[error("malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),
    #[error("upload failed: {0}")]
    Upload(#[from] std::io::Error),
    #[error("password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
    #[error("token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Multipart(e) => e.status(),
            AppError::Auth(AuthError::TokenMissing) => StatusCode::FORBIDDEN,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFoundOrNotOwned => StatusCode::NOT_FOUND,
            AppError::DuplicateEmail
            | AppError::Store(_)
            | AppError::Upload(_)
            | AppError::Hashing(_)
            | AppError::Signing(_)
            | AppError::Task(_)
            | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text that is safe to hand to clients. Internal failures are redacted.
    fn client_message(&self) -> String {
        match self {
            AppError::Store(_) => "Database error.".into(),
            AppError::Upload(_) => "Failed to store uploaded image.".into(),
            AppError::Hashing(_) | AppError::Signing(_) | AppError::Task(_) | AppError::Config(_) => {
                "Internal server error.".into()
            }
            other => other.to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => AppError::DuplicateEmail,
            StoreError::NotFoundOrNotOwned => AppError::NotFoundOrNotOwned,
            StoreError::Database(e) => AppError::Store(e),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    code: i32,
    error_message: String,
}

/// Unredacted cause of a 5xx, carried as a response extension for
/// [`log_errors`](crate::middleware::log_errors) to report.
#[derive(Debug, Clone)]
pub struct ErrorDetail(pub String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorResponse {
            code: status.as_u16() as i32,
            error_message: self.client_message(),
        });

        if status.is_server_error() {
            let mut response = (status, body).into_response();
            response.extensions_mut().insert(ErrorDetail(self.to_string()));
            return response;
        }

        tracing::debug!(error = %self, "request rejected");
        (status, body).into_response()
    }
}
