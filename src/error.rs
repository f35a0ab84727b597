use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::{
    accounts::repo::StoreError,
    auth::{jwt::SigningError, password::PasswordError},
};

/// Errors returned by account handlers. The guard has its own uniform denial
/// and never produces one of these.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("account {0} not found")]
    AccountNotFound(i32),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("transfer is not implemented")]
    NotImplemented,
    #[error("storage error")]
    Store(#[from] StoreError),
    #[error("could not issue token")]
    Signing(#[from] SigningError),
    #[error("could not process password")]
    Password(#[from] PasswordError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::AccountNotFound(_) | ApiError::Store(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::NotImplemented => StatusCode::NOT_IMPLEMENTED,
            ApiError::Signing(_) | ApiError::Password(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // the Display text is what the client sees, the source chain stays here
        match &self {
            ApiError::Store(e) => error!(error = %e, "store failure"),
            ApiError::Signing(e) => error!(error = %e, "token signing failure"),
            ApiError::Password(e) => error!(error = %e, "password check failure"),
            _ => {}
        }
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
