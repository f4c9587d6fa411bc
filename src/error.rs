use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

/// Error taxonomy for the HTTP surface.
///
/// Every authentication failure on the login/refresh paths collapses into
/// [`AppError::InvalidCredentials`]; the response never reveals which check
/// failed. Internal detail is kept in the logs only.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Bad email/password, or an invalid/expired token during refresh.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// Registration conflict on the unique email key.
    #[error("email already registered")]
    DuplicateUser,
    /// Malformed registration input (email shape, password length).
    #[error("{0}")]
    Validation(String),
    /// Anything unexpected; surfaced as a sanitized 500.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            AppError::DuplicateUser => {
                (StatusCode::CONFLICT, "Email already registered".to_string())
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal(e) => {
                error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
