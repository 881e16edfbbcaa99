//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are automatically converted
//! to a JSON-body HTTP response with an appropriate status code.
//!
//! **Security note:** Internal errors (Database, Internal) are logged with
//! full detail but only a generic message is returned to the caller so that
//! file paths, SQL, or other implementation details never leak to clients.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, error};

use crate::schemas::recipe::ErrorResponse;

/// Message carried by every 400 response.
pub const VALIDATION_FAILED_MESSAGE: &str = "Recipe creation failed!";
/// Message carried by every 404 response.
pub const NOT_FOUND_MESSAGE: &str = "No recipe found";

/// All errors that can occur in the recipe-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Propagated from the SQLite store.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The caller referenced a recipe that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request body or path failed to parse into the expected shape.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An unclassified internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            // Client-facing errors: expose the message directly.
            ServerError::Validation(detail) => {
                debug!(detail = %detail, "request rejected");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        message: VALIDATION_FAILED_MESSAGE.to_owned(),
                        detail: Some(detail),
                    },
                )
            }
            ServerError::NotFound(detail) => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    message: NOT_FOUND_MESSAGE.to_owned(),
                    detail: Some(detail),
                },
            ),

            // Internal errors: log the full detail, keep it private.
            ServerError::Database(e) => {
                error!(error = %e, "database error");
                (StatusCode::INTERNAL_SERVER_ERROR, internal_body())
            }
            ServerError::Internal(m) => {
                error!(message = %m, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, internal_body())
            }
        };
        (status, Json(body)).into_response()
    }
}

fn internal_body() -> ErrorResponse {
    ErrorResponse {
        message: "internal server error".to_owned(),
        detail: None,
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ServerError {
    fn from(rejection: PathRejection) -> Self {
        ServerError::Validation(rejection.body_text())
    }
}
