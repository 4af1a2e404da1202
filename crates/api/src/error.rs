use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use multiverse_catalog::CatalogError;
use multiverse_core::error::CoreError;
use multiverse_db::StoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `multiverse_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Writing the JSON document failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The upstream catalog could not be reached or sent garbage.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// The request body was missing or not valid JSON.
    #[error("Invalid JSON body: {0}")]
    JsonBody(#[from] JsonRejection),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
            },

            // --- Storage and upstream failures ---
            AppError::Store(err) => {
                tracing::error!(error = %err, "Store error");
                internal()
            }
            AppError::Catalog(err) => {
                tracing::error!(error = %err, "Catalog error");
                internal()
            }

            // --- HTTP-specific errors ---
            AppError::JsonBody(rejection) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                rejection.body_text(),
            ),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
