//! HTTP surface: routes, error responses, and field validation.

pub mod stages;
pub mod tasks;

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, put},
    Json, Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Database;

/// Field name → list of human-readable messages, the shape validation
/// failures take on the wire.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 400 with a `{field: [messages]}` body.
    #[error("validation failed")]
    Validation(FieldErrors),
    /// Bare 404 with no body.
    #[error("not found")]
    NotFound,
    /// 404 with a `{detail: ...}` body. Only the guarded stage delete
    /// uses this shape; the asymmetry is part of the external contract.
    #[error("{0}")]
    NotFoundDetail(String),
    /// 400 with a `{detail: ...}` body, for the stage delete guard.
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(fields) => {
                (StatusCode::BAD_REQUEST, Json(fields)).into_response()
            }
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::NotFoundDetail(detail) => {
                (StatusCode::NOT_FOUND, Json(json!({ "detail": detail }))).into_response()
            }
            ApiError::Conflict(detail) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "detail": detail }))).into_response()
            }
            ApiError::Internal(err) => {
                tracing::error!("internal error: {err:#}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// Accumulates field errors so a response can report every invalid field
/// at once.
#[derive(Debug, Default)]
pub(crate) struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn reject(&mut self, field: &str, message: impl Into<String>) {
        self.errors.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.errors))
        }
    }
}

/// Builds the application router. Trailing slashes are part of the
/// route contract.
pub fn create_router(db: Database) -> Router {
    Router::new()
        .route("/tasks/", get(tasks::list).post(tasks::create))
        .route("/tasks/{id}/", put(tasks::update).delete(tasks::remove))
        .route("/stages/", get(stages::list).post(stages::create))
        .route("/stages/{id}/", put(stages::update).patch(stages::update))
        .route("/stages/{id}/delete/", delete(stages::remove))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(db)
}
