use adapt::AdaptError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Errors that abort a request before the resolver state machine can
/// produce an `adapt::Outcome` — everything else is shaped into a 404 or
/// an introspection body by the handlers themselves.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error(transparent)]
    Adapt(#[from] AdaptError),

    #[error("template render error: {0}")]
    Template(#[from] askama::Error),
}

impl ServeError {
    fn status(&self) -> StatusCode {
        match self {
            ServeError::Adapt(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServeError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
