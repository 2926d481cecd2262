use std::any::Any;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Unified error type for HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 400 with `{"error": msg}`.
    #[error("{0}")]
    BadRequest(String),
    /// 500 with `{"error": context, "details": cause}`.
    #[error("{context}: {cause}")]
    Upstream {
        context: &'static str,
        cause: anyhow::Error,
    },
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    /// For `map_err`: wrap a failed upstream call with a route-specific summary.
    pub fn upstream<E>(context: &'static str) -> impl FnOnce(E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        move |err| Self::Upstream {
            context,
            cause: err.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(msg) => {
                let body = serde_json::json!({ "error": msg });
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            AppError::Upstream { context, cause } => {
                tracing::error!(error = %cause, "{context}");
                let body = serde_json::json!({ "error": context, "details": cause.to_string() });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

/// Last line of defence: a panicking handler becomes a 500 instead of a dropped connection.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "An unexpected error occurred".to_string()
    };
    tracing::error!(%message, "Unhandled error");

    let body = serde_json::json!({ "error": "Internal server error", "message": message });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
