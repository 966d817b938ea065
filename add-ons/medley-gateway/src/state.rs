//! Shared gateway state and the error boundary.
//!
//! Every handler returns `ApiResult<T>`; `ApiError` converts the core
//! error taxonomy into an HTTP status plus a JSON body the UI shows
//! inline. Nothing is swallowed: a failed operation always produces a
//! visible message and the screen stays interactive.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use medley_core::{MarketDataClient, MedleyConfig, SessionRegistry, TextGenerator, ToolError};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Travel-plan generator, already wrapped in the memoization layer.
    pub generator: Arc<dyn TextGenerator>,
    pub market: Arc<MarketDataClient>,
    pub sessions: Arc<SessionRegistry>,
    pub config: Arc<MedleyConfig>,
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Handler-boundary error. Tool errors keep their kind tag; unknown
/// session ids get their own 404 so the UI can reopen a session.
#[derive(Debug)]
pub enum ApiError {
    Tool(ToolError),
    SessionNotFound,
}

impl From<ToolError> for ApiError {
    fn from(e: ToolError) -> Self {
        ApiError::Tool(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match &self {
            ApiError::Tool(e) => {
                let status = match e {
                    ToolError::Validation(_) | ToolError::MalformedInput(_) => {
                        StatusCode::BAD_REQUEST
                    }
                    ToolError::Render(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    ToolError::Remote(_) => StatusCode::BAD_GATEWAY,
                };
                (status, e.kind(), e.to_string())
            }
            ApiError::SessionNotFound => (
                StatusCode::NOT_FOUND,
                "session_not_found",
                "unknown or expired session".to_string(),
            ),
        };
        tracing::warn!(kind, %message, "request failed");
        let body = Json(serde_json::json!({ "kind": kind, "error": message }));
        (status, body).into_response()
    }
}
