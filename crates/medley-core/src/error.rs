//! Error taxonomy shared by every tool module.
//!
//! Four kinds, matching the four ways a screen can fail: a remote call
//! (LLM or market data), a malformed upload, a structurally invalid chart
//! request, and a user-correctable input. Handlers convert all of them to
//! a visible message at the gateway boundary; nothing is swallowed.

use thiserror::Error;

/// Failure of one tool operation. Every variant carries a human-readable
/// detail string that is safe to show in the UI (no credentials, no URLs
/// with keys).
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    /// Text generation or market-data call failed (network, auth, quota,
    /// malformed upstream response). Surfaced verbatim, never retried.
    #[error("remote service error: {0}")]
    Remote(String),

    /// Uploaded file does not parse as a table (duplicate headers, ragged
    /// rows, undecodable bytes). No partial table is ever produced.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Chart request is structurally invalid for the chosen renderer
    /// (missing column, non-numeric axis, negative pie slice).
    #[error("render error: {0}")]
    Render(String),

    /// User-correctable input problem (empty city, start date >= end
    /// date, unknown module id). Short-circuits before any remote or
    /// parsing layer is reached.
    #[error("validation error: {0}")]
    Validation(String),
}

impl ToolError {
    /// Stable kind tag used by the gateway's JSON error body.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::Remote(_) => "remote",
            ToolError::MalformedInput(_) => "malformed_input",
            ToolError::Render(_) => "render",
            ToolError::Validation(_) => "validation",
        }
    }
}
