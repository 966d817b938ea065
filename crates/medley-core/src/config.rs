//! Gateway configuration loaded from `.env` / environment.
//!
//! Change behavior without code edits. The LLM API key itself is read by
//! `CompletionBridge::from_env`, never stored here and never logged.

use serde::{Deserialize, Serialize};

/// Default OpenRouter-compatible chat-completions base.
pub const DEFAULT_COMPLETION_BASE: &str = "https://openrouter.ai/api/v1";
/// Default daily-history CSV provider (Stooq-style endpoint).
pub const DEFAULT_MARKET_BASE: &str = "https://stooq.com";
/// Default model routed through the completion endpoint.
pub const DEFAULT_MODEL: &str = "openai/gpt-3.5-turbo";

/// Runtime configuration loaded from environment.
///
/// | Env | Default | Description |
/// |-----|---------|-------------|
/// | MEDLEY_BIND_ADDR | 127.0.0.1:8080 | Gateway listen address. |
/// | MEDLEY_MODEL | openai/gpt-3.5-turbo | Model id sent to the completion endpoint. |
/// | MEDLEY_COMPLETION_BASE | openrouter.ai/api/v1 | Chat-completions API base URL. |
/// | MEDLEY_MARKET_BASE | stooq.com | Daily-closes CSV provider base URL. |
/// | MEDLEY_REQUEST_TIMEOUT_SECS | 60 | Client-side timeout for remote calls. |
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedleyConfig {
    /// MEDLEY_BIND_ADDR: listen address for the gateway.
    pub bind_addr: String,
    /// MEDLEY_MODEL: model identifier for the travel planner.
    pub model: String,
    /// MEDLEY_COMPLETION_BASE: chat-completions base URL.
    pub completion_base: String,
    /// MEDLEY_MARKET_BASE: market-data provider base URL.
    pub market_base: String,
    /// MEDLEY_REQUEST_TIMEOUT_SECS: reqwest client timeout for both remote services.
    pub request_timeout_secs: u64,
}

impl Default for MedleyConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            model: DEFAULT_MODEL.to_string(),
            completion_base: DEFAULT_COMPLETION_BASE.to_string(),
            market_base: DEFAULT_MARKET_BASE.to_string(),
            request_timeout_secs: 60,
        }
    }
}

impl MedleyConfig {
    /// Load from environment. Unset or invalid => defaults (see struct field docs).
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: env_string("MEDLEY_BIND_ADDR", &defaults.bind_addr),
            model: env_string("MEDLEY_MODEL", &defaults.model),
            completion_base: env_string("MEDLEY_COMPLETION_BASE", &defaults.completion_base),
            market_base: env_string("MEDLEY_MARKET_BASE", &defaults.market_base),
            request_timeout_secs: env_u64(
                "MEDLEY_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            ),
        }
    }
}

fn env_string(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => default.to_string(),
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
