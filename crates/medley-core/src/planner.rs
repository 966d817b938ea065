//! Travel-plan generation via an OpenAI-compatible chat-completions API.
//!
//! The system instruction and temperature are fixed server-side; the UI
//! only ever supplies the city. API key: `OPENROUTER_API_KEY` in `.env`.
//! The gateway holds the key; the frontend never sees it.

use crate::error::ToolError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{DEFAULT_COMPLETION_BASE, DEFAULT_MODEL};

/// Fixed persona for the travel planner. Not configurable from the UI.
pub const TRAVEL_SYSTEM_PROMPT: &str = "You are a clever and warm travel-planning assistant. \
    Provide a detailed and creative three-day travel plan.";

/// Sampling temperature for every completion. Memoization makes repeat
/// prompts deterministic regardless of this value.
pub const COMPLETION_TEMPERATURE: f32 = 0.7;

/// Prompt sent for a city, mirroring the travel screen's request.
pub fn travel_prompt(city: &str) -> String {
    format!(
        "Design a 3-day travel itinerary for {}, including sights, \
         food recommendations, and a day-by-day schedule.",
        city
    )
}

/// Downloadable markdown artifact: level-1 heading of the destination,
/// then the generated itinerary verbatim.
pub fn trip_markdown(city: &str, plan: &str) -> String {
    format!("# {}\n\n{}", city, plan)
}

/// File name offered for the markdown download.
pub fn trip_filename(city: &str) -> String {
    format!("{}_trip.md", city)
}

/// Anything that can turn a prompt into text. The gateway wires the real
/// bridge behind the memoization layer; tests substitute a counting fake.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ToolError>;
}

// OpenAI-compatible request/response shapes.
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}

/// Reqwest-backed completion client. One instance per process, shared by
/// all sessions through the gateway state.
pub struct CompletionBridge {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl CompletionBridge {
    /// Create a bridge using `OPENROUTER_API_KEY` from the environment.
    /// Returns `None` if the key is unset or blank so the caller can
    /// surface "not configured" instead of failing silently later.
    pub fn from_env() -> Option<Self> {
        let key = std::env::var("OPENROUTER_API_KEY").ok()?;
        let key = key.trim().to_string();
        if key.is_empty() {
            return None;
        }
        Some(Self::new(key))
    }

    /// Create a bridge with an explicit API key.
    pub fn new(api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            api_key: api_key.trim().to_string(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_COMPLETION_BASE.to_string(),
            client,
        }
    }

    /// Set the model id (e.g. `openai/gpt-3.5-turbo`, `anthropic/claude-3.5-sonnet`).
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Override the API base URL (tests, self-hosted gateways).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Override the client timeout (MEDLEY_REQUEST_TIMEOUT_SECS).
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.client = reqwest::Client::builder()
            .timeout(Duration::from_secs(secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        self
    }
}

#[async_trait]
impl TextGenerator for CompletionBridge {
    async fn complete(&self, prompt: &str) -> Result<String, ToolError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: TRAVEL_SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: COMPLETION_TEMPERATURE,
        };

        let res = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ToolError::Remote(format!("completion request failed: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ToolError::Remote(format!(
                "completion API error {}: {}",
                status, body
            )));
        }

        let parsed: ChatResponse = res
            .json()
            .await
            .map_err(|e| ToolError::Remote(format!("completion response parse failed: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ToolError::Remote("completion returned no choices".to_string()))
    }
}

/// Stand-in generator used when no API key is configured. Every call
/// fails with a visible remote error instead of hanging or panicking.
pub struct UnconfiguredGenerator;

#[async_trait]
impl TextGenerator for UnconfiguredGenerator {
    async fn complete(&self, _prompt: &str) -> Result<String, ToolError> {
        Err(ToolError::Remote(
            "no API key configured: set OPENROUTER_API_KEY in .env".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn travel_prompt_mentions_the_city() {
        let p = travel_prompt("Kyoto");
        assert!(p.contains("Kyoto"));
        assert!(p.contains("3-day"));
    }

    #[test]
    fn trip_markdown_has_heading_then_body() {
        let md = trip_markdown("Lisbon", "Day 1: Alfama.");
        assert!(md.starts_with("# Lisbon\n\n"));
        assert!(md.ends_with("Day 1: Alfama."));
    }

    #[test]
    fn trip_filename_format() {
        assert_eq!(trip_filename("Lisbon"), "Lisbon_trip.md");
    }

    #[tokio::test]
    async fn unconfigured_generator_surfaces_remote_error() {
        let gen = UnconfiguredGenerator;
        let err = gen.complete("anything").await.unwrap_err();
        assert!(matches!(err, ToolError::Remote(_)));
        assert!(err.to_string().contains("OPENROUTER_API_KEY"));
    }
}
