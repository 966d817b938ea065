//! Memoization layer over a `TextGenerator`.
//!
//! Process-wide hot cache keyed by the raw prompt string (no whitespace
//! or case normalization). A repeated prompt returns the cached response
//! without re-invoking the inner generator; with a nonzero sampling
//! temperature upstream, this is the only thing that makes repeat
//! requests deterministic. Entries never expire and are never evicted.
//! Two concurrent misses for the same key may both call upstream; the
//! later write wins, costing at most one redundant remote call.

use crate::error::ToolError;
use crate::planner::TextGenerator;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// Caching wrapper around any `TextGenerator`. Shared across all
/// sessions; failures are not cached, so a transient remote error does
/// not poison the key.
pub struct MemoizedGenerator {
    inner: Arc<dyn TextGenerator>,
    cache: DashMap<String, String>,
}

impl MemoizedGenerator {
    pub fn new(inner: Arc<dyn TextGenerator>) -> Self {
        Self {
            inner,
            cache: DashMap::new(),
        }
    }

    /// Number of cached prompts (diagnostics only).
    pub fn cached_prompts(&self) -> usize {
        self.cache.len()
    }
}

#[async_trait]
impl TextGenerator for MemoizedGenerator {
    async fn complete(&self, prompt: &str) -> Result<String, ToolError> {
        if let Some(hit) = self.cache.get(prompt) {
            tracing::debug!(prompt_len = prompt.len(), "memo cache hit");
            return Ok(hit.clone());
        }
        let out = self.inner.complete(prompt).await?;
        self.cache.insert(prompt.to_string(), out.clone());
        Ok(out)
    }
}
