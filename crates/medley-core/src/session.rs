//! Per-session state: the append-only transcript log and the process-wide
//! session registry.
//!
//! One `SessionState` per interactive session, created when the UI opens
//! and dropped when the session is closed. Only the transcript survives
//! module switches; widget state lives client-side and is discarded.
//! Entries land in completion order: the append that acquires the lock
//! first is the one that appears first.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// One (query, response) pair. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub query: String,
    pub response: String,
}

/// Ordered, append-only log of transcript entries. Append never fails
/// and is safe under racing generation requests.
#[derive(Debug, Default)]
pub struct TranscriptLog {
    entries: Mutex<Vec<TranscriptEntry>>,
}

impl TranscriptLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, query: impl Into<String>, response: impl Into<String>) {
        let entry = TranscriptEntry {
            query: query.into(),
            response: response.into(),
        };
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(entry);
    }

    /// Snapshot of all entries in insertion order.
    pub fn entries(&self) -> Vec<TranscriptEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// State owned by one interactive session. Module handlers share it via
/// the registry; no cross-session state exists besides the memo cache.
#[derive(Debug, Default)]
pub struct SessionState {
    pub transcript: TranscriptLog,
}

/// Process-wide map of live sessions. Concurrent sessions are
/// independent; there is no cross-session locking.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<Uuid, Arc<SessionState>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh session with an empty transcript.
    pub fn open(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.insert(id, Arc::new(SessionState::default()));
        id
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<SessionState>> {
        self.sessions.get(id).map(|s| Arc::clone(&s))
    }

    /// Drop a session and everything it owned. Returns false for ids
    /// that were never opened or were already closed.
    pub fn close(&self, id: &Uuid) -> bool {
        self.sessions.remove(id).is_some()
    }

    pub fn live_sessions(&self) -> usize {
        self.sessions.len()
    }
}
