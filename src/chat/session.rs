//! Per-session snapshot of the last non-empty provider result set
//!
//! Follow-up questions ("compare them", "which is best") are answered from
//! the providers the session last saw. The cache is keyed by the
//! caller-supplied session id so concurrent conversations never observe
//! each other's results, and entries are immutable `Arc` snapshots so a
//! read is never torn by a concurrent write.

use std::sync::Arc;

use dashmap::DashMap;

use crate::models::Provider;

/// Cache key used when the caller does not supply a session id
pub const DEFAULT_SESSION_KEY: &str = "default";

/// Process-lifetime store of provider snapshots, one per session
#[derive(Debug, Default)]
pub struct SnapshotStore {
    sessions: DashMap<String, Arc<Vec<Provider>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the session's snapshot. Sessions that never saw a result get
    /// an empty list.
    pub fn read(&self, session_key: &str) -> Arc<Vec<Provider>> {
        self.sessions
            .get(session_key)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Overwrite the session's snapshot. Empty lists are ignored: a turn
    /// with no results never erases the providers a follow-up needs.
    pub fn write(&self, session_key: &str, providers: &[Provider]) {
        if providers.is_empty() {
            return;
        }
        self.sessions
            .insert(session_key.to_string(), Arc::new(providers.to_vec()));
    }
}
