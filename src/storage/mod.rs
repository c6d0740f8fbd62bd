// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Platform key-value stores (persistent and session-scoped).
//!
//! Reads never fail: a missing or unreadable entry is simply absent. Writes
//! can fail (quota, disabled storage) and report a [`StorageError`] that
//! callers log and move past.

pub mod redirect;

pub use redirect::RedirectStorage;

use dashmap::DashMap;

use crate::models::IntentCategory;

/// Well-known storage keys.
pub mod keys {
    use crate::models::IntentCategory;

    /// Session store: JSON `RedirectIntent`.
    pub const SESSION_REDIRECT_INTENT: &str = "redirectIntent";
    /// Local store: JSON `RedirectIntent`.
    pub const PERSISTENT_REDIRECT_INTENT: &str = "pendingRedirectIntent";
    /// Session store: set once the post-login redirect has happened.
    pub const REDIRECT_DONE: &str = "redirectDone";
    /// Local store: language code.
    pub const LANGUAGE: &str = "language";
    /// Session store: JSON cached user record.
    pub const SESSION_USER: &str = "user";

    /// Session store: full URL stashed by a pre-login flow.
    pub fn deep_link(category: IntentCategory) -> Option<&'static str> {
        match category {
            IntentCategory::Subscription => Some("subscriptionRedirectUrl"),
            IntentCategory::Class => Some("classRedirectUrl"),
            IntentCategory::Group => Some("groupRedirectUrl"),
            IntentCategory::Generic => None,
        }
    }
}

/// Storage write errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to serialize value for {key}: {reason}")]
    Serialize { key: String, reason: String },
}

/// A string key-value store such as browser local or session storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str);
}

/// Read and parse a JSON value; malformed entries are removed and treated as absent.
pub fn read_json<T: serde::de::DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding malformed stored value");
            store.remove(key);
            None
        }
    }
}

pub fn write_json<T: serde::Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|e| StorageError::Serialize {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    store.set(key, &raw)
}

/// Remove the deep-link stash for a category, if that category has one.
pub fn clear_deep_link(store: &dyn KeyValueStore, category: IntentCategory) {
    if let Some(key) = keys::deep_link(category) {
        store.remove(key);
    }
}

/// In-memory store, used for tests and server-side sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.remove(key);
    }
}
