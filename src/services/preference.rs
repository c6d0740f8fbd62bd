// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Language preference fan-out.
//!
//! The same preference lives in four places: in-memory state, the local
//! store, the session-cached user record and the remote user record. All
//! writes go through [`PreferenceStore`], which updates them in that order.
//! The first three are synchronous and always agree; the remote write is
//! spawned and may lag or fail without affecting them.

use parking_lot::RwLock;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::db::UserRecordStore;
use crate::models::{Language, UserLoginRecord};
use crate::storage::{keys, KeyValueStore};

pub struct PreferenceStore {
    current: RwLock<Language>,
    user_id: RwLock<Option<String>>,
    local: Arc<dyn KeyValueStore>,
    session: Arc<dyn KeyValueStore>,
    remote: Arc<dyn UserRecordStore>,
}

impl PreferenceStore {
    pub fn new(
        local: Arc<dyn KeyValueStore>,
        session: Arc<dyn KeyValueStore>,
        remote: Arc<dyn UserRecordStore>,
    ) -> Self {
        Self {
            current: RwLock::new(Language::default()),
            user_id: RwLock::new(None),
            local,
            session,
            remote,
        }
    }

    /// The language the current render uses.
    pub fn get(&self) -> Language {
        *self.current.read()
    }

    /// Record who is signed in; `None` after sign-out.
    pub fn set_identity(&self, user_id: Option<String>) {
        *self.user_id.write() = user_id;
    }

    pub fn identity(&self) -> Option<String> {
        self.user_id.read().clone()
    }

    /// Change the preference everywhere.
    ///
    /// Local representations are updated before this returns. For a
    /// signed-in user the remote write is spawned and its handle returned;
    /// a failure there is only logged.
    pub fn set(&self, language: Language) -> Option<JoinHandle<()>> {
        self.apply_locally(language);

        let user_id = self.identity()?;
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!(%user_id, "No async runtime, skipping remote preference write");
                return None;
            }
        };

        let remote = Arc::clone(&self.remote);
        Some(handle.spawn(async move {
            match remote.set_language_preference(&user_id, language).await {
                Ok(()) => {
                    tracing::debug!(%user_id, language = %language, "Remote preference updated")
                }
                Err(e) => tracing::warn!(
                    %user_id,
                    language = %language,
                    error = %e,
                    "Failed to update remote language preference"
                ),
            }
        }))
    }

    /// Steps shared by `set` and startup reconciliation: memory, local
    /// key, session-cached user record.
    pub fn apply_locally(&self, language: Language) {
        *self.current.write() = language;

        if let Err(e) = self.local.set(keys::LANGUAGE, language.code()) {
            tracing::warn!(error = %e, "Failed to store language preference locally");
        }

        self.update_session_user(language);
    }

    fn update_session_user(&self, language: Language) {
        let Some(raw) = self.session.get(keys::SESSION_USER) else {
            return;
        };

        let mut cached: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring malformed session user record");
                return;
            }
        };
        let Some(fields) = cached.as_object_mut() else {
            tracing::warn!("Ignoring non-object session user record");
            return;
        };
        fields.insert(
            "languagePreference".to_string(),
            serde_json::Value::String(language.code().to_string()),
        );

        if let Err(e) = self.session.set(keys::SESSION_USER, &cached.to_string()) {
            tracing::warn!(error = %e, "Failed to update session user record");
        }
    }

    /// Determine the initial language for this app load and align the local
    /// representations with it. Never writes to the remote record.
    ///
    /// Priority: remote record, local key, platform locale, default.
    pub fn reconcile_on_startup(
        &self,
        stored_user: Option<&UserLoginRecord>,
        platform_locale: Option<&str>,
    ) -> Language {
        let local = self.local.get(keys::LANGUAGE).and_then(|raw| {
            let lang = Language::parse(&raw);
            if lang.is_none() {
                tracing::warn!(value = %raw, "Ignoring unsupported local language key");
            }
            lang
        });

        let effective = stored_user
            .and_then(UserLoginRecord::language)
            .or(local)
            .or_else(|| platform_locale.and_then(Language::from_locale))
            .unwrap_or_default();

        tracing::debug!(language = %effective, "Reconciled language preference");
        self.apply_locally(effective);
        effective
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryUserRecords;
    use crate::storage::MemoryStore;

    fn store() -> (PreferenceStore, Arc<MemoryStore>, Arc<MemoryStore>) {
        let local = Arc::new(MemoryStore::new());
        let session = Arc::new(MemoryStore::new());
        let prefs = PreferenceStore::new(
            local.clone(),
            session.clone(),
            Arc::new(MemoryUserRecords::new()),
        );
        (prefs, local, session)
    }

    #[test]
    fn test_set_without_runtime_or_identity_is_local_only() {
        let (prefs, local, _) = store();
        assert!(prefs.set(Language::Es).is_none());
        assert_eq!(prefs.get(), Language::Es);
        assert_eq!(local.get(keys::LANGUAGE).as_deref(), Some("es"));
    }

    #[test]
    fn test_session_user_keeps_other_fields() {
        let (prefs, _, session) = store();
        session
            .set(keys::SESSION_USER, r#"{"name":"Ana","languagePreference":"en"}"#)
            .unwrap();

        prefs.apply_locally(Language::Es);

        let cached: serde_json::Value =
            serde_json::from_str(&session.get(keys::SESSION_USER).unwrap()).unwrap();
        assert_eq!(cached["name"], "Ana");
        assert_eq!(cached["languagePreference"], "es");
    }

    #[test]
    fn test_malformed_session_user_is_left_alone() {
        let (prefs, _, session) = store();
        session.set(keys::SESSION_USER, "not json").unwrap();

        prefs.apply_locally(Language::Es);

        assert_eq!(session.get(keys::SESSION_USER).as_deref(), Some("not json"));
        assert_eq!(prefs.get(), Language::Es);
    }

    #[test]
    fn test_reconcile_prefers_local_over_locale() {
        let (prefs, local, _) = store();
        local.set(keys::LANGUAGE, "en").unwrap();

        assert_eq!(prefs.reconcile_on_startup(None, Some("es-ES")), Language::En);
    }

    #[test]
    fn test_reconcile_skips_unsupported_values() {
        let (prefs, local, _) = store();
        local.set(keys::LANGUAGE, "de").unwrap();

        assert_eq!(prefs.reconcile_on_startup(None, Some("fr-FR")), Language::En);
        assert_eq!(local.get(keys::LANGUAGE).as_deref(), Some("en"));
    }
}
