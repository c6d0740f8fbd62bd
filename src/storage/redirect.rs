// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage adapter around the pure redirect resolver.

use chrono::{DateTime, Utc};

use crate::models::{IntentCategory, RedirectIntent};
use crate::services::redirect::{
    resolve, DeepLink, PersistentAction, RedirectSnapshot, Resolution, RouteWhitelist,
};
use crate::storage::{clear_deep_link, keys, read_json, write_json, KeyValueStore};

/// Reads redirect candidates from the local and session stores and applies
/// a [`Resolution`]'s clears back to them.
pub struct RedirectStorage<'a> {
    local: &'a dyn KeyValueStore,
    session: &'a dyn KeyValueStore,
}

impl<'a> RedirectStorage<'a> {
    pub fn new(local: &'a dyn KeyValueStore, session: &'a dyn KeyValueStore) -> Self {
        Self { local, session }
    }

    /// Collect every candidate. `query` is the current URL's query string,
    /// with or without the leading `?`.
    pub fn snapshot(&self, query: &str) -> RedirectSnapshot {
        let session_intent: Option<RedirectIntent> =
            read_json(self.session, keys::SESSION_REDIRECT_INTENT);
        let persistent_intent: Option<RedirectIntent> =
            read_json(self.local, keys::PERSISTENT_REDIRECT_INTENT);

        let deep_link = ref_category(query).and_then(|category| {
            let key = keys::deep_link(category)?;
            let url = self.session.get(key)?;
            Some(DeepLink { category, url })
        });

        RedirectSnapshot {
            session_intent,
            persistent_intent,
            deep_link,
        }
    }

    /// Apply the clears a resolution asks for and mark the redirect as done.
    pub fn apply(&self, snapshot: &RedirectSnapshot, resolution: &Resolution) {
        if resolution.clear_session_intent {
            self.session.remove(keys::SESSION_REDIRECT_INTENT);
        }

        match resolution.persistent {
            PersistentAction::Keep => {}
            PersistentAction::Remove => self.local.remove(keys::PERSISTENT_REDIRECT_INTENT),
            PersistentAction::MarkConsumed => {
                let consumed = snapshot.persistent_intent.clone().map(|mut intent| {
                    intent.consumed = true;
                    intent
                });
                let written = consumed.map(|intent| {
                    write_json(self.local, keys::PERSISTENT_REDIRECT_INTENT, &intent)
                });
                if let Some(Err(e)) = written {
                    // A record that cannot be marked must not be reusable.
                    tracing::warn!(error = %e, "Failed to mark persistent intent consumed, removing");
                    self.local.remove(keys::PERSISTENT_REDIRECT_INTENT);
                }
            }
        }

        if let Some(category) = resolution.clear_deep_link {
            clear_deep_link(self.session, category);
        }

        if let Err(e) = self.session.set(keys::REDIRECT_DONE, "true") {
            tracing::warn!(error = %e, "Failed to record redirect flag");
        }
    }

    pub fn has_redirected(&self) -> bool {
        self.session.get(keys::REDIRECT_DONE).is_some()
    }

    pub fn clear_redirect_flag(&self) {
        self.session.remove(keys::REDIRECT_DONE);
    }

    /// Resolve and apply, unless this login session already redirected.
    pub fn resolve_once(
        &self,
        query: &str,
        first_time_login: bool,
        now: DateTime<Utc>,
        whitelist: &RouteWhitelist,
    ) -> Option<Resolution> {
        if self.has_redirected() {
            tracing::debug!("Redirect already performed for this session");
            return None;
        }

        let snapshot = self.snapshot(query);
        let resolution = resolve(&snapshot, first_time_login, now, whitelist);
        self.apply(&snapshot, &resolution);
        Some(resolution)
    }
}

/// Category named by the `ref` query parameter, if any.
fn ref_category(query: &str) -> Option<IntentCategory> {
    let query = query.strip_prefix('?').unwrap_or(query);
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(name, _)| name == "ref")
        .and_then(|(_, value)| IntentCategory::from_ref_param(&value))
}
