// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process session continuity: what happens on sign-in, sign-out and
//! app entry when the stores are local to this process.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::db::UserRecordStore;
use crate::models::{AuthIdentity, Language};
use crate::services::login::{LoginPlan, LoginService};
use crate::services::preference::PreferenceStore;
use crate::services::redirect::{Resolution, RouteWhitelist};
use crate::storage::{KeyValueStore, RedirectStorage};

/// Identity-provider auth state change.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    SignedIn(AuthIdentity),
    SignedOut,
}

/// Result of [`SessionContinuity::complete_login`].
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub plan: LoginPlan,
    pub streak_persisted: bool,
    /// `None` if this login session already redirected.
    pub redirect: Option<Resolution>,
}

pub struct SessionContinuity {
    local: Arc<dyn KeyValueStore>,
    session: Arc<dyn KeyValueStore>,
    records: Arc<dyn UserRecordStore>,
    login: LoginService,
    preferences: PreferenceStore,
    whitelist: RouteWhitelist,
    platform_locale: Option<String>,
}

impl SessionContinuity {
    pub fn new(
        local: Arc<dyn KeyValueStore>,
        session: Arc<dyn KeyValueStore>,
        records: Arc<dyn UserRecordStore>,
        platform_locale: Option<String>,
    ) -> Self {
        Self {
            preferences: PreferenceStore::new(
                Arc::clone(&local),
                Arc::clone(&session),
                Arc::clone(&records),
            ),
            login: LoginService::new(Arc::clone(&records)),
            local,
            session,
            records,
            whitelist: RouteWhitelist::default(),
            platform_locale,
        }
    }

    pub fn with_whitelist(mut self, whitelist: RouteWhitelist) -> Self {
        self.whitelist = whitelist;
        self
    }

    pub fn preferences(&self) -> &PreferenceStore {
        &self.preferences
    }

    fn redirects(&self) -> RedirectStorage<'_> {
        RedirectStorage::new(self.local.as_ref(), self.session.as_ref())
    }

    /// Re-run reconciliation for the new identity. Callers await this
    /// before rendering anything that depends on the language.
    pub async fn on_auth_state_changed(&self, event: AuthEvent) -> Language {
        match event {
            AuthEvent::SignedIn(identity) => {
                if self.preferences.identity().as_deref() != Some(identity.user_id.as_str()) {
                    self.redirects().clear_redirect_flag();
                }
                self.preferences.set_identity(Some(identity.user_id.clone()));

                let stored = match self.records.get_user(&identity.user_id).await {
                    Ok(record) => record,
                    Err(e) => {
                        tracing::warn!(
                            user_id = %identity.user_id,
                            error = %e,
                            "Failed to read user record, reconciling from local state"
                        );
                        None
                    }
                };
                self.preferences
                    .reconcile_on_startup(stored.as_ref(), self.platform_locale.as_deref())
            }
            AuthEvent::SignedOut => {
                self.preferences.set_identity(None);
                self.redirects().clear_redirect_flag();
                self.preferences
                    .reconcile_on_startup(None, self.platform_locale.as_deref())
            }
        }
    }

    /// Handle a successful sign-in: update the streak and pick where to go.
    ///
    /// The redirect is resolved from the plan before the streak write is
    /// awaited, so a failed write never changes the destination.
    pub async fn complete_login(
        &self,
        identity: &AuthIdentity,
        query: &str,
        now: DateTime<Utc>,
    ) -> LoginOutcome {
        let plan = self.login.plan(identity, now).await;

        let redirect =
            self.redirects()
                .resolve_once(query, plan.first_time_login(), now, &self.whitelist);

        let streak_persisted = self
            .login
            .persist(identity, &plan, self.preferences.get())
            .await;

        LoginOutcome {
            plan,
            streak_persisted,
            redirect,
        }
    }

    pub fn set_language(&self, language: Language) -> Option<JoinHandle<()>> {
        self.preferences.set(language)
    }
}
