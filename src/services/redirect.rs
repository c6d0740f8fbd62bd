// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Post-login redirect resolution.
//!
//! [`resolve`] is a pure function over a [`RedirectSnapshot`] of every
//! candidate source. It returns the chosen path together with the storage
//! clears the caller must apply; reading and clearing the stores is done by
//! [`crate::storage::RedirectStorage`] (in-process) or by the browser when the
//! resolution is returned over HTTP.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use url::Url;

use crate::models::{IntentCategory, RedirectIntent};

/// Main authenticated landing route.
pub const DEFAULT_LANDING_ROUTE: &str = "/dashboard";
/// Where first-time users finish their profile.
pub const PROFILE_COMPLETION_ROUTE: &str = "/completeProfile";

const STUDENT_ROUTES: &[&str] = &[
    "/dashboard",
    "/completeProfile",
    "/profile",
    "/subscriptions",
    "/checkout/",
    "/classDetailsUser/",
    "/groupDetailsUser/",
    "/myClasses",
];

const TUTOR_ROUTES: &[&str] = &[
    "/tutorDashboard",
    "/profile",
    "/classDetailsTutor/",
    "/groupDetailsTutor/",
    "/tutorClasses",
];

/// Which route family a prefix belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Student,
    Tutor,
}

impl Role {
    fn routes(self) -> &'static [&'static str] {
        match self {
            Role::Student => STUDENT_ROUTES,
            Role::Tutor => TUTOR_ROUTES,
        }
    }
}

/// Known-route prefixes a redirect may target.
#[derive(Debug, Clone)]
pub struct RouteWhitelist {
    prefixes: Vec<&'static str>,
}

impl Default for RouteWhitelist {
    /// Student and tutor routes together.
    fn default() -> Self {
        Self::for_roles(&[Role::Student, Role::Tutor])
    }
}

impl RouteWhitelist {
    pub fn for_roles(roles: &[Role]) -> Self {
        let mut prefixes: Vec<&'static str> = Vec::new();
        for role in roles {
            for &prefix in role.routes() {
                if !prefixes.contains(&prefix) {
                    prefixes.push(prefix);
                }
            }
        }
        Self { prefixes }
    }

    pub fn prefixes(&self) -> &[&'static str] {
        &self.prefixes
    }

    /// Check a candidate path against the known routes.
    ///
    /// The path must be absolute, survive URL construction unchanged (no
    /// `..` segments, no protocol-relative `//host`), and match a prefix on a
    /// segment boundary.
    pub fn is_allowed(&self, path: &str) -> bool {
        if !path.starts_with('/') || path.starts_with("//") || path.contains('\\') {
            return false;
        }

        let Ok(url) = Url::parse(&format!("http://localhost{}", path)) else {
            return false;
        };
        if url.host_str() != Some("localhost") {
            return false;
        }

        let raw_path = path.split(['?', '#']).next().unwrap_or_default();
        if url.path() != raw_path {
            return false;
        }

        self.prefixes
            .iter()
            .any(|prefix| matches_prefix(raw_path, prefix))
    }
}

fn matches_prefix(path: &str, prefix: &str) -> bool {
    if prefix.ends_with('/') {
        return path.starts_with(prefix);
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// A full URL stashed by a pre-login flow, keyed by category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeepLink {
    pub category: IntentCategory,
    pub url: String,
}

/// Every redirect candidate available at the moment of login.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RedirectSnapshot {
    pub session_intent: Option<RedirectIntent>,
    pub persistent_intent: Option<RedirectIntent>,
    /// Stash for the category inferred from the `ref` query parameter.
    pub deep_link: Option<DeepLink>,
}

/// Which tier produced the resolved path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum RedirectSource {
    SessionIntent,
    PersistentIntent,
    DeepLink,
    FirstTimeFallback,
    DefaultFallback,
}

/// What happens to the stored persistent intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum PersistentAction {
    /// Nothing was stored.
    Keep,
    /// Discard without use.
    Remove,
    /// Used: write it back with `consumed = true`.
    MarkConsumed,
}

/// The navigation target plus the storage clears that go with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Resolution {
    pub path: String,
    pub source: RedirectSource,
    pub clear_session_intent: bool,
    pub persistent: PersistentAction,
    pub clear_deep_link: Option<IntentCategory>,
}

/// Pick the single post-login destination.
///
/// Tiers are tried in order: session intent, unexpired unconsumed
/// persistent intent, category deep link, first-time profile completion,
/// default landing. Every candidate present in the snapshot is discarded
/// whether or not it wins. Never fails.
pub fn resolve(
    snapshot: &RedirectSnapshot,
    first_time_login: bool,
    now: DateTime<Utc>,
    whitelist: &RouteWhitelist,
) -> Resolution {
    let mut persistent = match snapshot.persistent_intent {
        Some(_) => PersistentAction::Remove,
        None => PersistentAction::Keep,
    };

    let (path, source) = if let Some(path) = session_candidate(snapshot, whitelist) {
        (path, RedirectSource::SessionIntent)
    } else if let Some(path) = persistent_candidate(snapshot, now, whitelist) {
        persistent = PersistentAction::MarkConsumed;
        (path, RedirectSource::PersistentIntent)
    } else if let Some(path) = deep_link_candidate(snapshot) {
        (path, RedirectSource::DeepLink)
    } else if first_time_login {
        (
            PROFILE_COMPLETION_ROUTE.to_string(),
            RedirectSource::FirstTimeFallback,
        )
    } else {
        (
            DEFAULT_LANDING_ROUTE.to_string(),
            RedirectSource::DefaultFallback,
        )
    };

    tracing::info!(path = %path, source = ?source, first_time_login, "Resolved post-login redirect");

    Resolution {
        path,
        source,
        clear_session_intent: snapshot.session_intent.is_some(),
        persistent,
        clear_deep_link: snapshot.deep_link.as_ref().map(|link| link.category),
    }
}

fn session_candidate(snapshot: &RedirectSnapshot, whitelist: &RouteWhitelist) -> Option<String> {
    let intent = snapshot.session_intent.as_ref()?;
    if whitelist.is_allowed(&intent.path) {
        Some(intent.path.clone())
    } else {
        tracing::debug!(path = %intent.path, "Discarding non-whitelisted session intent");
        None
    }
}

fn persistent_candidate(
    snapshot: &RedirectSnapshot,
    now: DateTime<Utc>,
    whitelist: &RouteWhitelist,
) -> Option<String> {
    let intent = snapshot.persistent_intent.as_ref()?;
    if intent.consumed {
        tracing::debug!(path = %intent.path, "Discarding consumed persistent intent");
        return None;
    }
    if intent.is_expired(now) {
        tracing::debug!(
            path = %intent.path,
            created_at = %intent.created_at,
            "Discarding expired persistent intent"
        );
        return None;
    }
    if !whitelist.is_allowed(&intent.path) {
        tracing::debug!(path = %intent.path, "Discarding non-whitelisted persistent intent");
        return None;
    }
    Some(intent.path.clone())
}

fn deep_link_candidate(snapshot: &RedirectSnapshot) -> Option<String> {
    let link = snapshot.deep_link.as_ref()?;
    extract_path_and_query(&link.url)
}

/// Path and query portion of a full URL, or `None` if it does not parse.
pub fn extract_path_and_query(raw: &str) -> Option<String> {
    let url = match Url::parse(raw.trim()) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(url = raw, error = %e, "Ignoring malformed stored deep link");
            return None;
        }
    };
    if url.cannot_be_a_base() {
        tracing::warn!(url = raw, "Ignoring deep link without a path");
        return None;
    }

    let mut target = url.path().to_string();
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }
    Some(target)
}
