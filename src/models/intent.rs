// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Deferred navigation targets saved before sign-in.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// How long a persistent-scope intent stays usable after creation.
pub const PERSISTENT_INTENT_TTL_HOURS: i64 = 24;

/// Which pre-login flow produced an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum IntentCategory {
    Subscription,
    Class,
    Group,
    Generic,
}

impl IntentCategory {
    /// Infer a deep-link category from the `ref` query parameter.
    ///
    /// `generic` has no deep-link stash, so it never comes back from here.
    pub fn from_ref_param(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "subscription" => Some(Self::Subscription),
            "class" => Some(Self::Class),
            "group" => Some(Self::Group),
            _ => None,
        }
    }
}

/// Lifetime of the storage slot an intent was saved in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum IntentScope {
    /// Cleared when the tab closes.
    Session,
    /// Survives restarts, one-time use, expires after 24 hours.
    Persistent,
}

/// A saved "send me here after sign-in" record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RedirectIntent {
    pub path: String,
    pub category: IntentCategory,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub created_at: DateTime<Utc>,
    pub scope: IntentScope,
    #[serde(default)]
    pub consumed: bool,
}

impl RedirectIntent {
    pub fn session(path: impl Into<String>, category: IntentCategory, now: DateTime<Utc>) -> Self {
        Self {
            path: path.into(),
            category,
            created_at: now,
            scope: IntentScope::Session,
            consumed: false,
        }
    }

    pub fn persistent(
        path: impl Into<String>,
        category: IntentCategory,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            path: path.into(),
            category,
            created_at: now,
            scope: IntentScope::Persistent,
            consumed: false,
        }
    }

    /// True once 24 hours have passed since creation.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at >= Duration::hours(PERSISTENT_INTENT_TTL_HOURS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_ref_param_categories() {
        assert_eq!(
            IntentCategory::from_ref_param("Subscription"),
            Some(IntentCategory::Subscription)
        );
        assert_eq!(IntentCategory::from_ref_param("class"), Some(IntentCategory::Class));
        assert_eq!(IntentCategory::from_ref_param("group"), Some(IntentCategory::Group));
        assert_eq!(IntentCategory::from_ref_param("generic"), None);
        assert_eq!(IntentCategory::from_ref_param(""), None);
    }

    #[test]
    fn test_expiry_boundary() {
        let created = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
        let intent = RedirectIntent::persistent("/subscriptions", IntentCategory::Subscription, created);

        assert!(!intent.is_expired(created + Duration::hours(23)));
        assert!(intent.is_expired(created + Duration::hours(24)));
        assert!(intent.is_expired(created + Duration::hours(25)));
    }

    #[test]
    fn test_stored_json_shape() {
        let raw = r#"{"path":"/classDetailsUser/42","category":"class","createdAt":"2026-05-01T12:00:00Z","scope":"persistent"}"#;
        let intent: RedirectIntent = serde_json::from_str(raw).unwrap();
        assert_eq!(intent.path, "/classDetailsUser/42");
        assert_eq!(intent.scope, IntentScope::Persistent);
        assert!(!intent.consumed);
    }
}
