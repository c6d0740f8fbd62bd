//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Language;
use crate::time_utils::{format_utc_rfc3339, parse_utc_rfc3339};

/// Per-user login record stored in Firestore.
///
/// Timestamps and the language code are kept as raw strings so that a
/// malformed value degrades to "absent" instead of failing the whole read.
/// The document body carries no user ID; stores fill `user_id` from the
/// document ID with [`UserLoginRecord::with_user_id`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLoginRecord {
    /// Identity-provider user ID (the document ID)
    #[serde(default, skip_serializing)]
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Last successful login (RFC3339)
    #[serde(default)]
    pub last_logged_in: Option<String>,
    /// Consecutive-day login count
    #[serde(default)]
    pub current_streak: u32,
    /// Language code
    #[serde(default)]
    pub language_preference: Option<String>,
}

impl UserLoginRecord {
    /// Profile created on a first-ever login.
    pub fn new_profile(identity: &AuthIdentity, now: DateTime<Utc>, language: Language) -> Self {
        Self {
            user_id: identity.user_id.clone(),
            name: identity.name.clone().unwrap_or_default(),
            email: identity.email.clone(),
            last_logged_in: Some(format_utc_rfc3339(now)),
            current_streak: 1,
            language_preference: Some(language.code().to_string()),
        }
    }

    /// Attach the document ID after a read.
    pub fn with_user_id(mut self, user_id: &str) -> Self {
        self.user_id = user_id.to_string();
        self
    }

    /// A record that has never completed a login, e.g. one created by a
    /// language write ahead of the first sign-in.
    pub fn has_logged_in(&self) -> bool {
        self.last_logged_in.is_some()
    }

    pub fn last_logged_in_at(&self) -> Option<DateTime<Utc>> {
        self.last_logged_in.as_deref().and_then(parse_utc_rfc3339)
    }

    /// Stored preference, if it is one of the supported languages.
    pub fn language(&self) -> Option<Language> {
        let raw = self.language_preference.as_deref()?;
        let lang = Language::parse(raw);
        if lang.is_none() {
            tracing::warn!(
                user_id = %self.user_id,
                value = raw,
                "Ignoring unsupported stored language preference"
            );
        }
        lang
    }
}

/// Authenticated identity handed over by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthIdentity {
    pub user_id: String,
    pub email: Option<String>,
    pub email_verified: bool,
    pub name: Option<String>,
}

impl AuthIdentity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
            email_verified: false,
            name: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_tolerates_malformed_fields() {
        let raw = r#"{"userId":"u1","name":"Ana","lastLoggedIn":"not a date","currentStreak":3,"languagePreference":"klingon"}"#;
        let record: UserLoginRecord = serde_json::from_str(raw).unwrap();

        assert_eq!(record.current_streak, 3);
        assert!(record.last_logged_in_at().is_none());
        assert!(record.language().is_none());
    }

    #[test]
    fn test_record_defaults_missing_fields() {
        let record: UserLoginRecord = serde_json::from_str(r#"{"languagePreference":"es"}"#).unwrap();
        assert_eq!(record.current_streak, 0);
        assert!(record.last_logged_in.is_none());
        assert!(record.email.is_none());
        assert!(!record.has_logged_in());
        assert_eq!(record.language(), Some(Language::Es));
    }

    #[test]
    fn test_document_body_without_user_id() {
        let raw = r#"{"lastLoggedIn":"2026-10-18T09:00:00Z","currentStreak":4,"languagePreference":"es","name":"Ana","email":"a@x.com"}"#;
        let record = serde_json::from_str::<UserLoginRecord>(raw)
            .unwrap()
            .with_user_id("ana");

        assert_eq!(record.user_id, "ana");
        assert_eq!(record.current_streak, 4);
        assert_eq!(record.name, "Ana");
        assert!(record.has_logged_in());
    }

    #[test]
    fn test_serialized_document_omits_user_id() {
        let record = UserLoginRecord::new_profile(
            &AuthIdentity::new("u3"),
            chrono::Utc::now(),
            Language::En,
        );
        let value = serde_json::to_value(&record).unwrap();

        assert!(value.get("userId").is_none());
        assert_eq!(value["currentStreak"], 1);
        assert_eq!(value["languagePreference"], "en");
    }
}
