// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Streak bookkeeping for a successful sign-in.
//!
//! A login is handled in two halves. [`LoginService::plan`] reads the stored
//! record once and computes the new streak; [`LoginService::persist`] writes
//! it back. Redirect resolution only needs the plan's first-time flag, so it
//! never waits on the write.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::db::UserRecordStore;
use crate::models::{AuthIdentity, Language, UserLoginRecord};
use crate::services::streak::compute_streak;

/// What the document store said about this user before the login.
#[derive(Debug, Clone, PartialEq)]
pub enum PriorRecord {
    Existing(UserLoginRecord),
    /// No completed login on record: a profile gets created. Carries the
    /// bare record when an earlier masked write (a language change made
    /// before the first sign-in) already created the document.
    FirstLogin(Option<UserLoginRecord>),
    /// The read failed; the previous streak is unknown.
    Unavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoginPlan {
    pub prior: PriorRecord,
    pub logged_in_at: DateTime<Utc>,
    /// `None` when the prior record could not be read.
    pub current_streak: Option<u32>,
}

impl LoginPlan {
    /// Compute the plan from whatever was read.
    pub fn from_prior(prior: PriorRecord, now: DateTime<Utc>) -> Self {
        let current_streak = match &prior {
            PriorRecord::Existing(record) => Some(compute_streak(
                record.last_logged_in_at(),
                now,
                record.current_streak,
            )),
            PriorRecord::FirstLogin(_) => Some(compute_streak(None, now, 0)),
            PriorRecord::Unavailable => None,
        };

        Self {
            prior,
            logged_in_at: now,
            current_streak,
        }
    }

    pub fn first_time_login(&self) -> bool {
        matches!(self.prior, PriorRecord::FirstLogin(_))
    }

    pub fn existing_record(&self) -> Option<&UserLoginRecord> {
        match &self.prior {
            PriorRecord::Existing(record) => Some(record),
            _ => None,
        }
    }
}

/// Reads and writes the per-user login record.
#[derive(Clone)]
pub struct LoginService {
    records: Arc<dyn UserRecordStore>,
}

impl LoginService {
    pub fn new(records: Arc<dyn UserRecordStore>) -> Self {
        Self { records }
    }

    pub async fn plan(&self, identity: &AuthIdentity, now: DateTime<Utc>) -> LoginPlan {
        let prior = match self.records.get_user(&identity.user_id).await {
            Ok(Some(record)) if record.has_logged_in() => PriorRecord::Existing(record),
            Ok(partial) => PriorRecord::FirstLogin(partial),
            Err(e) => {
                tracing::warn!(
                    user_id = %identity.user_id,
                    error = %e,
                    "Failed to read login record, streak will not be updated"
                );
                PriorRecord::Unavailable
            }
        };
        LoginPlan::from_prior(prior, now)
    }

    /// Write the planned streak. Returns whether the write landed; failures
    /// are logged, never propagated.
    pub async fn persist(
        &self,
        identity: &AuthIdentity,
        plan: &LoginPlan,
        language: Language,
    ) -> bool {
        let Some(streak) = plan.current_streak else {
            return false;
        };

        let result = match &plan.prior {
            PriorRecord::FirstLogin(partial) => {
                // A preference stored before the first sign-in outranks the
                // language the client is rendering.
                let language = partial
                    .as_ref()
                    .and_then(UserLoginRecord::language)
                    .unwrap_or(language);
                let record = UserLoginRecord::new_profile(identity, plan.logged_in_at, language);
                self.records.upsert_user(&record).await
            }
            _ => {
                self.records
                    .record_login(&identity.user_id, plan.logged_in_at, streak)
                    .await
            }
        };

        match result {
            Ok(()) => {
                tracing::info!(
                    user_id = %identity.user_id,
                    current_streak = streak,
                    first_time_login = plan.first_time_login(),
                    "Login streak updated"
                );
                true
            }
            Err(e) => {
                tracing::warn!(
                    user_id = %identity.user_id,
                    error = %e,
                    "Failed to persist login streak"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{FirestoreDb, MemoryUserRecords};
    use chrono::TimeZone;

    fn identity() -> AuthIdentity {
        AuthIdentity {
            user_id: "student-1".to_string(),
            email: Some("student@example.com".to_string()),
            email_verified: true,
            name: Some("Student One".to_string()),
        }
    }

    #[tokio::test]
    async fn test_first_login_creates_profile() {
        let records = Arc::new(MemoryUserRecords::new());
        let service = LoginService::new(records.clone());
        let now = Utc.with_ymd_and_hms(2026, 2, 3, 10, 0, 0).unwrap();

        let plan = service.plan(&identity(), now).await;
        assert!(plan.first_time_login());
        assert_eq!(plan.current_streak, Some(1));

        assert!(service.persist(&identity(), &plan, Language::Es).await);

        let stored = records.get_user("student-1").await.unwrap().unwrap();
        assert_eq!(stored.name, "Student One");
        assert_eq!(stored.current_streak, 1);
        assert_eq!(stored.language(), Some(Language::Es));
        assert_eq!(stored.last_logged_in_at(), Some(now));
    }

    #[tokio::test]
    async fn test_language_set_before_first_login_still_completes_profile() {
        let records = Arc::new(MemoryUserRecords::new());
        records
            .set_language_preference("student-1", Language::Es)
            .await
            .unwrap();
        let service = LoginService::new(records.clone());
        let now = Utc.with_ymd_and_hms(2026, 2, 3, 10, 0, 0).unwrap();

        let plan = service.plan(&identity(), now).await;
        assert!(plan.first_time_login());
        assert_eq!(plan.current_streak, Some(1));
        assert!(plan.existing_record().is_none());

        assert!(service.persist(&identity(), &plan, Language::En).await);

        let stored = records.get_user("student-1").await.unwrap().unwrap();
        assert_eq!(stored.name, "Student One");
        assert_eq!(stored.email.as_deref(), Some("student@example.com"));
        assert_eq!(stored.current_streak, 1);
        assert_eq!(stored.language(), Some(Language::Es));
        assert_eq!(stored.last_logged_in_at(), Some(now));
    }

    #[tokio::test]
    async fn test_unreadable_record_skips_persistence() {
        let service = LoginService::new(Arc::new(FirestoreDb::new_mock()));
        let plan = service.plan(&identity(), Utc::now()).await;

        assert_eq!(plan.prior, PriorRecord::Unavailable);
        assert!(!plan.first_time_login());
        assert_eq!(plan.current_streak, None);
        assert!(!service.persist(&identity(), &plan, Language::En).await);
    }
}
