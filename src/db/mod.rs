//! Database layer (Firestore).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryUserRecords;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::models::{Language, UserLoginRecord};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
}

/// Document field names written with field masks.
pub mod fields {
    pub const LAST_LOGGED_IN: &str = "lastLoggedIn";
    pub const CURRENT_STREAK: &str = "currentStreak";
    pub const LANGUAGE_PREFERENCE: &str = "languagePreference";
}

/// Per-user record storage keyed by identity-provider user ID.
#[async_trait]
pub trait UserRecordStore: Send + Sync {
    async fn get_user(&self, user_id: &str) -> Result<Option<UserLoginRecord>, AppError>;

    /// Create or replace a full record.
    async fn upsert_user(&self, record: &UserLoginRecord) -> Result<(), AppError>;

    /// Write only `lastLoggedIn` and `currentStreak`.
    async fn record_login(
        &self,
        user_id: &str,
        last_logged_in: DateTime<Utc>,
        current_streak: u32,
    ) -> Result<(), AppError>;

    /// Write only `languagePreference`.
    async fn set_language_preference(
        &self,
        user_id: &str,
        language: Language,
    ) -> Result<(), AppError>;
}
