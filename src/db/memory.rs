//! In-memory user records for local development and tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::{Map, Value};

use crate::db::{fields, UserRecordStore};
use crate::error::AppError;
use crate::models::{Language, UserLoginRecord};
use crate::time_utils::format_utc_rfc3339;

type Document = Map<String, Value>;

/// `UserRecordStore` backed by a concurrent map of JSON document bodies.
///
/// Documents are keyed by user ID and decoded the same way Firestore
/// documents are, so the body never carries the ID. Masked writes on a
/// missing user create a bare document, matching Firestore's
/// update-without-precondition behaviour.
#[derive(Debug, Default)]
pub struct MemoryUserRecords {
    documents: DashMap<String, Document>,
}

impl MemoryUserRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(record: UserLoginRecord) -> Self {
        let store = Self::new();
        match to_document(&record) {
            Ok(document) => {
                store.documents.insert(record.user_id, document);
            }
            Err(e) => tracing::warn!(user_id = %record.user_id, error = %e, "Skipping seed record"),
        }
        store
    }

    /// Seed a raw document body, as written by another client.
    pub fn with_document(user_id: &str, body: Value) -> Self {
        let store = Self::new();
        if let Value::Object(document) = body {
            store.documents.insert(user_id.to_string(), document);
        }
        store
    }

    /// Merge `fields` into the user's document, creating it if needed.
    fn merge(&self, user_id: &str, fields: Document) {
        self.documents
            .entry(user_id.to_string())
            .or_default()
            .extend(fields);
    }
}

fn to_document(record: &UserLoginRecord) -> Result<Document, AppError> {
    match serde_json::to_value(record) {
        Ok(Value::Object(document)) => Ok(document),
        Ok(other) => Err(AppError::Database(format!(
            "User record serialized to non-object: {}",
            other
        ))),
        Err(e) => Err(AppError::Database(e.to_string())),
    }
}

#[async_trait]
impl UserRecordStore for MemoryUserRecords {
    async fn get_user(&self, user_id: &str) -> Result<Option<UserLoginRecord>, AppError> {
        let Some(document) = self.documents.get(user_id).map(|d| d.value().clone()) else {
            return Ok(None);
        };
        let record: UserLoginRecord = serde_json::from_value(Value::Object(document))
            .map_err(|e| AppError::Database(format!("Malformed user document: {}", e)))?;
        Ok(Some(record.with_user_id(user_id)))
    }

    async fn upsert_user(&self, record: &UserLoginRecord) -> Result<(), AppError> {
        let document = to_document(record)?;
        self.documents.insert(record.user_id.clone(), document);
        Ok(())
    }

    async fn record_login(
        &self,
        user_id: &str,
        last_logged_in: DateTime<Utc>,
        current_streak: u32,
    ) -> Result<(), AppError> {
        let mut stamp = Document::new();
        stamp.insert(
            fields::LAST_LOGGED_IN.to_string(),
            Value::String(format_utc_rfc3339(last_logged_in)),
        );
        stamp.insert(fields::CURRENT_STREAK.to_string(), Value::from(current_streak));
        self.merge(user_id, stamp);
        Ok(())
    }

    async fn set_language_preference(
        &self,
        user_id: &str,
        language: Language,
    ) -> Result<(), AppError> {
        let mut field = Document::new();
        field.insert(
            fields::LANGUAGE_PREFERENCE.to_string(),
            Value::String(language.code().to_string()),
        );
        self.merge(user_id, field);
        Ok(())
    }
}
