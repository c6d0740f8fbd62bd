// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed user-record operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{collections, fields, UserRecordStore};
use crate::error::AppError;
use crate::models::{Language, UserLoginRecord};
use crate::time_utils::format_utc_rfc3339;

/// Partial document written on every login.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginStamp {
    last_logged_in: String,
    current_streak: u32,
}

/// Partial document written on a language change.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LanguageField {
    language_preference: String,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Delete a user record (test cleanup only; the login core never deletes).
    pub async fn delete_user(&self, user_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::USERS)
            .document_id(user_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl UserRecordStore for FirestoreDb {
    async fn get_user(&self, user_id: &str) -> Result<Option<UserLoginRecord>, AppError> {
        let record: Option<UserLoginRecord> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(record.map(|r| r.with_user_id(user_id)))
    }

    async fn upsert_user(&self, record: &UserLoginRecord) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&record.user_id)
            .object(record)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn record_login(
        &self,
        user_id: &str,
        last_logged_in: DateTime<Utc>,
        current_streak: u32,
    ) -> Result<(), AppError> {
        let stamp = LoginStamp {
            last_logged_in: format_utc_rfc3339(last_logged_in),
            current_streak,
        };

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields([fields::LAST_LOGGED_IN, fields::CURRENT_STREAK])
            .in_col(collections::USERS)
            .document_id(user_id)
            .object(&stamp)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn set_language_preference(
        &self,
        user_id: &str,
        language: Language,
    ) -> Result<(), AppError> {
        let field = LanguageField {
            language_preference: language.code().to_string(),
        };

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields([fields::LANGUAGE_PREFERENCE])
            .in_col(collections::USERS)
            .document_id(user_id)
            .object(&field)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_client_reports_database_errors() {
        let db = FirestoreDb::new_mock();

        let err = db.get_user("u1").await.unwrap_err();
        assert!(err.is_remote_failure());

        let err = db
            .set_language_preference("u1", Language::Es)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }
}
