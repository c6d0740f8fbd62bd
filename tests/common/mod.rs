// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{DateTime, TimeZone, Utc};
use session_continuity::config::Config;
use session_continuity::db::{FirestoreDb, MemoryUserRecords, UserRecordStore};
use session_continuity::middleware::auth::create_jwt;
use session_continuity::models::{AuthIdentity, UserLoginRecord};
use session_continuity::routes::create_router;
use session_continuity::time_utils::format_utc_rfc3339;
use session_continuity::AppState;
use std::sync::Arc;
use tracing::subscriber::DefaultGuard;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline, every call fails).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Fixed instant used by date-sensitive tests.
#[allow(dead_code)]
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 10, 9, 0, 0).unwrap()
}

/// A verified student identity.
#[allow(dead_code)]
pub fn student(user_id: &str) -> AuthIdentity {
    AuthIdentity {
        user_id: user_id.to_string(),
        email: Some(format!("{user_id}@example.com")),
        email_verified: true,
        name: Some("Test Student".to_string()),
    }
}

/// A stored record with the given streak state.
#[allow(dead_code)]
pub fn record(
    user_id: &str,
    last_logged_in: Option<DateTime<Utc>>,
    current_streak: u32,
    language: Option<&str>,
) -> UserLoginRecord {
    UserLoginRecord {
        user_id: user_id.to_string(),
        name: "Test Student".to_string(),
        email: Some(format!("{user_id}@example.com")),
        last_logged_in: last_logged_in.map(format_utc_rfc3339),
        current_streak,
        language_preference: language.map(str::to_string),
    }
}

/// Signed bearer token for an identity under the test config.
#[allow(dead_code)]
pub fn bearer(identity: &AuthIdentity) -> String {
    let token = create_jwt(identity, &Config::test_default().jwt_signing_key)
        .expect("Failed to create JWT");
    format!("Bearer {}", token)
}

/// Create a test app over the given record store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app(records: Arc<dyn UserRecordStore>) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(Config::test_default(), records));
    (create_router(state.clone()), state)
}

/// Test app backed by an empty in-memory store.
#[allow(dead_code)]
pub fn create_memory_app() -> (axum::Router, Arc<MemoryUserRecords>) {
    let records = Arc::new(MemoryUserRecords::new());
    let (app, _) = create_test_app(records.clone());
    (app, records)
}

/// JSON log output captured from the current thread.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<parking_lot::Mutex<Vec<u8>>>);

#[allow(dead_code)]
impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    /// Captured lines that carry `needle`.
    pub fn lines_containing(&self, needle: &str) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| line.contains(needle))
            .map(str::to_string)
            .collect()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Route this thread's tracing events into a buffer until the guard drops.
/// Spawned tasks are captured too under the single-threaded test runtime.
#[allow(dead_code)]
pub fn capture_logs() -> (CapturedLogs, DefaultGuard) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || writer.clone())
        .finish();
    (logs, tracing::subscriber::set_default(subscriber))
}
