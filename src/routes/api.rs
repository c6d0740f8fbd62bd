// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile and preference routes for authenticated users.

use crate::db::UserRecordStore;
use crate::error::{AppError, Result};
use crate::models::{AuthIdentity, Language};
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/me/language", put(set_language))
}

// ─── User Profile ────────────────────────────────────────────

/// Current user response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProfileResponse {
    pub user_id: String,
    pub name: String,
    pub email: Option<String>,
    pub current_streak: u32,
    pub last_logged_in: Option<String>,
    pub language_preference: Option<Language>,
}

/// Get current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AuthIdentity>,
) -> Result<Json<ProfileResponse>> {
    let record = state
        .records
        .get_user(&identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", identity.user_id)))?;

    Ok(Json(ProfileResponse {
        language_preference: record.language(),
        user_id: record.user_id,
        name: record.name,
        email: record.email,
        current_streak: record.current_streak,
        last_logged_in: record.last_logged_in,
    }))
}

// ─── Language Preference ─────────────────────────────────────

#[derive(Deserialize)]
struct LanguageRequest {
    language: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LanguageResponse {
    pub language: Language,
}

/// Store the remote copy of the language preference.
///
/// Browsers update their local copies before calling this and do not
/// roll them back if it fails.
async fn set_language(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AuthIdentity>,
    Json(body): Json<LanguageRequest>,
) -> Result<Json<LanguageResponse>> {
    let language = body
        .language
        .parse::<Language>()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    state
        .records
        .set_language_preference(&identity.user_id, language)
        .await?;

    tracing::info!(user_id = %identity.user_id, language = %language, "Language preference updated");

    Ok(Json(LanguageResponse { language }))
}
