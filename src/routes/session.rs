// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Post-sign-in login completion.

use crate::error::Result;
use crate::models::{AuthIdentity, Language};
use crate::services::redirect::{resolve, RedirectSnapshot, Resolution};
use crate::AppState;
use axum::{extract::State, routing::post, Extension, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/session/login", post(complete_login))
}

/// Redirect candidates read from browser storage, plus the language the
/// browser is currently rendering (stored on a newly created profile).
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub redirect: RedirectSnapshot,
    pub language: Option<Language>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LoginResponse {
    /// `None` when the stored record could not be read.
    pub current_streak: Option<u32>,
    pub first_time_login: bool,
    pub streak_persisted: bool,
    pub email_verified: bool,
    /// Destination plus the storage clears the browser must apply.
    pub redirect: Resolution,
}

/// Record the login and resolve where to navigate.
///
/// Never fails on storage problems: a failed streak write shows up as
/// `streak_persisted: false` and the redirect is resolved regardless.
async fn complete_login(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AuthIdentity>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let now = chrono::Utc::now();

    let plan = state.login_service.plan(&identity, now).await;
    let redirect = resolve(
        &request.redirect,
        plan.first_time_login(),
        now,
        &state.whitelist,
    );

    let streak_persisted = state
        .login_service
        .persist(&identity, &plan, request.language.unwrap_or_default())
        .await;

    tracing::info!(
        user_id = %identity.user_id,
        email_verified = identity.email_verified,
        redirect = %redirect.path,
        streak_persisted,
        "Login completed"
    );

    Ok(Json(LoginResponse {
        current_streak: plan.current_streak,
        first_time_login: plan.first_time_login(),
        streak_persisted,
        email_verified: identity.email_verified,
        redirect,
    }))
}
