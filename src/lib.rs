// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Session continuity after sign-in.
//!
//! Decides where a freshly authenticated user goes, keeps their daily
//! login streak, and keeps their language preference consistent across
//! in-memory state, local and session storage, and the remote user record.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod storage;
pub mod time_utils;

use config::Config;
use db::UserRecordStore;
use services::{LoginService, RouteWhitelist};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub records: Arc<dyn UserRecordStore>,
    pub login_service: LoginService,
    pub whitelist: RouteWhitelist,
}

impl AppState {
    pub fn new(config: Config, records: Arc<dyn UserRecordStore>) -> Self {
        Self {
            config,
            login_service: LoginService::new(Arc::clone(&records)),
            records,
            whitelist: RouteWhitelist::default(),
        }
    }
}
