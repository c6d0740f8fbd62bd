// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod intent;
pub mod language;
pub mod user;

pub use intent::{IntentCategory, IntentScope, RedirectIntent};
pub use language::{Language, UnsupportedLanguage};
pub use user::{AuthIdentity, UserLoginRecord};
