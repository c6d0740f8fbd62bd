// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod login;
pub mod preference;
pub mod redirect;
pub mod session;
pub mod streak;

pub use login::{LoginPlan, LoginService, PriorRecord};
pub use preference::PreferenceStore;
pub use redirect::{resolve, RedirectSnapshot, Resolution, RouteWhitelist};
pub use session::{AuthEvent, LoginOutcome, SessionContinuity};
pub use streak::{compute_streak, CalendarDay};
