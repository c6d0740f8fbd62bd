// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Consecutive-day login streaks.
//!
//! Days are UTC calendar days: the time of day is dropped before comparing.

use chrono::{DateTime, NaiveDate, Utc};

/// A UTC calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CalendarDay(NaiveDate);

impl CalendarDay {
    pub fn of(timestamp: DateTime<Utc>) -> Self {
        Self(timestamp.date_naive())
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Whole days from `self` to `later` (negative if `later` is earlier).
    pub fn days_until(self, later: CalendarDay) -> i64 {
        (later.0 - self.0).num_days()
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }
}

/// Streak after a login at `now`.
///
/// Never logged in: 1. Last login yesterday: `current_streak + 1`. Gap of
/// more than a day: 1. Same day or clock skew backward: unchanged.
pub fn compute_streak(
    last_logged_in: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    current_streak: u32,
) -> u32 {
    let Some(last) = last_logged_in else {
        return 1;
    };

    match CalendarDay::of(last).days_until(CalendarDay::of(now)) {
        1 => current_streak.saturating_add(1),
        diff if diff > 1 => 1,
        _ => current_streak,
    }
}
