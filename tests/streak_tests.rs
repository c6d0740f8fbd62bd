// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login streak rules.

use chrono::{Duration, TimeZone, Utc};
use session_continuity::services::streak::compute_streak;

#[test]
fn test_first_login_starts_at_one() {
    let now = Utc.with_ymd_and_hms(2026, 6, 10, 9, 0, 0).unwrap();
    for current in [0, 1, 7, 365] {
        assert_eq!(compute_streak(None, now, current), 1);
    }
}

#[test]
fn test_consecutive_day_increments() {
    let now = Utc.with_ymd_and_hms(2026, 6, 10, 9, 0, 0).unwrap();
    let yesterday = now - Duration::days(1);
    for n in [0, 1, 4, 99] {
        assert_eq!(compute_streak(Some(yesterday), now, n), n + 1);
    }
}

#[test]
fn test_gap_resets_to_one() {
    let now = Utc.with_ymd_and_hms(2026, 6, 10, 9, 0, 0).unwrap();
    for gap in [2, 3, 30, 400] {
        let last = now - Duration::days(gap);
        assert_eq!(compute_streak(Some(last), now, 12), 1, "gap of {gap} days");
    }
}

#[test]
fn test_same_day_is_idempotent() {
    let morning = Utc.with_ymd_and_hms(2026, 6, 10, 0, 5, 0).unwrap();
    let evening = Utc.with_ymd_and_hms(2026, 6, 10, 23, 55, 0).unwrap();

    assert_eq!(compute_streak(Some(morning), evening, 4), 4);
    // Logging in again right after must not double count.
    let again = compute_streak(Some(evening), evening, 4);
    assert_eq!(again, 4);
}

#[test]
fn test_clock_skew_backward_keeps_streak() {
    let now = Utc.with_ymd_and_hms(2026, 6, 10, 9, 0, 0).unwrap();
    let future = now + Duration::days(3);
    assert_eq!(compute_streak(Some(future), now, 9), 9);
}

#[test]
fn test_day_boundary_not_24_hours() {
    // 25 hours apart but two calendar days: streak resets.
    let last = Utc.with_ymd_and_hms(2026, 6, 8, 23, 30, 0).unwrap();
    let now = Utc.with_ymd_and_hms(2026, 6, 10, 0, 30, 0).unwrap();
    assert_eq!(compute_streak(Some(last), now, 5), 1);
}

#[test]
fn test_year_boundary() {
    let last = Utc.with_ymd_and_hms(2025, 12, 31, 18, 0, 0).unwrap();
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 6, 0, 0).unwrap();
    assert_eq!(compute_streak(Some(last), now, 10), 11);
}
