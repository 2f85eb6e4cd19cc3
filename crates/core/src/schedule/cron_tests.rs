// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;
use yare::parameterized;

fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Tz> {
    Tz::UTC.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

#[parameterized(
    too_few = { "0 22 * *" },
    too_many = { "0 0 22 * * 1" },
    empty = { "" },
    bad_minute = { "61 22 * * *" },
    bad_weekday = { "0 22 * * 8" },
    reversed_weekdays = { "0 22 * * 5-1" },
    zero_step = { "0 22 * * */0" },
    garbage = { "every day at ten" },
)]
fn rejects_malformed_expressions(expr: &str) {
    let err = CronExpr::parse(expr).unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidSchedule(_)), "{expr}: {err}");
}

#[parameterized(
    star = { "*", "*" },
    weekdays = { "1-5", "Mon,Tue,Wed,Thu,Fri" },
    sunday_zero = { "0", "Sun" },
    sunday_seven = { "7", "Sun" },
    weekend_wraps = { "6-7", "Sun,Sat" },
    list = { "1,3,5", "Mon,Wed,Fri" },
    stepped = { "*/2", "Sun,Tue,Thu,Sat" },
    names_pass_through = { "Mon-Fri", "Mon-Fri" },
)]
fn numeric_weekdays_become_names(field: &str, expected: &str) {
    assert_eq!(normalize_day_of_week(field).unwrap(), expected);
}

#[test]
fn weekday_one_means_monday() {
    // 2025-01-06 is a Monday, 2025-01-05 a Sunday
    let expr = CronExpr::parse("0 22 * * 1").unwrap();
    let last = expr.last_firing(&utc(2025, 1, 7, 12, 0)).unwrap();
    assert_eq!(last, utc(2025, 1, 6, 22, 0));
}

#[test]
fn last_firing_includes_now() {
    let expr = CronExpr::parse("0 22 * * *").unwrap();
    let now = utc(2025, 1, 7, 22, 0);
    assert_eq!(expr.last_firing(&now), Some(now));
}

#[test]
fn last_firing_looks_back_across_weekend() {
    // Friday 2025-01-10 22:00 is the latest weekday firing before Sunday
    let expr = CronExpr::parse("0 22 * * 1-5").unwrap();
    let last = expr.last_firing(&utc(2025, 1, 12, 12, 0)).unwrap();
    assert_eq!(last, utc(2025, 1, 10, 22, 0));
}

#[test]
fn last_firing_finds_yearly_schedule() {
    let expr = CronExpr::parse("0 0 1 1 *").unwrap();
    let last = expr.last_firing(&utc(2025, 12, 31, 0, 0)).unwrap();
    assert_eq!(last, utc(2025, 1, 1, 0, 0));
}

#[test]
fn next_firing_is_strictly_after_now() {
    let expr = CronExpr::parse("0 6 * * *").unwrap();
    let now = utc(2025, 1, 7, 6, 0);
    assert_eq!(expr.next_firing(&now), Some(utc(2025, 1, 8, 6, 0)));
}

#[parameterized(
    just_fired = { 22, 0, true },
    one_minute_later = { 22, 1, false },
    before = { 21, 59, false },
)]
fn fired_within_last_minute(hour: u32, minute: u32, expected: bool) {
    let expr = CronExpr::parse("0 22 * * *").unwrap();
    let now = utc(2025, 1, 7, hour, minute);
    assert_eq!(expr.fired_within(&now, Duration::minutes(1)), expected);
}

#[test]
fn firings_follow_local_time() {
    let berlin: Tz = "Europe/Berlin".parse().unwrap();
    let expr = CronExpr::parse("0 22 * * *").unwrap();
    // 21:30 UTC in January is 22:30 in Berlin
    let now = Tz::UTC
        .with_ymd_and_hms(2025, 1, 7, 21, 30, 0)
        .unwrap()
        .with_timezone(&berlin);
    let last = expr.last_firing(&now).unwrap();
    assert_eq!(
        last.with_timezone(&Tz::UTC),
        Tz::UTC.with_ymd_and_hms(2025, 1, 7, 21, 0, 0).unwrap()
    );
}

#[test]
fn keeps_source_expression() {
    let expr = CronExpr::parse("0 22 * * 1-5").unwrap();
    assert_eq!(expr.source(), "0 22 * * 1-5");
}
