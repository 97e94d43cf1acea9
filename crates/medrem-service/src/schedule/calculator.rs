//! Schedule calculator.
//!
//! Converts a start instant and a dosing interval into the next dose time.
//! When adding the interval stays on the same UTC day the result is that
//! instant truncated to the hour. When it crosses midnight the next dose
//! is pinned to the following day at [`MORNING_SLOT_HOUR`]:00 UTC, whatever
//! hour the interval would have produced. Existing clients rely on this
//! morning slot, so it is reproduced as is.

use chrono::{DateTime, Duration, Timelike, Utc};

/// UTC hour of the dose that follows a midnight rollover.
pub const MORNING_SLOT_HOUR: i64 = 9;

/// Compute the next dose after `start_time` for a dose every `interval_hours`.
///
/// `interval_hours` must be positive; callers validate it before reaching here.
pub fn compute_next_dose(start_time: DateTime<Utc>, interval_hours: i32) -> DateTime<Utc> {
    let candidate = start_time + Duration::hours(i64::from(interval_hours));

    if candidate.date_naive() == start_time.date_naive() {
        truncate_to_hour(candidate)
    } else {
        start_of_day(start_time) + Duration::days(1) + Duration::hours(MORNING_SLOT_HOUR)
    }
}

/// Re-apply [`compute_next_dose`] from `from` until the result is after `now`.
///
/// Each step moves strictly forward for a positive interval, so this always
/// terminates.
pub fn advance_past(from: DateTime<Utc>, interval_hours: i32, now: DateTime<Utc>) -> DateTime<Utc> {
    let interval_hours = interval_hours.max(1);
    let mut next = compute_next_dose(from, interval_hours);
    while next <= now {
        next = compute_next_dose(next, interval_hours);
    }
    next
}

/// Zero the minutes and smaller units of `ts`.
pub fn truncate_to_hour(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts - Duration::minutes(i64::from(ts.minute()))
        - Duration::seconds(i64::from(ts.second()))
        - Duration::nanoseconds(i64::from(ts.nanosecond()))
}

fn start_of_day(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts - Duration::seconds(i64::from(ts.num_seconds_from_midnight()))
        - Duration::nanoseconds(i64::from(ts.nanosecond()))
}
