//! Human-relative rendering of timestamps ("3 days ago").

use time::OffsetDateTime;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const MONTH: u64 = 30 * DAY;
const YEAR: u64 = 365 * DAY;

/// Describe `then` relative to `now`: "a few seconds ago", "3 days ago",
/// or "in 2 hours" for instants in the future.
pub(crate) fn relative(then: OffsetDateTime, now: OffsetDateTime) -> String {
    let delta = now - then;
    let phrase = span(delta.whole_seconds().unsigned_abs());
    if delta.is_negative() {
        format!("in {phrase}")
    } else {
        format!("{phrase} ago")
    }
}

fn span(secs: u64) -> String {
    match secs {
        s if s < 45 => "a few seconds".to_string(),
        s if s < 90 => "a minute".to_string(),
        s if s < 45 * MINUTE => format!("{} minutes", rounded(s, MINUTE)),
        s if s < 90 * MINUTE => "an hour".to_string(),
        s if s < 22 * HOUR => format!("{} hours", rounded(s, HOUR)),
        s if s < 36 * HOUR => "a day".to_string(),
        s if s < 26 * DAY => format!("{} days", rounded(s, DAY)),
        s if s < 46 * DAY => "a month".to_string(),
        s if s < 320 * DAY => format!("{} months", rounded(s, MONTH)),
        s if s < 548 * DAY => "a year".to_string(),
        s => format!("{} years", rounded(s, YEAR)),
    }
}

fn rounded(secs: u64, unit: u64) -> u64 {
    (secs + unit / 2) / unit
}
