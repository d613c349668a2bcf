//! Free-form text times.
//!
//! Accepted forms, case-insensitive, surrounding whitespace ignored:
//!
//! ```text
//! now | today | yesterday
//! <n> <unit>[s] ago          unit: second, minute, hour, day, week (n may be "a"/"an")
//! @<epoch seconds>
//! <RFC 3339>                 2020-03-03T10:00:00+02:00
//! YYYY-MM-DD HH:MM:SS +ZZZZ
//! YYYY-MM-DD[( |T)HH:MM[:SS[.f]]]
//! YYYY-MM | YYYY
//! HH:MM[:SS]                 today, or yesterday if that is still in the future
//! ```
//!
//! Forms without an offset are taken as UTC. Ambiguity always resolves
//! toward the past.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::error::{TimeError, TimeResult};
use crate::normalize::seconds_to_timestamp;

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

const NANOS_PER_SEC: i128 = 1_000_000_000;

/// Parse free-form text into a UTC instant, resolving relative forms
/// against `now`.
pub fn parse_text(text: &str, now: DateTime<Utc>) -> TimeResult<DateTime<Utc>> {
    let normalized = text.trim().to_ascii_lowercase();
    parse_keyword(&normalized, now)
        .or_else(|| parse_relative(&normalized, now))
        .or_else(|| parse_absolute(text.trim()))
        .or_else(|| parse_time_of_day(&normalized, now))
        .map_or_else(|| parse_epoch(&normalized, text), Ok)
}

fn parse_keyword(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match text {
        "now" => Some(now),
        "today" => Some(midnight(now.date_naive())),
        "yesterday" => now.date_naive().pred_opt().map(midnight),
        _ => None,
    }
}

fn parse_relative(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let mut parts = text.split_whitespace();
    let (count, unit, ago) = (parts.next()?, parts.next()?, parts.next()?);
    if ago != "ago" || parts.next().is_some() {
        return None;
    }
    let count: u32 = match count {
        "a" | "an" => 1,
        n => n.parse().ok()?,
    };
    let unit_secs: i64 = match unit.trim_end_matches('s') {
        "sec" | "second" => 1,
        "min" | "minute" => 60,
        "hr" | "hour" => 3_600,
        "day" => 86_400,
        "week" => 604_800,
        _ => return None,
    };
    let delta = Duration::try_seconds(i64::from(count).checked_mul(unit_secs)?)?;
    now.checked_sub_signed(delta)
}

fn parse_absolute(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S %z") {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(midnight(date));
    }
    let month_start = format!("{text}-01");
    if let Ok(date) = NaiveDate::parse_from_str(&month_start, "%Y-%m-%d") {
        if text.len() == 7 {
            return Some(midnight(date));
        }
    }
    if text.len() == 4 && text.bytes().all(|b| b.is_ascii_digit()) {
        let year: i32 = text.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1).map(midnight);
    }
    None
}

fn parse_time_of_day(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let time = TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(text, format).ok())?;
    let today = Utc.from_utc_datetime(&now.date_naive().and_time(time));
    if today <= now {
        Some(today)
    } else {
        today.checked_sub_signed(Duration::days(1))
    }
}

fn parse_epoch(text: &str, original: &str) -> TimeResult<DateTime<Utc>> {
    let Some(seconds) = text.strip_prefix('@') else {
        return Err(TimeError::invalid(
            format!("{original:?}"),
            "text could not be parsed as a date or time",
        ));
    };
    let seconds: f64 = seconds
        .parse()
        .map_err(|_| TimeError::invalid(format!("{original:?}"), "bad epoch seconds"))?;
    let nanos = seconds_to_timestamp(seconds)?.as_nanos();
    let subsec = nanos.rem_euclid(NANOS_PER_SEC) as u32;
    i64::try_from(nanos.div_euclid(NANOS_PER_SEC))
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, subsec).single())
        .ok_or_else(|| TimeError::invalid(format!("{original:?}"), "out of range"))
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}
