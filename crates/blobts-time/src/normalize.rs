use blobts_types::{Endpoint, TimeInput, Timestamp, Zone};
use chrono::offset::LocalResult;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;
use tracing::warn;

use crate::error::{TimeError, TimeResult};
use crate::text::parse_text;

const NANOS_PER_SEC: f64 = 1e9;

/// Normalize a time input against the current wall clock.
pub fn normalize(input: &TimeInput) -> TimeResult<Timestamp> {
    normalize_at(input, Utc::now())
}

/// Normalize a time input, resolving `Now` and relative text against `now`.
pub fn normalize_at(input: &TimeInput, now: DateTime<Utc>) -> TimeResult<Timestamp> {
    match input {
        TimeInput::Now => Ok(instant_to_timestamp(&now)),
        TimeInput::Seconds(seconds) => seconds_to_timestamp(*seconds),
        TimeInput::Calendar { datetime, zone } => calendar_to_timestamp(datetime, *zone),
        TimeInput::Instant(instant) => Ok(instant_to_timestamp(instant)),
        TimeInput::Text(text) => parse_text(text, now).map(|dt| instant_to_timestamp(&dt)),
    }
}

/// Normalize one end of a range query.
///
/// An absent bound or NaN seconds yield `default`; infinite seconds yield
/// the matching infinite endpoint. Everything else goes through
/// [`normalize`].
pub fn normalize_bound(input: Option<&TimeInput>, default: Endpoint) -> TimeResult<Endpoint> {
    match input {
        None => Ok(default),
        Some(TimeInput::Seconds(s)) if s.is_nan() => Ok(default),
        Some(TimeInput::Seconds(s)) if *s == f64::INFINITY => Ok(Endpoint::PosInfinity),
        Some(TimeInput::Seconds(s)) if *s == f64::NEG_INFINITY => Ok(Endpoint::NegInfinity),
        Some(input) => normalize(input).map(Endpoint::At),
    }
}

/// `round(seconds * 1e9)`, rounding half to even.
pub fn seconds_to_timestamp(seconds: f64) -> TimeResult<Timestamp> {
    if !seconds.is_finite() {
        return Err(TimeError::invalid(
            seconds,
            "seconds must be finite and not NaN to be used in a file name",
        ));
    }
    let nanos = (seconds * NANOS_PER_SEC).round_ties_even();
    if !nanos.is_finite() || nanos.abs() >= i128::MAX as f64 {
        return Err(TimeError::invalid(seconds, "out of range"));
    }
    Ok(Timestamp::from_nanos(nanos as i128))
}

/// Map untyped input (command line, JSON documents) to a [`TimeInput`].
pub fn from_json(value: &Value) -> TimeResult<TimeInput> {
    match value {
        Value::Null => Ok(TimeInput::Now),
        Value::Number(n) => n
            .as_f64()
            .map(TimeInput::Seconds)
            .ok_or_else(|| TimeError::invalid(n, "not representable as seconds")),
        Value::String(s) => Ok(TimeInput::Text(s.clone())),
        Value::Bool(_) => Err(TimeError::UnhandledType { kind: "bool".into() }),
        Value::Array(_) => Err(TimeError::UnhandledType { kind: "array".into() }),
        Value::Object(_) => Err(TimeError::UnhandledType { kind: "object".into() }),
    }
}

pub(crate) fn instant_to_timestamp<Tz: TimeZone>(instant: &DateTime<Tz>) -> Timestamp {
    Timestamp::from_secs_nanos(instant.timestamp(), instant.timestamp_subsec_nanos())
}

fn calendar_to_timestamp(datetime: &NaiveDateTime, zone: Zone) -> TimeResult<Timestamp> {
    match zone {
        Zone::Utc => Ok(instant_to_timestamp(&Utc.from_utc_datetime(datetime))),
        Zone::Fixed(offset) => resolve_local(datetime, offset.from_local_datetime(datetime)),
        Zone::Local => resolve_local(datetime, Local.from_local_datetime(datetime)),
    }
}

fn resolve_local<Tz: TimeZone>(
    datetime: &NaiveDateTime,
    resolved: LocalResult<DateTime<Tz>>,
) -> TimeResult<Timestamp> {
    match resolved {
        LocalResult::Single(dt) => Ok(instant_to_timestamp(&dt)),
        LocalResult::Ambiguous(earliest, _) => {
            warn!(%datetime, "ambiguous local time; using the earlier instant");
            Ok(instant_to_timestamp(&earliest))
        }
        LocalResult::None => Err(TimeError::invalid(
            datetime,
            "local time does not exist in this zone",
        )),
    }
}
