use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

/// Zone attached to a structured calendar time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Zone {
    /// Coordinated Universal Time. Always exact.
    Utc,
    /// A fixed offset from UTC. Always exact.
    Fixed(FixedOffset),
    /// The process's local zone. Folded or skipped wall-clock times around
    /// DST transitions make this the one lossy input form.
    Local,
}

/// Every accepted way of expressing the time of a record or a query bound.
#[derive(Clone, Debug, PartialEq)]
pub enum TimeInput {
    /// Current wall-clock time. The default for writes.
    Now,
    /// Seconds since the epoch, fractional allowed.
    Seconds(f64),
    /// Calendar date and time with an explicit zone.
    Calendar { datetime: NaiveDateTime, zone: Zone },
    /// An already zone-resolved instant.
    Instant(DateTime<Utc>),
    /// Free-form text such as `"2020-03-03"` or `"5 minutes ago"`.
    Text(String),
}

impl TimeInput {
    /// Calendar time in UTC.
    pub fn utc(datetime: NaiveDateTime) -> Self {
        Self::Calendar {
            datetime,
            zone: Zone::Utc,
        }
    }
}

impl Default for TimeInput {
    fn default() -> Self {
        Self::Now
    }
}

impl From<f64> for TimeInput {
    fn from(seconds: f64) -> Self {
        Self::Seconds(seconds)
    }
}

impl From<i64> for TimeInput {
    fn from(seconds: i64) -> Self {
        Self::Seconds(seconds as f64)
    }
}

impl From<&str> for TimeInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for TimeInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<DateTime<Utc>> for TimeInput {
    fn from(instant: DateTime<Utc>) -> Self {
        Self::Instant(instant)
    }
}

impl From<DateTime<FixedOffset>> for TimeInput {
    fn from(instant: DateTime<FixedOffset>) -> Self {
        Self::Instant(instant.with_timezone(&Utc))
    }
}

impl fmt::Display for TimeInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Now => write!(f, "now"),
            Self::Seconds(s) => write!(f, "{s}s"),
            Self::Calendar { datetime, zone } => match zone {
                Zone::Utc => write!(f, "{datetime} UTC"),
                Zone::Fixed(offset) => write!(f, "{datetime} {offset}"),
                Zone::Local => write!(f, "{datetime} local"),
            },
            Self::Instant(instant) => write!(f, "{}", instant.to_rfc3339()),
            Self::Text(text) => write!(f, "\"{text}\""),
        }
    }
}
