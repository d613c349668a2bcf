use std::fmt;

/// Canonical record timestamp: signed nanoseconds since the Unix epoch.
///
/// Negative values are pre-epoch instants and zero is a valid, distinct
/// timestamp. The range of `i128` comfortably covers any finite input the
/// normalizer accepts, so no sentinel value is ever needed.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i128);

impl Timestamp {
    /// The Unix epoch.
    pub const ZERO: Self = Self(0);

    pub const fn from_nanos(nanos: i128) -> Self {
        Self(nanos)
    }

    /// Whole seconds since the epoch; nanoseconds are appended.
    pub fn from_secs_nanos(secs: i64, nanos: u32) -> Self {
        Self(i128::from(secs) * 1_000_000_000 + i128::from(nanos))
    }

    pub const fn as_nanos(&self) -> i128 {
        self.0
    }

    /// Returns `true` for pre-epoch instants.
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

impl From<i128> for Timestamp {
    fn from(nanos: i128) -> Self {
        Self(nanos)
    }
}

impl From<i64> for Timestamp {
    fn from(nanos: i64) -> Self {
        Self(i128::from(nanos))
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({}ns)", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One end of a time range query.
///
/// Ordering: `NegInfinity` < every `At(_)` < `PosInfinity`, and `At` values
/// compare by timestamp. Infinite endpoints exist only in queries; nothing
/// infinite is ever persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Endpoint {
    NegInfinity,
    At(Timestamp),
    PosInfinity,
}

impl Endpoint {
    /// Returns `true` if `ts` lies in the inclusive range `[self, upper]`.
    pub fn contains_up_to(&self, upper: &Endpoint, ts: Timestamp) -> bool {
        let point = Endpoint::At(ts);
        *self <= point && point <= *upper
    }
}

impl From<Timestamp> for Endpoint {
    fn from(ts: Timestamp) -> Self {
        Self::At(ts)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegInfinity => write!(f, "-inf"),
            Self::At(ts) => write!(f, "{ts}"),
            Self::PosInfinity => write!(f, "+inf"),
        }
    }
}
