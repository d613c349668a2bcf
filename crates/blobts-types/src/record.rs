use crate::temporal::Timestamp;

/// A record as seen by the caller: its canonical timestamp and the raw
/// payload, after the egress pipeline has been applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub time_utc_ns: Timestamp,
    pub data: Vec<u8>,
}

impl Record {
    pub fn new(time_utc_ns: Timestamp, data: Vec<u8>) -> Self {
        Self { time_utc_ns, data }
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
