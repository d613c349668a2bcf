//! Timestamp normalization for blobts.
//!
//! Every way a caller can express a time ([`TimeInput`]) is reduced here to
//! one canonical [`Timestamp`]: signed nanoseconds since the Unix epoch.
//! Normalization happens before anything is written, so a [`TimeError`]
//! never leaves partial state behind.
//!
//! [`TimeInput`]: blobts_types::TimeInput
//! [`Timestamp`]: blobts_types::Timestamp

pub mod error;
pub mod normalize;
pub mod text;

pub use error::{TimeError, TimeResult};
pub use normalize::{from_json, normalize, normalize_at, normalize_bound, seconds_to_timestamp};
pub use text::parse_text;
