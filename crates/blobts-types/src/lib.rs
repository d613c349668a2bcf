//! Foundation types for blobts.
//!
//! Every other blobts crate depends on `blobts-types`.
//!
//! # Key Types
//!
//! - [`Timestamp`]: canonical signed nanoseconds since the Unix epoch
//! - [`Endpoint`]: a range-query bound that may be infinite
//! - [`TimeInput`]: every accepted way of expressing a point in time
//! - [`Record`]: a timestamp plus the caller-visible payload

pub mod input;
pub mod record;
pub mod temporal;

pub use input::{TimeInput, Zone};
pub use record::Record;
pub use temporal::{Endpoint, Timestamp};

/// Highest record file format version this build can read and the version
/// it writes.
pub const FORMAT_VERSION: u8 = 1;

/// Default width of the per-write random nonce, in bits.
pub const DEFAULT_NONCE_BITS: u32 = 256;
