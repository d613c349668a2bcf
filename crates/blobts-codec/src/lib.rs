//! Record name codec for blobts.
//!
//! A record's file name carries everything needed to place it in time: the
//! canonical timestamp merged with a random nonce, encoded as a
//! filesystem-safe token, followed by a short format-version suffix.
//!
//! ```text
//! <encode_signed(timestamp << nonce_bits | nonce)>.<encode_u8(version)>
//! ```
//!
//! # Layers
//!
//! - [`IntegerMerger`] -- packs a signed high integer and a fixed-width
//!   unsigned low integer into one integer, and splits it back
//! - [`BaseEncoder`] -- integer <-> text under a configurable [`Encoding`]
//! - [`NameCodec`] -- (timestamp, nonce) <-> record name, with version checks
//!
//! All three are pure and stateless after construction.

pub mod encoder;
pub mod error;
pub mod merger;
pub mod name;

pub use encoder::{BaseEncoder, Encoding};
pub use error::{EncodeError, EncodeResult, NameError, NameResult};
pub use merger::IntegerMerger;
pub use name::NameCodec;

pub use num_bigint::{BigInt, BigUint};
