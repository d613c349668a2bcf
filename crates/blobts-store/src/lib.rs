//! Time-indexed blob store over a replicated git working copy.
//!
//! Each record is one file in the working-copy root. Its name encodes the
//! record's timestamp together with a random nonce and a format version;
//! its content is the payload after the configured [`BlobPipeline`]. Range
//! queries decode names, filter, sort, and read payloads lazily.
//!
//! ```text
//! add:  TimeInput -> Timestamp -> name ; payload -> ingress -> file -> stage
//!       ... commit once -> push (pull + retry once on divergence)
//! get:  [pull] -> list -> decode names -> filter -> sort -> Records (egress per item)
//! ```
//!
//! [`BlobPipeline`]: blobts_pipeline::BlobPipeline

pub mod batch;
pub mod config;
pub mod error;
pub mod records;
pub mod store;

pub use batch::{parse_batch_line, payload_from_json, BatchEntry};
pub use config::{StoreConfig, StoreOptions};
pub use error::{BlobError, StoreError, StoreResult};
pub use records::Records;
pub use store::Store;
