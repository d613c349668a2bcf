//! Payload pipeline for blobts.
//!
//! Bytes on their way into the repository pass through
//! `encrypt(compress(payload))`; on the way out the inverse,
//! `decompress(decrypt(token))`. Both stages are optional and default to the
//! identity.

pub mod cipher;
pub mod compress;
pub mod error;
pub mod pipeline;

pub use cipher::{generate_key, Aes256GcmCipher, Cipher, EncryptionKey};
pub use compress::{Compressor, CompressorRegistry, GzipCompressor, ZlibCompressor, ZstdCompressor};
pub use error::{PipelineError, PipelineResult};
pub use pipeline::{BlobPipeline, PipelineConfig};
