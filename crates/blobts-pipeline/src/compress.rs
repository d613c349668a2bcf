use std::collections::BTreeMap;
use std::fmt;
use std::io::{Read, Write};
use std::sync::Arc;

use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;

use crate::error::{PipelineError, PipelineResult};

/// Default zstd level.
pub const ZSTD_LEVEL: i32 = 3;

/// A lossless byte-to-byte compression stage.
pub trait Compressor: fmt::Debug + Send + Sync {
    /// Identifier used in configuration, e.g. `"zstd"`.
    fn id(&self) -> &'static str;

    fn compress(&self, data: &[u8]) -> PipelineResult<Vec<u8>>;

    fn decompress(&self, data: &[u8]) -> PipelineResult<Vec<u8>>;
}

#[derive(Clone, Copy, Debug)]
pub struct ZstdCompressor {
    level: i32,
}

impl ZstdCompressor {
    pub fn new(level: i32) -> Self {
        Self { level }
    }
}

impl Default for ZstdCompressor {
    fn default() -> Self {
        Self::new(ZSTD_LEVEL)
    }
}

impl Compressor for ZstdCompressor {
    fn id(&self) -> &'static str {
        "zstd"
    }

    fn compress(&self, data: &[u8]) -> PipelineResult<Vec<u8>> {
        zstd::encode_all(data, self.level).map_err(|source| PipelineError::Compression {
            algorithm: self.id(),
            source,
        })
    }

    fn decompress(&self, data: &[u8]) -> PipelineResult<Vec<u8>> {
        zstd::decode_all(data).map_err(|source| PipelineError::Decompression {
            algorithm: self.id(),
            source,
        })
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GzipCompressor;

impl Compressor for GzipCompressor {
    fn id(&self) -> &'static str {
        "gzip"
    }

    fn compress(&self, data: &[u8]) -> PipelineResult<Vec<u8>> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(data)
            .and_then(|()| encoder.finish())
            .map_err(|source| PipelineError::Compression {
                algorithm: self.id(),
                source,
            })
    }

    fn decompress(&self, data: &[u8]) -> PipelineResult<Vec<u8>> {
        let mut out = Vec::new();
        GzDecoder::new(data)
            .read_to_end(&mut out)
            .map_err(|source| PipelineError::Decompression {
                algorithm: self.id(),
                source,
            })?;
        Ok(out)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ZlibCompressor;

impl Compressor for ZlibCompressor {
    fn id(&self) -> &'static str {
        "zlib"
    }

    fn compress(&self, data: &[u8]) -> PipelineResult<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(data)
            .and_then(|()| encoder.finish())
            .map_err(|source| PipelineError::Compression {
                algorithm: self.id(),
                source,
            })
    }

    fn decompress(&self, data: &[u8]) -> PipelineResult<Vec<u8>> {
        let mut out = Vec::new();
        ZlibDecoder::new(data)
            .read_to_end(&mut out)
            .map_err(|source| PipelineError::Decompression {
                algorithm: self.id(),
                source,
            })?;
        Ok(out)
    }
}

/// Compressors addressable by identifier.
#[derive(Clone, Debug)]
pub struct CompressorRegistry {
    compressors: BTreeMap<&'static str, Arc<dyn Compressor>>,
}

impl CompressorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            compressors: BTreeMap::new(),
        }
    }

    /// A registry holding `zstd`, `gzip` and `zlib`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ZstdCompressor::default()));
        registry.register(Arc::new(GzipCompressor));
        registry.register(Arc::new(ZlibCompressor));
        registry
    }

    /// Add a compressor, replacing any previous one with the same id.
    pub fn register(&mut self, compressor: Arc<dyn Compressor>) {
        self.compressors.insert(compressor.id(), compressor);
    }

    pub fn get(&self, id: &str) -> PipelineResult<Arc<dyn Compressor>> {
        self.compressors
            .get(id)
            .cloned()
            .ok_or_else(|| PipelineError::UnknownAlgorithm(id.to_string()))
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.compressors.keys().copied()
    }
}

impl Default for CompressorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
