use std::path::{Path, PathBuf};

use blobts_codec::Encoding;
use blobts_pipeline::{EncryptionKey, PipelineConfig};
use blobts_types::DEFAULT_NONCE_BITS;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// On-disk store configuration, usually read from a TOML file.
///
/// ```toml
/// path = "/srv/blobs"
/// remote = "git@example.com:blobs.git"
/// compression = "zstd"
/// key_file = "/etc/blobts/key"
/// nonce_bits = 256
/// encoding = "base32"
/// ```
///
/// `compression`, `key_file`, `nonce_bits` and `encoding` shape the
/// repository's on-disk format and must not change once records exist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Working copy root.
    pub path: PathBuf,
    /// Clone URL used when `path` does not exist yet.
    pub remote: Option<String>,
    /// Compressor id: `zstd`, `gzip` or `zlib`.
    pub compression: Option<String>,
    /// File holding the text form of an encryption key.
    pub key_file: Option<PathBuf>,
    pub nonce_bits: u32,
    pub encoding: Encoding,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            remote: None,
            compression: None,
            key_file: None,
            nonce_bits: DEFAULT_NONCE_BITS,
            encoding: Encoding::default(),
        }
    }
}

impl StoreConfig {
    pub fn from_toml_str(text: &str) -> StoreResult<Self> {
        toml::from_str(text).map_err(|e| StoreError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> StoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml(&self) -> StoreResult<String> {
        toml::to_string_pretty(self).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Validate and load everything [`Store::open`](crate::Store::open) needs,
    /// including the key file.
    pub fn resolve(&self) -> StoreResult<StoreOptions> {
        let key = match &self.key_file {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    StoreError::Config(format!("cannot read key file {}: {e}", path.display()))
                })?;
                Some(EncryptionKey::from_text(&text)?)
            }
            None => None,
        };
        let options = StoreOptions {
            pipeline: PipelineConfig {
                compression: self.compression.clone(),
                key,
            },
            nonce_bits: self.nonce_bits,
            encoding: self.encoding,
        };
        options.validate()?;
        Ok(options)
    }
}

/// Resolved settings handed to [`Store::open`](crate::Store::open).
#[derive(Clone, Debug)]
pub struct StoreOptions {
    pub pipeline: PipelineConfig,
    pub nonce_bits: u32,
    pub encoding: Encoding,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            nonce_bits: DEFAULT_NONCE_BITS,
            encoding: Encoding::default(),
        }
    }
}

impl StoreOptions {
    pub fn with_compression(mut self, id: impl Into<String>) -> Self {
        self.pipeline.compression = Some(id.into());
        self
    }

    pub fn with_key(mut self, key: EncryptionKey) -> Self {
        self.pipeline.key = Some(key);
        self
    }

    pub fn with_nonce_bits(mut self, bits: u32) -> Self {
        self.nonce_bits = bits;
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn validate(&self) -> StoreResult<()> {
        if self.nonce_bits == 0 {
            return Err(StoreError::Config(
                "nonce_bits must be at least 1 so that equal timestamps get distinct names".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobts_pipeline::{generate_key, PipelineError};

    #[test]
    fn default_config() {
        let c = StoreConfig::default();
        assert_eq!(c.path, PathBuf::from("."));
        assert_eq!(c.nonce_bits, 256);
        assert_eq!(c.encoding, Encoding::Base32);
        assert!(c.compression.is_none());
        assert!(c.key_file.is_none());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let c = StoreConfig::from_toml_str("path = \"/srv/blobs\"\ncompression = \"zstd\"\n").unwrap();
        assert_eq!(c.path, PathBuf::from("/srv/blobs"));
        assert_eq!(c.compression.as_deref(), Some("zstd"));
        assert_eq!(c.nonce_bits, 256);
    }

    #[test]
    fn toml_roundtrip() {
        let c = StoreConfig {
            path: "/data".into(),
            remote: Some("https://example.com/blobs.git".into()),
            compression: Some("gzip".into()),
            key_file: Some("/etc/key".into()),
            nonce_bits: 64,
            encoding: Encoding::Base64Url,
        };
        assert_eq!(StoreConfig::from_toml_str(&c.to_toml().unwrap()).unwrap(), c);
    }

    #[test]
    fn unknown_field_rejected() {
        let err = StoreConfig::from_toml_str("compresion = \"zstd\"").unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn resolve_reads_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let key = generate_key();
        let key_path = dir.path().join("key");
        std::fs::write(&key_path, format!("{}\n", key.to_text())).unwrap();
        let c = StoreConfig {
            key_file: Some(key_path),
            ..StoreConfig::default()
        };
        assert_eq!(c.resolve().unwrap().pipeline.key, Some(key));
    }

    #[test]
    fn resolve_rejects_bad_key_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let key_path = dir.path().join("key");
        std::fs::write(&key_path, "definitely not a key").unwrap();
        let c = StoreConfig {
            key_file: Some(key_path),
            ..StoreConfig::default()
        };
        assert!(matches!(
            c.resolve(),
            Err(StoreError::Pipeline(PipelineError::InvalidKey(_)))
        ));

        let c = StoreConfig {
            key_file: Some(dir.path().join("missing")),
            ..StoreConfig::default()
        };
        assert!(matches!(c.resolve(), Err(StoreError::Config(_))));
    }

    #[test]
    fn zero_nonce_bits_rejected() {
        let c = StoreConfig {
            nonce_bits: 0,
            ..StoreConfig::default()
        };
        assert!(matches!(c.resolve(), Err(StoreError::Config(_))));
    }
}
