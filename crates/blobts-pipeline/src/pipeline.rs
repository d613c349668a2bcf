use std::sync::Arc;

use tracing::debug;

use crate::cipher::{Aes256GcmCipher, Cipher, EncryptionKey};
use crate::compress::{Compressor, CompressorRegistry};
use crate::error::PipelineResult;

/// Which stages a pipeline runs.
#[derive(Clone, Debug, Default)]
pub struct PipelineConfig {
    /// Compressor id from the registry; `None` disables compression.
    pub compression: Option<String>,
    /// AES-256-GCM key; `None` disables encryption.
    pub key: Option<EncryptionKey>,
}

/// Reversible payload transformation: `ingress` before write, `egress` after read.
#[derive(Clone, Debug, Default)]
pub struct BlobPipeline {
    compressor: Option<Arc<dyn Compressor>>,
    cipher: Option<Arc<dyn Cipher>>,
}

impl BlobPipeline {
    pub fn new(compressor: Option<Arc<dyn Compressor>>, cipher: Option<Arc<dyn Cipher>>) -> Self {
        Self { compressor, cipher }
    }

    /// Pass-through pipeline.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Resolve a configuration against a compressor registry.
    pub fn from_config(config: &PipelineConfig, registry: &CompressorRegistry) -> PipelineResult<Self> {
        let compressor = config
            .compression
            .as_deref()
            .map(|id| registry.get(id))
            .transpose()?;
        let cipher = config
            .key
            .as_ref()
            .map(|key| Aes256GcmCipher::new(key).map(|c| Arc::new(c) as Arc<dyn Cipher>))
            .transpose()?;
        Ok(Self::new(compressor, cipher))
    }

    pub fn compression_id(&self) -> Option<&'static str> {
        self.compressor.as_ref().map(|c| c.id())
    }

    pub fn is_encrypted(&self) -> bool {
        self.cipher.is_some()
    }

    /// `encrypt(compress(payload))`.
    pub fn ingress(&self, payload: &[u8]) -> PipelineResult<Vec<u8>> {
        let compressed = match &self.compressor {
            Some(c) => c.compress(payload)?,
            None => payload.to_vec(),
        };
        let out = match &self.cipher {
            Some(c) => c.encrypt(&compressed)?,
            None => compressed,
        };
        debug!(input = payload.len(), output = out.len(), "ingress");
        Ok(out)
    }

    /// `decompress(decrypt(token))`.
    pub fn egress(&self, token: &[u8]) -> PipelineResult<Vec<u8>> {
        let decrypted = match &self.cipher {
            Some(c) => c.decrypt(token)?,
            None => token.to_vec(),
        };
        match &self.compressor {
            Some(c) => c.decompress(&decrypted),
            None => Ok(decrypted),
        }
    }
}
