use std::fmt;

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{PipelineError, PipelineResult};

/// Leading byte of every token written by [`Aes256GcmCipher`].
pub const TOKEN_VERSION: u8 = 0x01;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// An authenticated, symmetric encryption stage.
///
/// `decrypt` must reject anything that `encrypt` with the same key did not
/// produce, with [`PipelineError::Authentication`].
pub trait Cipher: fmt::Debug + Send + Sync {
    fn encrypt(&self, plaintext: &[u8]) -> PipelineResult<Vec<u8>>;

    fn decrypt(&self, token: &[u8]) -> PipelineResult<Vec<u8>>;
}

/// 256-bit symmetric key.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionKey([u8; KEY_LEN]);

impl EncryptionKey {
    /// Generate a new random key from the OS RNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// URL-safe base64 with padding, 44 characters.
    pub fn to_text(&self) -> String {
        URL_SAFE.encode(self.0)
    }

    /// Parse the form produced by [`to_text`](Self::to_text). Surrounding
    /// whitespace, such as a trailing newline in a key file, is ignored.
    pub fn from_text(text: &str) -> PipelineResult<Self> {
        let bytes = URL_SAFE
            .decode(text.trim())
            .map_err(|e| PipelineError::InvalidKey(e.to_string()))?;
        let bytes: [u8; KEY_LEN] = bytes.try_into().map_err(|b: Vec<u8>| {
            PipelineError::InvalidKey(format!("expected {KEY_LEN} bytes, got {}", b.len()))
        })?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncryptionKey(<redacted>)")
    }
}

/// Generate a new random encryption key.
pub fn generate_key() -> EncryptionKey {
    EncryptionKey::generate()
}

/// AES-256-GCM with a fresh random nonce per token.
///
/// Token layout: `[TOKEN_VERSION][12-byte nonce][ciphertext || 16-byte tag]`.
#[derive(Clone)]
pub struct Aes256GcmCipher {
    cipher: Aes256Gcm,
}

impl Aes256GcmCipher {
    pub fn new(key: &EncryptionKey) -> PipelineResult<Self> {
        let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
            .map_err(|e| PipelineError::InvalidKey(e.to_string()))?;
        Ok(Self { cipher })
    }
}

impl Cipher for Aes256GcmCipher {
    fn encrypt(&self, plaintext: &[u8]) -> PipelineResult<Vec<u8>> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
            .map_err(|_| PipelineError::Authentication)?;

        let mut token = Vec::with_capacity(1 + NONCE_LEN + ciphertext.len());
        token.push(TOKEN_VERSION);
        token.extend_from_slice(&nonce_bytes);
        token.extend_from_slice(&ciphertext);
        Ok(token)
    }

    fn decrypt(&self, token: &[u8]) -> PipelineResult<Vec<u8>> {
        if token.len() < 1 + NONCE_LEN + TAG_LEN || token[0] != TOKEN_VERSION {
            return Err(PipelineError::Authentication);
        }
        let (nonce, ciphertext) = token[1..].split_at(NONCE_LEN);
        self.cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| PipelineError::Authentication)
    }
}

impl fmt::Debug for Aes256GcmCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Aes256GcmCipher(<redacted>)")
    }
}
