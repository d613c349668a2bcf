use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use num_bigint::{BigInt, BigUint, Sign};
use serde::{Deserialize, Serialize};

use crate::error::{EncodeError, EncodeResult};

/// Textual alphabet used for record name tokens.
///
/// None of the alphabets produce `/`, `\` or `.`, so every token is usable as
/// a file name component. `Base16` and `Base32` are single-case and safe on
/// case-insensitive filesystems; `Base64Url` is shorter but case-sensitive
/// and must not be used where the filesystem folds case.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Lower-case hexadecimal.
    Base16,
    /// RFC 4648 upper-case base32 without padding.
    #[default]
    Base32,
    /// RFC 4648 URL-safe base64 without padding.
    Base64Url,
}

impl Encoding {
    pub const ALL: [Encoding; 3] = [Self::Base16, Self::Base32, Self::Base64Url];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Base16 => "base16",
            Self::Base32 => "base32",
            Self::Base64Url => "base64url",
        }
    }

    /// Whether tokens survive a case-folding filesystem.
    pub fn is_case_insensitive_safe(&self) -> bool {
        !matches!(self, Self::Base64Url)
    }

    fn encode_bytes(&self, bytes: &[u8]) -> String {
        match self {
            Self::Base16 => hex::encode(bytes),
            Self::Base32 => data_encoding::BASE32_NOPAD.encode(bytes),
            Self::Base64Url => URL_SAFE_NO_PAD.encode(bytes),
        }
    }

    fn decode_bytes(&self, text: &str) -> EncodeResult<Vec<u8>> {
        let decoded = match self {
            Self::Base16 => hex::decode(text).map_err(|e| e.to_string()),
            Self::Base32 => data_encoding::BASE32_NOPAD
                .decode(text.as_bytes())
                .map_err(|e| e.to_string()),
            Self::Base64Url => URL_SAFE_NO_PAD.decode(text).map_err(|e| e.to_string()),
        };
        decoded.map_err(|reason| self.invalid(text, reason))
    }

    fn invalid(&self, text: &str, reason: impl Into<String>) -> EncodeError {
        EncodeError::Invalid {
            encoding: self.name(),
            text: text.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "base16" | "b16" | "hex" => Ok(Self::Base16),
            "base32" | "b32" => Ok(Self::Base32),
            "base64url" | "urlsafe_b64" | "b64url" => Ok(Self::Base64Url),
            other => Err(format!(
                "unknown encoding {other:?} (expected base16, base32 or base64url)"
            )),
        }
    }
}

/// Reversibly encodes an integer as a short token.
///
/// Integers are serialized big-endian (two's complement when signed) and
/// then run through the configured [`Encoding`]. With a fixed bit width every
/// token has the same length; otherwise the shortest byte length able to
/// hold the value is used, which never shrinks as `|i|` grows and is never
/// zero bytes, so `0` still encodes to a non-empty token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseEncoder {
    encoding: Encoding,
    signed: bool,
    byte_len: Option<usize>,
}

impl BaseEncoder {
    /// Variable-length encoder.
    pub fn variable(encoding: Encoding, signed: bool) -> Self {
        Self {
            encoding,
            signed,
            byte_len: None,
        }
    }

    /// Fixed-length encoder for integers of at most `bits` bits of magnitude.
    pub fn fixed(encoding: Encoding, bits: u32, signed: bool) -> Self {
        let byte_len = Self::byte_len_for_bits(u64::from(bits), signed);
        Self {
            encoding,
            signed,
            byte_len: Some(byte_len),
        }
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// Byte length of every token in fixed mode.
    pub fn fixed_byte_len(&self) -> Option<usize> {
        self.byte_len
    }

    fn byte_len_for_bits(bits: u64, signed: bool) -> usize {
        let len = (bits + 7 + u64::from(signed)) / 8;
        len.max(1) as usize
    }

    /// Encode an integer.
    pub fn encode(&self, value: &BigInt) -> EncodeResult<String> {
        let negative = value.sign() == Sign::Minus;
        if negative && !self.signed {
            return Err(self.out_of_range(value, "negative value for unsigned encoder"));
        }
        let len = self
            .byte_len
            .unwrap_or_else(|| Self::byte_len_for_bits(value.magnitude().bits(), self.signed));
        let minimal = if self.signed {
            value.to_signed_bytes_be()
        } else {
            value.magnitude().to_bytes_be()
        };
        if minimal.len() > len {
            return Err(self.out_of_range(value, &format!("needs more than {len} bytes")));
        }
        let fill = if negative { 0xFF } else { 0x00 };
        let mut bytes = vec![fill; len - minimal.len()];
        bytes.extend_from_slice(&minimal);
        Ok(self.encoding.encode_bytes(&bytes))
    }

    /// Decode a token produced by [`encode`](Self::encode).
    pub fn decode(&self, text: &str) -> EncodeResult<BigInt> {
        let bytes = self.encoding.decode_bytes(text)?;
        if bytes.is_empty() {
            return Err(self.encoding.invalid(text, "empty token"));
        }
        if let Some(len) = self.byte_len {
            if bytes.len() != len {
                return Err(self.encoding.invalid(
                    text,
                    format!("expected {len} bytes, got {}", bytes.len()),
                ));
            }
        }
        if self.signed {
            Ok(BigInt::from_signed_bytes_be(&bytes))
        } else {
            Ok(BigInt::from(BigUint::from_bytes_be(&bytes)))
        }
    }

    fn out_of_range(&self, value: &BigInt, reason: &str) -> EncodeError {
        EncodeError::OutOfRange {
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}
