use thiserror::Error;

/// Errors from integer <-> text encoding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// The integer does not fit the encoder's signedness or fixed width.
    #[error("integer {value} does not fit encoder ({reason})")]
    OutOfRange { value: String, reason: String },

    /// The text is not a valid token for the encoding.
    #[error("invalid {encoding} token {text:?}: {reason}")]
    Invalid {
        encoding: &'static str,
        text: String,
        reason: String,
    },
}

/// Result alias for encoding operations.
pub type EncodeResult<T> = Result<T, EncodeError>;

/// Errors from record name parsing and construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
    /// The name cannot be decoded at all.
    #[error("malformed record name {name:?}: {reason}")]
    Malformed { name: String, reason: String },

    /// The name decodes, but was written by a newer format version.
    #[error(
        "record name {name:?} has format version {version}; the highest supported version is {max}"
    )]
    UnsupportedVersion { name: String, version: u64, max: u8 },

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

impl NameError {
    pub(crate) fn malformed(name: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias for name operations.
pub type NameResult<T> = Result<T, NameError>;
