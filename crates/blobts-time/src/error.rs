use thiserror::Error;

/// Errors produced while normalizing a time input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimeError {
    /// The input has an accepted shape but no usable value: non-finite or
    /// out-of-range seconds, unparseable text, a skipped local time.
    #[error("invalid time {input}: {reason}")]
    Invalid { input: String, reason: String },

    /// The input has a shape that is never accepted.
    #[error("unhandled time input of type {kind}; expected null, a number or a string")]
    UnhandledType { kind: String },
}

impl TimeError {
    pub(crate) fn invalid(input: impl ToString, reason: impl Into<String>) -> Self {
        Self::Invalid {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias for normalization.
pub type TimeResult<T> = Result<T, TimeError>;
