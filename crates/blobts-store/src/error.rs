use blobts_codec::NameError;
use blobts_pipeline::PipelineError;
use blobts_repo::RepoError;
use blobts_time::TimeError;
use thiserror::Error;

/// Errors about individual records.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BlobError {
    /// A payload arrived in a shape other than bytes.
    #[error("payload must be {expected}, found {found}")]
    WrongType { expected: &'static str, found: String },

    /// The record was written by a newer format version. Readers skip it.
    #[error("record {name:?} has format version {version}; the highest supported is {max}")]
    UnsupportedFormatVersion { name: String, version: u64, max: u8 },

    #[error("malformed record name {name:?}: {reason}")]
    MalformedName { name: String, reason: String },

    /// A freshly written record did not read back as written.
    #[error("verification of record {name:?} failed: {reason}")]
    VerificationFailed { name: String, reason: String },
}

impl From<NameError> for BlobError {
    fn from(err: NameError) -> Self {
        match err {
            NameError::Malformed { name, reason } => Self::MalformedName { name, reason },
            NameError::UnsupportedVersion { name, version, max } => {
                Self::UnsupportedFormatVersion { name, version, max }
            }
            NameError::Encode(e) => Self::MalformedName {
                name: String::new(),
                reason: e.to_string(),
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("repository error: {0}")]
    Repo(#[from] RepoError),

    #[error("record error: {0}")]
    Blob(#[from] BlobError),

    #[error("time error: {0}")]
    Time(#[from] TimeError),

    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<NameError> for StoreError {
    fn from(err: NameError) -> Self {
        Self::Blob(err.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
