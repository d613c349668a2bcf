use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Decryption failed: wrong key, tampered or truncated token.
    #[error("token failed authentication")]
    Authentication,

    #[error("compression with {algorithm} failed: {source}")]
    Compression {
        algorithm: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("decompression with {algorithm} failed: {source}")]
    Decompression {
        algorithm: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown compression algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("invalid encryption key: {0}")]
    InvalidKey(String),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
