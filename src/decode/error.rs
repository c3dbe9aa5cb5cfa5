use thiserror::Error;

/// Per-file decoding failures. None of these affect other files in a batch.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The buffer could not be probed, holds no audio stream, or no decoder fits
    #[error("decoder setup failed: {0}")]
    Setup(String),

    /// A decoded frame uses a sample layout the normalizer does not accept
    #[error("unsupported sample format: {0}")]
    Format(String),

    /// Corrupt data in the middle of the stream
    #[error("decoding failed: {0}")]
    Stream(String),
}

pub type Result<T> = std::result::Result<T, DecodeError>;
