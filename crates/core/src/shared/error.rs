use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WarpError {
    #[error("audio source unavailable: {identifier}: {reason}")]
    SourceUnavailable { identifier: String, reason: String },
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),
    #[error("audio buffer is empty")]
    EmptyBuffer,
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("clip pool unavailable at {path}: {source}")]
    ResourceExhausted {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode audio: {0}")]
    Encode(String),
    #[error("i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl WarpError {
    pub fn invalid(message: impl Into<String>) -> Self {
        WarpError::InvalidParameter(message.into())
    }
}
