use std::path::PathBuf;

use thiserror::Error;

/// The result type used across the crate.
pub type Result<T> = std::result::Result<T, XiError>;

#[derive(Debug, Error)]
pub enum XiError {
    /// Rejected before any split is computed.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("no Xi record for rank {r} at {}", .path.display())]
    DataNotFound { r: usize, path: PathBuf },

    #[error("malformed Xi record: {0}")]
    MalformedRecord(String),

    #[error("failed to decode Xi record: {0}")]
    Decode(#[from] postcard::Error),

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl XiError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        XiError::InvalidConfiguration(msg.into())
    }
}
