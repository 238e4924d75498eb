//! SDK error types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the SDK
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid configuration (credentials, key/IV shape)
    #[error("configuration error: {0}")]
    Config(String),

    /// Cookie payload encryption/decryption failure
    #[error("crypto error: {0}")]
    Crypto(String),

    /// Network or TLS failure before a response exists
    #[error("transport error: {0}")]
    Transport(String),

    /// Service responded with status >= 400
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Local file access failure (multipart uploads)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Response body did not match the expected shape
    #[error("decode error: {0}")]
    Decode(String),
}

impl Error {
    /// Status code for HTTP-level errors
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if this is an HTTP "not found" error
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
