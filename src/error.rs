//! Error types for the newebpay-mpg library.

use thiserror::Error;

use crate::models::EncryptType;

/// Main error type for the newebpay-mpg library.
#[derive(Error, Debug)]
pub enum MpgError {
    /// Empty or malformed field mapping, or a trade-info field that breaks a gateway rule
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Cipher setup or operation failed
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Character encoding failed
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Encryption mode the pipeline cannot produce
    #[error("Unsupported encryption type: {0:?}")]
    UnsupportedEncryption(EncryptType),

    /// TradeSha did not match the received TradeInfo
    #[error("TradeSha checksum mismatch")]
    ChecksumMismatch,

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex error
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// Result type alias for newebpay-mpg operations.
pub type Result<T> = std::result::Result<T, MpgError>;
