//! Error types for MIME codec operations.

/// Result type alias for MIME codec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// MIME codec error types.
///
/// The lenient decoders used while building a message never produce these;
/// they are returned by the strict helpers only.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid content type.
    #[error("Invalid content type: {0}")]
    InvalidContentType(String),

    /// Invalid encoding.
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Base64 decode error.
    #[error("Base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),
}
