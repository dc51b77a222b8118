use dstack_handler::HandlerError;
use dstack_protocol::ProtocolError;

use crate::encryption::EncryptionError;

/// Errors that can occur in frame operations.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The object could not be encoded.
    #[error("handler error: {0}")]
    Handler(#[from] HandlerError),

    /// The server rejected the request or could not be reached.
    #[error("server error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The payload could not be encrypted or decrypted.
    #[error("encryption error: {0}")]
    Encryption(#[from] EncryptionError),

    /// A commit parameter is not a scalar.
    #[error("parameter '{key}' must be a string, number or boolean")]
    InvalidParam { key: String },

    /// The stack path is empty after normalization.
    #[error("invalid stack path '{0}'")]
    InvalidStack(String),

    /// The push response carried no `url`.
    #[error("server response has no url: {0}")]
    MissingUrl(String),

    /// Attachment data is not valid base64.
    #[error("attachment data is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    /// JSON serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
