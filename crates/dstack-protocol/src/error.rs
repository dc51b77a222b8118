/// Errors that can occur while talking to the server.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The server answered with something other than HTTP 200.
    #[error("server returned {status} for {endpoint}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The request never produced a response (connect, TLS, I/O, timeout).
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        source: reqwest::Error,
    },

    /// The response body is not valid JSON.
    #[error("failed to decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    /// The HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    Client(reqwest::Error),

    /// Failure reported by a custom protocol implementation.
    #[error("protocol error: {0}")]
    Other(String),
}

impl ProtocolError {
    /// HTTP status of a rejected request, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProtocolError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
