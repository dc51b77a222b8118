use dstack_config::ConfigError;
use dstack_frame::FrameError;
use dstack_handler::HandlerError;
use dstack_protocol::ProtocolError;

/// Errors surfaced by the top-level frame operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Profile lookup or configuration file problem.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The server rejected a request or could not be reached.
    #[error("server error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Commit or push failed.
    #[error(transparent)]
    Frame(FrameError),
}

impl Error {
    /// HTTP status of a server rejection, if that is what this is.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Protocol(err) | Error::Frame(FrameError::Protocol(err)) => err.status(),
            _ => None,
        }
    }
}

// Protocol failures are lifted out of frame errors so callers match one variant.
impl From<FrameError> for Error {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::Protocol(err) => Error::Protocol(err),
            other => Error::Frame(other),
        }
    }
}

impl From<HandlerError> for Error {
    fn from(err: HandlerError) -> Self {
        Error::Frame(FrameError::Handler(err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
