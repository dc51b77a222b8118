use std::fmt;

use dstack::config::ConfigError;
use dstack::frame::FrameError;
use dstack::protocol::ProtocolError;
use dstack::Error;

// Exit codes follow sysexits-style conventions.
pub const SUCCESS: i32 = 0;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const CONFIG: i32 = 78;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn config_error(context: &str, err: ConfigError) -> CliError {
    CliError::new(CONFIG, format!("{context}: {err}"))
}

pub fn protocol_error(context: &str, err: ProtocolError) -> CliError {
    let code = match &err {
        ProtocolError::Status {
            status: 401 | 403, ..
        } => PERMISSION_DENIED,
        ProtocolError::Transport { source, .. } if source.is_timeout() => TIMEOUT,
        ProtocolError::Status { .. }
        | ProtocolError::Transport { .. }
        | ProtocolError::Decode { .. }
        | ProtocolError::Other(_) => TRANSPORT_ERROR,
        ProtocolError::Client(_) => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Protocol(err) => protocol_error(context, err),
        FrameError::Handler(_) | FrameError::InvalidParam { .. } | FrameError::InvalidStack(_) => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        FrameError::MissingUrl(_) | FrameError::Decode(_) => {
            CliError::new(TRANSPORT_ERROR, format!("{context}: {err}"))
        }
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

pub fn dstack_error(context: &str, err: Error) -> CliError {
    match err {
        Error::Config(err) => config_error(context, err),
        Error::Protocol(err) => protocol_error(context, err),
        Error::Frame(err) => frame_error(context, err),
    }
}
