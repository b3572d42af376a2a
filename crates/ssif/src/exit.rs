use std::fmt;
use std::io;

use ssif_bus::BusError;
use ssif_endpoint::{ErrorKind, SsifError};
use ssif_frame::FrameError;

// Process exit codes shared by every subcommand.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const HEALTH_CHECK_FAILED: i32 = 30;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
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

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound => TRANSPORT_ERROR,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn bus_error(context: &str, err: BusError) -> CliError {
    match err {
        BusError::Open { source, .. } | BusError::Io(source) => io_error(context, source),
        BusError::NoResponse { .. } => CliError::new(TIMEOUT, format!("{context}: {err}")),
        BusError::Unsupported(_) => CliError::new(INTERNAL, format!("{context}: {err}")),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn ssif_error(context: &str, err: SsifError) -> CliError {
    let code = match err.kind() {
        ErrorKind::InvalidRequest => USAGE,
        ErrorKind::NotReady => TIMEOUT,
        ErrorKind::Framing | ErrorKind::IdentityMismatch | ErrorKind::ResourceExhausted => {
            DATA_INVALID
        }
        ErrorKind::ResyncExhausted => FAILURE,
        ErrorKind::Discovery => TRANSPORT_ERROR,
        ErrorKind::Transport => match err {
            SsifError::Frame(FrameError::Bus { source, .. }) => {
                return bus_error(context, source);
            }
            _ => TRANSPORT_ERROR,
        },
    };
    CliError::new(code, format!("{context}: {err}"))
}
