use std::fmt;
use std::io;

use viscasim_device::DeviceError;
use viscasim_frame::FrameError;
use viscasim_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
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
        io::ErrorKind::ConnectionRefused | io::ErrorKind::AddrInUse => TRANSPORT_ERROR,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Bind { source, .. }
        | TransportError::Connect { source, .. }
        | TransportError::Accept(source)
        | TransportError::Io(source) => io_error(context, source),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

pub fn device_error(context: &str, err: DeviceError) -> CliError {
    match err {
        DeviceError::Transport(err) => transport_error(context, err),
        DeviceError::Frame(err) => frame_error(context, err),
        DeviceError::Io(err) => io_error(context, err),
        DeviceError::InvalidDevice(_) => CliError::new(USAGE, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, SocketAddr};

    use super::*;

    #[test]
    fn refused_connection_is_a_transport_error() {
        let err = TransportError::Connect {
            addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 5678)),
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        };
        let cli = device_error("connect failed", DeviceError::Transport(err));
        assert_eq!(cli.code, TRANSPORT_ERROR);
        assert!(cli.message.starts_with("connect failed: "));
    }

    #[test]
    fn timeouts_and_bad_config_map_to_their_codes() {
        let timeout = frame_error("read failed", FrameError::Io(io::ErrorKind::TimedOut.into()));
        assert_eq!(timeout.code, TIMEOUT);

        let usage = device_error("bind failed", DeviceError::InvalidDevice(0));
        assert_eq!(usage.code, USAGE);

        let closed = frame_error("read failed", FrameError::ConnectionClosed);
        assert_eq!(closed.code, FAILURE);
    }
}
