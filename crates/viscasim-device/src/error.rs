/// Errors that can occur while serving or driving an emulated device.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] viscasim_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] viscasim_frame::FrameError),

    /// I/O error outside the framing layer (async serving).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Device numbers on a VISCA chain run from 1 to 7.
    #[error("invalid device number {0} (expected 1..=7)")]
    InvalidDevice(u8),
}

pub type Result<T> = std::result::Result<T, DeviceError>;
