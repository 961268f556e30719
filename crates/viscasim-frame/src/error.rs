/// Errors that can occur while framing messages or decoding their fields.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Message is shorter than an address byte plus one payload byte.
    #[error("message too short ({len} bytes)")]
    TooShort { len: usize },

    /// Leading byte is not a VISCA command or broadcast address.
    #[error("invalid address byte {0:#04x}")]
    InvalidAddress(u8),

    /// Leading byte is not a VISCA reply header.
    #[error("invalid reply header {0:#04x}")]
    InvalidReplyHeader(u8),

    /// A payload slice runs past the end of the message.
    #[error("payload truncated (need {needed} bytes at offset {offset}, have {available})")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// A fixed-width numeric field has the wrong length.
    #[error("field length {actual}, expected {expected}")]
    FieldLength { expected: usize, actual: usize },

    /// 4-bit signed speed byte carries an unknown direction pattern.
    #[error("invalid s4 direction bits in {0:#04x}")]
    InvalidS4Sign(u8),

    /// 9-bit signed speed field carries a direction nibble outside 1..=3.
    #[error("invalid s9 direction {0:#04x}")]
    InvalidS9Sign(u8),

    /// Nibble-packed byte has high bits set.
    #[error("invalid nibble byte {0:#04x}")]
    InvalidNibble(u8),

    /// On/off flag byte is neither 0x02 nor 0x03.
    #[error("invalid flag byte {0:#04x}")]
    InvalidFlag(u8),

    /// An I/O error occurred while reading or writing messages.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed by the remote end.
    #[error("connection closed")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
