//! Address bytes and well-known reply codes.
//!
//! Commands are addressed `0x8x` where `x` is the device number (1..=7 on a
//! daisy chain). `0x88` is the broadcast address. Replies carry the header
//! `(x + 8) << 4`, so device 1 answers with `0x90`.

/// Terminates every message on the wire.
pub const TERMINATOR: u8 = 0xFF;

/// Broadcast address byte (commands and broadcast replies).
pub const BROADCAST: u8 = 0x88;

/// Command accepted into a socket.
pub const ACK: u8 = 0x41;

/// Command completed on socket 1.
pub const COMPLETION: u8 = 0x51;

/// Inquiry reply marker (also the socket-0 completion).
pub const INQUIRY_REPLY: u8 = 0x50;

/// Error reply marker; the next byte is the error code.
pub const ERROR_REPLY: u8 = 0x60;

/// Error code for malformed or unrecognised commands.
pub const SYNTAX_ERROR: u8 = 0x02;

/// Broadcast address-set / device-id exchange.
pub const DEVICE_ID_INQUIRY: u8 = 0x30;

/// Broadcast network-change notification sent when a controller attaches.
pub const NETWORK_CHANGE: u8 = 0x38;

/// Target of an incoming command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Address {
    /// `0x88`: every device on the chain.
    Broadcast,
    /// `0x8x`: the device with number `x`.
    Device(u8),
}

impl Address {
    /// Classify the leading byte of an incoming message.
    ///
    /// Returns `None` for anything outside `0x80..=0x8F`.
    pub fn classify(byte: u8) -> Option<Self> {
        match byte {
            BROADCAST => Some(Self::Broadcast),
            0x80..=0x8F => Some(Self::Device(byte & 0x0F)),
            _ => None,
        }
    }

    /// The wire byte for this address.
    pub fn to_byte(self) -> u8 {
        match self {
            Self::Broadcast => BROADCAST,
            Self::Device(n) => 0x80 | (n & 0x0F),
        }
    }
}

/// Reply header byte for replies sent by `device`.
pub fn reply_header(device: u8) -> u8 {
    (0x08 | (device & 0x07)) << 4
}

/// Returns true if `byte` is a unicast reply header (`0x90`..=`0xF0`).
pub fn is_reply_header(byte: u8) -> bool {
    byte & 0x0F == 0 && byte >= 0x90
}
