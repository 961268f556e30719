//! VISCA message framing and field encoding.
//!
//! VISCA is a terminator-delimited protocol. Every message on the wire is:
//! - one address byte (`0x8x` command to device `x`, `0x88` broadcast,
//!   `0x9x`-style reply header on the way back)
//! - zero or more payload bytes, all below `0x80`
//! - the terminator `0xFF`
//!
//! This crate splits incoming chunks into messages, classifies their address
//! byte, encodes and decodes the packed integer fields carried in payloads,
//! and wraps reply bodies in the addressed envelope.

pub mod address;
pub mod codec;
pub mod error;
pub mod number;
pub mod reader;
pub mod writer;

pub use address::{
    reply_header, Address, ACK, BROADCAST, COMPLETION, DEVICE_ID_INQUIRY, ERROR_REPLY,
    INQUIRY_REPLY, NETWORK_CHANGE, SYNTAX_ERROR, TERMINATOR,
};
pub use codec::{encode_reply, split_messages, Message, Reply, ReplyKind};
pub use error::{FrameError, Result};
pub use reader::{ChunkReader, ReaderConfig};
pub use writer::MessageWriter;
