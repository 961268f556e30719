//! Byte-stream transport for the VISCA camera emulator.
//!
//! VISCA-over-IP controllers open a plain TCP connection and exchange
//! `0xFF`-terminated messages over it. This crate owns the socket side of
//! that exchange:
//! - [`TcpTransport`] binds a listening socket and accepts connections
//! - [`ViscaStream`] wraps one connected socket (`Read` + `Write`)
//!
//! Nothing here knows about message boundaries; that is the job of
//! `viscasim-frame`.

pub mod error;
pub mod stream;
pub mod tcp;

pub use error::{Result, TransportError};
pub use stream::ViscaStream;
pub use tcp::{TcpTransport, DEFAULT_PORT};
