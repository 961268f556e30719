use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use crate::error::Result;

/// A connected VISCA byte stream implementing `Read` and `Write`.
///
/// This is the I/O type handed out by [`crate::TcpTransport`] for both
/// accepted and outgoing connections.
pub struct ViscaStream {
    inner: TcpStream,
    peer: Option<SocketAddr>,
}

impl Read for ViscaStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for ViscaStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl ViscaStream {
    pub(crate) fn from_tcp(stream: TcpStream) -> Self {
        let peer = stream.peer_addr().ok();
        Self {
            inner: stream,
            peer,
        }
    }

    /// Set read timeout on the underlying stream.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_read_timeout(timeout).map_err(Into::into)
    }

    /// Set write timeout on the underlying stream.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_write_timeout(timeout).map_err(Into::into)
    }

    /// Disable Nagle's algorithm so short replies leave immediately.
    pub fn set_nodelay(&self, nodelay: bool) -> Result<()> {
        self.inner.set_nodelay(nodelay).map_err(Into::into)
    }

    /// Try to clone this stream (creates a new file descriptor).
    pub fn try_clone(&self) -> Result<Self> {
        let cloned = self.inner.try_clone()?;
        Ok(Self {
            inner: cloned,
            peer: self.peer,
        })
    }

    /// Remote address, captured when the stream was created.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer
    }
}

impl std::fmt::Debug for ViscaStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViscaStream")
            .field("type", &"tcp")
            .field("peer", &self.peer)
            .finish()
    }
}
