use std::io::{ErrorKind, Write};
use std::time::Duration;

use bytes::{BufMut, BytesMut};
use viscasim_transport::ViscaStream;

use crate::address::TERMINATOR;
use crate::codec::Reply;
use crate::error::{FrameError, Result};
use crate::reader::transport_to_frame_error;

const INITIAL_BUFFER_CAPACITY: usize = 256;

/// Writes terminated VISCA messages to any `Write` stream.
///
/// The emulator side writes [`Reply`] values; controller side tooling writes
/// raw command bytes with [`MessageWriter::write_message`].
pub struct MessageWriter<T> {
    inner: T,
    buf: BytesMut,
}

impl<T: Write> MessageWriter<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Write one reply (blocking).
    pub fn write_reply(&mut self, reply: &Reply) -> Result<()> {
        self.write_replies(std::slice::from_ref(reply))
    }

    /// Write a batch of replies in order with a single flush.
    pub fn write_replies(&mut self, replies: &[Reply]) -> Result<()> {
        if replies.is_empty() {
            return Ok(());
        }
        self.buf.clear();
        for reply in replies {
            reply.encode(&mut self.buf);
        }
        self.write_buffered()
    }

    /// Write a raw message, appending the terminator if it is missing.
    pub fn write_message(&mut self, raw: &[u8]) -> Result<()> {
        self.buf.clear();
        self.buf.put_slice(raw);
        if raw.last() != Some(&TERMINATOR) {
            self.buf.put_u8(TERMINATOR);
        }
        self.write_buffered()
    }

    fn write_buffered(&mut self) -> Result<()> {
        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl MessageWriter<ViscaStream> {
    /// Create a writer for `ViscaStream`, applying a write timeout.
    pub fn with_timeout(inner: ViscaStream, write_timeout: Option<Duration>) -> Result<Self> {
        inner
            .set_write_timeout(write_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::new(inner))
    }
}
