use std::io::{ErrorKind, Read};
use std::time::Duration;

use bytes::Bytes;
use viscasim_transport::ViscaStream;

use crate::error::{FrameError, Result};

/// Default size of a single read from the stream.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 4 * 1024;

/// Configuration for [`ChunkReader`].
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Upper bound on bytes returned by one [`ChunkReader::read_chunk`].
    pub read_chunk_size: usize,
    /// Read timeout for blocking operations.
    pub read_timeout: Option<Duration>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            read_timeout: None,
        }
    }
}

/// Reads raw chunks from any `Read` stream.
///
/// A chunk is whatever one successful `read` returned. Chunks are not joined:
/// a message split across two reads reaches the caller as two fragments.
pub struct ChunkReader<T> {
    inner: T,
    buf: Vec<u8>,
    config: ReaderConfig,
}

impl<T: Read> ChunkReader<T> {
    /// Create a new chunk reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, ReaderConfig::default())
    }

    /// Create a new chunk reader with explicit configuration.
    pub fn with_config(inner: T, config: ReaderConfig) -> Self {
        Self {
            inner,
            buf: vec![0u8; config.read_chunk_size.max(1)],
            config,
        }
    }

    /// Read the next non-empty chunk (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached.
    pub fn read_chunk(&mut self) -> Result<Bytes> {
        loop {
            match self.inner.read(&mut self.buf) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => return Ok(Bytes::copy_from_slice(&self.buf[..n])),
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

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current reader configuration.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }
}

impl ChunkReader<ViscaStream> {
    /// Create a chunk reader for `ViscaStream` and apply read timeout from config.
    pub fn with_config_stream(inner: ViscaStream, config: ReaderConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}

pub(crate) fn transport_to_frame_error(err: viscasim_transport::TransportError) -> FrameError {
    match err {
        viscasim_transport::TransportError::Io(io)
        | viscasim_transport::TransportError::Accept(io) => FrameError::Io(io),
        viscasim_transport::TransportError::Bind { source, .. }
        | viscasim_transport::TransportError::Connect { source, .. } => FrameError::Io(source),
    }
}
