use std::io::{Read, Write};
use std::net::SocketAddr;
use std::time::Duration;

use tracing::{debug, info};
use viscasim_frame::{ChunkReader, FrameError, MessageWriter, ReaderConfig};
use viscasim_transport::ViscaStream;

use crate::error::Result;
use crate::session::Session;

/// One accepted controller connection and the session serving it.
pub struct Connection<R = ViscaStream, W = ViscaStream> {
    peer: Option<SocketAddr>,
    reader: ChunkReader<R>,
    writer: MessageWriter<W>,
    session: Session,
}

impl Connection<ViscaStream, ViscaStream> {
    /// Wrap an accepted stream, splitting it into read and write halves.
    pub fn from_stream(
        stream: ViscaStream,
        session: Session,
        reader_config: ReaderConfig,
        write_timeout: Option<Duration>,
    ) -> Result<Self> {
        let peer = stream.peer_addr();
        stream.set_nodelay(true)?;
        let reader_stream = stream.try_clone()?;
        let reader = ChunkReader::with_config_stream(reader_stream, reader_config)?;
        let writer = MessageWriter::with_timeout(stream, write_timeout)?;
        Ok(Self {
            peer,
            reader,
            writer,
            session,
        })
    }
}

impl<R: Read, W: Write> Connection<R, W> {
    /// Assemble a connection from already-built halves.
    pub fn from_parts(reader: ChunkReader<R>, writer: MessageWriter<W>, session: Session) -> Self {
        Self {
            peer: None,
            reader,
            writer,
            session,
        }
    }

    pub fn id(&self) -> u64 {
        self.session.id()
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn writer_ref(&self) -> &W {
        self.writer.get_ref()
    }

    /// Serve until the controller disconnects.
    ///
    /// Sends the session's opening replies, then answers every chunk read.
    /// A clean EOF returns `Ok(())`; read and write failures are returned.
    pub fn serve(&mut self) -> Result<()> {
        let id = self.session.id();
        let peer = self.peer.map(|addr| addr.to_string()).unwrap_or_default();

        self.writer.write_replies(&self.session.open())?;

        loop {
            let chunk = match self.reader.read_chunk() {
                Ok(chunk) => chunk,
                Err(FrameError::ConnectionClosed) => {
                    info!(connection = id, peer = %peer, "connection closed");
                    return Ok(());
                }
                Err(err) => return Err(err.into()),
            };
            debug!(connection = id, len = chunk.len(), "chunk received");
            let replies = self.session.feed(&chunk);
            self.writer.write_replies(&replies)?;
        }
    }
}
