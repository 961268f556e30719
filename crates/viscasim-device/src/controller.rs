//! Controller side of a VISCA-over-TCP link.
//!
//! Used by the CLI's `send` command and by tests to drive an emulator the way
//! a real controller would. Unlike the device side, replies are reassembled
//! across reads.

use std::io::ErrorKind;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use bytes::BytesMut;
use tracing::{debug, warn};
use viscasim_frame::{ChunkReader, FrameError, MessageWriter, ReaderConfig, Reply, TERMINATOR};
use viscasim_transport::{TcpTransport, ViscaStream};

use crate::error::Result;

/// A connection to an emulated (or real) camera.
pub struct Controller {
    addr: SocketAddr,
    reader: ChunkReader<ViscaStream>,
    writer: MessageWriter<ViscaStream>,
    pending: BytesMut,
}

impl Controller {
    /// Connect to the camera at `addr`, giving up after `timeout`.
    pub fn connect(addr: SocketAddr, timeout: Duration) -> Result<Self> {
        let stream = TcpTransport::connect_timeout(addr, timeout)?;
        stream.set_nodelay(true)?;
        let reader_stream = stream.try_clone()?;
        let reader = ChunkReader::with_config_stream(reader_stream, ReaderConfig::default())?;
        let writer = MessageWriter::with_timeout(stream, Some(timeout))?;
        Ok(Self {
            addr,
            reader,
            writer,
            pending: BytesMut::new(),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Send one message; the terminator is appended when missing.
    pub fn send(&mut self, raw: &[u8]) -> Result<()> {
        debug!(addr = %self.addr, bytes = %hex::encode(raw), "sending");
        self.writer.write_message(raw)?;
        Ok(())
    }

    /// Collect replies until nothing arrives for `quiet`, or the peer closes.
    pub fn recv_replies(&mut self, quiet: Duration) -> Result<Vec<Reply>> {
        let quiet = quiet.max(Duration::from_millis(1));
        let mut replies = Vec::new();
        while self.read_once(Some(quiet))? {
            self.drain(&mut replies);
        }
        self.drain(&mut replies);
        Ok(replies)
    }

    /// Collect replies until at least `count` have arrived or `timeout` passes.
    pub fn recv_until(&mut self, count: usize, timeout: Duration) -> Result<Vec<Reply>> {
        let deadline = Instant::now() + timeout;
        let mut replies = Vec::new();
        self.drain(&mut replies);
        while replies.len() < count {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() || !self.read_once(Some(remaining))? {
                break;
            }
            self.drain(&mut replies);
        }
        Ok(replies)
    }

    /// Read one chunk into the pending buffer. `false` on timeout or EOF.
    fn read_once(&mut self, timeout: Option<Duration>) -> Result<bool> {
        self.reader.get_ref().set_read_timeout(timeout)?;
        match self.reader.read_chunk() {
            Ok(chunk) => {
                self.pending.extend_from_slice(&chunk);
                Ok(true)
            }
            Err(FrameError::ConnectionClosed) => Ok(false),
            Err(FrameError::Io(err))
                if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
            {
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Move every complete reply out of the pending buffer.
    fn drain(&mut self, replies: &mut Vec<Reply>) {
        while let Some(end) = self.pending.iter().position(|&b| b == TERMINATOR) {
            let raw = self.pending.split_to(end + 1);
            let body = &raw[..end];
            if body.is_empty() {
                continue;
            }
            match Reply::parse(body) {
                Ok(reply) => replies.push(reply),
                Err(err) => warn!(bytes = %hex::encode(body), error = %err, "unparseable reply"),
            }
        }
        if !self.pending.is_empty() {
            debug!(len = self.pending.len(), "partial reply buffered");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::{IpAddr, Ipv4Addr};
    use std::thread;

    use viscasim_frame::ReplyKind;

    use super::*;

    #[test]
    fn replies_split_across_writes_are_reassembled() {
        let transport =
            TcpTransport::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0)).expect("bind");
        let addr = transport.local_addr();

        let server = thread::spawn(move || {
            let mut stream = transport.accept().expect("accept");
            let mut cmd = [0u8; 5];
            stream.read_exact(&mut cmd).expect("command");
            stream.write_all(&[0x90, 0x41]).expect("first half");
            stream.flush().expect("flush");
            thread::sleep(Duration::from_millis(50));
            stream.write_all(&[0xFF, 0x90, 0x51, 0xFF]).expect("second half");
            cmd
        });

        let mut controller =
            Controller::connect(addr, Duration::from_secs(2)).expect("controller should connect");
        controller.send(&[0x81, 0x09, 0x04, 0x00]).expect("send");
        let replies = controller
            .recv_until(2, Duration::from_secs(5))
            .expect("replies");

        let kinds: Vec<ReplyKind> = replies.iter().map(Reply::kind).collect();
        assert_eq!(kinds, vec![ReplyKind::Ack, ReplyKind::Completion]);
        assert_eq!(
            server.join().expect("server thread"),
            [0x81, 0x09, 0x04, 0x00, 0xFF]
        );
    }

    #[test]
    fn recv_replies_stops_on_silence() {
        let transport =
            TcpTransport::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0)).expect("bind");
        let addr = transport.local_addr();

        let server = thread::spawn(move || {
            let mut stream = transport.accept().expect("accept");
            stream.write_all(&[0x88, 0x38, 0xFF]).expect("announce");
            thread::sleep(Duration::from_millis(500));
        });

        let mut controller =
            Controller::connect(addr, Duration::from_secs(2)).expect("controller should connect");
        let replies = controller
            .recv_replies(Duration::from_millis(200))
            .expect("replies");
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].kind(), ReplyKind::NetworkChange);

        server.join().expect("server thread");
    }
}
