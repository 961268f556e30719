use std::net::{SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::stream::ViscaStream;

/// Port used by VISCA-over-IP emulators when none is configured.
pub const DEFAULT_PORT: u16 = 5678;

/// TCP listening socket.
///
/// Provides bind/accept/connect over IPv4 or IPv6 addresses. Binding to
/// port 0 picks an ephemeral port; [`TcpTransport::local_addr`] reports it.
pub struct TcpTransport {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl TcpTransport {
    /// Bind and listen on `addr`.
    pub fn bind(addr: SocketAddr) -> Result<Self> {
        let listener =
            TcpListener::bind(addr).map_err(|e| TransportError::Bind { addr, source: e })?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| TransportError::Bind { addr, source: e })?;

        info!(%local_addr, "listening on tcp socket");

        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Accept an incoming connection (blocking).
    pub fn accept(&self) -> Result<ViscaStream> {
        let (stream, peer) = self.listener.accept().map_err(TransportError::Accept)?;
        debug!(%peer, "accepted connection");
        Ok(ViscaStream::from_tcp(stream))
    }

    /// Connect to a listening emulator (blocking).
    pub fn connect(addr: SocketAddr) -> Result<ViscaStream> {
        let stream =
            TcpStream::connect(addr).map_err(|e| TransportError::Connect { addr, source: e })?;
        debug!(%addr, "connected to tcp socket");
        Ok(ViscaStream::from_tcp(stream))
    }

    /// Connect, giving up after `timeout`.
    pub fn connect_timeout(addr: SocketAddr, timeout: Duration) -> Result<ViscaStream> {
        let stream = TcpStream::connect_timeout(&addr, timeout)
            .map_err(|e| TransportError::Connect { addr, source: e })?;
        debug!(%addr, ?timeout, "connected to tcp socket");
        Ok(ViscaStream::from_tcp(stream))
    }

    /// The address this socket is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::{Ipv4Addr, SocketAddrV4};

    fn loopback() -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0))
    }

    #[test]
    fn test_bind_accept_connect() {
        let listener = TcpTransport::bind(loopback()).unwrap();
        let addr = listener.local_addr();
        assert_ne!(addr.port(), 0);

        let handle = std::thread::spawn(move || {
            let mut client = TcpTransport::connect(addr).unwrap();
            client.write_all(&[0x81, 0x09, 0x04, 0x00, 0xff]).unwrap();
        });

        let mut server = listener.accept().unwrap();
        assert!(server.peer_addr().is_some());
        let mut buf = [0u8; 5];
        server.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [0x81, 0x09, 0x04, 0x00, 0xff]);

        handle.join().unwrap();
    }

    #[test]
    fn test_bind_address_in_use() {
        let first = TcpTransport::bind(loopback()).unwrap();
        let result = TcpTransport::bind(first.local_addr());
        assert!(matches!(result, Err(TransportError::Bind { .. })));
    }

    #[test]
    fn test_connect_refused() {
        let addr = {
            let listener = TcpTransport::bind(loopback()).unwrap();
            listener.local_addr()
        };
        let result = TcpTransport::connect(addr);
        assert!(matches!(result, Err(TransportError::Connect { .. })));
    }

    #[test]
    fn test_cloned_stream_shares_socket() {
        let listener = TcpTransport::bind(loopback()).unwrap();
        let addr = listener.local_addr();

        let handle = std::thread::spawn(move || {
            let mut client = TcpTransport::connect(addr).unwrap();
            let mut buf = [0u8; 3];
            client.read_exact(&mut buf).unwrap();
            buf
        });

        let server = listener.accept().unwrap();
        let mut writer = server.try_clone().unwrap();
        writer.write_all(&[0x90, 0x41, 0xff]).unwrap();

        assert_eq!(handle.join().unwrap(), [0x90, 0x41, 0xff]);
    }
}
