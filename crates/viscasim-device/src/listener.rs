use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, warn};
use viscasim_frame::ReaderConfig;
use viscasim_transport::{TcpTransport, ViscaStream, DEFAULT_PORT};

use crate::connection::Connection;
use crate::error::Result;
use crate::registry::CommandRegistry;
use crate::session::{Session, SessionConfig};

/// Pause after a failed accept, so descriptor exhaustion does not spin.
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Listener configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind: SocketAddr,
    /// Applied to every accepted connection.
    pub session: SessionConfig,
    /// Refuse connections beyond this many concurrent ones. `None` is unlimited.
    pub max_connections: Option<usize>,
    pub reader: ReaderConfig,
    /// Timeout for writing replies to a slow controller.
    pub write_timeout: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            session: SessionConfig::default(),
            max_connections: None,
            reader: ReaderConfig::default(),
            write_timeout: Some(Duration::from_secs(5)),
        }
    }
}

/// Listens for controllers and serves each on its own thread.
pub struct DeviceListener {
    transport: TcpTransport,
    config: ServerConfig,
    registry: Arc<CommandRegistry>,
    next_connection_id: AtomicU64,
    active: Arc<AtomicUsize>,
}

impl DeviceListener {
    /// Validate `config` and bind its address.
    pub fn bind(config: ServerConfig) -> Result<Self> {
        config.session.validate()?;
        let transport = TcpTransport::bind(config.bind)?;
        Ok(Self {
            transport,
            config,
            registry: CommandRegistry::standard(),
            next_connection_id: AtomicU64::new(1),
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Serve a different command set.
    pub fn with_registry(mut self, registry: Arc<CommandRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.transport.local_addr()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Connections currently being served by [`DeviceListener::serve`].
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Accept the next controller and give it a fresh session.
    pub fn accept(&self) -> Result<Connection> {
        let stream = self.transport.accept()?;
        self.open_connection(stream)
    }

    fn open_connection(&self, stream: ViscaStream) -> Result<Connection> {
        let id = self.next_connection_id.fetch_add(1, Ordering::Relaxed);
        let session =
            Session::with_registry(self.registry.clone(), self.config.session.clone(), Instant::now())
                .with_id(id);
        let conn = Connection::from_stream(
            stream,
            session,
            self.config.reader.clone(),
            self.config.write_timeout,
        )?;
        info!(
            connection = id,
            peer = ?conn.peer_addr(),
            device = self.config.session.device,
            "controller connected"
        );
        Ok(conn)
    }

    /// Accept and serve connections until `running` is cleared.
    ///
    /// The flag is checked after each accept, so a stopper should also call
    /// [`request_stop`] to unblock a pending accept. Failures affecting a
    /// single connection are logged and serving continues.
    pub fn serve(&self, running: &AtomicBool) -> Result<()> {
        while running.load(Ordering::SeqCst) {
            let stream = match self.transport.accept() {
                Ok(stream) => stream,
                Err(err) => {
                    if !running.load(Ordering::SeqCst) {
                        break;
                    }
                    warn!(error = %err, "accept failed, retrying");
                    thread::sleep(ACCEPT_RETRY_DELAY);
                    continue;
                }
            };
            if !running.load(Ordering::SeqCst) {
                break;
            }

            let mut conn = match self.open_connection(stream) {
                Ok(conn) => conn,
                Err(err) => {
                    warn!(error = %err, "connection setup failed");
                    continue;
                }
            };

            if let Some(max) = self.config.max_connections {
                if self.active.load(Ordering::SeqCst) >= max {
                    warn!(connection = conn.id(), max, "connection limit reached, closing");
                    continue;
                }
            }

            let guard = ActiveGuard::new(self.active.clone());
            let id = conn.id();
            let spawned = thread::Builder::new()
                .name(format!("viscasim-conn-{id}"))
                .spawn(move || {
                    let _guard = guard;
                    if let Err(err) = conn.serve() {
                        warn!(connection = id, error = %err, "connection ended with error");
                    }
                });
            if let Err(err) = spawned {
                warn!(connection = id, error = %err, "connection thread spawn failed");
            }
        }

        info!(addr = %self.local_addr(), "listener stopped");
        Ok(())
    }
}

/// Clear `running` and wake a listener blocked in accept on `addr`.
pub fn request_stop(running: &AtomicBool, addr: SocketAddr) {
    running.store(false, Ordering::SeqCst);
    let target = match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), addr.port()),
        IpAddr::V6(ip) if ip.is_unspecified() => SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), addr.port()),
        _ => addr,
    };
    let _ = TcpTransport::connect_timeout(target, Duration::from_secs(1));
}

struct ActiveGuard(Arc<AtomicUsize>);

impl ActiveGuard {
    fn new(active: Arc<AtomicUsize>) -> Self {
        active.fetch_add(1, Ordering::SeqCst);
        Self(active)
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
