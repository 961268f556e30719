//! Tokio accept loop, one task per connection.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};
use viscasim_frame::reader::DEFAULT_READ_CHUNK_SIZE;
use viscasim_frame::Reply;

use crate::error::Result;
use crate::registry::CommandRegistry;
use crate::session::{Session, SessionConfig};

const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Serve every connection accepted on `listener`.
///
/// Each connection runs in its own task with its own [`Session`]. A failed
/// accept is logged and retried. Drop the returned future (e.g. from
/// `tokio::select!`) to stop accepting.
pub async fn serve_async(
    listener: TcpListener,
    config: SessionConfig,
    registry: Arc<CommandRegistry>,
) -> Result<()> {
    config.validate()?;
    info!(addr = ?listener.local_addr().ok(), "listening (async)");

    let mut next_id = 1u64;
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(err) => {
                warn!(error = %err, "accept failed, retrying");
                tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                continue;
            }
        };
        let id = next_id;
        next_id += 1;
        info!(connection = id, %peer, "controller connected");

        let session = Session::with_registry(registry.clone(), config.clone(), Instant::now())
            .with_id(id);
        tokio::spawn(async move {
            if let Err(err) = serve_connection(stream, session).await {
                warn!(connection = id, error = %err, "connection ended with error");
            }
        });
    }
}

async fn serve_connection(mut stream: TcpStream, mut session: Session) -> std::io::Result<()> {
    stream.set_nodelay(true)?;
    let mut out = BytesMut::new();
    write_replies(&mut stream, &session.open(), &mut out).await?;

    let mut buf = vec![0u8; DEFAULT_READ_CHUNK_SIZE];
    loop {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            info!(connection = session.id(), "connection closed");
            return Ok(());
        }
        debug!(connection = session.id(), len = n, "chunk received");
        let replies = session.feed(&buf[..n]);
        write_replies(&mut stream, &replies, &mut out).await?;
    }
}

async fn write_replies(
    stream: &mut TcpStream,
    replies: &[Reply],
    out: &mut BytesMut,
) -> std::io::Result<()> {
    if replies.is_empty() {
        return Ok(());
    }
    out.clear();
    for reply in replies {
        reply.encode(out);
    }
    stream.write_all(&out[..]).await?;
    stream.flush().await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    #[tokio::test]
    async fn async_serving_matches_blocking_behaviour() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let server = tokio::spawn(serve_async(
            listener,
            SessionConfig::default(),
            CommandRegistry::standard(),
        ));

        let mut client = TcpStream::connect(addr).await.expect("connect");
        let mut announce = [0u8; 3];
        timeout(Duration::from_secs(5), client.read_exact(&mut announce))
            .await
            .expect("announce in time")
            .expect("announce");
        assert_eq!(announce, [0x88, 0x38, 0xFF]);

        client
            .write_all(&[0x81, 0x01, 0x04, 0x07, 0x03, 0xFF, 0x81, 0x09, 0x04, 0x00, 0xFF])
            .await
            .expect("write");
        let mut replies = [0u8; 10];
        timeout(Duration::from_secs(5), client.read_exact(&mut replies))
            .await
            .expect("replies in time")
            .expect("replies");
        assert_eq!(
            replies,
            [0x90, 0x41, 0xFF, 0x90, 0x51, 0xFF, 0x90, 0x50, 0x02, 0xFF]
        );

        server.abort();
    }

    #[tokio::test]
    async fn invalid_device_is_rejected() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let config = SessionConfig {
            device: 0,
            announce: true,
        };
        let result = serve_async(listener, config, CommandRegistry::standard()).await;
        assert!(matches!(
            result,
            Err(crate::error::DeviceError::InvalidDevice(0))
        ));
    }
}
