use std::net::SocketAddr;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tracing::info;
use viscasim_device::listener::request_stop;
use viscasim_device::{DeviceListener, ServerConfig, SessionConfig};

use crate::cmd::ServeArgs;
use crate::exit::{device_error, CliError, CliResult, INTERNAL, SUCCESS};

pub fn run(args: ServeArgs) -> CliResult<i32> {
    let config = server_config(&args);

    #[cfg(feature = "async")]
    if args.use_async {
        return run_async(config);
    }

    let listener = DeviceListener::bind(config).map_err(|err| device_error("bind failed", err))?;
    let addr = listener.local_addr();
    info!(%addr, device = args.device, "emulator ready");

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone(), addr)?;

    listener
        .serve(&running)
        .map_err(|err| device_error("serve failed", err))?;
    Ok(SUCCESS)
}

fn server_config(args: &ServeArgs) -> ServerConfig {
    ServerConfig {
        bind: SocketAddr::new(args.bind, args.port),
        session: SessionConfig {
            device: args.device,
            announce: !args.no_announce,
        },
        max_connections: args.max_connections,
        ..ServerConfig::default()
    }
}

fn install_ctrlc_handler(running: Arc<AtomicBool>, addr: SocketAddr) -> CliResult<()> {
    ctrlc::set_handler(move || {
        info!("interrupt received, stopping");
        request_stop(&running, addr);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

#[cfg(feature = "async")]
fn run_async(config: ServerConfig) -> CliResult<i32> {
    use viscasim_device::{serve_async, CommandRegistry};

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| crate::exit::io_error("runtime setup failed", err))?;

    if config.max_connections.is_some() {
        tracing::warn!("--max-connections is not enforced with --async");
    }

    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(config.bind)
            .await
            .map_err(|err| crate::exit::io_error("bind failed", err))?;
        info!(addr = ?listener.local_addr().ok(), device = config.session.device, "emulator ready");

        tokio::select! {
            result = serve_async(listener, config.session, CommandRegistry::standard()) => {
                result.map_err(|err| device_error("serve failed", err))?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received, stopping");
            }
        }
        Ok(SUCCESS)
    })
}
