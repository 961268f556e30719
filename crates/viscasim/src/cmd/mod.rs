use std::net::{IpAddr, SocketAddr};

use clap::{Args, Subcommand};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod send;
pub mod serve;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the camera emulator.
    Serve(ServeArgs),
    /// Send hex-encoded messages to a camera and print its replies.
    Send(SendArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Serve(args) => serve::run(args),
        Command::Send(args) => send::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on.
    #[arg(long, env = "VISCASIM_BIND", default_value = "0.0.0.0")]
    pub bind: IpAddr,
    /// TCP port to listen on.
    #[arg(long, short = 'p', env = "VISCASIM_PORT", default_value_t = viscasim_transport::DEFAULT_PORT)]
    pub port: u16,
    /// Camera address on the VISCA chain (1-7).
    #[arg(
        long,
        short = 'd',
        env = "VISCASIM_DEVICE",
        default_value_t = 1,
        value_parser = clap::value_parser!(u8).range(1..=7)
    )]
    pub device: u8,
    /// Do not send the network-change broadcast when a controller connects.
    #[arg(long)]
    pub no_announce: bool,
    /// Close connections beyond this many concurrent controllers.
    #[arg(long, value_name = "N")]
    pub max_connections: Option<usize>,
    /// Serve connections as tokio tasks instead of threads.
    #[cfg(feature = "async")]
    #[arg(long = "async")]
    pub use_async: bool,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Camera address, e.g. 127.0.0.1:5678.
    pub addr: SocketAddr,
    /// Messages as hex, e.g. "81 09 04 00 ff". The terminator is optional.
    #[arg(required = true, value_name = "HEX")]
    pub messages: Vec<String>,
    /// Stop collecting replies after this much silence (e.g. 500ms, 2s).
    #[arg(long, default_value = "500ms")]
    pub wait_timeout: String,
    /// Connection timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
