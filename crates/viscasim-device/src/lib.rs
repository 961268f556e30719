//! Simulated VISCA pan-tilt-zoom camera.
//!
//! This is the protocol engine. Each connection gets a [`Session`] holding
//! its own [`DeviceState`]; every received chunk first advances the motion
//! model to the current time, then each message in the chunk is dispatched
//! through the [`CommandRegistry`] to the most specific handler.

#[cfg(feature = "async")]
pub mod async_listener;
pub mod connection;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod listener;
pub mod motion;
pub mod registry;
pub mod session;
pub mod state;

#[cfg(feature = "async")]
pub use async_listener::serve_async;
pub use connection::Connection;
pub use controller::Controller;
pub use dispatch::{dispatch, Context, Outcome};
pub use error::{DeviceError, Result};
pub use listener::{DeviceListener, ServerConfig};
pub use registry::{Command, CommandKey, CommandRegistry, Handler, MAX_KEY_LEN};
pub use session::{Session, SessionConfig};
pub use state::{Axis, DeviceState};
