use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};
use viscasim_frame::{
    split_messages, Address, FrameError, Message, Reply, DEVICE_ID_INQUIRY, NETWORK_CHANGE,
};

use crate::dispatch::{dispatch, Outcome};
use crate::error::{DeviceError, Result};
use crate::motion;
use crate::registry::CommandRegistry;
use crate::state::DeviceState;

/// Second byte of the broadcast reply to a device-id inquiry.
const DEVICE_ID_REPLY: u8 = 0x02;

/// Per-connection behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Device number on the chain (1..=7); selects which commands are ours
    /// and the reply header.
    pub device: u8,
    /// Send the network-change broadcast when the connection opens.
    pub announce: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            device: 1,
            announce: true,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        if (1..=7).contains(&self.device) {
            Ok(())
        } else {
            Err(DeviceError::InvalidDevice(self.device))
        }
    }
}

/// Protocol engine for one connection.
///
/// Owns the connection's [`DeviceState`]. Feed it every chunk read from the
/// transport, in order, and write back the replies it returns.
pub struct Session {
    id: u64,
    state: DeviceState,
    registry: Arc<CommandRegistry>,
    config: SessionConfig,
}

impl Session {
    /// Session with the standard command set, clock starting now.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_registry(CommandRegistry::standard(), config, Instant::now())
    }

    /// Session with an explicit registry and start time.
    pub fn with_registry(registry: Arc<CommandRegistry>, config: SessionConfig, now: Instant) -> Self {
        Self {
            id: 0,
            state: DeviceState::new(now),
            registry,
            config,
        }
    }

    /// Tag log output with a connection id.
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut DeviceState {
        &mut self.state
    }

    /// Replies to send as soon as the connection is established.
    pub fn open(&self) -> Vec<Reply> {
        if self.config.announce {
            vec![Reply::broadcast(vec![NETWORK_CHANGE])]
        } else {
            Vec::new()
        }
    }

    /// Process one received chunk at the current time.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Reply> {
        self.feed_at(chunk, Instant::now())
    }

    /// Process one received chunk as if it arrived at `now`.
    ///
    /// Motion is caught up first, then each message in the chunk is handled
    /// in order. Replies come back in the order they must be written.
    pub fn feed_at(&mut self, chunk: &[u8], now: Instant) -> Vec<Reply> {
        motion::advance(&mut self.state, now);
        let mut out = Vec::new();
        for raw in split_messages(chunk) {
            self.handle_message(raw, &mut out);
        }
        out
    }

    fn handle_message(&mut self, raw: &[u8], out: &mut Vec<Reply>) {
        let message = match Message::parse(raw) {
            Ok(message) => message,
            Err(FrameError::TooShort { len }) => {
                debug!(session = self.id, len, "dropping short message");
                return;
            }
            Err(err) => {
                warn!(session = self.id, bytes = %hex::encode(raw), error = %err, "malformed message");
                return;
            }
        };

        debug!(
            session = self.id,
            state = %self.state.axes_summary(),
            "--> {}",
            hex::encode(raw)
        );

        match message.address() {
            Address::Broadcast if message.is_device_id_inquiry() => {
                self.push(out, Reply::broadcast(vec![DEVICE_ID_INQUIRY, DEVICE_ID_REPLY]));
            }
            Address::Broadcast => {
                debug!(session = self.id, "ignoring broadcast");
            }
            Address::Device(n) if n != self.config.device => {
                debug!(session = self.id, device = n, "not addressed to this device");
            }
            Address::Device(_) => {
                let start = out.len();
                let outcome = dispatch(
                    &self.registry,
                    &mut self.state,
                    self.config.device,
                    message.payload(),
                    out,
                );
                if let Outcome::Handled(command) = outcome {
                    debug!(session = self.id, command, "handled");
                }
                for reply in &out[start..] {
                    self.log_reply(reply);
                }
            }
        }
    }

    fn push(&self, out: &mut Vec<Reply>, reply: Reply) {
        self.log_reply(&reply);
        out.push(reply);
    }

    fn log_reply(&self, reply: &Reply) {
        debug!(
            session = self.id,
            state = %self.state.axes_summary(),
            "<-- {:02x}{}ff",
            reply.header(),
            hex::encode(reply.body())
        );
    }
}
