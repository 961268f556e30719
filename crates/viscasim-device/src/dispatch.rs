use bytes::Bytes;
use tracing::warn;
use viscasim_frame::{FrameError, Reply, ACK, COMPLETION, ERROR_REPLY, INQUIRY_REPLY, SYNTAX_ERROR};

use crate::registry::CommandRegistry;
use crate::state::DeviceState;

/// What a handler sees while it runs: the device state and a reply queue.
pub struct Context<'a> {
    pub state: &'a mut DeviceState,
    device: u8,
    replies: Vec<Reply>,
}

impl<'a> Context<'a> {
    pub fn new(state: &'a mut DeviceState, device: u8) -> Self {
        Self {
            state,
            device,
            replies: Vec::new(),
        }
    }

    /// Device number replies are sent from.
    pub fn device(&self) -> u8 {
        self.device
    }

    /// Queue a unicast reply with `body`.
    pub fn reply(&mut self, body: impl Into<Bytes>) {
        self.replies.push(Reply::from_device(self.device, body));
    }

    /// Queue the two-part acknowledgement: accepted, then completed.
    pub fn ack(&mut self) {
        self.reply(vec![ACK]);
        self.reply(vec![COMPLETION]);
    }

    /// Queue an inquiry reply: the `0x50` marker followed by `fields`.
    pub fn inquiry(&mut self, fields: &[u8]) {
        let mut body = Vec::with_capacity(fields.len() + 1);
        body.push(INQUIRY_REPLY);
        body.extend_from_slice(fields);
        self.reply(body);
    }

    /// Queue the syntax error reply `60 02`.
    pub fn syntax_error(&mut self) {
        self.reply(vec![ERROR_REPLY, SYNTAX_ERROR]);
    }

    fn into_replies(self) -> Vec<Reply> {
        self.replies
    }
}

/// Result of dispatching one message.
#[derive(Debug)]
pub enum Outcome {
    /// A registered handler ran to completion.
    Handled(&'static str),
    /// No key matched; the fallback ran.
    Unmatched,
    /// The handler failed and its replies were replaced by `60 02`.
    Failed {
        command: &'static str,
        error: FrameError,
    },
}

impl Outcome {
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled(_))
    }
}

/// Run the most specific handler for `payload` and append its replies to `out`.
///
/// Handler failures never escape: they are logged and answered with the
/// syntax error reply, and no partial output is kept.
pub fn dispatch(
    registry: &CommandRegistry,
    state: &mut DeviceState,
    device: u8,
    payload: &[u8],
    out: &mut Vec<Reply>,
) -> Outcome {
    let (command, matched) = registry.lookup(payload);
    let mut ctx = Context::new(state, device);

    match (command.handler)(&mut ctx, payload) {
        Ok(()) => {
            out.extend(ctx.into_replies());
            if matched {
                Outcome::Handled(command.name)
            } else {
                Outcome::Unmatched
            }
        }
        Err(error) => {
            warn!(
                command = command.name,
                payload = %hex::encode(payload),
                error = %error,
                "decode error"
            );
            out.push(Reply::from_device(device, vec![ERROR_REPLY, SYNTAX_ERROR]));
            Outcome::Failed {
                command: command.name,
                error,
            }
        }
    }
}
