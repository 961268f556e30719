//! Command table keyed by leading payload bytes.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use viscasim_frame::FrameError;

use crate::dispatch::Context;

/// Longest key a handler may be registered under.
pub const MAX_KEY_LEN: usize = 4;

/// A command handler.
///
/// Receives the payload (bytes after the address byte, terminator removed).
/// Returning an error discards any replies the handler queued.
pub type Handler = fn(&mut Context<'_>, &[u8]) -> Result<(), FrameError>;

/// A registered command: a name for logging plus its handler.
#[derive(Clone, Copy)]
pub struct Command {
    pub name: &'static str,
    pub handler: Handler,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command").field("name", &self.name).finish()
    }
}

/// Up to four leading payload bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandKey {
    bytes: [u8; MAX_KEY_LEN],
    len: u8,
}

impl CommandKey {
    /// Build a key from a fixed-size array of 1 to 4 bytes.
    pub const fn from_bytes<const N: usize>(key: [u8; N]) -> Self {
        const { assert!(N >= 1 && N <= MAX_KEY_LEN, "command keys are 1 to 4 bytes") };
        let mut bytes = [0u8; MAX_KEY_LEN];
        let mut i = 0;
        while i < N {
            bytes[i] = key[i];
            i += 1;
        }
        Self {
            bytes,
            len: N as u8,
        }
    }

    /// Build a key from a slice, or `None` if it is empty or too long.
    pub fn try_from_slice(key: &[u8]) -> Option<Self> {
        if key.is_empty() || key.len() > MAX_KEY_LEN {
            return None;
        }
        let mut bytes = [0u8; MAX_KEY_LEN];
        bytes[..key.len()].copy_from_slice(key);
        Some(Self {
            bytes,
            len: key.len() as u8,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..usize::from(self.len)]
    }
}

impl fmt::Debug for CommandKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommandKey({})", hex::encode(self.as_bytes()))
    }
}

/// Immutable mapping from command key to handler.
///
/// Lookup tries the payload's first four bytes, then three, two and one, and
/// returns the first registered match; with no match the fallback runs.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    commands: HashMap<CommandKey, Command>,
    fallback: Command,
}

impl CommandRegistry {
    /// Empty registry whose fallback is `fallback`.
    pub fn new(fallback: Command) -> Self {
        Self {
            commands: HashMap::new(),
            fallback,
        }
    }

    /// Register `handler` under `key`, replacing any previous entry.
    pub fn register(&mut self, key: CommandKey, name: &'static str, handler: Handler) -> &mut Self {
        self.commands.insert(key, Command { name, handler });
        self
    }

    /// Find the most specific command for `payload`.
    ///
    /// The boolean is `false` when the fallback was chosen.
    pub fn lookup(&self, payload: &[u8]) -> (Command, bool) {
        let longest = payload.len().min(MAX_KEY_LEN);
        (1..=longest)
            .rev()
            .filter_map(|len| CommandKey::try_from_slice(&payload[..len]))
            .find_map(|key| self.commands.get(&key).copied())
            .map_or((self.fallback, false), |command| (command, true))
    }

    pub fn fallback(&self) -> Command {
        self.fallback
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The standard camera command set, built once per process.
    pub fn standard() -> Arc<Self> {
        static STANDARD: OnceLock<Arc<CommandRegistry>> = OnceLock::new();
        STANDARD
            .get_or_init(|| Arc::new(crate::handlers::standard_registry()))
            .clone()
    }
}
