//! Per-peer conversation state.
//!
//! A [`Contact`] parses one inbound message at a time, runs the matching
//! command and reports failures back into the room without ever letting
//! them escape the message being handled.

use std::sync::Arc;

use tracing::{debug, error, trace, warn};

use super::command::{split_command, CommandContext, CommandError};
use super::identity::PeerIdentity;
use super::services::ChatServices;
use super::watch::WatchList;
use crate::transport::{Transport, TransportError};

/// Prefix marking an action ("emote") message.
pub const ACTION_PREFIX: &str = "/me";

/// Conversation state for one peer.
pub struct Contact {
    identity: PeerIdentity,
    room: String,
    transport: Arc<dyn Transport>,
    muted: bool,
    message_count: u64,
}

impl Contact {
    /// Create a contact whose replies go to `room`.
    pub fn new(identity: PeerIdentity, room: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            identity,
            room: room.into(),
            transport,
            muted: false,
            message_count: 0,
        }
    }

    /// Peer this contact talks to.
    pub fn identity(&self) -> &PeerIdentity {
        &self.identity
    }

    /// Room replies are delivered to.
    pub fn room(&self) -> &str {
        &self.room
    }

    /// Check if outbound sends are suppressed.
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Suppress or resume outbound sends.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Number of messages handled so far.
    pub fn message_count(&self) -> u64 {
        self.message_count
    }

    /// Send a message to the room, unless muted.
    pub fn send(&self, message: &str) -> Result<(), TransportError> {
        if self.muted {
            trace!(peer = %self.identity, "muted, dropping reply");
            return Ok(());
        }
        self.transport.send_group_message(&self.room, message)
    }

    /// Send a third-person action.
    pub fn act(&self, description: &str) -> Result<(), TransportError> {
        self.send(&format!("{ACTION_PREFIX} {description}"))
    }

    /// Handle one message addressed to the bot.
    ///
    /// The message counter is bumped exactly once per call whatever happens.
    pub fn handle_message(
        &mut self,
        text: &str,
        who: &str,
        services: &ChatServices,
        watches: &mut WatchList,
    ) {
        let message = text.trim_start();

        if let Some(lines) = services.silly.get(message) {
            self.send_lines(lines);
        } else {
            self.dispatch(message, who, services, watches);
        }

        self.message_count += 1;
    }

    fn send_lines(&self, lines: &[String]) {
        for line in lines {
            if let Err(e) = self.send(line) {
                warn!(peer = %self.identity, "failed to send canned reply: {}", e);
                return;
            }
        }
    }

    fn dispatch(
        &mut self,
        message: &str,
        who: &str,
        services: &ChatServices,
        watches: &mut WatchList,
    ) {
        let (name, args) = split_command(message);

        let command = match services.dispatcher.resolve(name) {
            Some(command) => command,
            None if message.ends_with('!') => services.dispatcher.excited(),
            None => {
                trace!(peer = %self.identity, command = name, "no such command");
                return;
            }
        };

        debug!(peer = %self.identity, command = command.name(), "running command");
        let mut ctx = CommandContext {
            contact: &mut *self,
            services,
            watches,
        };

        match command.invoke(&mut ctx, args.trim(), who) {
            Ok(()) => {}
            Err(CommandError::Usage(usage)) => {
                if let Err(e) = self.send(&usage) {
                    warn!(peer = %self.identity, "failed to send usage error: {}", e);
                }
            }
            Err(CommandError::Failed { kind, detail }) => {
                error!(
                    peer = %self.identity,
                    sender = who,
                    command = command.name(),
                    kind,
                    "command failed: {}",
                    detail
                );
                let notice = format!("Something bad happened (see logs): {kind}");
                if let Err(e) = self.send(&notice) {
                    error!(peer = %self.identity, "failed to report command failure: {}", e);
                }
            }
        }
    }

    /// Handle an action message such as "/me pokes bot".
    ///
    /// Only actions aimed at the bot get a reply.
    pub fn handle_action(&self, body: &str, who: &str, own_nick: &str) {
        let Some(head) = body.strip_suffix(own_nick) else {
            return;
        };
        if !head.ends_with("s ") {
            return;
        }
        let Some(verb) = head.split_whitespace().last() else {
            return;
        };

        let response = if verb == "kicks" {
            format!("{verb} back")
        } else {
            format!("{verb} {who} too")
        };
        if let Err(e) = self.act(&response) {
            warn!(peer = %self.identity, "failed to send action reply: {}", e);
        }
    }
}
