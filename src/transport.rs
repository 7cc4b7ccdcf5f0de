//! Chat transport boundary.
//!
//! The bot never talks to the network itself. Outbound requests are handed
//! to a [`Transport`] and return immediately; inbound traffic arrives as the
//! event types in this module.

use serde::Deserialize;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::HistoryOptions;

/// Immediate hand-off failure reported by a transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The transport has shut down.
    #[error("transport is closed")]
    Closed,
    /// The bot is not an occupant of the room.
    #[error("not joined to room {0}")]
    NotJoined(String),
}

/// Outbound side of a chat connection.
///
/// All calls are fire-and-forget: `Ok` means the request was accepted,
/// not that the server acted on it.
pub trait Transport: Send + Sync {
    /// Ask to join a room under the given nickname.
    fn join(
        &self,
        room: &str,
        nick: &str,
        history: Option<&HistoryOptions>,
        password: Option<&str>,
    ) -> Result<(), TransportError>;

    /// Leave a room.
    fn leave(&self, room: &str) -> Result<(), TransportError>;

    /// Send a message to everyone in a room.
    fn send_group_message(&self, room: &str, text: &str) -> Result<(), TransportError>;
}

/// Request produced by [`ChannelTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundCommand {
    /// Join request.
    Join {
        room: String,
        nick: String,
        history: Option<HistoryOptions>,
        password: Option<String>,
    },
    /// Leave request.
    Leave { room: String },
    /// Group chat message.
    GroupMessage { room: String, text: String },
}

/// Transport that queues requests on an mpsc channel for a connection task.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    sender: mpsc::UnboundedSender<OutboundCommand>,
}

impl ChannelTransport {
    /// Create a transport and the receiver its requests are delivered to.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OutboundCommand>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    fn push(&self, command: OutboundCommand) -> Result<(), TransportError> {
        self.sender.send(command).map_err(|_| TransportError::Closed)
    }
}

impl Transport for ChannelTransport {
    fn join(
        &self,
        room: &str,
        nick: &str,
        history: Option<&HistoryOptions>,
        password: Option<&str>,
    ) -> Result<(), TransportError> {
        self.push(OutboundCommand::Join {
            room: room.to_string(),
            nick: nick.to_string(),
            history: history.cloned(),
            password: password.map(str::to_string),
        })
    }

    fn leave(&self, room: &str) -> Result<(), TransportError> {
        self.push(OutboundCommand::Leave {
            room: room.to_string(),
        })
    }

    fn send_group_message(&self, room: &str, text: &str) -> Result<(), TransportError> {
        self.push(OutboundCommand::GroupMessage {
            room: room.to_string(),
            text: text.to_string(),
        })
    }
}

/// A message seen in a room.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InboundRoomEvent {
    /// Room the message was posted in.
    pub room: String,
    /// Sender nickname; `None` for room status messages.
    #[serde(default)]
    pub sender: Option<String>,
    /// Message body.
    pub body: String,
    /// Message was replayed from room history on join.
    #[serde(default)]
    pub is_history_replay: bool,
}

impl InboundRoomEvent {
    /// Create a live message from a room occupant.
    pub fn new(room: impl Into<String>, sender: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            room: room.into(),
            sender: Some(sender.into()),
            body: body.into(),
            is_history_replay: false,
        }
    }

    /// Mark the message as history replay.
    pub fn replayed(mut self) -> Self {
        self.is_history_replay = true;
        self
    }
}

/// Server confirmation that a join completed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JoinConfirmation {
    /// Joined room.
    pub room: String,
    /// Nickname the server assigned to the bot.
    pub assigned_nick: String,
}
