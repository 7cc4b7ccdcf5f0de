//! Room membership and message routing.
//!
//! A [`RoomSession`] walks `Disconnected -> Joining -> Joined -> Departed`
//! and, while joined, decides which room messages reach a [`Contact`].

use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use super::contact::{Contact, ACTION_PREFIX};
use super::identity::PeerIdentity;
use super::registry::ContactRegistry;
use super::services::ChatServices;
use super::watch::WatchList;
use crate::config::{HistoryOptions, MucConfig};
use crate::transport::{InboundRoomEvent, Transport, TransportError};

/// Anything the bot can talk into.
pub trait Channel {
    /// Get the contact for a peer, creating it if needed.
    fn get_or_create(&mut self, identity: PeerIdentity) -> &mut Contact;

    /// Say something to the whole channel.
    fn send(&self, message: &str) -> Result<(), TransportError>;

    /// Emote something to the whole channel.
    fn act(&self, description: &str) -> Result<(), TransportError>;
}

/// Membership state of a room session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomState {
    /// Not in the room and no join pending.
    Disconnected,
    /// Join requested, waiting for confirmation.
    Joining,
    /// In the room under the server-assigned nickname.
    Joined { nick: String },
    /// Left or removed from the room.
    Departed,
}

impl RoomState {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomState::Disconnected => "disconnected",
            RoomState::Joining => "joining",
            RoomState::Joined { .. } => "joined",
            RoomState::Departed => "departed",
        }
    }
}

impl std::fmt::Display for RoomState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One multi-user chat room.
pub struct RoomSession {
    room: String,
    /// Nickname requested on join.
    nick: String,
    history: Option<HistoryOptions>,
    password: Option<String>,
    state: RoomState,
    registry: ContactRegistry,
    watches: WatchList,
    transport: Arc<dyn Transport>,
}

impl RoomSession {
    /// Create a disconnected session.
    pub fn new(room: impl Into<String>, nick: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        let room = room.into();
        Self {
            registry: ContactRegistry::new(room.clone(), Arc::clone(&transport)),
            room,
            nick: nick.into(),
            history: None,
            password: None,
            state: RoomState::Disconnected,
            watches: WatchList::new(),
            transport,
        }
    }

    /// Create a session from a configured room.
    pub fn from_config(config: &MucConfig, transport: Arc<dyn Transport>) -> Self {
        Self::new(&config.muc, &config.nick, transport)
            .with_history(config.history.clone())
            .with_password(config.password.clone())
    }

    /// Set the history replay window requested on join.
    pub fn with_history(mut self, history: Option<HistoryOptions>) -> Self {
        self.history = history;
        self
    }

    /// Set the room password.
    pub fn with_password(mut self, password: Option<String>) -> Self {
        self.password = password;
        self
    }

    /// Room address.
    pub fn room(&self) -> &str {
        &self.room
    }

    /// Current membership state.
    pub fn state(&self) -> &RoomState {
        &self.state
    }

    /// Check if the bot is in the room.
    pub fn is_joined(&self) -> bool {
        matches!(self.state, RoomState::Joined { .. })
    }

    /// Nickname assigned on join; `None` until the join completes.
    pub fn own_nick(&self) -> Option<&str> {
        match &self.state {
            RoomState::Joined { nick } => Some(nick),
            _ => None,
        }
    }

    /// Contacts known in this room.
    pub fn registry(&self) -> &ContactRegistry {
        &self.registry
    }

    /// Pending build watches in this room.
    pub fn watches(&self) -> &WatchList {
        &self.watches
    }

    /// Ask the transport to join the room.
    ///
    /// Only valid from `Disconnected`; otherwise ignored. A departed room
    /// stays departed until [`RoomSession::rejoin`] is called.
    pub fn request_join(&mut self) -> Result<(), TransportError> {
        if self.state != RoomState::Disconnected {
            debug!(room = %self.room, state = %self.state, "not requesting join");
            return Ok(());
        }

        info!(room = %self.room, nick = %self.nick, "joining room");
        self.transport.join(
            &self.room,
            &self.nick,
            self.history.as_ref(),
            self.password.as_deref(),
        )?;
        self.state = RoomState::Joining;
        Ok(())
    }

    /// Join a room the bot has left or was removed from.
    pub fn rejoin(&mut self) -> Result<(), TransportError> {
        if self.state == RoomState::Departed {
            self.state = RoomState::Disconnected;
        }
        self.request_join()
    }

    /// Complete a pending join under the nickname the server assigned.
    ///
    /// Confirmations that arrive when no join is pending are ignored.
    pub fn confirm_join(&mut self, assigned_nick: &str) {
        if self.state != RoomState::Joining {
            debug!(room = %self.room, state = %self.state, "ignoring unexpected join confirmation");
            return;
        }

        self.registry
            .get_or_create(PeerIdentity::occupant(&self.room, assigned_nick));
        self.state = RoomState::Joined {
            nick: assigned_nick.to_string(),
        };
        info!(room = %self.room, nick = assigned_nick, "joined room");
    }

    /// Leave the room, or abandon a pending join.
    pub fn leave(&mut self) -> Result<(), TransportError> {
        let result = match self.state {
            RoomState::Joining | RoomState::Joined { .. } => self.transport.leave(&self.room),
            RoomState::Disconnected | RoomState::Departed => Ok(()),
        };
        self.depart();
        result
    }

    /// The server removed the bot from the room.
    pub fn removed(&mut self) {
        warn!(room = %self.room, "removed from room");
        self.depart();
    }

    /// The connection dropped. Contacts are kept for the next join.
    pub fn connection_lost(&mut self) {
        if self.state != RoomState::Departed {
            self.state = RoomState::Disconnected;
        }
    }

    /// A peer left the room.
    pub fn occupant_left(&mut self, nick: &str) {
        let identity = PeerIdentity::occupant(&self.room, nick);
        if self.registry.remove(&identity).is_some() {
            trace!(peer = %identity, "contact removed");
        }
        self.watches.remove_peer(&identity);
    }

    fn depart(&mut self) {
        self.state = RoomState::Departed;
        self.registry.clear();
        self.watches.clear();
        info!(room = %self.room, "departed room");
    }

    /// Route one room message.
    pub fn handle_message(&mut self, event: &InboundRoomEvent, services: &ChatServices) {
        let RoomState::Joined { nick } = &self.state else {
            trace!(room = %self.room, "not joined, dropping message");
            return;
        };
        if event.is_history_replay {
            trace!(room = %self.room, "dropping history replay");
            return;
        }
        let Some(sender) = event.sender.as_deref() else {
            return;
        };
        if sender == nick {
            return;
        }

        let own_nick = nick.clone();
        let body = event.body.as_str();
        let contact = self
            .registry
            .get_or_create(PeerIdentity::occupant(&self.room, sender));

        if body.starts_with(ACTION_PREFIX) {
            contact.handle_action(body, sender, &own_nick);
        }
        if let Some(text) = strip_address(body, &own_nick) {
            contact.handle_message(text, sender, services, &mut self.watches);
        }
    }

    /// Deliver a notice to everyone watching `builder`, then forget them.
    pub fn notify_watchers(&mut self, builder: &str, notice: &str) {
        for peer in self.watches.take(builder) {
            let Some(contact) = self.registry.get(&peer) else {
                continue;
            };
            if let Err(e) = contact.send(notice) {
                warn!(peer = %peer, "failed to notify watcher: {}", e);
            }
        }
    }

    fn self_contact(&self) -> Result<&Contact, TransportError> {
        self.own_nick()
            .and_then(|nick| {
                self.registry
                    .get(&PeerIdentity::occupant(&self.room, nick))
            })
            .ok_or_else(|| TransportError::NotJoined(self.room.clone()))
    }
}

impl Channel for RoomSession {
    fn get_or_create(&mut self, identity: PeerIdentity) -> &mut Contact {
        self.registry.get_or_create(identity)
    }

    fn send(&self, message: &str) -> Result<(), TransportError> {
        self.self_contact()?.send(message)
    }

    fn act(&self, description: &str) -> Result<(), TransportError> {
        self.self_contact()?.act(description)
    }
}

/// Strip a leading "nick:" or "nick," address from a message body.
fn strip_address<'a>(body: &'a str, nick: &str) -> Option<&'a str> {
    body.strip_prefix(nick)
        .and_then(|rest| rest.strip_prefix(':').or_else(|| rest.strip_prefix(',')))
}
