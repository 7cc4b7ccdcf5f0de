//! The status bot.
//!
//! [`StatusBot`] owns one [`RoomSession`] per configured room and turns
//! connection, room and build events into room traffic. Events are handled
//! one at a time, either directly or by [`StatusBot::run`] draining an mpsc
//! channel.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::build::{
    format_announcement, format_watch_notice, should_announce, BuildControl, BuildEvent,
    BuildResult, BuildStatus, NotifyEvent,
};
use crate::chat::{Channel, ChatServices, RoomSession, RoomState};
use crate::config::Config;
use crate::error::{BuildMucError, Result};
use crate::transport::{InboundRoomEvent, JoinConfirmation, Transport};

/// Event fed to the bot by the connection and build feeds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BotEvent {
    /// The chat connection is up.
    Connected,
    /// The chat connection dropped.
    Disconnected,
    /// The server confirmed a join.
    JoinConfirmed(JoinConfirmation),
    /// A message was posted in a room.
    RoomMessage(InboundRoomEvent),
    /// A peer left a room.
    OccupantLeft { room: String, nick: String },
    /// The server removed the bot from a room.
    RoomRemoved { room: String },
    /// Operator asked the bot to leave a room.
    Leave { room: String },
    /// Operator asked the bot to join a room it left.
    Join { room: String },
    /// Something happened on the build system.
    Build(BuildEvent),
}

impl BotEvent {
    /// Parse one line of the JSON event feed.
    pub fn from_json_line(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line.trim())?)
    }
}

/// Relays build status into chat rooms.
pub struct StatusBot {
    rooms: BTreeMap<String, RoomSession>,
    services: ChatServices,
    notify_events: Vec<NotifyEvent>,
    show_blame_list: bool,
}

impl StatusBot {
    /// Create a bot for every configured room.
    ///
    /// Force and stop commands are only offered when `allow_force` is set
    /// and a build control is supplied.
    pub fn new(
        config: &Config,
        transport: Arc<dyn Transport>,
        status: Arc<dyn BuildStatus>,
        control: Option<Arc<dyn BuildControl>>,
    ) -> Self {
        let mut services = ChatServices::new(status)
            .with_silly(config.chat.silly.clone())
            .with_categories(config.jabber.categories.clone());

        match control {
            Some(control) if config.jabber.allow_force => {
                services = services.with_control(control);
            }
            None if config.jabber.allow_force => {
                warn!("allow_force is set but no build control is available");
            }
            _ => {}
        }

        let rooms = config
            .jabber
            .mucs
            .iter()
            .map(|muc| {
                (
                    muc.muc.clone(),
                    RoomSession::from_config(muc, Arc::clone(&transport)),
                )
            })
            .collect();

        Self {
            rooms,
            services,
            notify_events: config.jabber.notify_events.clone(),
            show_blame_list: config.jabber.show_blame_list,
        }
    }

    /// Shared command table and build collaborators.
    pub fn services(&self) -> &ChatServices {
        &self.services
    }

    /// Mutable access to the services, e.g. to register extra commands.
    pub fn services_mut(&mut self) -> &mut ChatServices {
        &mut self.services
    }

    /// Look up a room session.
    pub fn room(&self, room: &str) -> Option<&RoomSession> {
        self.rooms.get(room)
    }

    /// The connection came up: join every room the bot has not left.
    pub fn connection_initialized(&mut self) {
        info!("connection initialized, joining {} room(s)", self.rooms.len());
        for session in self
            .rooms
            .values_mut()
            .filter(|s| *s.state() != RoomState::Departed)
        {
            if let Err(e) = session.request_join() {
                error!(room = %session.room(), "failed to request join: {}", e);
            }
        }
    }

    /// The connection dropped.
    pub fn connection_lost(&mut self) {
        warn!("connection lost");
        for session in self.rooms.values_mut() {
            session.connection_lost();
        }
    }

    /// The server confirmed a join.
    pub fn on_join_confirmed(&mut self, confirmation: &JoinConfirmation) {
        match self.rooms.get_mut(&confirmation.room) {
            Some(session) => session.confirm_join(&confirmation.assigned_nick),
            None => warn!(room = %confirmation.room, "join confirmed for unknown room"),
        }
    }

    /// A message was posted in a room.
    pub fn on_room_message(&mut self, event: &InboundRoomEvent) {
        match self.rooms.get_mut(&event.room) {
            Some(session) => session.handle_message(event, &self.services),
            None => debug!(room = %event.room, "message for unknown room"),
        }
    }

    /// A peer left a room.
    pub fn on_occupant_left(&mut self, room: &str, nick: &str) {
        if let Some(session) = self.rooms.get_mut(room) {
            session.occupant_left(nick);
        }
    }

    /// The server removed the bot from a room.
    pub fn on_room_removed(&mut self, room: &str) {
        if let Some(session) = self.rooms.get_mut(room) {
            session.removed();
        }
    }

    /// Leave a room.
    pub fn leave(&mut self, room: &str) -> Result<()> {
        let session = self
            .rooms
            .get_mut(room)
            .ok_or_else(|| BuildMucError::UnknownRoom(room.to_string()))?;
        session.leave()?;
        Ok(())
    }

    /// Join a room again after leaving it.
    pub fn join(&mut self, room: &str) -> Result<()> {
        let session = self
            .rooms
            .get_mut(room)
            .ok_or_else(|| BuildMucError::UnknownRoom(room.to_string()))?;
        session.rejoin()?;
        Ok(())
    }

    /// Record a build event and tell the rooms about it.
    pub fn on_build_event(&mut self, event: &BuildEvent) {
        let snapshot = self.services.status.builder(event.builder());
        let previous: Option<BuildResult> = snapshot
            .as_ref()
            .and_then(|b| b.last.as_ref())
            .map(|last| last.result);
        let category = event
            .category()
            .map(str::to_string)
            .or_else(|| snapshot.and_then(|b| b.category));

        self.services.status.record(event);

        if !self.services.category_visible(category.as_deref()) {
            debug!(builder = event.builder(), "builder outside category filter");
            return;
        }

        let announcement = if should_announce(&self.notify_events, event, previous) {
            format_announcement(event, self.show_blame_list)
        } else {
            None
        };
        let watch_notice = match event {
            BuildEvent::Finished {
                builder,
                number,
                result,
                text,
                ..
            } => Some(format_watch_notice(builder, *number, *result, text)),
            _ => None,
        };

        for session in self.rooms.values_mut().filter(|s| s.is_joined()) {
            if let Some(text) = &announcement {
                if let Err(e) = session.act(text) {
                    warn!(room = %session.room(), "failed to announce build: {}", e);
                }
            }
            if let Some(notice) = &watch_notice {
                session.notify_watchers(event.builder(), notice);
            }
        }
    }

    /// Handle one event.
    pub fn handle(&mut self, event: BotEvent) {
        match event {
            BotEvent::Connected => self.connection_initialized(),
            BotEvent::Disconnected => self.connection_lost(),
            BotEvent::JoinConfirmed(confirmation) => self.on_join_confirmed(&confirmation),
            BotEvent::RoomMessage(message) => self.on_room_message(&message),
            BotEvent::OccupantLeft { room, nick } => self.on_occupant_left(&room, &nick),
            BotEvent::RoomRemoved { room } => self.on_room_removed(&room),
            BotEvent::Leave { room } => {
                if let Err(e) = self.leave(&room) {
                    error!(room = %room, "failed to leave room: {}", e);
                }
            }
            BotEvent::Join { room } => {
                if let Err(e) = self.join(&room) {
                    error!(room = %room, "failed to join room: {}", e);
                }
            }
            BotEvent::Build(event) => self.on_build_event(&event),
        }
    }

    /// Process events until the sender side closes.
    pub async fn run(&mut self, mut events: mpsc::Receiver<BotEvent>) {
        info!("status bot running");
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        info!("event feed closed, status bot stopping");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{BuildBoard, ChannelBuildControl};
    use crate::config::MucConfig;
    use crate::transport::{ChannelTransport, OutboundCommand};

    fn config(allow_force: bool) -> Config {
        let mut config = Config::default();
        config.jabber.jid = "bot@example.org".to_string();
        config.jabber.allow_force = allow_force;
        config.jabber.mucs = vec![MucConfig {
            muc: "ci@muc".to_string(),
            nick: "bot".to_string(),
            password: None,
            history: None,
        }];
        config
    }

    fn bot(config: &Config, control: Option<Arc<dyn BuildControl>>) -> StatusBot {
        let (transport, _rx) = ChannelTransport::new();
        StatusBot::new(
            config,
            Arc::new(transport),
            Arc::new(BuildBoard::new()),
            control,
        )
    }

    #[test]
    fn test_force_requires_allow_and_control() {
        let (control, _rx) = ChannelBuildControl::new();
        let control: Arc<dyn BuildControl> = Arc::new(control);

        let bot_a = bot(&config(false), Some(Arc::clone(&control)));
        assert!(bot_a.services().dispatcher.resolve("force").is_none());

        let bot_b = bot(&config(true), None);
        assert!(bot_b.services().dispatcher.resolve("force").is_none());

        let bot_c = bot(&config(true), Some(control));
        assert!(bot_c.services().dispatcher.resolve("force").is_some());
    }

    #[test]
    fn test_leave_unknown_room() {
        let mut bot = bot(&config(false), None);
        let err = bot.leave("nowhere@muc").unwrap_err();
        assert!(matches!(err, BuildMucError::UnknownRoom(room) if room == "nowhere@muc"));
    }

    #[test]
    fn test_join_unknown_room() {
        let mut bot = bot(&config(false), None);
        let err = bot.join("nowhere@muc").unwrap_err();
        assert_eq!(err.kind(), "UnknownRoom");
    }

    #[test]
    fn test_from_json_line() {
        let event = BotEvent::from_json_line("{\"event\": \"join\", \"room\": \"ci@muc\"}\n").unwrap();
        assert_eq!(
            event,
            BotEvent::Join {
                room: "ci@muc".to_string()
            }
        );

        let err = BotEvent::from_json_line("{\"event\": \"explode\"}").unwrap_err();
        assert!(matches!(err, BuildMucError::Json(_)));
        assert_eq!(err.kind(), "Json");

        assert!(matches!(
            BotEvent::from_json_line("not json"),
            Err(BuildMucError::Json(_))
        ));
    }

    #[test]
    fn test_handle_drives_lifecycle() {
        let (transport, mut rx) = ChannelTransport::new();
        let mut bot = StatusBot::new(
            &config(false),
            Arc::new(transport),
            Arc::new(BuildBoard::new()),
            None,
        );

        bot.handle(BotEvent::Connected);
        assert!(matches!(rx.try_recv(), Ok(OutboundCommand::Join { .. })));

        bot.handle(BotEvent::JoinConfirmed(JoinConfirmation {
            room: "ci@muc".to_string(),
            assigned_nick: "bot".to_string(),
        }));
        assert!(bot.room("ci@muc").unwrap().is_joined());

        bot.handle(BotEvent::Leave {
            room: "ci@muc".to_string(),
        });
        assert!(matches!(rx.try_recv(), Ok(OutboundCommand::Leave { .. })));
        assert!(!bot.room("ci@muc").unwrap().is_joined());
    }

    #[test]
    fn test_bot_event_deserialize() {
        let event: BotEvent = serde_json::from_str(r#"{"event": "connected"}"#).unwrap();
        assert_eq!(event, BotEvent::Connected);

        let event: BotEvent = serde_json::from_str(
            r#"{"event": "room_message", "room": "ci@muc", "sender": "alice", "body": "bot: status"}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            BotEvent::RoomMessage(InboundRoomEvent::new("ci@muc", "alice", "bot: status"))
        );

        let event: BotEvent = serde_json::from_str(
            r#"{"event": "occupant_left", "room": "ci@muc", "nick": "alice"}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            BotEvent::OccupantLeft {
                room: "ci@muc".to_string(),
                nick: "alice".to_string()
            }
        );
    }
}
