//! Test helpers for integration tests.
//!
//! Provides a bot wired to channel-backed collaborators and helpers to
//! inspect what it sent.

#![allow(dead_code)]

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;

use buildmuc::build::{BuildBoard, BuildControl, ChannelBuildControl, ControlRequest, NotifyEvent};
use buildmuc::config::{Config, MucConfig};
use buildmuc::transport::{ChannelTransport, InboundRoomEvent, JoinConfirmation, OutboundCommand};
use buildmuc::{BotEvent, StatusBot};

/// Room every test bot joins.
pub const ROOM: &str = "ci@conference.example.org";

/// Nickname the server assigns to the bot.
pub const NICK: &str = "bot";

/// A bot plus the receiving ends of its collaborators.
pub struct TestBot {
    pub bot: StatusBot,
    pub board: Arc<BuildBoard>,
    pub outbound: UnboundedReceiver<OutboundCommand>,
    pub control: UnboundedReceiver<ControlRequest>,
}

/// Create a test configuration with one room.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.jabber.jid = "buildbot@example.org".to_string();
    config.jabber.allow_force = true;
    config.jabber.notify_events = vec![NotifyEvent::Started, NotifyEvent::Finished];
    config.jabber.mucs = vec![MucConfig {
        muc: ROOM.to_string(),
        nick: NICK.to_string(),
        password: None,
        history: None,
    }];
    config
}

impl TestBot {
    /// Build a bot from a configuration, with `linux` and `win` builders.
    pub fn with_config(config: &Config) -> Self {
        let (transport, outbound) = ChannelTransport::new();
        let (control, control_rx) = ChannelBuildControl::new();
        let control: Arc<dyn BuildControl> = Arc::new(control);
        let board = Arc::new(BuildBoard::with_builders([
            ("linux", Some("unix".to_string())),
            ("win", Some("windows".to_string())),
        ]));
        let bot = StatusBot::new(config, Arc::new(transport), board.clone(), Some(control));
        Self {
            bot,
            board,
            outbound,
            control: control_rx,
        }
    }

    /// Build a bot from the default test configuration.
    pub fn new() -> Self {
        Self::with_config(&test_config())
    }

    /// Build a bot that has already joined [`ROOM`].
    pub fn joined() -> Self {
        let mut test = Self::new();
        test.bot.handle(BotEvent::Connected);
        test.bot.handle(BotEvent::JoinConfirmed(JoinConfirmation {
            room: ROOM.to_string(),
            assigned_nick: NICK.to_string(),
        }));
        test.drain();
        test
    }

    /// Deliver a live room message from `sender`.
    pub fn say(&mut self, sender: &str, body: &str) {
        self.bot
            .handle(BotEvent::RoomMessage(InboundRoomEvent::new(ROOM, sender, body)));
    }

    /// Take every queued outbound command.
    pub fn drain(&mut self) -> Vec<OutboundCommand> {
        let mut out = Vec::new();
        while let Ok(cmd) = self.outbound.try_recv() {
            out.push(cmd);
        }
        out
    }

    /// Take the text of every queued group message.
    pub fn sent(&mut self) -> Vec<String> {
        self.drain()
            .into_iter()
            .filter_map(|cmd| match cmd {
                OutboundCommand::GroupMessage { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Take every queued build control request.
    pub fn control_requests(&mut self) -> Vec<ControlRequest> {
        let mut out = Vec::new();
        while let Ok(req) = self.control.try_recv() {
            out.push(req);
        }
        out
    }
}
