//! Configuration module for buildmuc.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::build::NotifyEvent;
use crate::chat::default_silly_triggers;
use crate::{BuildMucError, Result};

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file, appended to. Empty means stdout only.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/buildmuc.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// How much room history the server should replay on join.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HistoryOptions {
    /// Limit on total characters of replayed history.
    #[serde(default)]
    pub max_chars: Option<u32>,
    /// Limit on number of replayed messages.
    #[serde(default)]
    pub max_stanzas: Option<u32>,
    /// Only replay messages newer than this many seconds.
    #[serde(default)]
    pub seconds: Option<u32>,
}

/// A room to join on connect.
#[derive(Debug, Clone, Deserialize)]
pub struct MucConfig {
    /// Room identifier (e.g. "ci@conference.example.org").
    pub muc: String,
    /// Nickname to request in the room.
    pub nick: String,
    /// Room password, if the room is protected.
    #[serde(default)]
    pub password: Option<String>,
    /// History replay window requested on join.
    #[serde(default)]
    pub history: Option<HistoryOptions>,
}

/// Chat server connection and notification settings.
#[derive(Debug, Clone, Deserialize)]
pub struct JabberConfig {
    /// Chat server host.
    #[serde(default = "default_host")]
    pub host: String,
    /// Chat server port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Identity the bot logs in as.
    #[serde(default)]
    pub jid: String,
    /// Login password.
    #[serde(default)]
    pub password: String,
    /// Rooms to join.
    #[serde(default)]
    pub mucs: Vec<MucConfig>,
    /// Register the force/stop build commands.
    #[serde(default)]
    pub allow_force: bool,
    /// Builder categories to report on (None = all builders).
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    /// Build events announced to rooms.
    #[serde(default)]
    pub notify_events: Vec<NotifyEvent>,
    /// Include the blamelist in finished-build announcements.
    #[serde(default = "default_show_blame_list")]
    pub show_blame_list: bool,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5222
}

fn default_show_blame_list() -> bool {
    true
}

impl Default for JabberConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            jid: String::new(),
            password: String::new(),
            mucs: Vec::new(),
            allow_force: false,
            categories: None,
            notify_events: Vec::new(),
            show_blame_list: default_show_blame_list(),
        }
    }
}

/// In-room conversation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Trigger phrase to canned reply lines.
    #[serde(default = "default_silly_triggers")]
    pub silly: HashMap<String, Vec<String>>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            silly: default_silly_triggers(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Chat server configuration.
    #[serde(default)]
    pub jabber: JabberConfig,
    /// Conversation configuration.
    #[serde(default)]
    pub chat: ChatConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(BuildMucError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| BuildMucError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `BUILDMUC_PASSWORD`: Override the login password
    pub fn apply_env_overrides(&mut self) {
        if let Ok(password) = std::env::var("BUILDMUC_PASSWORD") {
            if !password.is_empty() {
                self.jabber.password = password;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - the login identity is empty
    /// - a room entry has an empty room identifier or nickname
    /// - the same room is listed twice
    pub fn validate(&self) -> Result<()> {
        if self.jabber.jid.is_empty() {
            return Err(BuildMucError::Validation(
                "jabber.jid is not set".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for muc in &self.jabber.mucs {
            if muc.muc.is_empty() || muc.nick.is_empty() {
                return Err(BuildMucError::Validation(
                    "every [[jabber.mucs]] entry needs both muc and nick".to_string(),
                ));
            }
            if !seen.insert(muc.muc.as_str()) {
                return Err(BuildMucError::Validation(format!(
                    "room {} is listed more than once",
                    muc.muc
                )));
            }
        }
        Ok(())
    }
}
