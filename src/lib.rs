//! buildmuc - build status relay for multi-user chat rooms
//!
//! Joins chat rooms, announces build events and answers commands
//! addressed to the bot.

pub mod bot;
pub mod build;
pub mod chat;
pub mod config;
pub mod datetime;
pub mod error;
pub mod logging;
pub mod transport;

pub use bot::{BotEvent, StatusBot};
pub use config::Config;
pub use error::{BuildMucError, Result};
