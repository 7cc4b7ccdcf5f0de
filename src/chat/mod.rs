//! Chat side of buildmuc.
//!
//! This module provides the conversation core:
//! - Room sessions with join/leave state and message routing
//! - Per-peer contacts owned by a room's contact registry
//! - The command table and built-in commands
//! - Build watches and canned replies

mod command;
mod contact;
mod handlers;
mod identity;
mod registry;
mod room;
mod services;
mod silly;
mod watch;

pub use command::{
    split_args, split_command, Command, CommandContext, CommandDispatcher, CommandError,
    CommandFn, CommandResult,
};
pub use contact::{Contact, ACTION_PREFIX};
pub use identity::PeerIdentity;
pub use registry::ContactRegistry;
pub use room::{Channel, RoomSession, RoomState};
pub use services::ChatServices;
pub use silly::default_silly_triggers;
pub use watch::WatchList;
