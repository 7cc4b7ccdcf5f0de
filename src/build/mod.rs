//! Build system collaborators.
//!
//! This module provides:
//! - Build lifecycle events and builder snapshots
//! - The build status view and an in-memory board fed by events
//! - The build control hand-off (force/stop)
//! - Announcement filtering and formatting

mod announce;
mod board;
mod control;
mod types;

pub use announce::{
    category_allowed, format_announcement, format_watch_notice, should_announce, NotifyEvent,
};
pub use board::{BuildBoard, BuildStatus};
pub use control::{BuildControl, ChannelBuildControl, ControlError, ControlRequest};
pub use types::{
    BuildEvent, BuildRequest, BuildResult, BuildSummary, BuilderSnapshot, BuilderState,
};
