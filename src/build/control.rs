//! Build control boundary.
//!
//! Force and stop requests are handed off here and never awaited by the
//! chat event path.

use thiserror::Error;
use tokio::sync::mpsc;

use super::types::BuildRequest;

/// Immediate hand-off failure reported by build control.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    /// The control channel has shut down.
    #[error("build control is closed")]
    Closed,
    /// The build system does not know the builder.
    #[error("no such builder: {0}")]
    UnknownBuilder(String),
}

/// Write access to the build system.
pub trait BuildControl: Send + Sync {
    /// Queue a forced build.
    fn request_build(&self, request: BuildRequest) -> Result<(), ControlError>;

    /// Stop the running build(s) of a builder.
    fn stop_build(&self, builder: &str, reason: &str) -> Result<(), ControlError>;
}

/// Request produced by [`ChannelBuildControl`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlRequest {
    Build(BuildRequest),
    Stop { builder: String, reason: String },
}

/// Build control that forwards requests over an mpsc channel.
#[derive(Debug, Clone)]
pub struct ChannelBuildControl {
    sender: mpsc::UnboundedSender<ControlRequest>,
}

impl ChannelBuildControl {
    /// Create a control handle and the receiver its requests go to.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ControlRequest>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl BuildControl for ChannelBuildControl {
    fn request_build(&self, request: BuildRequest) -> Result<(), ControlError> {
        self.sender
            .send(ControlRequest::Build(request))
            .map_err(|_| ControlError::Closed)
    }

    fn stop_build(&self, builder: &str, reason: &str) -> Result<(), ControlError> {
        self.sender
            .send(ControlRequest::Stop {
                builder: builder.to_string(),
                reason: reason.to_string(),
            })
            .map_err(|_| ControlError::Closed)
    }
}
