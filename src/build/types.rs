//! Build-side data types shared by the status board, control and announcements.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Outcome of a finished build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildResult {
    Success,
    Warnings,
    Failure,
    Skipped,
    Exception,
    Retry,
    Cancelled,
}

impl BuildResult {
    /// Human-readable description used in chat.
    pub fn description(&self) -> &'static str {
        match self {
            BuildResult::Success => "Success",
            BuildResult::Warnings => "Warnings",
            BuildResult::Failure => "Failure",
            BuildResult::Skipped => "Skipped",
            BuildResult::Exception => "Exception",
            BuildResult::Retry => "Retry",
            BuildResult::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for BuildResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Event from the build system's lifecycle feed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BuildEvent {
    /// A worker attached to the builder.
    BuilderOnline {
        builder: String,
        #[serde(default)]
        category: Option<String>,
    },
    /// The builder lost its worker.
    BuilderOffline { builder: String },
    /// A build started.
    Started {
        builder: String,
        number: u64,
        #[serde(default)]
        category: Option<String>,
        #[serde(default)]
        reason: Option<String>,
    },
    /// A build finished.
    Finished {
        builder: String,
        number: u64,
        #[serde(default)]
        category: Option<String>,
        result: BuildResult,
        #[serde(default)]
        text: Vec<String>,
        #[serde(default)]
        blamelist: Vec<String>,
        #[serde(default)]
        url: Option<String>,
    },
}

impl BuildEvent {
    /// Name of the builder the event concerns.
    pub fn builder(&self) -> &str {
        match self {
            BuildEvent::BuilderOnline { builder, .. }
            | BuildEvent::BuilderOffline { builder }
            | BuildEvent::Started { builder, .. }
            | BuildEvent::Finished { builder, .. } => builder,
        }
    }

    /// Builder category, when the event carries one.
    pub fn category(&self) -> Option<&str> {
        match self {
            BuildEvent::BuilderOnline { category, .. }
            | BuildEvent::Started { category, .. }
            | BuildEvent::Finished { category, .. } => category.as_deref(),
            BuildEvent::BuilderOffline { .. } => None,
        }
    }
}

/// What a builder is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    Idle,
    Building,
    Offline,
}

impl BuilderState {
    /// Lowercase name used in status replies.
    pub fn as_str(&self) -> &'static str {
        match self {
            BuilderState::Idle => "idle",
            BuilderState::Building => "building",
            BuilderState::Offline => "offline",
        }
    }
}

/// Summary of the most recent finished build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub number: u64,
    pub result: BuildResult,
    pub text: Vec<String>,
    pub finished_at: DateTime<Utc>,
}

/// Point-in-time view of one builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderSnapshot {
    pub name: String,
    pub category: Option<String>,
    pub state: BuilderState,
    /// Numbers of the builds currently running.
    pub running: Vec<u64>,
    pub last: Option<BuildSummary>,
}

impl BuilderSnapshot {
    /// Create an idle builder with no history.
    pub fn new(name: impl Into<String>, category: Option<String>) -> Self {
        Self {
            name: name.into(),
            category,
            state: BuilderState::Idle,
            running: Vec::new(),
            last: None,
        }
    }
}

/// A forced build request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub builder: String,
    pub reason: String,
    pub branch: Option<String>,
    pub revision: Option<String>,
}

impl BuildRequest {
    /// Create a request for the builder's default branch and revision.
    pub fn new(builder: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            builder: builder.into(),
            reason: reason.into(),
            branch: None,
            revision: None,
        }
    }
}
