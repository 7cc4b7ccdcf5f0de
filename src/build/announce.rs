//! Room announcements for build events.

use serde::Deserialize;

use super::types::{BuildEvent, BuildResult};

/// Build events a room can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyEvent {
    Started,
    Finished,
    Success,
    Warnings,
    Failure,
    Exception,
    SuccessToFailure,
    FailureToSuccess,
}

impl NotifyEvent {
    /// Check whether this subscription covers the event.
    ///
    /// `previous` is the result of the builder's prior build, if known.
    pub fn matches(&self, event: &BuildEvent, previous: Option<BuildResult>) -> bool {
        match event {
            BuildEvent::Started { .. } => *self == NotifyEvent::Started,
            BuildEvent::Finished { result, .. } => match self {
                NotifyEvent::Started => false,
                NotifyEvent::Finished => true,
                NotifyEvent::Success => *result == BuildResult::Success,
                NotifyEvent::Warnings => *result == BuildResult::Warnings,
                NotifyEvent::Failure => *result == BuildResult::Failure,
                NotifyEvent::Exception => *result == BuildResult::Exception,
                NotifyEvent::SuccessToFailure => {
                    previous == Some(BuildResult::Success) && *result == BuildResult::Failure
                }
                NotifyEvent::FailureToSuccess => {
                    previous == Some(BuildResult::Failure) && *result == BuildResult::Success
                }
            },
            BuildEvent::BuilderOnline { .. } | BuildEvent::BuilderOffline { .. } => false,
        }
    }
}

/// Check whether any subscribed event covers this build event.
pub fn should_announce(
    subscribed: &[NotifyEvent],
    event: &BuildEvent,
    previous: Option<BuildResult>,
) -> bool {
    subscribed.iter().any(|n| n.matches(event, previous))
}

/// Check whether a builder category passes the configured filter.
pub fn category_allowed(categories: Option<&[String]>, category: Option<&str>) -> bool {
    match categories {
        None => true,
        Some(allowed) => category.is_some_and(|c| allowed.iter().any(|a| a == c)),
    }
}

/// Announcement text for an event, or `None` for events that are never announced.
pub fn format_announcement(event: &BuildEvent, show_blame_list: bool) -> Option<String> {
    match event {
        BuildEvent::Started {
            builder,
            number,
            reason,
            ..
        } => {
            let mut line = format!("build #{number} of {builder} started");
            if let Some(reason) = reason {
                line.push_str(&format!(" ({reason})"));
            }
            Some(line)
        }
        BuildEvent::Finished {
            builder,
            number,
            result,
            text,
            blamelist,
            url,
            ..
        } => {
            let mut line = format!("build #{number} of {builder} is complete: {result}");
            if !text.is_empty() {
                line.push_str(&format!(" [{}]", text.join(" ")));
            }
            if let Some(url) = url {
                line.push_str(&format!("  Build details are at {url}"));
            }
            if show_blame_list && !blamelist.is_empty() {
                line.push_str(&format!("  blamelist: {}", blamelist.join(", ")));
            }
            Some(line)
        }
        BuildEvent::BuilderOnline { .. } | BuildEvent::BuilderOffline { .. } => None,
    }
}

/// Notice sent to a contact watching the builder.
pub fn format_watch_notice(builder: &str, number: u64, result: BuildResult, text: &[String]) -> String {
    let mut line = format!("Hey! build {builder} #{number} is complete: {result}");
    if !text.is_empty() {
        line.push_str(&format!(" [{}]", text.join(" ")));
    }
    line
}
