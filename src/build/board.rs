//! Build status view.
//!
//! [`BuildStatus`] is the read side of the build system as seen by chat
//! commands. [`BuildBoard`] is an in-memory implementation kept current
//! from the build-event feed.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use chrono::Utc;

use super::types::{BuildEvent, BuildSummary, BuilderSnapshot, BuilderState};

/// Read access to builder state.
pub trait BuildStatus: Send + Sync {
    /// Names of all known builders, sorted.
    fn builder_names(&self) -> Vec<String>;

    /// Snapshot of one builder.
    fn builder(&self, name: &str) -> Option<BuilderSnapshot>;

    /// Observe a build event before it is announced.
    ///
    /// Implementations backed by the build system itself can ignore this.
    fn record(&self, _event: &BuildEvent) {}
}

/// In-memory builder table fed by build events.
#[derive(Debug, Default)]
pub struct BuildBoard {
    builders: RwLock<BTreeMap<String, BuilderSnapshot>>,
}

impl BuildBoard {
    /// Create an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a board with the given `(name, category)` builders, all idle.
    pub fn with_builders<I, S>(builders: I) -> Self
    where
        I: IntoIterator<Item = (S, Option<String>)>,
        S: Into<String>,
    {
        let map = builders
            .into_iter()
            .map(|(name, category)| {
                let name = name.into();
                (name.clone(), BuilderSnapshot::new(name, category))
            })
            .collect();
        Self {
            builders: RwLock::new(map),
        }
    }

    /// Number of known builders.
    pub fn len(&self) -> usize {
        self.builders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if no builders are known.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn entry<'a>(
    builders: &'a mut BTreeMap<String, BuilderSnapshot>,
    name: &str,
    category: Option<&str>,
) -> &'a mut BuilderSnapshot {
    let snapshot = builders
        .entry(name.to_string())
        .or_insert_with(|| BuilderSnapshot::new(name, None));
    if let Some(category) = category {
        snapshot.category = Some(category.to_string());
    }
    snapshot
}

impl BuildStatus for BuildBoard {
    fn builder_names(&self) -> Vec<String> {
        self.builders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    fn builder(&self, name: &str) -> Option<BuilderSnapshot> {
        self.builders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    fn record(&self, event: &BuildEvent) {
        let mut builders = self
            .builders
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        match event {
            BuildEvent::BuilderOnline { builder, category } => {
                let snapshot = entry(&mut builders, builder, category.as_deref());
                if snapshot.state == BuilderState::Offline {
                    snapshot.state = BuilderState::Idle;
                }
            }
            BuildEvent::BuilderOffline { builder } => {
                let snapshot = entry(&mut builders, builder, None);
                snapshot.state = BuilderState::Offline;
                snapshot.running.clear();
            }
            BuildEvent::Started {
                builder,
                number,
                category,
                ..
            } => {
                let snapshot = entry(&mut builders, builder, category.as_deref());
                if !snapshot.running.contains(number) {
                    snapshot.running.push(*number);
                }
                snapshot.state = BuilderState::Building;
            }
            BuildEvent::Finished {
                builder,
                number,
                category,
                result,
                text,
                ..
            } => {
                let snapshot = entry(&mut builders, builder, category.as_deref());
                snapshot.running.retain(|n| n != number);
                snapshot.last = Some(BuildSummary {
                    number: *number,
                    result: *result,
                    text: text.clone(),
                    finished_at: Utc::now(),
                });
                if snapshot.running.is_empty() && snapshot.state == BuilderState::Building {
                    snapshot.state = BuilderState::Idle;
                }
            }
        }
    }
}
