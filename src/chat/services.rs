//! Bot-wide collaborators shared by every contact.

use std::collections::HashMap;
use std::sync::Arc;

use super::command::CommandDispatcher;
use super::silly::default_silly_triggers;
use crate::build::{category_allowed, BuildControl, BuildStatus, BuilderSnapshot};

/// Command table, canned replies and build collaborators.
pub struct ChatServices {
    /// Command lookup table.
    pub dispatcher: CommandDispatcher,
    /// Trigger phrase to canned reply lines.
    pub silly: HashMap<String, Vec<String>>,
    /// Read side of the build system.
    pub status: Arc<dyn BuildStatus>,
    /// Write side of the build system, when forcing builds is allowed.
    pub control: Option<Arc<dyn BuildControl>>,
    /// Builder categories to report on (None = all).
    pub categories: Option<Vec<String>>,
}

impl ChatServices {
    /// Create services with the built-in commands (no force/stop) and default triggers.
    pub fn new(status: Arc<dyn BuildStatus>) -> Self {
        Self {
            dispatcher: CommandDispatcher::with_builtins(false),
            silly: default_silly_triggers(),
            status,
            control: None,
            categories: None,
        }
    }

    /// Attach build control and register the force/stop commands.
    pub fn with_control(mut self, control: Arc<dyn BuildControl>) -> Self {
        self.dispatcher = CommandDispatcher::with_builtins(true);
        self.control = Some(control);
        self
    }

    /// Replace the canned replies.
    pub fn with_silly(mut self, silly: HashMap<String, Vec<String>>) -> Self {
        self.silly = silly;
        self
    }

    /// Restrict reporting to the given builder categories.
    pub fn with_categories(mut self, categories: Option<Vec<String>>) -> Self {
        self.categories = categories;
        self
    }

    /// Check whether a builder category passes the category filter.
    pub fn category_visible(&self, category: Option<&str>) -> bool {
        category_allowed(self.categories.as_deref(), category)
    }

    /// All builders that pass the category filter, sorted by name.
    pub fn visible_builders(&self) -> Vec<BuilderSnapshot> {
        self.status
            .builder_names()
            .iter()
            .filter_map(|name| self.visible_builder(name))
            .collect()
    }

    /// One builder, if it exists and passes the category filter.
    pub fn visible_builder(&self, name: &str) -> Option<BuilderSnapshot> {
        self.status
            .builder(name)
            .filter(|b| self.category_visible(b.category.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{BuildBoard, ChannelBuildControl};

    fn board() -> Arc<BuildBoard> {
        Arc::new(BuildBoard::with_builders([
            ("linux", Some("unix".to_string())),
            ("mac", Some("unix".to_string())),
            ("win", Some("windows".to_string())),
            ("docs", None),
        ]))
    }

    #[test]
    fn test_visible_builders_without_filter() {
        let services = ChatServices::new(board());
        let names: Vec<String> = services
            .visible_builders()
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(names, vec!["docs", "linux", "mac", "win"]);
    }

    #[test]
    fn test_visible_builders_with_filter() {
        let services =
            ChatServices::new(board()).with_categories(Some(vec!["unix".to_string()]));
        let names: Vec<String> = services
            .visible_builders()
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(names, vec!["linux", "mac"]);
        assert!(services.visible_builder("win").is_none());
        assert!(services.visible_builder("docs").is_none());
    }

    #[test]
    fn test_with_control_registers_force() {
        let (control, _rx) = ChannelBuildControl::new();
        let services = ChatServices::new(board());
        assert!(services.dispatcher.resolve("force").is_none());

        let services = services.with_control(Arc::new(control));
        assert!(services.dispatcher.resolve("force").is_some());
        assert!(services.control.is_some());
    }
}
