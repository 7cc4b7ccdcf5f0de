//! Command table and dispatch for addressed chat messages.
//!
//! Commands are looked up by exact, case-sensitive name in a table built
//! once at startup. Handlers receive the trimmed argument string and the
//! sender's nickname.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use super::contact::Contact;
use super::handlers;
use super::services::ChatServices;
use super::watch::WatchList;
use crate::build::ControlError;
use crate::transport::TransportError;
use crate::BuildMucError;

/// Failure raised by a command handler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Bad arguments. The message is shown to the user verbatim.
    #[error("{0}")]
    Usage(String),
    /// Anything else. Only `kind` is shown to the user.
    #[error("{kind}: {detail}")]
    Failed { kind: &'static str, detail: String },
}

impl CommandError {
    /// Create a usage error.
    pub fn usage(message: impl Into<String>) -> Self {
        CommandError::Usage(message.into())
    }

    /// Create an unclassified failure.
    pub fn failed(kind: &'static str, detail: impl fmt::Display) -> Self {
        CommandError::Failed {
            kind,
            detail: detail.to_string(),
        }
    }
}

impl From<BuildMucError> for CommandError {
    fn from(e: BuildMucError) -> Self {
        CommandError::failed(e.kind(), &e)
    }
}

impl From<TransportError> for CommandError {
    fn from(e: TransportError) -> Self {
        BuildMucError::from(e).into()
    }
}

impl From<ControlError> for CommandError {
    fn from(e: ControlError) -> Self {
        BuildMucError::from(e).into()
    }
}

/// Result of running a command handler.
pub type CommandResult = std::result::Result<(), CommandError>;

/// Everything a handler may touch while it runs.
pub struct CommandContext<'a> {
    /// The contact the command came from; replies go through it.
    pub contact: &'a mut Contact,
    /// Bot-wide collaborators.
    pub services: &'a ChatServices,
    /// Builders watched in this room.
    pub watches: &'a mut WatchList,
}

/// Handler signature: `(context, argument, sender nickname)`.
pub type CommandFn = dyn Fn(&mut CommandContext<'_>, &str, &str) -> CommandResult + Send + Sync;

/// A named command with its usage text.
#[derive(Clone)]
pub struct Command {
    name: String,
    usage: String,
    handler: Arc<CommandFn>,
}

impl Command {
    /// Create a command.
    pub fn new<F>(name: impl Into<String>, usage: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut CommandContext<'_>, &str, &str) -> CommandResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            usage: usage.into(),
            handler: Arc::new(handler),
        }
    }

    /// Command name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// One-line usage text.
    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// Run the handler.
    pub fn invoke(&self, ctx: &mut CommandContext<'_>, args: &str, who: &str) -> CommandResult {
        (self.handler)(ctx, args, who)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("usage", &self.usage)
            .finish_non_exhaustive()
    }
}

/// Fixed lookup table from command name to handler.
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    commands: HashMap<String, Command>,
    excited: Command,
}

impl CommandDispatcher {
    /// Create a dispatcher with no commands and the default excited fallback.
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
            excited: Command::new("excited", "", handlers::excited),
        }
    }

    /// Create a dispatcher with the built-in commands.
    ///
    /// `force` and `stop` are only registered when `allow_force` is set.
    pub fn with_builtins(allow_force: bool) -> Self {
        let mut dispatcher = Self::new();
        for command in handlers::builtins() {
            dispatcher.register(command);
        }
        if allow_force {
            for command in handlers::control_builtins() {
                dispatcher.register(command);
            }
        }
        dispatcher
    }

    /// Add or replace a command.
    pub fn register(&mut self, command: Command) {
        self.commands.insert(command.name.clone(), command);
    }

    /// Look up a command by exact name.
    pub fn resolve(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// The excited fallback handler.
    pub fn excited(&self) -> &Command {
        &self.excited
    }

    /// Sorted names of all registered commands.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for CommandDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a message into command name and argument at the first whitespace run.
///
/// The argument is empty when the message has no whitespace.
pub fn split_command(message: &str) -> (&str, &str) {
    match message.find(char::is_whitespace) {
        Some(pos) => (&message[..pos], message[pos..].trim_start()),
        None => (message, ""),
    }
}

/// Split a command argument into whitespace-separated words.
///
/// No quoting rules apply; chat text is taken as typed.
pub fn split_args(args: &str) -> Vec<&str> {
    args.split_whitespace().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_command() {
        assert_eq!(split_command("status"), ("status", ""));
        assert_eq!(split_command("status linux"), ("status", "linux"));
        assert_eq!(
            split_command("force \t build  linux now "),
            ("force", "build  linux now ")
        );
        assert_eq!(split_command(""), ("", ""));
    }

    #[test]
    fn test_split_args_ignores_quotes() {
        assert_eq!(
            split_args(" build linux \"it's broken\" "),
            vec!["build", "linux", "\"it's", "broken\""]
        );
        assert!(split_args("   ").is_empty());
    }

    #[test]
    fn test_builtins_without_force() {
        let dispatcher = CommandDispatcher::with_builtins(false);
        assert!(dispatcher.resolve("status").is_some());
        assert!(dispatcher.resolve("help").is_some());
        assert!(dispatcher.resolve("force").is_none());
        assert!(dispatcher.resolve("stop").is_none());
    }

    #[test]
    fn test_builtins_with_force() {
        let dispatcher = CommandDispatcher::with_builtins(true);
        assert!(dispatcher.resolve("force").is_some());
        assert!(dispatcher.resolve("stop").is_some());
    }

    #[test]
    fn test_resolve_is_case_sensitive_and_exact() {
        let dispatcher = CommandDispatcher::with_builtins(false);
        assert!(dispatcher.resolve("Status").is_none());
        assert!(dispatcher.resolve("stat").is_none());
        assert!(dispatcher.resolve("statuses").is_none());
    }

    #[test]
    fn test_names_sorted() {
        let dispatcher = CommandDispatcher::with_builtins(false);
        let names = dispatcher.names();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        assert!(names.contains(&"commands"));
    }

    #[test]
    fn test_register_replaces() {
        let mut dispatcher = CommandDispatcher::new();
        dispatcher.register(Command::new("ping", "ping", |_, _, _| Ok(())));
        dispatcher.register(Command::new("ping", "ping again", |_, _, _| Ok(())));
        assert_eq!(dispatcher.resolve("ping").unwrap().usage(), "ping again");
        assert_eq!(dispatcher.names(), vec!["ping"]);
    }

    #[test]
    fn test_error_conversions_keep_kind_only() {
        let err: CommandError = TransportError::Closed.into();
        assert!(matches!(err, CommandError::Failed { kind: "Transport", .. }));

        let err: CommandError = ControlError::UnknownBuilder("x".to_string()).into();
        match err {
            CommandError::Failed { kind, detail } => {
                assert_eq!(kind, "Control");
                assert!(detail.contains("no such builder"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_usage_error_display() {
        assert_eq!(
            CommandError::usage("try 'list builders'").to_string(),
            "try 'list builders'"
        );
    }
}
