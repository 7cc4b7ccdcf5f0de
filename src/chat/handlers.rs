//! Built-in chat commands.

use chrono::Utc;

use super::command::{split_args, Command, CommandContext, CommandError, CommandResult};
use crate::build::{BuildRequest, BuilderSnapshot, BuilderState};
use crate::datetime::format_age;

const FORCE_USAGE: &str =
    "force build [--branch=BRANCH] [--revision=REVISION] <builder> [reason...]";
const STOP_USAGE: &str = "stop build <builder> [reason...]";

const DANCE: &[&str] = &["<(^.^<)", "<(^.^)>", "(>^.^)>", "(7^.^)7", "(>^.^<)"];

/// Commands available in every room.
pub(super) fn builtins() -> Vec<Command> {
    vec![
        Command::new("help", "help <command> - show usage for a command", help),
        Command::new("commands", "commands - list all commands", commands),
        Command::new("version", "version - show the bot version", version),
        Command::new("list", "list builders - list configured builders", list),
        Command::new(
            "status",
            "status [all|<builder>] - show current builder status",
            status,
        ),
        Command::new(
            "last",
            "last [<builder>] - show the last finished build",
            last,
        ),
        Command::new(
            "watch",
            "watch <builder> - report when the running build finishes",
            watch,
        ),
        Command::new("mute", "mute - stop talking to you", mute),
        Command::new("unmute", "unmute - start talking to you again", unmute),
        Command::new("dance", "dance - do a little dance", dance),
    ]
}

/// Commands that change build state; registered only when forcing is allowed.
pub(super) fn control_builtins() -> Vec<Command> {
    vec![
        Command::new("force", FORCE_USAGE, force),
        Command::new("stop", STOP_USAGE, stop),
    ]
}

/// Fallback for unknown commands ending in '!'.
pub(super) fn excited(ctx: &mut CommandContext<'_>, _args: &str, _who: &str) -> CommandResult {
    ctx.contact.send("What you say!")?;
    Ok(())
}

fn help(ctx: &mut CommandContext<'_>, args: &str, _who: &str) -> CommandResult {
    let args = split_args(args);
    let Some(name) = args.first() else {
        return Err(CommandError::usage(
            "Get help on what? (try 'help <command>', or 'commands' for a command list)",
        ));
    };
    let command = ctx
        .services
        .dispatcher
        .resolve(name)
        .ok_or_else(|| CommandError::usage(format!("No usage info for '{name}'")))?;
    ctx.contact.send(&format!("Usage: {}", command.usage()))?;
    Ok(())
}

fn commands(ctx: &mut CommandContext<'_>, _args: &str, _who: &str) -> CommandResult {
    let names = ctx.services.dispatcher.names().join(", ");
    ctx.contact.send(&format!("Buildbot commands: {names}"))?;
    Ok(())
}

fn version(ctx: &mut CommandContext<'_>, _args: &str, _who: &str) -> CommandResult {
    ctx.contact.send(&format!(
        "buildmuc-{} at your service",
        env!("CARGO_PKG_VERSION")
    ))?;
    Ok(())
}

fn list(ctx: &mut CommandContext<'_>, args: &str, _who: &str) -> CommandResult {
    if split_args(args) != ["builders"] {
        return Err(CommandError::usage("try 'list builders'"));
    }

    let names: Vec<String> = ctx
        .services
        .visible_builders()
        .into_iter()
        .map(|b| match b.state {
            BuilderState::Offline => format!("{}[{}]", b.name, b.state.as_str()),
            _ => b.name,
        })
        .collect();
    ctx.contact
        .send(&format!("Configured builders: {}", names.join(" ")))?;
    Ok(())
}

fn lookup(ctx: &CommandContext<'_>, name: &str) -> Result<BuilderSnapshot, CommandError> {
    ctx.services
        .visible_builder(name)
        .ok_or_else(|| CommandError::usage(format!("no such builder '{name}'")))
}

fn build_numbers(numbers: &[u64]) -> String {
    numbers
        .iter()
        .map(|n| format!("#{n}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn status_line(builder: &BuilderSnapshot) -> String {
    match builder.state {
        BuilderState::Offline => format!("{}: {}", builder.name, builder.state.as_str()),
        BuilderState::Building => {
            format!("{}: running {}", builder.name, build_numbers(&builder.running))
        }
        BuilderState::Idle => match &builder.last {
            Some(last) => format!(
                "{}: {}, last build {} ago: {}",
                builder.name,
                builder.state.as_str(),
                format_age(Utc::now() - last.finished_at),
                last.result
            ),
            None => format!("{}: {}", builder.name, builder.state.as_str()),
        },
    }
}

fn status(ctx: &mut CommandContext<'_>, args: &str, _who: &str) -> CommandResult {
    let which = match split_args(args).as_slice() {
        [] => "all",
        [which] => *which,
        _ => return Err(CommandError::usage("try 'status <builder>'")),
    };

    if which == "all" {
        let builders = ctx.services.visible_builders();
        if builders.is_empty() {
            ctx.contact.send("no builders are configured")?;
        }
        for builder in &builders {
            ctx.contact.send(&status_line(builder))?;
        }
        return Ok(());
    }

    let builder = lookup(ctx, which)?;
    ctx.contact.send(&status_line(&builder))?;
    Ok(())
}

fn last_line(builder: &BuilderSnapshot) -> String {
    match &builder.last {
        None => format!(
            "last build [{}]: (no builds run since last restart)",
            builder.name
        ),
        Some(last) => {
            let mut line = format!(
                "last build [{}] (#{}, {} ago): {}",
                builder.name,
                last.number,
                format_age(Utc::now() - last.finished_at),
                last.result
            );
            if !last.text.is_empty() {
                line.push_str(&format!(" [{}]", last.text.join(" ")));
            }
            line
        }
    }
}

fn last(ctx: &mut CommandContext<'_>, args: &str, _who: &str) -> CommandResult {
    let builders = match split_args(args).as_slice() {
        [] => ctx.services.visible_builders(),
        [which] => vec![lookup(ctx, which)?],
        _ => return Err(CommandError::usage("try 'last <builder>'")),
    };
    for builder in &builders {
        ctx.contact.send(&last_line(builder))?;
    }
    Ok(())
}

fn watch(ctx: &mut CommandContext<'_>, args: &str, _who: &str) -> CommandResult {
    let which = match split_args(args).as_slice() {
        [which] => *which,
        _ => return Err(CommandError::usage("try 'watch <builder>'")),
    };
    let builder = lookup(ctx, which)?;

    if builder.state != BuilderState::Building {
        ctx.contact.send("there are no builds currently running")?;
        return Ok(());
    }

    let peer = ctx.contact.identity().clone();
    ctx.watches.add(&builder.name, peer);
    ctx.contact.send(&format!(
        "watching build {} {} until it finishes..",
        builder.name,
        build_numbers(&builder.running)
    ))?;
    Ok(())
}

fn mute(ctx: &mut CommandContext<'_>, _args: &str, _who: &str) -> CommandResult {
    ctx.contact.send("Shutting up for now.")?;
    ctx.contact.set_muted(true);
    Ok(())
}

fn unmute(ctx: &mut CommandContext<'_>, _args: &str, _who: &str) -> CommandResult {
    if ctx.contact.is_muted() {
        ctx.contact.set_muted(false);
        ctx.contact.send("I'm baaaaaaaaaaack!")?;
    } else {
        ctx.contact.send(
            "You hadn't told me to be quiet, but it's the thought that counts, right?",
        )?;
    }
    Ok(())
}

fn dance(ctx: &mut CommandContext<'_>, _args: &str, _who: &str) -> CommandResult {
    for step in DANCE {
        ctx.contact.send(step)?;
    }
    Ok(())
}

fn valid_ref(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | '-' | '/'))
}

fn describe_user(ctx: &CommandContext<'_>, who: &str) -> String {
    match ctx.contact.identity().room() {
        Some(room) => format!("chat user {who} on {room}"),
        None => format!("chat user {who}"),
    }
}

fn force(ctx: &mut CommandContext<'_>, args: &str, who: &str) -> CommandResult {
    let words = split_args(args);
    let Some((&"build", rest)) = words.split_first() else {
        return Err(CommandError::usage(format!("try '{FORCE_USAGE}'")));
    };

    let mut branch = None;
    let mut revision = None;
    let mut rest = rest;
    while let Some((word, tail)) = rest.split_first() {
        let Some(option) = word.strip_prefix("--") else {
            break;
        };
        match option.split_once('=') {
            Some(("branch", value)) if valid_ref(value) => branch = Some(value.to_string()),
            Some(("revision", value)) if valid_ref(value) => revision = Some(value.to_string()),
            Some((key @ ("branch" | "revision"), value)) => {
                return Err(CommandError::usage(format!("bad {key}: '{value}'")));
            }
            _ => return Err(CommandError::usage(format!("unknown option '{word}'"))),
        }
        rest = tail;
    }

    let Some((which, reason)) = rest.split_first() else {
        return Err(CommandError::usage(format!("try '{FORCE_USAGE}'")));
    };
    let builder = lookup(ctx, which)?;
    if builder.state == BuilderState::Offline {
        ctx.contact
            .send(&format!("sorry, I can't force a build: {} is offline", builder.name))?;
        return Ok(());
    }

    let control = ctx
        .services
        .control
        .as_ref()
        .ok_or_else(|| CommandError::failed("Control", "build control is not configured"))?;
    let request = BuildRequest {
        builder: builder.name.clone(),
        reason: format!("forced: by {}: {}", describe_user(ctx, who), reason.join(" ")),
        branch,
        revision,
    };
    control.request_build(request)?;
    ctx.contact
        .send(&format!("build for {} requested", builder.name))?;
    Ok(())
}

fn stop(ctx: &mut CommandContext<'_>, args: &str, who: &str) -> CommandResult {
    let words = split_args(args);
    let (which, reason) = match words.as_slice() {
        ["build", which, reason @ ..] => (*which, reason),
        _ => return Err(CommandError::usage(format!("try '{STOP_USAGE}'"))),
    };
    let builder = lookup(ctx, which)?;
    if builder.state != BuilderState::Building {
        ctx.contact
            .send(&format!("no build is running on {}", builder.name))?;
        return Ok(());
    }

    let control = ctx
        .services
        .control
        .as_ref()
        .ok_or_else(|| CommandError::failed("Control", "build control is not configured"))?;
    let reason = format!("stopped: by {}: {}", describe_user(ctx, who), reason.join(" "));
    control.stop_build(&builder.name, &reason)?;
    ctx.contact
        .send(&format!("build {} interrupted", builder.name))?;
    Ok(())
}
