//! Message routing and command dispatch through a joined room.

mod common;

use buildmuc::build::ControlRequest;
use buildmuc::chat::{Command, CommandError, PeerIdentity};
use buildmuc::transport::{InboundRoomEvent, OutboundCommand};
use buildmuc::BotEvent;

use common::{TestBot, NICK, ROOM};

fn contact_count(test: &TestBot, nick: &str) -> Option<u64> {
    test.bot
        .room(ROOM)
        .and_then(|room| room.registry().get(&PeerIdentity::occupant(ROOM, nick)))
        .map(|contact| contact.message_count())
}

#[test]
fn test_addressed_status_invokes_handler() {
    let mut test = TestBot::joined();
    test.bot
        .services_mut()
        .dispatcher
        .register(Command::new("status", "status", |ctx, args, who| {
            ctx.contact.send(&format!("args=[{args}] who={who}"))?;
            Ok(())
        }));

    test.say("alice", "bot: status");

    assert_eq!(test.sent(), vec!["args=[] who=alice"]);
    assert_eq!(contact_count(&test, "alice"), Some(1));
}

#[test]
fn test_builtin_status_reports_builders() {
    let mut test = TestBot::joined();

    test.say("alice", "bot: status");

    assert_eq!(test.sent(), vec!["linux: idle", "win: idle"]);
}

#[test]
fn test_self_echo_never_touches_contacts() {
    let mut test = TestBot::joined();
    let before = test.bot.room(ROOM).unwrap().registry().len();

    test.say(NICK, "bot: version");
    test.say(NICK, "/me kicks bot");

    let room = test.bot.room(ROOM).unwrap();
    assert_eq!(room.registry().len(), before);
    assert_eq!(room.registry().total_messages(), 0);
    assert!(test.sent().is_empty());
}

#[test]
fn test_action_does_not_dispatch() {
    let mut test = TestBot::joined();

    test.say("alice", "/me waves");
    assert!(test.sent().is_empty());
    assert_eq!(contact_count(&test, "alice"), Some(0));

    test.say("alice", "/me hugs bot");
    assert_eq!(test.sent(), vec!["/me hugs alice too"]);
}

#[test]
fn test_failure_reports_only_kind() {
    let mut test = TestBot::joined();
    test.bot
        .services_mut()
        .dispatcher
        .register(Command::new("explode", "explode", |_, _, _| {
            Err(CommandError::failed("ConnectionRefused", "db at 10.0.0.7:5432 refused"))
        }));

    test.say("alice", "bot: explode");

    let sent = test.sent();
    assert_eq!(sent, vec!["Something bad happened (see logs): ConnectionRefused"]);
    assert_eq!(contact_count(&test, "alice"), Some(1));
}

#[test]
fn test_unknown_and_excited() {
    let mut test = TestBot::joined();

    test.say("alice", "bot: frobnicate");
    assert!(test.sent().is_empty());

    test.say("alice", "bot: frobnicate!");
    assert_eq!(test.sent(), vec!["What you say!"]);

    test.say("alice", "bot: What happen ?");
    assert_eq!(test.sent(), vec!["Somebody set up us the bomb."]);

    assert_eq!(contact_count(&test, "alice"), Some(3));
}

#[test]
fn test_mute_is_per_contact() {
    let mut test = TestBot::joined();

    test.say("alice", "bot: mute");
    assert_eq!(test.sent(), vec!["Shutting up for now."]);

    test.say("alice", "bot: version");
    test.say("alice", "bot: dance");
    assert!(test.sent().is_empty());

    test.say("bob", "bot: version");
    assert_eq!(test.sent().len(), 1);

    test.say("alice", "bot: unmute");
    assert_eq!(test.sent(), vec!["I'm baaaaaaaaaaack!"]);
}

#[test]
fn test_history_replay_is_ignored() {
    let mut test = TestBot::joined();

    test.bot.handle(BotEvent::RoomMessage(
        InboundRoomEvent::new(ROOM, "alice", "bot: force build linux").replayed(),
    ));

    assert!(test.drain().is_empty());
    assert!(test.control_requests().is_empty());
    assert_eq!(contact_count(&test, "alice"), None);
}

#[test]
fn test_force_build_hands_off_request() {
    let mut test = TestBot::joined();

    test.say("alice", "bot: force build --branch=main linux nightly rerun");

    assert_eq!(test.sent(), vec!["build for linux requested"]);
    let requests = test.control_requests();
    assert_eq!(requests.len(), 1);
    match &requests[0] {
        ControlRequest::Build(request) => {
            assert_eq!(request.builder, "linux");
            assert_eq!(request.branch.as_deref(), Some("main"));
            assert!(request.reason.contains("alice"));
            assert!(request.reason.ends_with("nightly rerun"));
        }
        other => panic!("unexpected request: {other:?}"),
    }
}

#[test]
fn test_messages_for_unjoined_room_are_dropped() {
    let mut test = TestBot::new();
    test.bot.handle(BotEvent::Connected);
    test.drain();

    test.say("alice", "bot: version");

    assert!(test.sent().is_empty());
    assert_eq!(contact_count(&test, "alice"), None);
}

#[test]
fn test_reply_goes_to_room() {
    let mut test = TestBot::joined();

    test.say("alice", "bot: version");

    let out = test.drain();
    assert_eq!(out.len(), 1);
    assert!(matches!(
        &out[0],
        OutboundCommand::GroupMessage { room, text } if room == ROOM && text.contains("at your service")
    ));
}
