//! Peer identity within a chat room.

use std::fmt;

/// Stable key for one conversational partner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PeerIdentity {
    /// A room occupant, known by nickname within that room.
    Occupant { room: String, nick: String },
    /// A peer addressed directly by its bare identity.
    Direct(String),
}

impl PeerIdentity {
    /// Identity of a room occupant.
    pub fn occupant(room: impl Into<String>, nick: impl Into<String>) -> Self {
        PeerIdentity::Occupant {
            room: room.into(),
            nick: nick.into(),
        }
    }

    /// Identity of a direct peer.
    pub fn direct(id: impl Into<String>) -> Self {
        PeerIdentity::Direct(id.into())
    }

    /// Room the identity belongs to, if any.
    pub fn room(&self) -> Option<&str> {
        match self {
            PeerIdentity::Occupant { room, .. } => Some(room),
            PeerIdentity::Direct(_) => None,
        }
    }

    /// Name to address the peer by.
    pub fn nick(&self) -> &str {
        match self {
            PeerIdentity::Occupant { nick, .. } => nick,
            PeerIdentity::Direct(id) => id,
        }
    }
}

impl fmt::Display for PeerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeerIdentity::Occupant { room, nick } => write!(f, "{room}/{nick}"),
            PeerIdentity::Direct(id) => write!(f, "{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occupant_identity() {
        let id = PeerIdentity::occupant("ci@muc", "alice");
        assert_eq!(id.room(), Some("ci@muc"));
        assert_eq!(id.nick(), "alice");
        assert_eq!(id.to_string(), "ci@muc/alice");
    }

    #[test]
    fn test_direct_identity() {
        let id = PeerIdentity::direct("alice@example.org");
        assert!(id.room().is_none());
        assert_eq!(id.nick(), "alice@example.org");
        assert_eq!(id.to_string(), "alice@example.org");
    }

    #[test]
    fn test_same_nick_different_rooms_differ() {
        assert_ne!(
            PeerIdentity::occupant("ci@muc", "alice"),
            PeerIdentity::occupant("release@muc", "alice")
        );
    }
}
