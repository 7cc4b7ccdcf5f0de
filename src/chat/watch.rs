//! Contacts waiting to hear when a builder's running builds finish.

use std::collections::HashMap;

use super::identity::PeerIdentity;

/// Builder name to the peers watching it.
#[derive(Debug, Default)]
pub struct WatchList {
    watchers: HashMap<String, Vec<PeerIdentity>>,
}

impl WatchList {
    /// Create an empty watch list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a watcher. Returns false if the peer was already watching.
    pub fn add(&mut self, builder: &str, peer: PeerIdentity) -> bool {
        let peers = self.watchers.entry(builder.to_string()).or_default();
        if peers.contains(&peer) {
            return false;
        }
        peers.push(peer);
        true
    }

    /// Remove and return everyone watching the builder.
    pub fn take(&mut self, builder: &str) -> Vec<PeerIdentity> {
        self.watchers.remove(builder).unwrap_or_default()
    }

    /// Forget a peer everywhere.
    pub fn remove_peer(&mut self, peer: &PeerIdentity) {
        self.watchers.retain(|_, peers| {
            peers.retain(|p| p != peer);
            !peers.is_empty()
        });
    }

    /// Number of peers watching the builder.
    pub fn count(&self, builder: &str) -> usize {
        self.watchers.get(builder).map_or(0, Vec::len)
    }

    /// Drop all watches.
    pub fn clear(&mut self) {
        self.watchers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_take() {
        let mut watches = WatchList::new();
        let alice = PeerIdentity::occupant("ci@muc", "alice");

        assert!(watches.add("linux", alice.clone()));
        assert!(!watches.add("linux", alice.clone()));
        assert_eq!(watches.count("linux"), 1);

        assert_eq!(watches.take("linux"), vec![alice]);
        assert_eq!(watches.count("linux"), 0);
        assert!(watches.take("linux").is_empty());
    }

    #[test]
    fn test_remove_peer() {
        let mut watches = WatchList::new();
        let alice = PeerIdentity::occupant("ci@muc", "alice");
        let bob = PeerIdentity::occupant("ci@muc", "bob");
        watches.add("linux", alice.clone());
        watches.add("linux", bob.clone());
        watches.add("win", alice.clone());

        watches.remove_peer(&alice);
        assert_eq!(watches.count("linux"), 1);
        assert_eq!(watches.count("win"), 0);
        assert_eq!(watches.take("linux"), vec![bob]);
    }
}
