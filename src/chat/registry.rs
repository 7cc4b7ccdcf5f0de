//! Contact registry for a room.
//!
//! Owns every [`Contact`] in one room, keyed by [`PeerIdentity`]. Contacts
//! are created lazily on first lookup and only ever removed through the
//! registry.

use std::collections::HashMap;
use std::sync::Arc;

use super::contact::Contact;
use super::identity::PeerIdentity;
use crate::transport::Transport;

/// Identity to contact mapping for one room.
pub struct ContactRegistry {
    /// Room replies from these contacts are delivered to.
    room: String,
    transport: Arc<dyn Transport>,
    contacts: HashMap<PeerIdentity, Contact>,
}

impl ContactRegistry {
    /// Create an empty registry for a room.
    pub fn new(room: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            room: room.into(),
            transport,
            contacts: HashMap::new(),
        }
    }

    /// Room the registry belongs to.
    pub fn room(&self) -> &str {
        &self.room
    }

    /// Get the contact for an identity, creating it if needed.
    pub fn get_or_create(&mut self, identity: PeerIdentity) -> &mut Contact {
        let Self {
            room,
            transport,
            contacts,
        } = self;
        contacts
            .entry(identity)
            .or_insert_with_key(|id| Contact::new(id.clone(), room.clone(), Arc::clone(transport)))
    }

    /// Get an existing contact.
    pub fn get(&self, identity: &PeerIdentity) -> Option<&Contact> {
        self.contacts.get(identity)
    }

    /// Remove a contact. Absent identities are ignored.
    pub fn remove(&mut self, identity: &PeerIdentity) -> Option<Contact> {
        self.contacts.remove(identity)
    }

    /// Check if a contact exists.
    pub fn contains(&self, identity: &PeerIdentity) -> bool {
        self.contacts.contains_key(identity)
    }

    /// Number of contacts.
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    /// Check if there are no contacts.
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Drop every contact.
    pub fn clear(&mut self) {
        self.contacts.clear();
    }

    /// Messages handled across all contacts.
    pub fn total_messages(&self) -> u64 {
        self.contacts.values().map(Contact::message_count).sum()
    }
}
