//! Registry of named connections.
//!
//! [`ClientRegistry`] owns the set of currently-registered connections and
//! enforces name uniqueness at registration time. Entries are kept in
//! registration order because the order is display-relevant: two snapshots
//! taken with no mutation in between must list clients identically.
//!
//! The registry is a plain struct with no interior locking. All mutation is
//! funneled through the relay service, which holds the whole aggregate
//! (sockets, registry, mapping table) behind a single lock.

use crate::error::RelayError;

use super::{ClientName, ConnectionId};

/// One registered connection: its stable identity plus its current name.
#[derive(Debug, Clone)]
pub struct ClientEntry {
    /// Identity of the underlying transport.
    pub id: ConnectionId,
    /// Name claimed via `join_remote` (or applied by a later rename).
    pub name: ClientName,
}

/// Ordered set of registered connections with unique names.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: Vec<ClientEntry>,
}

impl ClientRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `id` under `name`, appending it in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::NameTaken`] if the name already belongs to a
    /// currently-registered connection; the registry is left unchanged.
    pub fn register(&mut self, name: ClientName, id: ConnectionId) -> Result<(), RelayError> {
        if self.clients.iter().any(|c| c.name == name) {
            return Err(RelayError::NameTaken(name));
        }
        self.clients.push(ClientEntry { id, name });
        Ok(())
    }

    /// Removes the connection with the given id, if present.
    ///
    /// Absent ids are a silent no-op so that teardown can run once per
    /// close-like transport event without tracking which one fired first.
    pub fn unregister(&mut self, id: ConnectionId) -> Option<ClientEntry> {
        let idx = self.clients.iter().position(|c| c.id == id)?;
        Some(self.clients.remove(idx))
    }

    /// Renames the connection currently registered as `old`.
    ///
    /// The rename is applied unconditionally: there is no collision check
    /// against existing names, so two registered connections can end up with
    /// equal names and name lookups then resolve to the earlier registrant.
    /// See `rename_onto_taken_name_applies_unconditionally` below.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::UnknownClient`] if no connection is registered
    /// as `old`.
    pub fn rename(&mut self, old: &ClientName, new: ClientName) -> Result<ConnectionId, RelayError> {
        let entry = self
            .clients
            .iter_mut()
            .find(|c| c.name == *old)
            .ok_or_else(|| RelayError::UnknownClient(old.clone()))?;
        entry.name = new;
        Ok(entry.id)
    }

    /// Resolves a name to the id of the connection registered under it.
    #[must_use]
    pub fn id_of(&self, name: &ClientName) -> Option<ConnectionId> {
        self.clients.iter().find(|c| c.name == *name).map(|c| c.id)
    }

    /// Returns the current name of the connection with the given id.
    #[must_use]
    pub fn name_of(&self, id: ConnectionId) -> Option<&ClientName> {
        self.clients.iter().find(|c| c.id == id).map(|c| &c.name)
    }

    /// Returns `true` if the connection with the given id is registered.
    #[must_use]
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.clients.iter().any(|c| c.id == id)
    }

    /// Returns all registered names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<ClientName> {
        self.clients.iter().map(|c| c.name.clone()).collect()
    }

    /// Returns the number of registered connections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns `true` if no connection is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
