//! Directed mapping table between registered connections.
//!
//! Edges are stored by [`ConnectionId`], not by name, so a rename never
//! invalidates an edge. Insertion order is preserved because the edge list is
//! part of every topology snapshot.
//!
//! The table itself is deliberately dumb: endpoint existence is validated by
//! the relay service against the registry before insertion, and the service
//! also owns the typed errors (it has both endpoint names in hand).

use super::ConnectionId;

/// Ordered set of directed `(from, to)` edges, at most one per ordered pair.
#[derive(Debug, Default)]
pub struct MappingTable {
    edges: Vec<(ConnectionId, ConnectionId)>,
}

impl MappingTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the exact ordered pair is present.
    #[must_use]
    pub fn contains(&self, from: ConnectionId, to: ConnectionId) -> bool {
        self.edges.iter().any(|&(f, t)| f == from && t == to)
    }

    /// Inserts a directed edge. Duplicate ordered pairs are rejected without
    /// mutating the table. Fan-out and fan-in are both permitted, as is a
    /// self-edge (`from == to`).
    ///
    /// Returns `false` if the edge already existed.
    pub fn insert(&mut self, from: ConnectionId, to: ConnectionId) -> bool {
        if self.contains(from, to) {
            return false;
        }
        self.edges.push((from, to));
        true
    }

    /// Removes the exact ordered pair. Returns `false` if it was not present.
    pub fn remove(&mut self, from: ConnectionId, to: ConnectionId) -> bool {
        let before = self.edges.len();
        self.edges.retain(|&(f, t)| !(f == from && t == to));
        self.edges.len() != before
    }

    /// Removes every edge where `id` appears as either endpoint.
    ///
    /// Used only by connection teardown; unlike an explicit remove, this
    /// sends no per-edge notifications to the surviving endpoints. Returns
    /// the number of edges removed.
    pub fn remove_all_touching(&mut self, id: ConnectionId) -> usize {
        let before = self.edges.len();
        self.edges.retain(|&(f, t)| f != id && t != id);
        before - self.edges.len()
    }

    /// Returns the receivers mapped from `from`, in insertion order.
    #[must_use]
    pub fn receivers_of(&self, from: ConnectionId) -> Vec<ConnectionId> {
        self.edges
            .iter()
            .filter(|&&(f, _)| f == from)
            .map(|&(_, t)| t)
            .collect()
    }

    /// Returns all edges in insertion order.
    #[must_use]
    pub fn pairs(&self) -> &[(ConnectionId, ConnectionId)] {
        &self.edges
    }

    /// Returns the number of edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` if the table holds no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
