//! Full-state topology snapshot.
//!
//! A [`TopologySnapshot`] is derived read-only from the registry and mapping
//! table and is recomputed fresh on every broadcast — never cached, never
//! diffed. N mutations in sequence produce N full snapshots even when they
//! collapse to the same final state.

use serde::{Deserialize, Serialize};

use super::{ClientName, ClientRegistry, MappingTable};

/// The full current topology: registered names plus the directed edge set.
///
/// Both sequences are ordered (registration order, edge-insertion order) so
/// that repeated snapshots of an unchanged topology are identical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologySnapshot {
    /// Registered client names in registration order.
    pub clients: Vec<ClientName>,
    /// Directed `[from, to]` name pairs in edge-insertion order.
    pub mappings: Vec<[ClientName; 2]>,
}

impl TopologySnapshot {
    /// Builds a snapshot from the current registry and mapping table.
    ///
    /// Edge endpoints are resolved to their current names; an edge whose
    /// endpoint is no longer registered cannot exist by invariant (teardown
    /// removes touching edges atomically), so unresolvable edges are skipped
    /// rather than panicking.
    #[must_use]
    pub fn capture(registry: &ClientRegistry, table: &MappingTable) -> Self {
        let mappings = table
            .pairs()
            .iter()
            .filter_map(|&(from, to)| {
                let from = registry.name_of(from)?.clone();
                let to = registry.name_of(to)?.clone();
                Some([from, to])
            })
            .collect();

        Self {
            clients: registry.names(),
            mappings,
        }
    }
}
