//! Relay service: orchestrates the registry, mapping table, and broadcasts.
//!
//! [`RelayService`] owns the entire mutable aggregate — the socket sender
//! map, the [`ClientRegistry`] and the [`MappingTable`] — behind one
//! [`tokio::sync::Mutex`]. Every operation acquires the lock once and runs
//! lookup, mutation, directed notifications, and the topology broadcast to
//! completion before releasing it. There is no await point between
//! acquisition and release (socket sends go through unbounded channels and
//! never block), so no two mutations can interleave.
//!
//! Socket delivery is fire-and-forget: a send to a closed or missing socket
//! is dropped without error, and nothing is retried or acknowledged.

use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::Mutex;
use tokio::sync::mpsc;

use crate::domain::{ClientName, ClientRegistry, ConnectionId, MappingTable, TopologySnapshot};
use crate::error::RelayError;
use crate::ws::messages::WsMessage;

/// Outbound half of one socket's message queue.
///
/// The queue is unbounded on purpose: the core never waits on a slow
/// receiver, and backpressure is delegated entirely to the transport layer.
pub type OutboundSender = mpsc::UnboundedSender<WsMessage>;

/// The single mutable aggregate: sockets, registry, and mapping table.
#[derive(Debug, Default)]
struct RelayCore {
    /// Outbound queue of every attached socket, registered or not.
    sockets: HashMap<ConnectionId, OutboundSender>,
    registry: ClientRegistry,
    table: MappingTable,
}

impl RelayCore {
    /// Queues a message on one socket, if it is still attached.
    fn send_to(&self, id: ConnectionId, msg: WsMessage) {
        if let Some(tx) = self.sockets.get(&id) {
            let _ = tx.send(msg);
        }
    }

    /// Sends a fresh topology snapshot to every attached socket.
    ///
    /// Observers that never registered a name receive the broadcast too.
    /// The snapshot is rebuilt on every call; nothing is cached or diffed.
    fn broadcast_state(&self) {
        let msg = WsMessage::remote_state(TopologySnapshot::capture(&self.registry, &self.table));
        for tx in self.sockets.values() {
            let _ = tx.send(msg.clone());
        }
    }
}

/// Coordinating component for all relay state.
///
/// Handlers and connection tasks share one `Arc<RelayService>`; all
/// mutation entry points funnel through it.
#[derive(Debug, Default)]
pub struct RelayService {
    core: Mutex<RelayCore>,
}

impl RelayService {
    /// Creates a relay with no attached sockets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a new socket and returns its identity.
    ///
    /// The connection starts unregistered: it receives every topology
    /// broadcast from now on but is not visible in snapshots until a
    /// successful join.
    pub async fn attach(&self, sender: OutboundSender) -> ConnectionId {
        let id = ConnectionId::new();
        let mut core = self.core.lock().await;
        core.sockets.insert(id, sender);
        tracing::debug!(%id, "socket attached");
        id
    }

    /// Registers the connection under `name`.
    ///
    /// On success the socket receives `join_remote_success` followed by the
    /// topology broadcast. On a name collision it receives
    /// `join_remote_fail` and no broadcast fires. A join from an
    /// already-registered connection is absorbed as a no-op, like every
    /// other non-collision error on the socket path.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::NameTaken`] when the name is already claimed.
    pub async fn join(&self, id: ConnectionId, name: ClientName) -> Result<(), RelayError> {
        let mut core = self.core.lock().await;

        if core.registry.contains(id) {
            tracing::debug!(%id, %name, "join from registered connection ignored");
            return Ok(());
        }

        if let Err(err) = core.registry.register(name.clone(), id) {
            core.send_to(
                id,
                WsMessage::JoinRemoteFail {
                    reason: "name taken".to_owned(),
                },
            );
            return Err(err);
        }

        tracing::info!(%name, %id, "client joined");
        core.send_to(id, WsMessage::JoinRemoteSuccess { name });
        core.broadcast_state();
        Ok(())
    }

    /// Renames the client currently registered as `old`.
    ///
    /// Applied unconditionally — no collision check against existing names
    /// (see the registry docs). The renamed client receives
    /// `rename_success`, then everyone receives the broadcast. Edges are
    /// keyed by connection identity, so mappings survive the rename.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::UnknownClient`] when no client is registered
    /// as `old`.
    pub async fn rename(&self, old: &ClientName, new: ClientName) -> Result<(), RelayError> {
        let mut core = self.core.lock().await;
        let id = core.registry.rename(old, new.clone())?;

        tracing::info!(old = %old, new = %new, "client renamed");
        core.send_to(id, WsMessage::RenameSuccess { new_name: new });
        core.broadcast_state();
        Ok(())
    }

    /// Tears down the client registered as `name`, as if its transport had
    /// closed.
    ///
    /// Dropping the socket's queue also ends its connection task, which
    /// closes the underlying transport.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::UnknownClient`] when no client is registered
    /// as `name`.
    pub async fn leave(&self, name: &ClientName) -> Result<(), RelayError> {
        let mut core = self.core.lock().await;
        let id = core
            .registry
            .id_of(name)
            .ok_or_else(|| RelayError::UnknownClient(name.clone()))?;
        teardown(&mut core, id);
        Ok(())
    }

    /// Creates the directed mapping `from → to`.
    ///
    /// Both endpoints must be registered and the ordered pair must not
    /// already exist; nothing mutates on failure. On success the sender
    /// endpoint receives `become_sender`, the receiver endpoint receives
    /// `become_receiver` — each exactly once, before the broadcast.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::UnknownClient`] naming the endpoint that is
    /// not registered, or [`RelayError::DuplicateMapping`] for a repeated
    /// ordered pair.
    pub async fn map(&self, from: &ClientName, to: &ClientName) -> Result<(), RelayError> {
        let mut core = self.core.lock().await;

        let from_id = core
            .registry
            .id_of(from)
            .ok_or_else(|| RelayError::UnknownClient(from.clone()))?;
        let to_id = core
            .registry
            .id_of(to)
            .ok_or_else(|| RelayError::UnknownClient(to.clone()))?;

        if !core.table.insert(from_id, to_id) {
            return Err(RelayError::DuplicateMapping {
                from: from.clone(),
                to: to.clone(),
            });
        }

        tracing::info!(%from, %to, "mapped");
        core.send_to(from_id, WsMessage::BecomeSender { to: to.clone() });
        core.send_to(to_id, WsMessage::BecomeReceiver { from: from.clone() });
        core.broadcast_state();
        Ok(())
    }

    /// Removes the directed mapping `from → to`.
    ///
    /// The receiver endpoint — and only the receiver endpoint — gets
    /// `unbecome_receiver` before the broadcast.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::MappingNotFound`] when the ordered pair does
    /// not exist, including when either name is not registered at all.
    pub async fn unmap(&self, from: &ClientName, to: &ClientName) -> Result<(), RelayError> {
        let mut core = self.core.lock().await;

        let not_found = || RelayError::MappingNotFound {
            from: from.clone(),
            to: to.clone(),
        };
        let from_id = core.registry.id_of(from).ok_or_else(not_found)?;
        let to_id = core.registry.id_of(to).ok_or_else(not_found)?;

        if !core.table.remove(from_id, to_id) {
            return Err(not_found());
        }

        tracing::info!(%from, %to, "unmapped");
        core.send_to(to_id, WsMessage::UnbecomeReceiver { from: from.clone() });
        core.broadcast_state();
        Ok(())
    }

    /// Forwards one frame from `sender` to every mapped receiver.
    ///
    /// The sender is resolved by the name carried in the message. An
    /// unknown sender or a sender with zero outgoing edges is a deliberate
    /// silent no-op. Read-only: no broadcast fires, and nothing is buffered
    /// between frames.
    pub async fn route_frame(&self, sender: &ClientName, frame: Value) {
        let core = self.core.lock().await;
        let Some(from_id) = core.registry.id_of(sender) else {
            return;
        };
        for to_id in core.table.receivers_of(from_id) {
            core.send_to(to_id, WsMessage::frame(sender.clone(), frame.clone()));
        }
    }

    /// Tears down a connection after a close-like transport event.
    ///
    /// Idempotent: the socket-handle removal is the gate, so whichever of
    /// close / disconnect / error arrives first performs the teardown and
    /// every later event for the same connection is a no-op with no further
    /// broadcast.
    pub async fn disconnect(&self, id: ConnectionId) {
        let mut core = self.core.lock().await;
        if !core.sockets.contains_key(&id) {
            return;
        }
        teardown(&mut core, id);
    }

    /// Returns the number of attached sockets and the current snapshot.
    pub async fn status(&self) -> (usize, TopologySnapshot) {
        let core = self.core.lock().await;
        let snapshot = TopologySnapshot::capture(&core.registry, &core.table);
        (core.sockets.len(), snapshot)
    }
}

/// Removes a connection and everything referencing it, then broadcasts.
///
/// Runs under the core lock. Edge removal is silent: survivors learn about
/// it only from the broadcast, unlike an explicit unmap.
fn teardown(core: &mut RelayCore, id: ConnectionId) {
    core.sockets.remove(&id);
    let removed_edges = core.table.remove_all_touching(id);

    match core.registry.unregister(id) {
        Some(entry) => {
            tracing::info!(name = %entry.name, %id, removed_edges, "client removed");
        }
        None => {
            tracing::debug!(%id, "unregistered socket detached");
        }
    }

    core.broadcast_state();
}
