//! WebSocket layer: socket upgrade, per-connection loop, wire messages.
//!
//! The WebSocket endpoint at `/ws` is the data plane: peers join by name,
//! publish BVH frames, and receive frames, mapping notifications, and
//! topology broadcasts over the same socket.

pub mod connection;
pub mod handler;
pub mod messages;
