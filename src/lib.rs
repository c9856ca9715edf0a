//! # bvh-relay
//!
//! WebSocket relay and REST control surface for realtime BVH motion-capture
//! streams.
//!
//! Peers connect over WebSocket, claim a unique name, and publish BVH
//! frames; directed mappings between named peers decide which frames are
//! relayed where. Every topology mutation is followed by a full-state
//! broadcast to every connected socket, so observer UIs stay consistent
//! without ever diffing. Delivery is best-effort: the relay holds no frame
//! state between messages.
//!
//! ## Architecture
//!
//! ```text
//! Clients (WebSocket peers, observer sockets, HTTP control)
//!     │
//!     ├── Control Handlers (api/)
//!     ├── WS Handler + connection loop (ws/)
//!     │
//!     ├── RelayService (service/)
//!     │
//!     ├── ClientRegistry (domain/)
//!     ├── MappingTable (domain/)
//!     └── TopologySnapshot (domain/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod ws;
