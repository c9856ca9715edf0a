//! Request and response bodies for the relay control endpoints.
//!
//! Field names are camelCase on the wire (`newName`, `fromName`), matching
//! what the UI client sends.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::TopologySnapshot;

/// Body of `PUT /api/rename/{oldName}`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    /// Name to assign to the client.
    pub new_name: String,
}

/// Body of `PUT /api/map` and `PUT /api/unmap`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MappingRequest {
    /// Sender endpoint of the edge.
    pub from_name: String,
    /// Receiver endpoint of the edge.
    pub to_name: String,
}

/// Response of `GET /api/status`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// Number of attached sockets, registered or not.
    pub ws_connections: usize,
    /// Current topology snapshot.
    #[schema(value_type = Object)]
    pub state: TopologySnapshot,
}
