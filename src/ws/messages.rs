//! WebSocket wire messages.
//!
//! Every message exchanged over a relay socket is one [`WsMessage`] variant,
//! discriminated by the `_tag` field. Frame payloads are opaque JSON — the
//! relay forwards them verbatim and never inspects the motion-capture data.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{ClientName, TopologySnapshot};

/// Tagged message exchanged between the relay core and its sockets.
///
/// Client → core: `join_remote`, `bvh_frame`. Core → client: everything
/// else. `bvh_frame` is bidirectional: inbound it names the publishing
/// client, outbound it is re-wrapped with the sender's current name for each
/// mapped receiver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "_tag", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum WsMessage {
    /// Claim a unique name on this connection.
    JoinRemote {
        /// Requested client name.
        name: ClientName,
    },

    /// The join succeeded; the connection is now registered.
    JoinRemoteSuccess {
        /// The name that was claimed.
        name: ClientName,
    },

    /// The join was rejected.
    JoinRemoteFail {
        /// Human-readable rejection reason.
        reason: String,
    },

    /// One motion-capture frame, forwarded verbatim.
    BvhFrame {
        /// Name of the publishing client.
        from: ClientName,
        /// Opaque frame payload.
        frame: Value,
    },

    /// Full topology snapshot, sent to every socket after each mutation.
    RemoteState {
        /// Registered client names in registration order.
        clients: Vec<ClientName>,
        /// Directed `[from, to]` name pairs in edge-insertion order.
        mappings: Vec<[ClientName; 2]>,
    },

    /// This connection is now the sender of a new mapping.
    BecomeSender {
        /// Receiver endpoint of the new mapping.
        to: ClientName,
    },

    /// This connection is now the receiver of a new mapping.
    BecomeReceiver {
        /// Sender endpoint of the new mapping.
        from: ClientName,
    },

    /// An explicit unmap removed a mapping this connection was receiving.
    UnbecomeReceiver {
        /// Sender endpoint of the removed mapping.
        from: ClientName,
    },

    /// A rename was applied to this connection.
    RenameSuccess {
        /// The connection's new name.
        new_name: ClientName,
    },
}

impl WsMessage {
    /// Wraps a topology snapshot as a `remote_state` message.
    #[must_use]
    pub fn remote_state(snapshot: TopologySnapshot) -> Self {
        Self::RemoteState {
            clients: snapshot.clients,
            mappings: snapshot.mappings,
        }
    }

    /// Wraps a frame payload for delivery to a mapped receiver.
    #[must_use]
    pub fn frame(from: ClientName, frame: Value) -> Self {
        Self::BvhFrame { from, frame }
    }
}
