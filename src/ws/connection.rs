//! WebSocket connection lifecycle.
//!
//! Runs the read/write loop for a single socket. The connection attaches to
//! the relay on entry, dispatches inbound `join_remote` / `bvh_frame`
//! messages, forwards everything the relay queues for it, and funnels every
//! exit path — peer close, transport error, queue teardown — into the one
//! idempotent [`RelayService::disconnect`] call.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use super::messages::WsMessage;
use crate::domain::ConnectionId;
use crate::service::RelayService;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Forwards messages from the relay's outbound queue to the socket.
/// - Dispatches incoming client messages into the relay core.
pub async fn run_connection(socket: WebSocket, relay: Arc<RelayService>) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let id = relay.attach(tx).await;

    loop {
        tokio::select! {
            // Message queued by the relay core for this socket
            outbound = rx.recv() => {
                match outbound {
                    Some(msg) => {
                        let Ok(json) = serde_json::to_string(&msg) else {
                            continue;
                        };
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    // Queue dropped by a server-side teardown (/api/leave):
                    // fall through and close the transport.
                    None => break,
                }
            }
            // Incoming message from the client
            inbound = ws_rx.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => dispatch_text(&relay, id, &text).await,
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => {}
                }
            }
        }
    }

    relay.disconnect(id).await;
    tracing::debug!(%id, "ws connection closed");
}

/// Dispatches one inbound text message into the relay core.
///
/// Malformed JSON, server-to-client tags arriving inbound, and core errors
/// other than a join collision (which the relay reports on the socket as
/// `join_remote_fail`) are all absorbed without a reply.
async fn dispatch_text(relay: &RelayService, id: ConnectionId, text: &str) {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        tracing::debug!(%id, "malformed ws message dropped");
        return;
    };

    match msg {
        WsMessage::JoinRemote { name } => {
            let _ = relay.join(id, name).await;
        }
        WsMessage::BvhFrame { from, frame } => {
            relay.route_frame(&from, frame).await;
        }
        _ => {
            tracing::debug!(%id, "unexpected inbound ws message dropped");
        }
    }
}
