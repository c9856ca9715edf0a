//! End-to-end relay tests over real WebSocket and HTTP connections.
//!
//! Boots the full router on an ephemeral port and drives it the way the
//! motion-capture peers and the observer UI do: join by name, map via the
//! control surface, publish frames, disconnect, and watch the topology
//! broadcasts stay consistent throughout.
//!
//! Sockets are connected right before they join so that each socket's queue
//! holds exactly the messages the assertions expect — every attached socket
//! receives every broadcast, including ones triggered by other peers.

#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use bvh_relay::api;
use bvh_relay::app_state::AppState;
use bvh_relay::service::RelayService;
use bvh_relay::ws::handler::ws_handler;

type WsClient = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

async fn spawn_server() -> SocketAddr {
    let app_state = AppState {
        relay: Arc::new(RelayService::new()),
    };
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .with_state(app_state);

    let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
        panic!("failed to bind test listener");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("listener has no local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

async fn connect(addr: SocketAddr) -> WsClient {
    let Ok((socket, _)) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws")).await else {
        panic!("ws connect failed");
    };
    socket
}

async fn send_json(socket: &mut WsClient, value: &Value) {
    let Ok(text) = serde_json::to_string(value) else {
        panic!("failed to encode test message");
    };
    if socket.send(Message::text(text)).await.is_err() {
        panic!("ws send failed");
    }
}

/// Receives the next text message within a deadline, skipping control
/// frames.
async fn recv_json(socket: &mut WsClient) -> Value {
    loop {
        let next = tokio::time::timeout(Duration::from_secs(5), socket.next()).await;
        let Ok(Some(Ok(msg))) = next else {
            panic!("expected a ws message before the deadline");
        };
        match msg {
            Message::Text(text) => {
                let Ok(value) = serde_json::from_str(text.as_str()) else {
                    panic!("non-JSON ws message");
                };
                return value;
            }
            Message::Ping(_) | Message::Pong(_) => {}
            other => panic!("unexpected ws message: {other:?}"),
        }
    }
}

fn tag(value: &Value) -> &str {
    value.get("_tag").and_then(Value::as_str).unwrap_or("")
}

fn clients_of(state: &Value) -> Vec<&str> {
    state
        .get("clients")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

fn mappings_of(state: &Value) -> usize {
    state
        .get("mappings")
        .and_then(Value::as_array)
        .map(Vec::len)
        .unwrap_or_default()
}

async fn join(socket: &mut WsClient, name: &str) -> Value {
    send_json(socket, &json!({"_tag": "join_remote", "name": name})).await;
    recv_json(socket).await
}

async fn put_json(http: &reqwest::Client, url: String, body: &Value) -> u16 {
    let Ok(resp) = http.put(url).json(body).send().await else {
        panic!("http request failed");
    };
    resp.status().as_u16()
}

#[tokio::test]
async fn full_relay_scenario() {
    let addr = spawn_server().await;
    let http = reqwest::Client::new();

    // An observer that never registers still sees every broadcast.
    let mut observer = connect(addr).await;

    // --- alice joins ---
    let mut alice = connect(addr).await;
    let reply = join(&mut alice, "alice").await;
    assert_eq!(tag(&reply), "join_remote_success");
    assert_eq!(reply.get("name").and_then(Value::as_str), Some("alice"));
    let state = recv_json(&mut alice).await;
    assert_eq!(tag(&state), "remote_state");
    assert_eq!(clients_of(&state), ["alice"].to_vec());

    let state = recv_json(&mut observer).await;
    assert_eq!(tag(&state), "remote_state");
    assert_eq!(clients_of(&state), ["alice"].to_vec());

    // --- bob joins ---
    let mut bob = connect(addr).await;
    let reply = join(&mut bob, "bob").await;
    assert_eq!(tag(&reply), "join_remote_success");
    let state = recv_json(&mut bob).await;
    assert_eq!(clients_of(&state), ["alice", "bob"].to_vec());
    let state = recv_json(&mut alice).await;
    assert_eq!(clients_of(&state), ["alice", "bob"].to_vec());
    let _ = recv_json(&mut observer).await;

    // --- map alice -> bob via the control surface ---
    let status = put_json(
        &http,
        format!("http://{addr}/api/map"),
        &json!({"fromName": "alice", "toName": "bob"}),
    )
    .await;
    assert_eq!(status, 200);

    let msg = recv_json(&mut alice).await;
    assert_eq!(tag(&msg), "become_sender");
    assert_eq!(msg.get("to").and_then(Value::as_str), Some("bob"));
    let state = recv_json(&mut alice).await;
    assert_eq!(mappings_of(&state), 1);

    let msg = recv_json(&mut bob).await;
    assert_eq!(tag(&msg), "become_receiver");
    assert_eq!(msg.get("from").and_then(Value::as_str), Some("alice"));
    let _ = recv_json(&mut bob).await;
    let _ = recv_json(&mut observer).await;

    // --- duplicate mapping is a conflict ---
    let status = put_json(
        &http,
        format!("http://{addr}/api/map"),
        &json!({"fromName": "alice", "toName": "bob"}),
    )
    .await;
    assert_eq!(status, 409);

    // --- frames flow along the mapping, to bob only ---
    send_json(
        &mut alice,
        &json!({"_tag": "bvh_frame", "from": "alice", "frame": "F1"}),
    )
    .await;
    let msg = recv_json(&mut bob).await;
    assert_eq!(tag(&msg), "bvh_frame");
    assert_eq!(msg.get("from").and_then(Value::as_str), Some("alice"));
    assert_eq!(msg.get("frame").and_then(Value::as_str), Some("F1"));

    // --- explicit unmap notifies the receiver ---
    let status = put_json(
        &http,
        format!("http://{addr}/api/unmap"),
        &json!({"fromName": "alice", "toName": "bob"}),
    )
    .await;
    assert_eq!(status, 200);

    let msg = recv_json(&mut bob).await;
    assert_eq!(tag(&msg), "unbecome_receiver");
    assert_eq!(msg.get("from").and_then(Value::as_str), Some("alice"));
    let _ = recv_json(&mut bob).await;
    let _ = recv_json(&mut alice).await;
    // The observer's next message is the unmap broadcast — in particular
    // the frame above was never relayed to it.
    let state = recv_json(&mut observer).await;
    assert_eq!(tag(&state), "remote_state");
    assert_eq!(mappings_of(&state), 0);

    // --- unmapping a missing edge is 404 ---
    let status = put_json(
        &http,
        format!("http://{addr}/api/unmap"),
        &json!({"fromName": "alice", "toName": "zoe"}),
    )
    .await;
    assert_eq!(status, 404);

    // --- rebuild edges in both directions, then close bob's transport ---
    for body in [
        json!({"fromName": "alice", "toName": "bob"}),
        json!({"fromName": "bob", "toName": "alice"}),
    ] {
        let status = put_json(&http, format!("http://{addr}/api/map"), &body).await;
        assert_eq!(status, 200);
    }
    // Each map queues a notification + broadcast for both endpoints and a
    // broadcast for the observer.
    for _ in 0..4 {
        let _ = recv_json(&mut alice).await;
        let _ = recv_json(&mut bob).await;
    }
    let _ = recv_json(&mut observer).await;
    let _ = recv_json(&mut observer).await;

    let _ = bob.close(None).await;

    // Teardown removes bob and every edge touching him. Alice was the
    // receiver of bob -> alice, yet her next message is the broadcast, not
    // an unbecome_receiver: teardown is silent per edge.
    let state = recv_json(&mut alice).await;
    assert_eq!(tag(&state), "remote_state");
    assert_eq!(clients_of(&state), ["alice"].to_vec());
    assert_eq!(mappings_of(&state), 0);
    let _ = recv_json(&mut observer).await;

    // --- status reflects the surviving topology ---
    let Ok(resp) = http.get(format!("http://{addr}/api/status")).send().await else {
        panic!("status request failed");
    };
    assert_eq!(resp.status().as_u16(), 200);
    let Ok(status_body) = resp.json::<Value>().await else {
        panic!("status body is not JSON");
    };
    assert_eq!(
        status_body.get("wsConnections").and_then(Value::as_u64),
        Some(2)
    );
    let Some(state) = status_body.get("state") else {
        panic!("status has no state");
    };
    assert_eq!(clients_of(state), ["alice"].to_vec());
    assert_eq!(mappings_of(state), 0);

    // --- leave closes alice's transport server-side ---
    let Ok(resp) = http
        .get(format!("http://{addr}/api/leave/alice"))
        .send()
        .await
    else {
        panic!("leave request failed");
    };
    assert_eq!(resp.status().as_u16(), 200);

    // Alice's socket ends without her doing anything.
    let closed = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match alice.next().await {
                None | Some(Ok(Message::Close(_))) | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            }
        }
    })
    .await;
    assert!(closed.is_ok(), "alice's socket should close after leave");

    let Ok(resp) = http
        .get(format!("http://{addr}/api/leave/alice"))
        .send()
        .await
    else {
        panic!("leave request failed");
    };
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn join_collision_rejects_second_peer() {
    let addr = spawn_server().await;

    let mut first = connect(addr).await;
    let reply = join(&mut first, "alice").await;
    assert_eq!(tag(&reply), "join_remote_success");
    let _ = recv_json(&mut first).await;

    let mut second = connect(addr).await;
    let reply = join(&mut second, "alice").await;
    assert_eq!(tag(&reply), "join_remote_fail");
    assert_eq!(
        reply.get("reason").and_then(Value::as_str),
        Some("name taken")
    );

    // The loser stays connected and can claim a free name.
    let reply = join(&mut second, "alice-2").await;
    assert_eq!(tag(&reply), "join_remote_success");
}

#[tokio::test]
async fn rename_notifies_client_and_rewrites_topology() {
    let addr = spawn_server().await;
    let http = reqwest::Client::new();

    let mut alice = connect(addr).await;
    let _ = join(&mut alice, "alice").await;
    let _ = recv_json(&mut alice).await;

    let mut bob = connect(addr).await;
    let _ = join(&mut bob, "bob").await;
    let _ = recv_json(&mut bob).await;
    let _ = recv_json(&mut alice).await;

    let status = put_json(
        &http,
        format!("http://{addr}/api/map"),
        &json!({"fromName": "alice", "toName": "bob"}),
    )
    .await;
    assert_eq!(status, 200);
    let _ = recv_json(&mut alice).await;
    let _ = recv_json(&mut alice).await;
    let _ = recv_json(&mut bob).await;
    let _ = recv_json(&mut bob).await;

    let status = put_json(
        &http,
        format!("http://{addr}/api/rename/alice"),
        &json!({"newName": "carol"}),
    )
    .await;
    assert_eq!(status, 200);

    let msg = recv_json(&mut alice).await;
    assert_eq!(tag(&msg), "rename_success");
    assert_eq!(msg.get("newName").and_then(Value::as_str), Some("carol"));

    // The mapping survives the rename under the new name.
    let state = recv_json(&mut alice).await;
    assert_eq!(clients_of(&state), ["carol", "bob"].to_vec());
    assert_eq!(
        state
            .get("mappings")
            .and_then(Value::as_array)
            .and_then(|m| m.first())
            .and_then(Value::as_array)
            .map(|pair| pair.iter().filter_map(Value::as_str).collect::<Vec<_>>()),
        Some(["carol", "bob"].to_vec())
    );

    // Renaming an unknown client is 404.
    let status = put_json(
        &http,
        format!("http://{addr}/api/rename/alice"),
        &json!({"newName": "dora"}),
    )
    .await;
    assert_eq!(status, 404);
}
