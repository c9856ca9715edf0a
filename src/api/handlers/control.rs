//! Relay control handlers: status, rename, leave, map, unmap.
//!
//! Thin wrappers over [`crate::service::RelayService`]: each handler
//! translates its request into one core operation and maps the typed result
//! to a status code. The broadcasts and notifications these operations
//! trigger are identical to the socket-driven paths.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};

use crate::api::dto::{MappingRequest, RenameRequest, StatusResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, RelayError};

/// `GET /status` — Socket count plus the current topology snapshot.
#[utoipa::path(
    get,
    path = "/api/status",
    tag = "Relay",
    summary = "Relay status",
    description = "Returns the number of attached sockets and the current list of registered clients and mappings.",
    responses(
        (status = 200, description = "Current relay state", body = StatusResponse),
    )
)]
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let (ws_connections, snapshot) = state.relay.status().await;

    Json(StatusResponse {
        ws_connections,
        state: snapshot,
    })
}

/// `PUT /rename/{oldName}` — Rename a registered client.
///
/// # Errors
///
/// Returns [`RelayError::UnknownClient`] if no client is registered under
/// `oldName`.
#[utoipa::path(
    put,
    path = "/api/rename/{oldName}",
    tag = "Relay",
    summary = "Rename a client",
    description = "Renames the client registered under `oldName`. The client is notified with `rename_success` and every socket receives the updated topology. No collision check is performed against existing names.",
    params(
        ("oldName" = String, Path, description = "Current client name"),
    ),
    request_body = RenameRequest,
    responses(
        (status = 200, description = "Client renamed"),
        (status = 404, description = "Unknown client", body = ErrorResponse),
    )
)]
pub async fn rename_handler(
    State(state): State<AppState>,
    Path(old_name): Path<String>,
    Json(req): Json<RenameRequest>,
) -> Result<impl IntoResponse, RelayError> {
    state
        .relay
        .rename(&old_name.into(), req.new_name.into())
        .await?;

    Ok(StatusCode::OK)
}

/// `GET /leave/{name}` — Disconnect a registered client.
///
/// # Errors
///
/// Returns [`RelayError::UnknownClient`] if no client is registered under
/// `name`.
#[utoipa::path(
    get,
    path = "/api/leave/{name}",
    tag = "Relay",
    summary = "Disconnect a client",
    description = "Closes the named client's transport and tears it down: the client is unregistered, every mapping touching it is removed, and all sockets receive the updated topology.",
    params(
        ("name" = String, Path, description = "Client name to disconnect"),
    ),
    responses(
        (status = 200, description = "Client disconnected"),
        (status = 404, description = "Unknown client", body = ErrorResponse),
    )
)]
pub async fn leave_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, RelayError> {
    state.relay.leave(&name.into()).await?;

    Ok(StatusCode::OK)
}

/// `PUT /map` — Create a directed mapping between two clients.
///
/// # Errors
///
/// Returns [`RelayError::UnknownClient`] if either endpoint is not
/// registered, or [`RelayError::DuplicateMapping`] if the exact ordered
/// pair already exists.
#[utoipa::path(
    put,
    path = "/api/map",
    tag = "Relay",
    summary = "Create a mapping",
    description = "Creates the directed mapping `fromName -> toName`. Frames published by the sender are then relayed to the receiver. The endpoints are notified with `become_sender` / `become_receiver`.",
    request_body = MappingRequest,
    responses(
        (status = 200, description = "Mapping created"),
        (status = 404, description = "Unknown endpoint", body = ErrorResponse),
        (status = 409, description = "Mapping already exists", body = ErrorResponse),
    )
)]
pub async fn map_handler(
    State(state): State<AppState>,
    Json(req): Json<MappingRequest>,
) -> Result<impl IntoResponse, RelayError> {
    state
        .relay
        .map(&req.from_name.into(), &req.to_name.into())
        .await?;

    Ok(StatusCode::OK)
}

/// `PUT /unmap` — Remove a directed mapping.
///
/// # Errors
///
/// Returns [`RelayError::MappingNotFound`] if the ordered pair does not
/// exist.
#[utoipa::path(
    put,
    path = "/api/unmap",
    tag = "Relay",
    summary = "Remove a mapping",
    description = "Removes the directed mapping `fromName -> toName`. The receiver is notified with `unbecome_receiver`.",
    request_body = MappingRequest,
    responses(
        (status = 200, description = "Mapping removed"),
        (status = 404, description = "Mapping not found", body = ErrorResponse),
    )
)]
pub async fn unmap_handler(
    State(state): State<AppState>,
    Json(req): Json<MappingRequest>,
) -> Result<impl IntoResponse, RelayError> {
    state
        .relay
        .unmap(&req.from_name.into(), &req.to_name.into())
        .await?;

    Ok(StatusCode::OK)
}

/// Control routes, mounted under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(status_handler))
        .route("/rename/{oldName}", put(rename_handler))
        .route("/leave/{name}", get(leave_handler))
        .route("/map", put(map_handler))
        .route("/unmap", put(unmap_handler))
}
