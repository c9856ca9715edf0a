//! REST endpoint handlers organized by resource.

pub mod control;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all control routes mounted under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new().merge(control::routes())
}
