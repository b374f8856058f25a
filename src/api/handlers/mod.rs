//! REST endpoint handlers organized by resource.

pub mod dev;
pub mod player;
pub mod session;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes the resource routes mounted under `/api`.
///
/// Dev routes are only merged when `dev_routes_enabled` is set.
pub fn routes(dev_routes_enabled: bool) -> Router<AppState> {
    let router = Router::new()
        .merge(session::routes())
        .merge(player::routes())
        .merge(system::routes());
    if dev_routes_enabled {
        router.merge(dev::routes())
    } else {
        router
    }
}
