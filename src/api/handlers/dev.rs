//! Development-only endpoints. Mounted only when `DEV_ROUTES_ENABLED` is set.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::delete;
use axum::Router;

use crate::app_state::AppState;
use crate::error::{ErrorResponse, LedgerError};

/// `DELETE /api/dev/reset`: wipe every session and player.
///
/// # Errors
///
/// Returns [`LedgerError`] if the store fails.
#[utoipa::path(
    delete,
    path = "/api/dev/reset",
    tag = "Dev",
    summary = "Reset ledger",
    description = "Deletes all sessions and players and restarts id sequences. Only available when dev routes are enabled.",
    responses(
        (status = 204, description = "Ledger cleared"),
        (status = 500, description = "Store failure", body = ErrorResponse),
    )
)]
pub async fn reset(State(state): State<AppState>) -> Result<StatusCode, LedgerError> {
    state.ledger.reset().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Dev routes, mounted under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new().route("/dev/reset", delete(reset))
}
