//! Player ledger handlers: seating, buy-ins, credits, cash-outs.
//!
//! Bodies are extracted as `Result<Json<_>, JsonRejection>` so malformed
//! JSON comes back in the same error envelope as every other failure.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    AddPlayerRequest, AddPlayerResponse, BuyInRequest, CashOutRequest, CashOutResponse,
    CreditRequest, PlayerDto,
};
use crate::app_state::AppState;
use crate::domain::SessionId;
use crate::error::{ErrorResponse, LedgerError};

/// `POST /sessions/{session_id}/players`: seat a player.
///
/// # Errors
///
/// Returns [`LedgerError`] on validation failure, an unknown session or an
/// ended session.
#[utoipa::path(
    post,
    path = "/api/sessions/{session_id}/players",
    tag = "Players",
    summary = "Add player",
    description = "Seats a player with an initial buy-in. The player's net balance starts at minus that buy-in.",
    params(("session_id" = i64, Path, description = "Session identifier")),
    request_body = AddPlayerRequest,
    responses(
        (status = 201, description = "Player added", body = AddPlayerResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 409, description = "Session has ended", body = ErrorResponse),
    )
)]
pub async fn add_player(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
    payload: Result<Json<AddPlayerRequest>, JsonRejection>,
) -> Result<impl IntoResponse, LedgerError> {
    let Json(req) = payload?;
    req.validate()?;

    let player_id = state
        .ledger
        .add_player(session_id, req.name.trim(), req.initial_buy_in)
        .await?;
    Ok((StatusCode::CREATED, Json(AddPlayerResponse { player_id })))
}

/// `GET /sessions/{session_id}/players`: list players.
///
/// # Errors
///
/// Returns [`LedgerError`] on store failures.
#[utoipa::path(
    get,
    path = "/api/sessions/{session_id}/players",
    tag = "Players",
    summary = "List players",
    description = "Returns the session's players in seating order. An unknown session yields an empty list.",
    params(("session_id" = i64, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Players in seating order", body = Vec<PlayerDto>),
    )
)]
pub async fn list_players(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
) -> Result<Json<Vec<PlayerDto>>, LedgerError> {
    let players = state.ledger.list_players(session_id).await?;
    Ok(Json(players.into_iter().map(PlayerDto::from).collect()))
}

/// `POST /sessions/{session_id}/buy-in`: record a rebuy.
///
/// # Errors
///
/// Returns [`LedgerError`] on validation failure, an unknown or cashed-out
/// player, or an ended session.
#[utoipa::path(
    post,
    path = "/api/sessions/{session_id}/buy-in",
    tag = "Players",
    summary = "Register buy-in",
    description = "Appends a buy-in to the player's log and lowers their net balance by the amount.",
    params(("session_id" = i64, Path, description = "Session identifier")),
    request_body = BuyInRequest,
    responses(
        (status = 204, description = "Buy-in recorded"),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Session or player not found", body = ErrorResponse),
        (status = 409, description = "Session ended or player cashed out", body = ErrorResponse),
    )
)]
pub async fn register_buy_in(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
    payload: Result<Json<BuyInRequest>, JsonRejection>,
) -> Result<StatusCode, LedgerError> {
    let Json(req) = payload?;
    req.validate()?;

    state
        .ledger
        .register_buy_in(session_id, req.player_id, req.amount)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /sessions/{session_id}/credit`: stake one player from another.
///
/// # Errors
///
/// Returns [`LedgerError`] on validation failure, an unknown or cashed-out
/// provider or receiver, or an ended session.
#[utoipa::path(
    post,
    path = "/api/sessions/{session_id}/credit",
    tag = "Players",
    summary = "Register credit",
    description = "Moves `amount` from the receiver's net balance to the provider's. The entry is logged on the provider.",
    params(("session_id" = i64, Path, description = "Session identifier")),
    request_body = CreditRequest,
    responses(
        (status = 204, description = "Credit recorded"),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Session, provider or receiver not found", body = ErrorResponse),
        (status = 409, description = "Session ended or a party cashed out", body = ErrorResponse),
    )
)]
pub async fn register_credit(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
    payload: Result<Json<CreditRequest>, JsonRejection>,
) -> Result<StatusCode, LedgerError> {
    let Json(req) = payload?;
    req.validate()?;

    state
        .ledger
        .register_credit(session_id, req.provider_id, req.receiver_id, req.amount)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /sessions/{session_id}/cash-out`: settle a player.
///
/// # Errors
///
/// Returns [`LedgerError`] on validation failure, an unknown or already
/// cashed-out player, or an ended session.
#[utoipa::path(
    post,
    path = "/api/sessions/{session_id}/cash-out",
    tag = "Players",
    summary = "Cash out",
    description = "Records the final chip count, computes `payout = finalChipCount + netBalance` and marks the player inactive.",
    params(("session_id" = i64, Path, description = "Session identifier")),
    request_body = CashOutRequest,
    responses(
        (status = 200, description = "Player cashed out", body = CashOutResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Session or player not found", body = ErrorResponse),
        (status = 409, description = "Session ended or player already cashed out", body = ErrorResponse),
    )
)]
pub async fn cash_out(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
    payload: Result<Json<CashOutRequest>, JsonRejection>,
) -> Result<Json<CashOutResponse>, LedgerError> {
    let Json(req) = payload?;
    req.validate()?;

    let payout = state
        .ledger
        .cash_out(session_id, req.player_id, req.final_chip_count)
        .await?;
    Ok(Json(CashOutResponse { payout }))
}

/// Player routes, mounted under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/sessions/{session_id}/players",
            get(list_players).post(add_player),
        )
        .route("/sessions/{session_id}/buy-in", post(register_buy_in))
        .route("/sessions/{session_id}/credit", post(register_credit))
        .route("/sessions/{session_id}/cash-out", post(cash_out))
}
