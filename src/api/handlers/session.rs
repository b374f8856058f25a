//! Session handlers: create, list, get, end, archive.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    CreateSessionRequest, CreateSessionResponse, EndSessionResponse, SessionDetailResponse,
    SessionDto, SessionListParams, SessionListResponse,
};
use crate::app_state::AppState;
use crate::domain::SessionId;
use crate::error::{ErrorResponse, LedgerError};

/// `GET /sessions`: list sessions that are not archived.
///
/// # Errors
///
/// Returns [`LedgerError`] on store failures.
#[utoipa::path(
    get,
    path = "/api/sessions",
    tag = "Sessions",
    summary = "List sessions",
    description = "Returns a page of non-archived sessions, newest first. `q` filters by a case-insensitive substring of the creator name.",
    params(SessionListParams),
    responses(
        (status = 200, description = "Paginated session list", body = SessionListResponse),
    )
)]
pub async fn list_sessions(
    State(state): State<AppState>,
    Query(params): Query<SessionListParams>,
) -> Result<Json<SessionListResponse>, LedgerError> {
    list(&state, params, false).await
}

/// `GET /sessions/archived`: list archived sessions.
///
/// # Errors
///
/// Returns [`LedgerError`] on store failures.
#[utoipa::path(
    get,
    path = "/api/sessions/archived",
    tag = "Sessions",
    summary = "List archived sessions",
    description = "Same as the session listing, restricted to sessions that have been archived.",
    params(SessionListParams),
    responses(
        (status = 200, description = "Paginated archived session list", body = SessionListResponse),
    )
)]
pub async fn list_archived_sessions(
    State(state): State<AppState>,
    Query(params): Query<SessionListParams>,
) -> Result<Json<SessionListResponse>, LedgerError> {
    list(&state, params, true).await
}

async fn list(
    state: &AppState,
    params: SessionListParams,
    archived: bool,
) -> Result<Json<SessionListResponse>, LedgerError> {
    let filter = params.into_filter(archived);
    let page = state.ledger.list_sessions(&filter).await?;

    Ok(Json(SessionListResponse {
        items: page.items.into_iter().map(SessionDto::from).collect(),
        total: page.total,
        page: filter.page,
        page_size: filter.page_size,
    }))
}

/// `POST /sessions`: open a new session.
///
/// The body is optional; an empty request opens an anonymous session.
///
/// # Errors
///
/// Returns [`LedgerError`] on malformed JSON or store failures.
#[utoipa::path(
    post,
    path = "/api/sessions",
    tag = "Sessions",
    summary = "Create a session",
    description = "Opens a new active session. `createdBy` is optional and a blank value is stored as absent.",
    request_body(content = CreateSessionRequest, description = "Optional creator", content_type = "application/json"),
    responses(
        (status = 201, description = "Session created", body = CreateSessionResponse),
        (status = 400, description = "Malformed body", body = ErrorResponse),
    )
)]
pub async fn create_session(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, LedgerError> {
    let req = if body.iter().all(u8::is_ascii_whitespace) {
        CreateSessionRequest::default()
    } else {
        serde_json::from_slice::<CreateSessionRequest>(&body)
            .map_err(|e| LedgerError::InvalidRequest(e.to_string()))?
    };

    let session_id = state.ledger.create_session(req.created_by).await?;
    Ok((StatusCode::CREATED, Json(CreateSessionResponse { session_id })))
}

/// `GET /sessions/{session_id}`: session detail with players.
///
/// # Errors
///
/// Returns [`LedgerError::SessionNotFound`] for an unknown id.
#[utoipa::path(
    get,
    path = "/api/sessions/{session_id}",
    tag = "Sessions",
    summary = "Get session",
    description = "Returns the session and its players, each with derived buy-in and credit totals.",
    params(("session_id" = i64, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Session detail", body = SessionDetailResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
    )
)]
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
) -> Result<Json<SessionDetailResponse>, LedgerError> {
    let detail = state
        .ledger
        .get_session(session_id)
        .await?
        .ok_or(LedgerError::SessionNotFound(session_id))?;
    Ok(Json(detail.into()))
}

/// `POST /sessions/{session_id}/end`: end a session.
///
/// # Errors
///
/// Returns [`LedgerError::SessionNotFound`] for an unknown id and
/// [`LedgerError::ActivePlayersRemain`] while anyone is still seated.
#[utoipa::path(
    post,
    path = "/api/sessions/{session_id}/end",
    tag = "Sessions",
    summary = "End session",
    description = "Marks the session inactive. Every player must have cashed out first.",
    params(("session_id" = i64, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Session ended", body = EndSessionResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 409, description = "Players still active", body = ErrorResponse),
    )
)]
pub async fn end_session(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
) -> Result<Json<EndSessionResponse>, LedgerError> {
    state.ledger.end_session(session_id).await?;
    Ok(Json(EndSessionResponse { is_active: false }))
}

/// `POST /sessions/{session_id}/archive`: archive a session.
///
/// # Errors
///
/// Returns [`LedgerError::SessionNotFound`] for an unknown id.
#[utoipa::path(
    post,
    path = "/api/sessions/{session_id}/archive",
    tag = "Sessions",
    summary = "Archive session",
    description = "Soft-deletes the session: it moves from the main listing to the archived listing.",
    params(("session_id" = i64, Path, description = "Session identifier")),
    responses(
        (status = 204, description = "Session archived"),
        (status = 404, description = "Session not found", body = ErrorResponse),
    )
)]
pub async fn archive_session(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
) -> Result<StatusCode, LedgerError> {
    state.ledger.archive_session(session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Session routes, mounted under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", get(list_sessions).post(create_session))
        .route("/sessions/archived", get(list_archived_sessions))
        .route("/sessions/{session_id}", get(get_session))
        .route("/sessions/{session_id}/end", post(end_session))
        .route("/sessions/{session_id}/archive", post(archive_session))
}
