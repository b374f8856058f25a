//! Session-related DTOs for create, get, list and end operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::player_dto::PlayerDto;
use crate::domain::{Session, SessionDetail, SessionId};

/// Request body for `POST /sessions`. The body itself is optional.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    /// Optional name of whoever opens the session.
    #[serde(default)]
    pub created_by: Option<String>,
}

/// Response body for `POST /sessions` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    /// Identifier of the new session.
    pub session_id: SessionId,
}

/// Session summary used in listings.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionDto {
    /// Session identifier.
    pub id: SessionId,
    /// `false` once ended.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Optional creator name.
    pub created_by: Option<String>,
    /// Archival timestamp, if archived.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<Session> for SessionDto {
    fn from(session: Session) -> Self {
        Self {
            id: session.id,
            is_active: session.is_active,
            created_at: session.created_at,
            created_by: session.created_by,
            deleted_at: session.deleted_at,
        }
    }
}

/// Paginated list response for `GET /sessions` and `GET /sessions/archived`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionListResponse {
    /// Sessions on this page, newest first.
    pub items: Vec<SessionDto>,
    /// Total number of matching sessions.
    pub total: u64,
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub page_size: u32,
}

/// Full session detail for `GET /sessions/{session_id}`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetailResponse {
    /// Session identifier.
    pub id: SessionId,
    /// `false` once ended.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Optional creator name.
    pub created_by: Option<String>,
    /// Archival timestamp, if archived.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    /// Players in seating order with derived totals.
    pub players: Vec<PlayerDto>,
}

impl From<SessionDetail> for SessionDetailResponse {
    fn from(detail: SessionDetail) -> Self {
        let SessionDetail { session, players } = detail;
        Self {
            id: session.id,
            is_active: session.is_active,
            created_at: session.created_at,
            created_by: session.created_by,
            deleted_at: session.deleted_at,
            players: players.into_iter().map(PlayerDto::from).collect(),
        }
    }
}

/// Response body for `POST /sessions/{session_id}/end`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EndSessionResponse {
    /// Always `false` after a successful end.
    pub is_active: bool,
}
