//! Ledger error types with HTTP status code mapping.
//!
//! [`LedgerError`] is the central error type for the service. Each variant
//! carries an [`ErrorKind`], a numeric code and an HTTP status, and renders
//! as a structured JSON error response.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{PlayerId, SessionId};

/// Convenience alias used throughout the service and store layers.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2101,
///     "kind": "conflict",
///     "message": "session has ended: 7"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code, kind and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Coarse error category.
    pub kind: ErrorKind,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Coarse classification of a [`LedgerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed input rejected before touching the ledger.
    Validation,
    /// A referenced session or player does not exist.
    NotFound,
    /// The operation violates a session or player lifecycle rule.
    Conflict,
    /// Persistence or other server-side failure.
    Internal,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Kind       | HTTP Status                |
/// |-----------|------------|----------------------------|
/// | 1000–1999 | Validation | 400 Bad Request            |
/// | 2000–2099 | Not found  | 404 Not Found              |
/// | 2100–2199 | Conflict   | 409 Conflict               |
/// | 3000–3999 | Internal   | 500 Internal Server Error  |
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Applying an amount would overflow the player's balance.
    #[error("amount overflows the balance of player {0}")]
    BalanceOverflow(PlayerId),

    /// Session with the given ID was not found.
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),

    /// Player with the given ID was not found in the session.
    #[error("player not found: {0}")]
    PlayerNotFound(PlayerId),

    /// Credit provider was not found in the session.
    #[error("provider not found in this session: {0}")]
    ProviderNotFound(PlayerId),

    /// Credit receiver was not found in the session.
    #[error("receiver not found in this session: {0}")]
    ReceiverNotFound(PlayerId),

    /// The session is no longer active and cannot be mutated.
    #[error("session has ended: {0}")]
    SessionEnded(SessionId),

    /// The session still has players who have not cashed out.
    #[error(
        "cannot end session {session_id} while {active} players are active; cash out all players first"
    )]
    ActivePlayersRemain {
        /// Session that was asked to end.
        session_id: SessionId,
        /// Number of players still active.
        active: u64,
    },

    /// The player has already cashed out.
    #[error("player has already cashed out: {0}")]
    PlayerCashedOut(PlayerId),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::BalanceOverflow(_) => 1002,
            Self::SessionNotFound(_) => 2001,
            Self::PlayerNotFound(_) => 2002,
            Self::ProviderNotFound(_) => 2003,
            Self::ReceiverNotFound(_) => 2004,
            Self::SessionEnded(_) => 2101,
            Self::ActivePlayersRemain { .. } => 2102,
            Self::PlayerCashedOut(_) => 2103,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
        }
    }

    /// Returns the coarse kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRequest(_) | Self::BalanceOverflow(_) => ErrorKind::Validation,
            Self::SessionNotFound(_)
            | Self::PlayerNotFound(_)
            | Self::ProviderNotFound(_)
            | Self::ReceiverNotFound(_) => ErrorKind::NotFound,
            Self::SessionEnded(_)
            | Self::ActivePlayersRemain { .. }
            | Self::PlayerCashedOut(_) => ErrorKind::Conflict,
            Self::PersistenceError(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        Self::PersistenceError(err.to_string())
    }
}

impl From<JsonRejection> for LedgerError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                kind: self.kind(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_variants_map_to_404() {
        let errors = [
            LedgerError::SessionNotFound(SessionId::new(1)),
            LedgerError::PlayerNotFound(PlayerId::new(2)),
            LedgerError::ProviderNotFound(PlayerId::new(3)),
            LedgerError::ReceiverNotFound(PlayerId::new(4)),
        ];
        for err in errors {
            assert_eq!(err.kind(), ErrorKind::NotFound);
            assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn lifecycle_violations_map_to_409() {
        let err = LedgerError::ActivePlayersRemain {
            session_id: SessionId::new(9),
            active: 2,
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.error_code(), 2102);
        assert!(err.to_string().contains("cash out all players first"));

        let err = LedgerError::SessionEnded(SessionId::new(9));
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn provider_and_receiver_messages_differ() {
        let provider = LedgerError::ProviderNotFound(PlayerId::new(5)).to_string();
        let receiver = LedgerError::ReceiverNotFound(PlayerId::new(5)).to_string();
        assert!(provider.starts_with("provider not found"));
        assert!(receiver.starts_with("receiver not found"));
    }

    #[test]
    fn validation_and_internal_statuses() {
        assert_eq!(
            LedgerError::InvalidRequest("name is required".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            LedgerError::PersistenceError("connection reset".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn into_response_sets_status() {
        let response = LedgerError::SessionNotFound(SessionId::new(42)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
