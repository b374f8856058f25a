//! Database row models for sessions and players.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use sqlx::types::Json;

use crate::domain::{BuyInEntry, CreditEntry, Player, PlayerId, Session, SessionId};

/// A row from the `sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    /// `BIGSERIAL` primary key.
    pub id: i64,
    /// Cleared when the session is ended.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Optional creator name.
    pub created_by: Option<String>,
    /// Soft-delete marker.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Self {
            id: SessionId::new(row.id),
            is_active: row.is_active,
            created_at: row.created_at,
            created_by: row.created_by,
            deleted_at: row.deleted_at,
        }
    }
}

/// A row from the `players` table. Both ledgers are `JSONB` arrays.
#[derive(Debug, Clone, FromRow)]
pub struct PlayerRow {
    /// `BIGSERIAL` primary key.
    pub id: i64,
    /// Owning session.
    pub session_id: i64,
    /// Display name.
    pub name: String,
    /// Running signed balance.
    pub net_balance: i64,
    /// Buy-in log.
    pub buy_ins_log: Json<Vec<BuyInEntry>>,
    /// Credit log.
    pub credits_log: Json<Vec<CreditEntry>>,
    /// Running sum of the buy-in log.
    pub total_buy_ins: i64,
    /// Running sum of the credit log.
    pub total_credits: i64,
    /// Cleared at cash-out.
    pub is_active: bool,
    /// Chip count declared at cash-out.
    pub final_chip_count: Option<i64>,
    /// Payout settled at cash-out.
    pub payout: Option<i64>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<PlayerRow> for Player {
    fn from(row: PlayerRow) -> Self {
        Self {
            id: PlayerId::new(row.id),
            session_id: SessionId::new(row.session_id),
            name: row.name,
            net_balance: row.net_balance,
            buy_ins_log: row.buy_ins_log.0,
            credits_log: row.credits_log.0,
            total_buy_ins: row.total_buy_ins,
            total_credits: row.total_credits,
            is_active: row.is_active,
            final_chip_count: row.final_chip_count,
            payout: row.payout,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
