//! PostgreSQL implementation of the ledger store.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;

use super::{EndOutcome, LedgerStore};
use super::models::{PlayerRow, SessionRow};
use crate::config::LedgerConfig;
use crate::domain::{
    BuyInEntry, CreditEntry, NewPlayer, Player, PlayerId, Session, SessionFilter, SessionId,
    SessionPage,
};
use crate::error::{LedgerError, LedgerResult};

/// Column list matching [`PlayerRow`].
const PLAYER_COLUMNS: &str = "id, session_id, name, net_balance, buy_ins_log, credits_log, \
     total_buy_ins, total_credits, is_active, final_chip_count, payout, created_at, updated_at";

/// SQLSTATE raised when a `BIGINT` expression overflows.
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

/// PostgreSQL-backed ledger store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool sized from `config` and applies pending
    /// migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError::PersistenceError`] if the database is
    /// unreachable or a migration fails.
    pub async fn connect(config: &LedgerConfig) -> LedgerResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| LedgerError::PersistenceError(format!("migration failed: {e}")))?;

        tracing::info!(
            max_connections = config.database_max_connections,
            "connected to postgres"
        );
        Ok(Self::new(pool))
    }

    /// Closes every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl LedgerStore for PostgresStore {
    async fn insert_session(
        &self,
        created_by: Option<String>,
        created_at: DateTime<Utc>,
    ) -> LedgerResult<Session> {
        let row = sqlx::query_as::<_, SessionRow>(
            "INSERT INTO sessions (is_active, created_at, created_by) VALUES (TRUE, $1, $2) \
             RETURNING id, is_active, created_at, created_by, deleted_at",
        )
        .bind(created_at)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_session(&self, session_id: SessionId) -> LedgerResult<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT id, is_active, created_at, created_by, deleted_at FROM sessions WHERE id = $1",
        )
        .bind(session_id.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Session::from))
    }

    async fn list_sessions(&self, filter: &SessionFilter) -> LedgerResult<SessionPage> {
        let pattern = like_pattern(filter.needle());
        let limit = i64::from(filter.page_size);
        let offset = i64::try_from(filter.offset()).unwrap_or(i64::MAX);

        let rows = sqlx::query_as::<_, SessionRow>(
            "SELECT id, is_active, created_at, created_by, deleted_at FROM sessions \
             WHERE (deleted_at IS NOT NULL) = $1 AND COALESCE(created_by, '') ILIKE $2 \
             ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4",
        )
        .bind(filter.archived)
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM sessions \
             WHERE (deleted_at IS NOT NULL) = $1 AND COALESCE(created_by, '') ILIKE $2",
        )
        .bind(filter.archived)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok(SessionPage {
            items: rows.into_iter().map(Session::from).collect(),
            total: u64::try_from(total).unwrap_or_default(),
        })
    }

    async fn end_session(&self, session_id: SessionId) -> LedgerResult<EndOutcome> {
        let mut tx = self.pool.begin().await?;

        // The session row lock serializes this with `insert_player`; the
        // count below runs after it and sees every committed seat.
        let locked = sqlx::query_scalar::<_, i64>("SELECT id FROM sessions WHERE id = $1 FOR UPDATE")
            .bind(session_id.get())
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            tx.rollback().await?;
            return Ok(EndOutcome::NotFound);
        }

        let active = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM players WHERE session_id = $1 AND is_active",
        )
        .bind(session_id.get())
        .fetch_one(&mut *tx)
        .await?;
        if active > 0 {
            tx.rollback().await?;
            return Ok(EndOutcome::ActivePlayers(
                u64::try_from(active).unwrap_or_default(),
            ));
        }

        sqlx::query("UPDATE sessions SET is_active = FALSE WHERE id = $1")
            .bind(session_id.get())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(EndOutcome::Ended)
    }

    async fn archive_session(&self, session_id: SessionId, at: DateTime<Utc>) -> LedgerResult<bool> {
        let result = sqlx::query("UPDATE sessions SET deleted_at = $1 WHERE id = $2")
            .bind(at)
            .bind(session_id.get())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_player(&self, new: NewPlayer) -> LedgerResult<Option<Player>> {
        let at = new.initial_buy_in.timestamp;
        let mut tx = self.pool.begin().await?;

        let active = sqlx::query_scalar::<_, bool>(
            "SELECT is_active FROM sessions WHERE id = $1 FOR UPDATE",
        )
        .bind(new.session_id.get())
        .fetch_optional(&mut *tx)
        .await?;
        if active != Some(true) {
            tx.rollback().await?;
            return Ok(None);
        }

        let sql = format!(
            "INSERT INTO players \
             (session_id, name, net_balance, buy_ins_log, credits_log, total_buy_ins, total_credits, \
             is_active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, '[]'::jsonb, $5, 0, TRUE, $6, $6) \
             RETURNING {PLAYER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PlayerRow>(&sql)
            .bind(new.session_id.get())
            .bind(&new.name)
            .bind(new.initial_buy_in.amount.saturating_neg())
            .bind(Json(vec![&new.initial_buy_in]))
            .bind(new.initial_buy_in.amount)
            .bind(at)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Some(row.into()))
    }

    async fn find_player(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
    ) -> LedgerResult<Option<Player>> {
        let sql = format!("SELECT {PLAYER_COLUMNS} FROM players WHERE id = $1 AND session_id = $2");
        let row = sqlx::query_as::<_, PlayerRow>(&sql)
            .bind(player_id.get())
            .bind(session_id.get())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Player::from))
    }

    async fn list_players(&self, session_id: SessionId) -> LedgerResult<Vec<Player>> {
        let sql = format!("SELECT {PLAYER_COLUMNS} FROM players WHERE session_id = $1 ORDER BY id ASC");
        let rows = sqlx::query_as::<_, PlayerRow>(&sql)
            .bind(session_id.get())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Player::from).collect())
    }

    async fn apply_buy_in(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
        entry: BuyInEntry,
    ) -> LedgerResult<bool> {
        let result = sqlx::query(
            "UPDATE players SET net_balance = net_balance - $1, \
             total_buy_ins = total_buy_ins + $1, buy_ins_log = buy_ins_log || $2, updated_at = $3 \
             WHERE id = $4 AND session_id = $5 AND is_active",
        )
        .bind(entry.amount)
        .bind(Json(vec![&entry]))
        .bind(entry.timestamp)
        .bind(player_id.get())
        .bind(session_id.get())
        .execute(&self.pool)
        .await
        .map_err(|e| overflow_or_persistence(e, player_id))?;

        Ok(result.rows_affected() > 0)
    }

    async fn apply_credit(
        &self,
        session_id: SessionId,
        provider_id: PlayerId,
        credit: CreditEntry,
    ) -> LedgerResult<bool> {
        let receiver_id = credit.receiver_id;
        let received = BuyInEntry {
            amount: credit.amount,
            timestamp: credit.timestamp,
        };

        let mut tx = self.pool.begin().await?;

        // Row locks are taken in ascending id order so opposing transfers
        // between the same two players cannot deadlock.
        let provider_first = provider_id <= receiver_id;
        for is_provider in [provider_first, !provider_first] {
            let result = if is_provider {
                sqlx::query(
                    "UPDATE players SET net_balance = net_balance + $1, \
                     total_credits = total_credits + $1, credits_log = credits_log || $2, \
                     updated_at = $3 \
                     WHERE id = $4 AND session_id = $5 AND is_active",
                )
                .bind(credit.amount)
                .bind(Json(vec![&credit]))
                .bind(credit.timestamp)
                .bind(provider_id.get())
                .bind(session_id.get())
                .execute(&mut *tx)
                .await
                .map_err(|e| overflow_or_persistence(e, provider_id))?
            } else {
                sqlx::query(
                    "UPDATE players SET net_balance = net_balance - $1, \
                     total_buy_ins = total_buy_ins + $1, buy_ins_log = buy_ins_log || $2, \
                     updated_at = $3 \
                     WHERE id = $4 AND session_id = $5 AND is_active",
                )
                .bind(received.amount)
                .bind(Json(vec![&received]))
                .bind(received.timestamp)
                .bind(receiver_id.get())
                .bind(session_id.get())
                .execute(&mut *tx)
                .await
                .map_err(|e| overflow_or_persistence(e, receiver_id))?
            };

            if result.rows_affected() == 0 {
                tx.rollback().await?;
                return Ok(false);
            }
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn apply_cash_out(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
        final_chip_count: i64,
        at: DateTime<Utc>,
    ) -> LedgerResult<Option<i64>> {
        let payout = sqlx::query_scalar::<_, i64>(
            "UPDATE players SET is_active = FALSE, final_chip_count = $1, \
             payout = $1 + net_balance, updated_at = $2 \
             WHERE id = $3 AND session_id = $4 AND is_active RETURNING payout",
        )
        .bind(final_chip_count)
        .bind(at)
        .bind(player_id.get())
        .bind(session_id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| overflow_or_persistence(e, player_id))?;

        Ok(payout)
    }

    async fn reset(&self) -> LedgerResult<()> {
        sqlx::query("TRUNCATE players, sessions RESTART IDENTITY")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Maps a `BIGINT` overflow to [`LedgerError::BalanceOverflow`]; anything
/// else becomes a persistence error.
fn overflow_or_persistence(err: sqlx::Error, player_id: PlayerId) -> LedgerError {
    let overflowed = err
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == NUMERIC_VALUE_OUT_OF_RANGE);
    if overflowed {
        LedgerError::BalanceOverflow(player_id)
    } else {
        LedgerError::from(err)
    }
}

/// Builds an `ILIKE` pattern matching `needle` anywhere, with `LIKE`
/// metacharacters escaped.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
