//! Persistence layer: the [`LedgerStore`] contract and its backends.
//!
//! [`PostgresStore`] is the durable backend built on `sqlx::PgPool`;
//! [`MemoryStore`] keeps everything in process and backs tests and
//! deployments with persistence switched off. [`LedgerBackend`] picks one
//! at startup so the rest of the service stays monomorphic.
//!
//! Every balance mutation is applied atomically by the store, and so are
//! the two session guards: seating a player only into an active session,
//! and ending a session only once nobody is seated. Mutations whose guard
//! fails report it through their return value instead of an error, so the
//! service can phrase the conflict.

pub mod memory;
pub mod models;
pub mod postgres;

use chrono::{DateTime, Utc};

use crate::domain::{
    BuyInEntry, CreditEntry, NewPlayer, Player, PlayerId, Session, SessionFilter, SessionId,
    SessionPage,
};
use crate::error::LedgerResult;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Result of a guarded attempt to end a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndOutcome {
    /// The session is now inactive (or already was).
    Ended,
    /// No session with that id exists.
    NotFound,
    /// Players are still seated; nothing changed.
    ActivePlayers(u64),
}

/// Storage contract used by [`crate::service::LedgerService`].
pub trait LedgerStore: Send + Sync {
    /// Inserts a new active session.
    fn insert_session(
        &self,
        created_by: Option<String>,
        created_at: DateTime<Utc>,
    ) -> impl Future<Output = LedgerResult<Session>> + Send;

    /// Looks up a session by id.
    fn find_session(
        &self,
        session_id: SessionId,
    ) -> impl Future<Output = LedgerResult<Option<Session>>> + Send;

    /// Returns one page of sessions matching `filter`, newest first.
    fn list_sessions(
        &self,
        filter: &SessionFilter,
    ) -> impl Future<Output = LedgerResult<SessionPage>> + Send;

    /// Marks a session ended unless it still has active players. The
    /// count and the update are one atomic step.
    fn end_session(
        &self,
        session_id: SessionId,
    ) -> impl Future<Output = LedgerResult<EndOutcome>> + Send;

    /// Stamps the soft-delete marker. Returns `false` if the session does
    /// not exist.
    fn archive_session(
        &self,
        session_id: SessionId,
        at: DateTime<Utc>,
    ) -> impl Future<Output = LedgerResult<bool>> + Send;

    /// Inserts a player seated with its initial buy-in.
    ///
    /// Returns `None` if the session is missing or no longer active at the
    /// moment of the insert.
    fn insert_player(
        &self,
        new: NewPlayer,
    ) -> impl Future<Output = LedgerResult<Option<Player>>> + Send;

    /// Looks up a player within a session.
    fn find_player(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
    ) -> impl Future<Output = LedgerResult<Option<Player>>> + Send;

    /// Returns all players of a session in ascending id order.
    fn list_players(
        &self,
        session_id: SessionId,
    ) -> impl Future<Output = LedgerResult<Vec<Player>>> + Send;

    /// Appends a buy-in and lowers the balance in one atomic step.
    ///
    /// Returns `false` if the player is missing or no longer active.
    fn apply_buy_in(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
        entry: BuyInEntry,
    ) -> impl Future<Output = LedgerResult<bool>> + Send;

    /// Applies both sides of a credit transfer in one transaction.
    ///
    /// The provider gains `credit`; the receiver (`credit.receiver_id`)
    /// gains the matching buy-in. Returns `false` and leaves both players
    /// untouched if either is missing or no longer active.
    fn apply_credit(
        &self,
        session_id: SessionId,
        provider_id: PlayerId,
        credit: CreditEntry,
    ) -> impl Future<Output = LedgerResult<bool>> + Send;

    /// Settles an active player and returns the payout.
    ///
    /// Returns `None` if the player is missing or already cashed out.
    fn apply_cash_out(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
        final_chip_count: i64,
        at: DateTime<Utc>,
    ) -> impl Future<Output = LedgerResult<Option<i64>>> + Send;

    /// Deletes every session and player.
    fn reset(&self) -> impl Future<Output = LedgerResult<()>> + Send;
}

/// Store selected at startup from configuration.
#[derive(Debug)]
pub enum LedgerBackend {
    /// Durable PostgreSQL storage.
    Postgres(PostgresStore),
    /// Volatile in-process storage.
    Memory(MemoryStore),
}

impl LedgerBackend {
    /// Short backend name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Memory(_) => "memory",
        }
    }

    /// Releases backend resources. Called once on shutdown.
    pub async fn close(&self) {
        match self {
            Self::Postgres(store) => store.close().await,
            Self::Memory(_) => {}
        }
    }
}

impl LedgerStore for LedgerBackend {
    async fn insert_session(
        &self,
        created_by: Option<String>,
        created_at: DateTime<Utc>,
    ) -> LedgerResult<Session> {
        match self {
            Self::Postgres(s) => s.insert_session(created_by, created_at).await,
            Self::Memory(s) => s.insert_session(created_by, created_at).await,
        }
    }

    async fn find_session(&self, session_id: SessionId) -> LedgerResult<Option<Session>> {
        match self {
            Self::Postgres(s) => s.find_session(session_id).await,
            Self::Memory(s) => s.find_session(session_id).await,
        }
    }

    async fn list_sessions(&self, filter: &SessionFilter) -> LedgerResult<SessionPage> {
        match self {
            Self::Postgres(s) => s.list_sessions(filter).await,
            Self::Memory(s) => s.list_sessions(filter).await,
        }
    }

    async fn end_session(&self, session_id: SessionId) -> LedgerResult<EndOutcome> {
        match self {
            Self::Postgres(s) => s.end_session(session_id).await,
            Self::Memory(s) => s.end_session(session_id).await,
        }
    }

    async fn archive_session(&self, session_id: SessionId, at: DateTime<Utc>) -> LedgerResult<bool> {
        match self {
            Self::Postgres(s) => s.archive_session(session_id, at).await,
            Self::Memory(s) => s.archive_session(session_id, at).await,
        }
    }

    async fn insert_player(&self, new: NewPlayer) -> LedgerResult<Option<Player>> {
        match self {
            Self::Postgres(s) => s.insert_player(new).await,
            Self::Memory(s) => s.insert_player(new).await,
        }
    }

    async fn find_player(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
    ) -> LedgerResult<Option<Player>> {
        match self {
            Self::Postgres(s) => s.find_player(session_id, player_id).await,
            Self::Memory(s) => s.find_player(session_id, player_id).await,
        }
    }

    async fn list_players(&self, session_id: SessionId) -> LedgerResult<Vec<Player>> {
        match self {
            Self::Postgres(s) => s.list_players(session_id).await,
            Self::Memory(s) => s.list_players(session_id).await,
        }
    }

    async fn apply_buy_in(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
        entry: BuyInEntry,
    ) -> LedgerResult<bool> {
        match self {
            Self::Postgres(s) => s.apply_buy_in(session_id, player_id, entry).await,
            Self::Memory(s) => s.apply_buy_in(session_id, player_id, entry).await,
        }
    }

    async fn apply_credit(
        &self,
        session_id: SessionId,
        provider_id: PlayerId,
        credit: CreditEntry,
    ) -> LedgerResult<bool> {
        match self {
            Self::Postgres(s) => s.apply_credit(session_id, provider_id, credit).await,
            Self::Memory(s) => s.apply_credit(session_id, provider_id, credit).await,
        }
    }

    async fn apply_cash_out(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
        final_chip_count: i64,
        at: DateTime<Utc>,
    ) -> LedgerResult<Option<i64>> {
        match self {
            Self::Postgres(s) => {
                s.apply_cash_out(session_id, player_id, final_chip_count, at)
                    .await
            }
            Self::Memory(s) => {
                s.apply_cash_out(session_id, player_id, final_chip_count, at)
                    .await
            }
        }
    }

    async fn reset(&self) -> LedgerResult<()> {
        match self {
            Self::Postgres(s) => s.reset().await,
            Self::Memory(s) => s.reset().await,
        }
    }
}
