//! Ledger service: session lifecycle and player balance operations.

use chrono::Utc;

use crate::domain::{
    BuyInEntry, CreditEntry, NewPlayer, Player, PlayerId, Session, SessionDetail, SessionFilter,
    SessionId, SessionPage,
};
use crate::error::{LedgerError, LedgerResult};
use crate::persistence::{EndOutcome, LedgerStore};

/// Orchestration layer for all ledger operations.
///
/// Owns the store handle it was constructed with. Every mutation follows
/// the pattern: check session lifecycle → check the players involved →
/// apply one atomic store mutation → log.
#[derive(Debug)]
pub struct LedgerService<S> {
    store: S,
}

impl<S: LedgerStore> LedgerService<S> {
    /// Creates a new `LedgerService` over `store`.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the inner store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Opens a new active session.
    ///
    /// A blank creator name is stored as absent.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError`] if the store fails.
    pub async fn create_session(&self, created_by: Option<String>) -> LedgerResult<SessionId> {
        let created_by = created_by
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        let session = self.store.insert_session(created_by, Utc::now()).await?;

        tracing::info!(session_id = %session.id, created_by = ?session.created_by, "session created");
        Ok(session.id)
    }

    /// Lists sessions matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError`] if the store fails.
    pub async fn list_sessions(&self, filter: &SessionFilter) -> LedgerResult<SessionPage> {
        self.store.list_sessions(filter).await
    }

    /// Returns a session with all of its players, or `None` if it does not
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError`] if the store fails.
    pub async fn get_session(&self, session_id: SessionId) -> LedgerResult<Option<SessionDetail>> {
        let Some(session) = self.store.find_session(session_id).await? else {
            return Ok(None);
        };
        let players = self.store.list_players(session_id).await?;
        Ok(Some(SessionDetail { session, players }))
    }

    /// Ends a session once every player has cashed out. Ending an ended
    /// session again succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::SessionNotFound`] for an unknown session and
    /// [`LedgerError::ActivePlayersRemain`] while anyone is still playing.
    pub async fn end_session(&self, session_id: SessionId) -> LedgerResult<()> {
        match self.store.end_session(session_id).await? {
            EndOutcome::Ended => {
                tracing::info!(%session_id, "session ended");
                Ok(())
            }
            EndOutcome::NotFound => Err(LedgerError::SessionNotFound(session_id)),
            EndOutcome::ActivePlayers(active) => {
                Err(LedgerError::ActivePlayersRemain { session_id, active })
            }
        }
    }

    /// Archives (soft-deletes) a session. Players and balances are left
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::SessionNotFound`] for an unknown session.
    pub async fn archive_session(&self, session_id: SessionId) -> LedgerResult<()> {
        if !self.store.archive_session(session_id, Utc::now()).await? {
            return Err(LedgerError::SessionNotFound(session_id));
        }

        tracing::info!(%session_id, "session archived");
        Ok(())
    }

    /// Seats a new player with their initial buy-in.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::SessionNotFound`] or
    /// [`LedgerError::SessionEnded`] if the session cannot take players.
    pub async fn add_player(
        &self,
        session_id: SessionId,
        name: &str,
        initial_buy_in: i64,
    ) -> LedgerResult<PlayerId> {
        self.require_active_session(session_id).await?;

        let inserted = self
            .store
            .insert_player(NewPlayer {
                session_id,
                name: name.to_string(),
                initial_buy_in: BuyInEntry {
                    amount: initial_buy_in,
                    timestamp: Utc::now(),
                },
            })
            .await?;
        let Some(player) = inserted else {
            // The session ended (or vanished) after the check above.
            self.require_active_session(session_id).await?;
            return Err(LedgerError::SessionEnded(session_id));
        };

        tracing::info!(%session_id, player_id = %player.id, initial_buy_in, "player added");
        Ok(player.id)
    }

    /// Records a buy-in for a player.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::SessionEnded`], [`LedgerError::PlayerNotFound`]
    /// or [`LedgerError::PlayerCashedOut`] when the buy-in cannot apply.
    pub async fn register_buy_in(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
        amount: i64,
    ) -> LedgerResult<()> {
        self.require_active_session(session_id).await?;
        self.require_active_player(session_id, player_id, LedgerError::PlayerNotFound)
            .await?;

        let entry = BuyInEntry {
            amount,
            timestamp: Utc::now(),
        };
        if !self.store.apply_buy_in(session_id, player_id, entry).await? {
            return Err(LedgerError::PlayerCashedOut(player_id));
        }

        tracing::info!(%session_id, %player_id, amount, "buy-in registered");
        Ok(())
    }

    /// Transfers `amount` of credit from `provider_id` to `receiver_id`.
    ///
    /// Both sides are written in one transaction: the provider's balance
    /// rises by `amount` and the receiver's falls by the same amount.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::SessionEnded`],
    /// [`LedgerError::ProviderNotFound`], [`LedgerError::ReceiverNotFound`]
    /// or [`LedgerError::PlayerCashedOut`] when the transfer cannot apply,
    /// and [`LedgerError::InvalidRequest`] if both ids are the same player.
    pub async fn register_credit(
        &self,
        session_id: SessionId,
        provider_id: PlayerId,
        receiver_id: PlayerId,
        amount: i64,
    ) -> LedgerResult<()> {
        if provider_id == receiver_id {
            return Err(LedgerError::InvalidRequest(
                "provider and receiver must be different players".to_string(),
            ));
        }
        self.require_active_session(session_id).await?;
        self.require_active_player(session_id, provider_id, LedgerError::ProviderNotFound)
            .await?;
        self.require_active_player(session_id, receiver_id, LedgerError::ReceiverNotFound)
            .await?;

        let credit = CreditEntry {
            amount,
            receiver_id,
            timestamp: Utc::now(),
        };
        if !self.store.apply_credit(session_id, provider_id, credit).await? {
            return Err(self.cashed_out_party(session_id, provider_id, receiver_id).await);
        }

        tracing::info!(%session_id, %provider_id, %receiver_id, amount, "credit registered");
        Ok(())
    }

    /// Cashes a player out and returns the payout
    /// (`final_chip_count + net_balance`).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::SessionEnded`], [`LedgerError::PlayerNotFound`]
    /// or [`LedgerError::PlayerCashedOut`] when the cash-out cannot apply.
    pub async fn cash_out(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
        final_chip_count: i64,
    ) -> LedgerResult<i64> {
        self.require_active_session(session_id).await?;
        self.require_active_player(session_id, player_id, LedgerError::PlayerNotFound)
            .await?;

        let Some(payout) = self
            .store
            .apply_cash_out(session_id, player_id, final_chip_count, Utc::now())
            .await?
        else {
            return Err(LedgerError::PlayerCashedOut(player_id));
        };

        tracing::info!(%session_id, %player_id, final_chip_count, payout, "player cashed out");
        Ok(payout)
    }

    /// Lists the players of a session in seating order. An unknown session
    /// yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError`] if the store fails.
    pub async fn list_players(&self, session_id: SessionId) -> LedgerResult<Vec<Player>> {
        self.store.list_players(session_id).await
    }

    /// Deletes every session and player.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError`] if the store fails.
    pub async fn reset(&self) -> LedgerResult<()> {
        self.store.reset().await?;
        tracing::warn!("ledger reset");
        Ok(())
    }

    async fn require_session(&self, session_id: SessionId) -> LedgerResult<Session> {
        self.store
            .find_session(session_id)
            .await?
            .ok_or(LedgerError::SessionNotFound(session_id))
    }

    async fn require_active_session(&self, session_id: SessionId) -> LedgerResult<Session> {
        let session = self.require_session(session_id).await?;
        if !session.is_active {
            return Err(LedgerError::SessionEnded(session_id));
        }
        Ok(session)
    }

    /// Loads an active player, reporting absence with `not_found`.
    async fn require_active_player(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
        not_found: fn(PlayerId) -> LedgerError,
    ) -> LedgerResult<Player> {
        let player = self
            .store
            .find_player(session_id, player_id)
            .await?
            .ok_or_else(|| not_found(player_id))?;
        player.ensure_active()?;
        Ok(player)
    }

    /// Works out which party made a guarded credit transfer fail.
    async fn cashed_out_party(
        &self,
        session_id: SessionId,
        provider_id: PlayerId,
        receiver_id: PlayerId,
    ) -> LedgerError {
        if let Err(err) = self
            .require_active_player(session_id, provider_id, LedgerError::ProviderNotFound)
            .await
        {
            return err;
        }
        match self
            .require_active_player(session_id, receiver_id, LedgerError::ReceiverNotFound)
            .await
        {
            Err(err) => err,
            Ok(_) => LedgerError::Internal("credit transfer was not applied".to_string()),
        }
    }
}
