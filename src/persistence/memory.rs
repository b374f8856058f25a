//! In-process ledger store.
//!
//! [`MemoryStore`] keeps sessions and players in ordered maps behind one
//! [`tokio::sync::RwLock`]. Every mutation runs under the write lock, so a
//! credit transfer is applied to both players or to neither.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{EndOutcome, LedgerStore};
use crate::domain::{
    BuyInEntry, CreditEntry, NewPlayer, Player, PlayerId, Session, SessionFilter, SessionId,
    SessionPage,
};
use crate::error::LedgerResult;

#[derive(Debug, Default)]
struct Tables {
    sessions: BTreeMap<SessionId, Session>,
    players: BTreeMap<PlayerId, Player>,
    last_session_id: i64,
    last_player_id: i64,
}

impl Tables {
    fn player_mut(&mut self, session_id: SessionId, player_id: PlayerId) -> Option<&mut Player> {
        self.players
            .get_mut(&player_id)
            .filter(|p| p.session_id == session_id)
    }

    fn player_is_active(&self, session_id: SessionId, player_id: PlayerId) -> bool {
        self.players
            .get(&player_id)
            .is_some_and(|p| p.session_id == session_id && p.is_active)
    }
}

/// Volatile ledger store. Cloning shares the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryStore {
    async fn insert_session(
        &self,
        created_by: Option<String>,
        created_at: DateTime<Utc>,
    ) -> LedgerResult<Session> {
        let mut tables = self.tables.write().await;
        tables.last_session_id += 1;
        let session = Session {
            id: SessionId::new(tables.last_session_id),
            is_active: true,
            created_at,
            created_by,
            deleted_at: None,
        };
        tables.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn find_session(&self, session_id: SessionId) -> LedgerResult<Option<Session>> {
        let tables = self.tables.read().await;
        Ok(tables.sessions.get(&session_id).cloned())
    }

    async fn list_sessions(&self, filter: &SessionFilter) -> LedgerResult<SessionPage> {
        let tables = self.tables.read().await;
        let needle = filter.needle();
        let mut matching: Vec<&Session> = tables
            .sessions
            .values()
            .filter(|s| s.is_archived() == filter.archived && s.creator_matches(needle))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as u64;
        let skip = usize::try_from(filter.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(filter.page_size).unwrap_or(usize::MAX);
        let items = matching
            .into_iter()
            .skip(skip)
            .take(take)
            .cloned()
            .collect();

        Ok(SessionPage { items, total })
    }

    async fn end_session(&self, session_id: SessionId) -> LedgerResult<EndOutcome> {
        let mut tables = self.tables.write().await;
        let active = tables
            .players
            .values()
            .filter(|p| p.session_id == session_id && p.is_active)
            .count() as u64;
        let Some(session) = tables.sessions.get_mut(&session_id) else {
            return Ok(EndOutcome::NotFound);
        };
        if active > 0 {
            return Ok(EndOutcome::ActivePlayers(active));
        }
        session.is_active = false;
        Ok(EndOutcome::Ended)
    }

    async fn archive_session(&self, session_id: SessionId, at: DateTime<Utc>) -> LedgerResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .sessions
            .get_mut(&session_id)
            .map(|s| s.deleted_at = Some(at))
            .is_some())
    }

    async fn insert_player(&self, new: NewPlayer) -> LedgerResult<Option<Player>> {
        let mut tables = self.tables.write().await;
        let session_active = tables
            .sessions
            .get(&new.session_id)
            .is_some_and(|s| s.is_active);
        if !session_active {
            return Ok(None);
        }
        tables.last_player_id += 1;
        let player = Player::seated(PlayerId::new(tables.last_player_id), new);
        tables.players.insert(player.id, player.clone());
        Ok(Some(player))
    }

    async fn find_player(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
    ) -> LedgerResult<Option<Player>> {
        let tables = self.tables.read().await;
        Ok(tables
            .players
            .get(&player_id)
            .filter(|p| p.session_id == session_id)
            .cloned())
    }

    async fn list_players(&self, session_id: SessionId) -> LedgerResult<Vec<Player>> {
        let tables = self.tables.read().await;
        Ok(tables
            .players
            .values()
            .filter(|p| p.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn apply_buy_in(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
        entry: BuyInEntry,
    ) -> LedgerResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.player_mut(session_id, player_id) {
            Some(player) if player.is_active => {
                player.record_buy_in(entry)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn apply_credit(
        &self,
        session_id: SessionId,
        provider_id: PlayerId,
        credit: CreditEntry,
    ) -> LedgerResult<bool> {
        let mut tables = self.tables.write().await;
        let receiver_id = credit.receiver_id;
        if !tables.player_is_active(session_id, provider_id)
            || !tables.player_is_active(session_id, receiver_id)
        {
            return Ok(false);
        }

        // Apply to copies first so an overflow on either side leaves both
        // players untouched.
        let (Some(mut provider), Some(mut receiver)) = (
            tables.players.get(&provider_id).cloned(),
            tables.players.get(&receiver_id).cloned(),
        ) else {
            return Ok(false);
        };
        let received = BuyInEntry {
            amount: credit.amount,
            timestamp: credit.timestamp,
        };
        provider.record_credit(credit)?;
        receiver.record_buy_in(received)?;

        tables.players.insert(provider_id, provider);
        tables.players.insert(receiver_id, receiver);
        Ok(true)
    }

    async fn apply_cash_out(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
        final_chip_count: i64,
        at: DateTime<Utc>,
    ) -> LedgerResult<Option<i64>> {
        let mut tables = self.tables.write().await;
        match tables.player_mut(session_id, player_id) {
            Some(player) if player.is_active => player.cash_out(final_chip_count, at).map(Some),
            _ => Ok(None),
        }
    }

    async fn reset(&self) -> LedgerResult<()> {
        let mut tables = self.tables.write().await;
        *tables = Tables::default();
        Ok(())
    }
}
