//! Player ledger: balance arithmetic and the append-only buy-in and
//! credit logs.
//!
//! Every buy-in lowers the net balance by its amount. A credit transfer
//! raises the provider's balance and lowers the receiver's by the same
//! amount; the receiver's side is recorded as a buy-in entry. Cash-out
//! settles `payout = final_chip_count + net_balance` and deactivates the
//! player for good.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PlayerId, SessionId};
use crate::error::{LedgerError, LedgerResult};

/// One buy-in log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyInEntry {
    /// Chips bought.
    pub amount: i64,
    /// When the buy-in was recorded.
    pub timestamp: DateTime<Utc>,
}

/// One credit log entry, recorded on the provider's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditEntry {
    /// Chips staked to the receiver.
    pub amount: i64,
    /// Player who received the credit.
    pub receiver_id: PlayerId,
    /// When the credit was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Input for inserting a new player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlayer {
    /// Owning session.
    pub session_id: SessionId,
    /// Display name.
    pub name: String,
    /// The initial buy-in; becomes the first log entry.
    pub initial_buy_in: BuyInEntry,
}

/// A player and their running ledger within one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Store-assigned identifier.
    pub id: PlayerId,
    /// Owning session.
    pub session_id: SessionId,
    /// Display name.
    pub name: String,
    /// Running signed balance.
    pub net_balance: i64,
    /// Append-only buy-ins, including credits received.
    pub buy_ins_log: Vec<BuyInEntry>,
    /// Append-only credits given to other players.
    pub credits_log: Vec<CreditEntry>,
    /// Running sum of `buy_ins_log`.
    pub total_buy_ins: i64,
    /// Running sum of `credits_log`.
    pub total_credits: i64,
    /// `false` once the player has cashed out.
    pub is_active: bool,
    /// Chip count declared at cash-out.
    pub final_chip_count: Option<i64>,
    /// Settled payout computed at cash-out.
    pub payout: Option<i64>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last ledger mutation.
    pub updated_at: DateTime<Utc>,
}

impl Player {
    /// Builds a freshly seated player with `net_balance = -initial_buy_in`.
    #[must_use]
    pub fn seated(id: PlayerId, new: NewPlayer) -> Self {
        let at = new.initial_buy_in.timestamp;
        Self {
            id,
            session_id: new.session_id,
            name: new.name,
            net_balance: new.initial_buy_in.amount.saturating_neg(),
            total_buy_ins: new.initial_buy_in.amount,
            buy_ins_log: vec![new.initial_buy_in],
            credits_log: Vec::new(),
            total_credits: 0,
            is_active: true,
            final_chip_count: None,
            payout: None,
            created_at: at,
            updated_at: at,
        }
    }

    /// Records a buy-in (or a credit received) and lowers the balance.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PlayerCashedOut`] if the player is inactive
    /// and [`LedgerError::BalanceOverflow`] if the balance or the buy-in
    /// total would overflow. Nothing changes on error.
    pub fn record_buy_in(&mut self, entry: BuyInEntry) -> LedgerResult<()> {
        self.ensure_active()?;
        let (Some(net_balance), Some(total)) = (
            self.net_balance.checked_sub(entry.amount),
            self.total_buy_ins.checked_add(entry.amount),
        ) else {
            return Err(LedgerError::BalanceOverflow(self.id));
        };
        self.net_balance = net_balance;
        self.total_buy_ins = total;
        self.updated_at = entry.timestamp;
        self.buy_ins_log.push(entry);
        Ok(())
    }

    /// Records a credit given to another player and raises the balance.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PlayerCashedOut`] if the player is inactive
    /// and [`LedgerError::BalanceOverflow`] if the balance or the credit
    /// total would overflow. Nothing changes on error.
    pub fn record_credit(&mut self, entry: CreditEntry) -> LedgerResult<()> {
        self.ensure_active()?;
        let (Some(net_balance), Some(total)) = (
            self.net_balance.checked_add(entry.amount),
            self.total_credits.checked_add(entry.amount),
        ) else {
            return Err(LedgerError::BalanceOverflow(self.id));
        };
        self.net_balance = net_balance;
        self.total_credits = total;
        self.updated_at = entry.timestamp;
        self.credits_log.push(entry);
        Ok(())
    }

    /// Settles the player: stores the chip count and payout and marks the
    /// player inactive. Returns the payout.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PlayerCashedOut`] if the player already
    /// cashed out and [`LedgerError::BalanceOverflow`] if the payout
    /// overflows.
    pub fn cash_out(&mut self, final_chip_count: i64, at: DateTime<Utc>) -> LedgerResult<i64> {
        self.ensure_active()?;
        let payout = final_chip_count
            .checked_add(self.net_balance)
            .ok_or(LedgerError::BalanceOverflow(self.id))?;
        self.is_active = false;
        self.final_chip_count = Some(final_chip_count);
        self.payout = Some(payout);
        self.updated_at = at;
        Ok(payout)
    }

    /// Checks that the player has not cashed out yet.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PlayerCashedOut`] for an inactive player.
    pub fn ensure_active(&self) -> LedgerResult<()> {
        if self.is_active {
            Ok(())
        } else {
            Err(LedgerError::PlayerCashedOut(self.id))
        }
    }
}
