//! Player ledger DTOs: seating, buy-ins, credits and cash-outs.
//!
//! Request bodies carry their own shape validation; the ledger service
//! only sees inputs that passed it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{BuyInEntry, CreditEntry, Player, PlayerId};
use crate::error::LedgerError;

/// Request body for `POST /sessions/{session_id}/players`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddPlayerRequest {
    /// Display name; must not be blank.
    pub name: String,
    /// Initial buy-in in chips; must not be negative.
    pub initial_buy_in: i64,
}

impl AddPlayerRequest {
    /// Validates the request shape.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidRequest`] for a blank name or a
    /// negative buy-in.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.name.trim().is_empty() {
            return Err(LedgerError::InvalidRequest("name is required".to_string()));
        }
        if self.initial_buy_in < 0 {
            return Err(LedgerError::InvalidRequest(
                "initialBuyIn must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Response body for `POST /sessions/{session_id}/players` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddPlayerResponse {
    /// Identifier of the new player.
    pub player_id: PlayerId,
}

/// Request body for `POST /sessions/{session_id}/buy-in`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuyInRequest {
    /// Player buying in.
    pub player_id: PlayerId,
    /// Chips bought; must be positive.
    pub amount: i64,
}

impl BuyInRequest {
    /// Validates the request shape.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidRequest`] for a non-positive amount.
    pub fn validate(&self) -> Result<(), LedgerError> {
        require_positive("amount", self.amount)
    }
}

/// Request body for `POST /sessions/{session_id}/credit`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreditRequest {
    /// Player staking the receiver.
    pub provider_id: PlayerId,
    /// Player receiving the stake.
    pub receiver_id: PlayerId,
    /// Chips transferred; must be positive.
    pub amount: i64,
}

impl CreditRequest {
    /// Validates the request shape.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidRequest`] for a non-positive amount or
    /// when provider and receiver are the same player.
    pub fn validate(&self) -> Result<(), LedgerError> {
        require_positive("amount", self.amount)?;
        if self.provider_id == self.receiver_id {
            return Err(LedgerError::InvalidRequest(
                "providerId and receiverId must differ".to_string(),
            ));
        }
        Ok(())
    }
}

/// Request body for `POST /sessions/{session_id}/cash-out`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CashOutRequest {
    /// Player cashing out.
    pub player_id: PlayerId,
    /// Chips on the table at cash-out; must not be negative.
    pub final_chip_count: i64,
}

impl CashOutRequest {
    /// Validates the request shape.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidRequest`] for a negative chip count.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.final_chip_count < 0 {
            return Err(LedgerError::InvalidRequest(
                "finalChipCount must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Response body for `POST /sessions/{session_id}/cash-out`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CashOutResponse {
    /// Settled payout (`finalChipCount + netBalance`).
    pub payout: i64,
}

/// One buy-in log entry.
#[derive(Debug, Serialize, ToSchema)]
pub struct BuyInEntryDto {
    /// Chips bought.
    pub amount: i64,
    /// When the buy-in was recorded.
    pub timestamp: DateTime<Utc>,
}

impl From<BuyInEntry> for BuyInEntryDto {
    fn from(entry: BuyInEntry) -> Self {
        Self {
            amount: entry.amount,
            timestamp: entry.timestamp,
        }
    }
}

/// One credit log entry.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreditEntryDto {
    /// Chips staked.
    pub amount: i64,
    /// Player who received the credit.
    pub receiver_id: PlayerId,
    /// When the credit was recorded.
    pub timestamp: DateTime<Utc>,
}

impl From<CreditEntry> for CreditEntryDto {
    fn from(entry: CreditEntry) -> Self {
        Self {
            amount: entry.amount,
            receiver_id: entry.receiver_id,
            timestamp: entry.timestamp,
        }
    }
}

/// A player with derived totals.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDto {
    /// Player identifier.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// `false` once cashed out.
    pub is_active: bool,
    /// Running signed balance.
    pub net_balance: i64,
    /// Sum of the buy-in log, credits received included.
    pub total_buy_ins: i64,
    /// Sum of the credit log.
    pub total_credits: i64,
    /// Chip count declared at cash-out.
    pub final_chip_count: Option<i64>,
    /// Settled payout.
    pub payout: Option<i64>,
    /// Buy-in log, oldest first.
    pub buy_ins_log: Vec<BuyInEntryDto>,
    /// Credit log, oldest first.
    pub credits_log: Vec<CreditEntryDto>,
    /// Timestamp of the last ledger mutation.
    pub updated_at: DateTime<Utc>,
}

impl From<Player> for PlayerDto {
    fn from(player: Player) -> Self {
        Self {
            id: player.id,
            name: player.name,
            is_active: player.is_active,
            net_balance: player.net_balance,
            total_buy_ins: player.total_buy_ins,
            total_credits: player.total_credits,
            final_chip_count: player.final_chip_count,
            payout: player.payout,
            buy_ins_log: player.buy_ins_log.into_iter().map(Into::into).collect(),
            credits_log: player.credits_log.into_iter().map(Into::into).collect(),
            updated_at: player.updated_at,
        }
    }
}

fn require_positive(field: &str, value: i64) -> Result<(), LedgerError> {
    if value <= 0 {
        return Err(LedgerError::InvalidRequest(format!(
            "{field} must be positive"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_player_requires_name() {
        let req = AddPlayerRequest {
            name: "   ".to_string(),
            initial_buy_in: 100,
        };
        assert!(matches!(req.validate(), Err(LedgerError::InvalidRequest(_))));

        let req = AddPlayerRequest {
            name: "Alice".to_string(),
            initial_buy_in: 0,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn buy_in_requires_positive_amount() {
        let req = BuyInRequest {
            player_id: PlayerId::new(1),
            amount: 0,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn credit_rejects_self_transfer() {
        let req = CreditRequest {
            provider_id: PlayerId::new(3),
            receiver_id: PlayerId::new(3),
            amount: 10,
        };
        assert!(req.validate().is_err());

        let req = CreditRequest {
            provider_id: PlayerId::new(3),
            receiver_id: PlayerId::new(4),
            amount: 10,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn cash_out_rejects_negative_chips() {
        let req = CashOutRequest {
            player_id: PlayerId::new(1),
            final_chip_count: -1,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn request_fields_are_camel_case() {
        let json = r#"{"providerId": 1, "receiverId": 2, "amount": 30}"#;
        let parsed = serde_json::from_str::<CreditRequest>(json);
        assert!(matches!(
            parsed,
            Ok(CreditRequest { amount: 30, .. })
        ));
    }
}
