//! Domain layer: identifiers, sessions and the player ledger.
//!
//! These types carry no storage concerns. The balance rules live on
//! [`Player`]; the session lifecycle rules are enforced by
//! [`crate::service::LedgerService`].

pub mod ids;
pub mod player;
pub mod session;

pub use ids::{PlayerId, SessionId};
pub use player::{BuyInEntry, CreditEntry, NewPlayer, Player};
pub use session::{Session, SessionDetail, SessionFilter, SessionPage};
