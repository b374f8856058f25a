//! Service layer: business logic orchestration.
//!
//! [`LedgerService`] enforces the session and player lifecycle rules and
//! delegates atomic balance updates to a [`crate::persistence::LedgerStore`].

pub mod ledger_service;

pub use ledger_service::LedgerService;
