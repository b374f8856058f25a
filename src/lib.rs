//! # poker-ledger
//!
//! REST service that keeps the money ledger of live poker sessions.
//!
//! A session seats players, each with an initial buy-in. During play the
//! ledger records rebuys and credits (one player staking another), and at
//! the end each player cashes out with a final chip count. The payout is
//! `final_chip_count + net_balance`, so a session's payouts always settle
//! the chips against the money that changed hands.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── LedgerService (service/)
//!     │
//!     ├── LedgerStore (persistence/)
//!     │     ├── PostgresStore
//!     │     └── MemoryStore
//!     │
//!     └── Session / Player (domain/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
