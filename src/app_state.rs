//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::persistence::LedgerBackend;
use crate::service::LedgerService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Ledger service for all business logic.
    pub ledger: Arc<LedgerService<LedgerBackend>>,
}

impl AppState {
    /// Wraps a service in shareable state.
    #[must_use]
    pub fn new(ledger: Arc<LedgerService<LedgerBackend>>) -> Self {
        Self { ledger }
    }
}
