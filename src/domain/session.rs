//! Session aggregate and listing types.

use chrono::{DateTime, Utc};

use super::{Player, SessionId};

/// One poker game instance.
///
/// Created active. Ending flips `is_active` once every player has cashed
/// out; archiving stamps `deleted_at` and hides the session from the
/// default listing, independently of `is_active`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Store-assigned identifier.
    pub id: SessionId,
    /// `false` once the session has been ended.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Optional name of whoever opened the session.
    pub created_by: Option<String>,
    /// Soft-delete marker set by archiving.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Returns `true` if the session has been archived.
    #[must_use]
    pub const fn is_archived(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns `true` if the creator name contains `needle`, ignoring case.
    ///
    /// An absent creator name is treated as the empty string, so an empty
    /// needle matches every session.
    #[must_use]
    pub fn creator_matches(&self, needle: &str) -> bool {
        let creator = self.created_by.as_deref().unwrap_or_default();
        creator.to_lowercase().contains(&needle.to_lowercase())
    }
}

/// Filter and paging parameters for session listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFilter {
    /// 1-indexed page number.
    pub page: u32,
    /// Number of sessions per page.
    pub page_size: u32,
    /// Case-insensitive substring matched against the creator name.
    pub query: String,
    /// List archived sessions instead of live ones.
    pub archived: bool,
}

impl SessionFilter {
    /// Number of rows to skip for the requested page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// The query with surrounding whitespace removed.
    #[must_use]
    pub fn needle(&self) -> &str {
        self.query.trim()
    }
}

impl Default for SessionFilter {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
            query: String::new(),
            archived: false,
        }
    }
}

/// One page of a session listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPage {
    /// Sessions on this page, newest first.
    pub items: Vec<Session>,
    /// Total number of sessions matching the filter across all pages.
    pub total: u64,
}

/// A session together with all of its players.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDetail {
    /// The session itself.
    pub session: Session,
    /// Players in ascending id order.
    pub players: Vec<Player>,
}
