//! Shared DTO types used across multiple endpoints.

use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::SessionFilter;

/// Largest page size the API will serve.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Pagination and filter query parameters for session listings.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SessionListParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100). Defaults to 10.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Case-insensitive substring matched against the creator name.
    #[serde(default)]
    pub q: String,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    10
}

impl SessionListParams {
    /// Clamps `page` to at least 1 and `page_size` to `1..=100`.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            page: self.page.max(1),
            page_size: self.page_size.clamp(1, MAX_PAGE_SIZE),
            q: self.q.clone(),
        }
    }

    /// Converts the clamped parameters into a store filter.
    #[must_use]
    pub fn into_filter(self, archived: bool) -> SessionFilter {
        let params = self.clamped();
        SessionFilter {
            page: params.page,
            page_size: params.page_size,
            query: params.q,
            archived,
        }
    }
}
