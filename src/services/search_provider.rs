//! The provider contract behind the unified search endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::models::search::SearchResults;

/// A free-text query with an offset cursor. `since`/`until` bound the
/// occurrence window for providers that index time (events).
#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    pub term: String,

    pub limit: u64,

    pub cursor: Option<u64>,

    pub since: Option<i64>,

    pub until: Option<i64>,
}

impl SearchQuery {
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.cursor.unwrap_or(0)
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for SearchError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

/// One search provider (contacts, events, tasks). Providers gate on their
/// owning app before touching the store and return a defined empty result
/// when gated off.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Stable identifier used in routes and metrics labels.
    fn id(&self) -> &'static str;

    fn display_name(&self) -> &'static str;

    async fn search(
        &self,
        user_id: &str,
        query: &SearchQuery,
    ) -> Result<SearchResults, SearchError>;
}
