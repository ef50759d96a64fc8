use crate::error::SourceError;
use async_trait::async_trait;
use sickadd_models::{ImdbId, TvdbId};
use std::collections::{BTreeSet, HashSet};

/// Site hosting the watchlists and the per-title detail pages.
#[async_trait]
pub trait WatchlistProvider: Send + Sync {
    fn provider_name(&self) -> &str;

    /// Every identifier referenced by one list page, de-duplicated.
    async fn fetch_list(&self, url: &str) -> Result<BTreeSet<ImdbId>, SourceError>;

    /// Decoded title of the identifier's detail page.
    ///
    /// `Ok(None)` means the page loaded but carried no title.
    async fn fetch_title(&self, id: &ImdbId) -> Result<Option<String>, SourceError>;
}

/// Maps an IMDb identifier into the tracking server's identifier space.
#[async_trait]
pub trait CrossRefResolver: Send + Sync {
    /// Single probe used by the pre-run health check.
    async fn check_available(&self) -> Result<(), SourceError>;

    /// `Ok(None)` when the provider knows no series for `id`.
    async fn resolve(&self, id: &ImdbId) -> Result<Option<TvdbId>, SourceError>;
}

/// The TV-tracking server shows get registered with.
#[async_trait]
pub trait TrackingServer: Send + Sync {
    /// Cross-reference ids of every show the server already tracks.
    async fn shows(&self) -> Result<HashSet<TvdbId>, SourceError>;

    async fn add_show(&self, tvdb_id: TvdbId) -> Result<(), SourceError>;
}
