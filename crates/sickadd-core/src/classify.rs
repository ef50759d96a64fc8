use sickadd_models::{ImdbId, ShowKind};
use sickadd_sources::WatchlistProvider;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Markers IMDb puts in the `<title>` of series and mini-series pages.
const SERIES_MARKERS: [&str; 3] = ["TV Series", "TV Mini Series", "TV Mini-Series"];

/// Outcome of classifying one identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Series { title: String },
    NotSeries { title: String },
    /// The detail page could not be fetched or had no title. Never persisted.
    Undetermined,
}

impl Classification {
    pub fn from_title(title: String) -> Self {
        if is_series_title(&title) {
            Classification::Series { title }
        } else {
            Classification::NotSeries { title }
        }
    }

    /// Kind and title to persist, `None` for `Undetermined`.
    pub fn persisted(&self) -> Option<(ShowKind, &str)> {
        match self {
            Classification::Series { title } => Some((ShowKind::Series, title)),
            Classification::NotSeries { title } => Some((ShowKind::NotSeries, title)),
            Classification::Undetermined => None,
        }
    }
}

pub fn is_series_title(title: &str) -> bool {
    SERIES_MARKERS.iter().any(|marker| title.contains(marker))
}

/// Decisions made during one run, keyed by identifier.
#[derive(Debug, Default)]
pub struct ClassificationMemo {
    decisions: HashMap<ImdbId, Classification>,
    remote_lookups: usize,
}

impl ClassificationMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &ImdbId) -> Option<&Classification> {
        self.decisions.get(id)
    }

    /// Detail pages requested so far this run.
    pub fn remote_lookups(&self) -> usize {
        self.remote_lookups
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }
}

/// Classifies identifiers through their detail pages.
pub struct Classifier<'a, P: WatchlistProvider + ?Sized> {
    provider: &'a P,
}

impl<'a, P: WatchlistProvider + ?Sized> Classifier<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    /// At most one detail fetch per identifier per memo, failures included.
    pub async fn classify(&self, memo: &mut ClassificationMemo, id: &ImdbId) -> Classification {
        if let Some(known) = memo.get(id) {
            debug!(imdb_id = %id, "Classification served from run memo");
            return known.clone();
        }

        memo.remote_lookups += 1;
        let outcome = match self.provider.fetch_title(id).await {
            Ok(Some(title)) => Classification::from_title(title),
            Ok(None) => {
                warn!(imdb_id = %id, "Title page has no title, will retry next run");
                Classification::Undetermined
            }
            Err(e) => {
                warn!(imdb_id = %id, error = %e, "Could not classify, will retry next run");
                Classification::Undetermined
            }
        };

        debug!(imdb_id = %id, outcome = ?outcome, "Classified");
        memo.decisions.insert(id.clone(), outcome.clone());
        outcome
    }
}
