use crate::catalog::Catalog;
use crate::classify::{ClassificationMemo, Classifier};
use crate::error::{CatalogError, ReconcileError};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use sickadd_models::{CatalogRecord, ImdbId, ShowKind, TvdbId};
use sickadd_sources::{CrossRefResolver, TrackingServer, WatchlistProvider};
use std::collections::{BTreeSet, HashSet};
use std::time::Instant;
use tracing::{error, info, warn};

/// Per-watchlist outcome of one run.
#[derive(Debug, Clone, Serialize)]
pub struct ListSummary {
    pub url: String,
    pub reachable: bool,
    /// Identifiers found on the page.
    pub total: usize,
    /// Identifiers not in the catalog before this list was processed.
    pub new: usize,
}

/// What one run did, in pipeline order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub lists: Vec<ListSummary>,
    pub series_added: usize,
    pub not_series_added: usize,
    pub undetermined: usize,
    pub detail_lookups: usize,
    pub resolved: usize,
    pub resolve_pending: usize,
    /// Series found already tracked by SickChill.
    pub reconciled: usize,
    pub registered: usize,
    pub failed_registrations: usize,
    /// Titles of series still lacking a TheTVDB id at the end of the run.
    pub skipped_missing_cross_ref: Vec<String>,
    pub duration_ms: u64,
}

impl RunSummary {
    pub fn reachable_lists(&self) -> usize {
        self.lists.iter().filter(|l| l.reachable).count()
    }
}

struct HealthReport {
    lists: Vec<(String, BTreeSet<ImdbId>)>,
    inventory: HashSet<TvdbId>,
}

/// Drives one pipeline run against an open catalog.
///
/// The caller owns the run lock and the catalog; everything remote is awaited
/// one call at a time.
pub struct Reconciler<'a> {
    catalog: &'a Catalog,
    provider: &'a dyn WatchlistProvider,
    resolver: &'a dyn CrossRefResolver,
    tracker: &'a dyn TrackingServer,
    watchlist_urls: &'a [String],
    today: NaiveDate,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        catalog: &'a Catalog,
        provider: &'a dyn WatchlistProvider,
        resolver: &'a dyn CrossRefResolver,
        tracker: &'a dyn TrackingServer,
        watchlist_urls: &'a [String],
    ) -> Self {
        Self {
            catalog,
            provider,
            resolver,
            tracker,
            watchlist_urls,
            today: Local::now().date_naive(),
        }
    }

    /// Date stamped on new and newly registered records.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub async fn run(&self) -> Result<RunSummary, ReconcileError> {
        let start = Instant::now();
        let mut summary = RunSummary::default();

        info!(
            operation = "run_start",
            lists = self.watchlist_urls.len(),
            catalog = %self.catalog.location().display(),
            "Starting watchlist sync"
        );

        let health = self.health_check(&mut summary).await?;
        self.import_new_titles(&health.lists, &mut summary).await?;
        self.resolve_cross_refs(&mut summary).await?;
        self.reconcile_inventory(&health.inventory, &mut summary)?;
        self.register_pending(&mut summary).await?;
        self.report_missing_cross_refs(&mut summary)?;

        summary.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            operation = "run_complete",
            series_added = summary.series_added,
            not_series_added = summary.not_series_added,
            resolved = summary.resolved,
            reconciled = summary.reconciled,
            registered = summary.registered,
            failed_registrations = summary.failed_registrations,
            duration_ms = summary.duration_ms,
            "Watchlist sync completed"
        );
        Ok(summary)
    }

    async fn health_check(&self, summary: &mut RunSummary) -> Result<HealthReport, ReconcileError> {
        let mut lists = Vec::new();
        for url in self.watchlist_urls {
            match self.provider.fetch_list(url).await {
                Ok(ids) => {
                    info!(
                        operation = "list_fetch",
                        provider = self.provider.provider_name(),
                        url = %url,
                        total = ids.len(),
                        "Watchlist is reachable"
                    );
                    lists.push((url.clone(), ids));
                }
                Err(e) => {
                    warn!(
                        operation = "list_fetch",
                        provider = self.provider.provider_name(),
                        url = %url,
                        error = %e,
                        "Watchlist is unreachable, skipping it this run"
                    );
                    summary.lists.push(ListSummary {
                        url: url.clone(),
                        reachable: false,
                        total: 0,
                        new: 0,
                    });
                }
            }
        }
        if lists.is_empty() {
            return Err(ReconcileError::AllListsUnreachable(self.watchlist_urls.len()));
        }

        let inventory = self
            .tracker
            .shows()
            .await
            .map_err(|e| ReconcileError::TrackerUnreachable(e.to_string()))?;
        info!(operation = "tracker_check", shows = inventory.len(), "SickChill is reachable");

        self.resolver
            .check_available()
            .await
            .map_err(|e| ReconcileError::ResolverUnreachable(e.to_string()))?;
        info!(operation = "resolver_check", "TheTVDB is reachable");

        Ok(HealthReport { lists, inventory })
    }

    async fn import_new_titles(
        &self,
        lists: &[(String, BTreeSet<ImdbId>)],
        summary: &mut RunSummary,
    ) -> Result<(), ReconcileError> {
        let mut known: HashSet<ImdbId> = self.catalog.lookup_known_titles()?.into_keys().collect();
        let classifier = Classifier::new(self.provider);
        let mut memo = ClassificationMemo::new();
        let mut undetermined = BTreeSet::new();

        for (url, ids) in lists {
            let new_ids: Vec<&ImdbId> = ids.iter().filter(|id| !known.contains(*id)).collect();
            info!(
                operation = "list_import",
                url = %url,
                total = ids.len(),
                new = new_ids.len(),
                "Processing watchlist"
            );
            summary.lists.push(ListSummary {
                url: url.clone(),
                reachable: true,
                total: ids.len(),
                new: new_ids.len(),
            });

            for id in new_ids {
                let classification = classifier.classify(&mut memo, id).await;
                let Some((kind, title)) = classification.persisted() else {
                    undetermined.insert(id.clone());
                    continue;
                };

                let record = CatalogRecord::discovered(id.clone(), title, url.as_str(), self.today, kind);
                match self.catalog.insert(&record) {
                    Ok(()) => {
                        match kind {
                            ShowKind::Series => summary.series_added += 1,
                            _ => summary.not_series_added += 1,
                        }
                        info!(imdb_id = %id, kind = ?kind, title = %record.title, "Added to catalog");
                        known.insert(id.clone());
                    }
                    Err(CatalogError::DuplicateId(dup)) => {
                        error!(imdb_id = %dup, "Record already exists in the catalog, skipping");
                        known.insert(id.clone());
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }

        summary.undetermined = undetermined.len();
        summary.detail_lookups = memo.remote_lookups();
        Ok(())
    }

    async fn resolve_cross_refs(&self, summary: &mut RunSummary) -> Result<(), ReconcileError> {
        for (id, title) in self.catalog.find_series_missing_cross_ref()? {
            match self.resolver.resolve(&id).await {
                Ok(Some(tvdb_id)) => {
                    if self.catalog.set_cross_ref(&id, tvdb_id)? {
                        info!(imdb_id = %id, tvdb_id = %tvdb_id, title = %title, "Resolved TheTVDB id");
                        summary.resolved += 1;
                    }
                }
                Ok(None) => {
                    warn!(imdb_id = %id, title = %title, "TheTVDB knows no series for this id");
                    summary.resolve_pending += 1;
                }
                Err(e) => {
                    warn!(imdb_id = %id, title = %title, error = %e, "TheTVDB lookup failed, will retry next run");
                    summary.resolve_pending += 1;
                }
            }
        }
        Ok(())
    }

    fn reconcile_inventory(
        &self,
        inventory: &HashSet<TvdbId>,
        summary: &mut RunSummary,
    ) -> Result<(), ReconcileError> {
        for (tvdb_id, title) in self.catalog.find_unregistered_resolved_series()? {
            if !inventory.contains(&tvdb_id) {
                continue;
            }
            let changed = self.catalog.mark_registered(tvdb_id, self.today)?;
            if changed > 0 {
                info!(tvdb_id = %tvdb_id, title = %title, "Already in SickChill, marked as added");
                summary.reconciled += changed;
            }
        }
        Ok(())
    }

    async fn register_pending(&self, summary: &mut RunSummary) -> Result<(), ReconcileError> {
        let mut attempted = HashSet::new();
        for (tvdb_id, title) in self.catalog.find_unregistered_resolved_series()? {
            if !attempted.insert(tvdb_id) {
                continue;
            }
            match self.tracker.add_show(tvdb_id).await {
                Ok(()) => {
                    let changed = self.catalog.mark_registered(tvdb_id, self.today)?;
                    info!(tvdb_id = %tvdb_id, title = %title, "Added to SickChill");
                    summary.registered += changed;
                }
                Err(e) => {
                    warn!(tvdb_id = %tvdb_id, title = %title, error = %e, "SickChill did not add show, will retry next run");
                    summary.failed_registrations += 1;
                }
            }
        }
        Ok(())
    }

    fn report_missing_cross_refs(&self, summary: &mut RunSummary) -> Result<(), ReconcileError> {
        for (id, title) in self.catalog.find_series_missing_cross_ref()? {
            warn!(imdb_id = %id, title = %title, "Skipped: missing TheTVDB id");
            summary.skipped_missing_cross_ref.push(title);
        }
        Ok(())
    }
}
