use crate::output::{Output, OutputFormat};
use color_eyre::Result;
use owo_colors::OwoColorize;
use sickadd_config::Config;
use sickadd_core::{Catalog, ReconcileError, Reconciler, RunLock, RunSummary};
use sickadd_sources::{ImdbClient, SickChillClient, TheTvdbClient};
use tracing::error;

/// Remote clients built once from the configuration and reused across runs.
pub struct Pipeline {
    imdb: ImdbClient,
    thetvdb: TheTvdbClient,
    sickchill: SickChillClient,
}

impl Pipeline {
    pub fn from_config(config: &Config) -> Self {
        Self {
            imdb: ImdbClient::new(&config.imdb.base_url),
            thetvdb: TheTvdbClient::new(&config.thetvdb.base_url),
            sickchill: SickChillClient::new(&config.sickchill.url, &config.sickchill.api_key),
        }
    }

    /// One run: lock, open the catalog, reconcile. Lock and catalog are released on return.
    pub async fn execute(&self, config: &Config) -> Result<RunSummary, ReconcileError> {
        let database = config.database_path();
        let _lock = RunLock::acquire(database)?;
        let catalog = Catalog::open(database)?;

        Reconciler::new(
            &catalog,
            &self.imdb,
            &self.thetvdb,
            &self.sickchill,
            &config.imdb.watchlist_urls,
        )
        .run()
        .await
    }
}

pub async fn run_once(config: &Config, output: &Output) -> Result<()> {
    config.validate().map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let pipeline = Pipeline::from_config(config);
    match pipeline.execute(config).await {
        Ok(summary) => {
            print_summary(&summary, output);
            Ok(())
        }
        Err(e) => {
            error!(operation = "run_failed", error = %e, "Sync aborted");
            output.error(format!("Sync aborted: {}", e));
            Err(e.into())
        }
    }
}

pub fn print_summary(summary: &RunSummary, output: &Output) {
    if output.format() != OutputFormat::Human {
        output.json(&serde_json::to_value(summary).unwrap_or_default());
        return;
    }
    if output.is_quiet() {
        return;
    }

    println!();
    println!("{}", "Sync summary".bright_cyan().bold());
    for list in &summary.lists {
        if list.reachable {
            println!("  {} {} ({} ids, {} new)", "✓".green(), list.url, list.total, list.new);
        } else {
            println!("  {} {} (unreachable)", "✗".red(), list.url);
        }
    }
    println!(
        "  Added to database: {} TV shows, {} other titles ({} could not be classified)",
        summary.series_added, summary.not_series_added, summary.undetermined
    );
    println!(
        "  TheTVDB ids: {} resolved, {} pending",
        summary.resolved, summary.resolve_pending
    );
    println!(
        "  SickChill: {} added, {} already present, {} failed",
        summary.registered, summary.reconciled, summary.failed_registrations
    );

    if !summary.skipped_missing_cross_ref.is_empty() {
        output.warn(format!(
            "{} TV shows skipped, missing TheTVDB id:",
            summary.skipped_missing_cross_ref.len()
        ));
        for title in &summary.skipped_missing_cross_ref {
            println!("    - {}", title);
        }
    }
    output.success(format!("Completed in {:.1}s", summary.duration_ms as f64 / 1000.0));
}
