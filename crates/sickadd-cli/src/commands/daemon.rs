use crate::commands::run::{print_summary, Pipeline};
use crate::output::Output;
use color_eyre::Result;
use sickadd_config::Config;
use sickadd_core::ReconcileError;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

pub async fn run_daemon(config: &Config, no_startup_run: bool, output: &Output) -> Result<()> {
    config.validate().map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let minutes = config.scheduler.interval_minutes;
    let run_on_startup = config.scheduler.run_on_startup && !no_startup_run;
    let pipeline = Pipeline::from_config(config);

    info!(
        operation = "daemon_start",
        interval_minutes = minutes,
        run_on_startup,
        "Starting scheduler"
    );
    output.info(format!("Syncing every {} minutes. Press Ctrl-C to stop.", minutes));

    let mut ticker = interval(Duration::from_secs(minutes.saturating_mul(60)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    if !run_on_startup {
        // The first tick completes immediately
        ticker.tick().await;
    }

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                run_scheduled(&pipeline, config, output).await;
            }
            _ = tokio::signal::ctrl_c() => {
                info!(operation = "daemon_stop", "Received Ctrl-C, stopping scheduler");
                break;
            }
        }
    }

    Ok(())
}

async fn run_scheduled(pipeline: &Pipeline, config: &Config, output: &Output) {
    info!(operation = "scheduled_run_start", "Starting scheduled sync");
    match pipeline.execute(config).await {
        Ok(summary) => {
            info!(
                operation = "scheduled_run_complete",
                registered = summary.registered,
                duration_ms = summary.duration_ms,
                "Scheduled sync completed"
            );
            print_summary(&summary, output);
        }
        Err(ReconcileError::AlreadyRunning { pid, path }) => {
            warn!(
                operation = "scheduled_run_skipped",
                pid,
                lock = %path.display(),
                "Another sync is still running, skipping this tick"
            );
        }
        Err(e) => {
            error!(
                operation = "scheduled_run_error",
                error = %e,
                "Scheduled sync failed"
            );
            output.error(format!("Scheduled sync failed: {}", e));
        }
    }
}
