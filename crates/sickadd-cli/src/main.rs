use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser, Subcommand};
use commands::{config, daemon, db, run};
use sickadd_config::{Config, ConfigOverrides, PathManager};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "sickadd")]
#[command(about = "SickAdd - Add the TV series on your IMDb watchlists to SickChill")]
#[command(version)]
struct Cli {
    /// Remove one record from the database by IMDb id (e.g. tt0903747)
    #[arg(long, value_name = "IMDB_ID", conflicts_with = "showdb")]
    delete: Option<String>,

    /// Print every record in the database, grouped by type
    #[arg(long, action = ArgAction::SetTrue)]
    showdb: bool,

    #[command(flatten)]
    settings: SettingsArgs,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Values that override the configuration file.
#[derive(Args)]
struct SettingsArgs {
    /// Configuration file (default: ~/.config/sickadd/config.toml, or /app/config.toml in containers)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// IMDb list URLs, space or comma separated
    #[arg(long = "watchlist_urls", env = "WATCHLIST_URLS", global = true, num_args = 1.., value_name = "URL")]
    watchlist_urls: Option<Vec<String>>,

    #[arg(long = "sickchill_url", env = "SICKCHILL_URL", global = true, value_name = "URL")]
    sickchill_url: Option<String>,

    #[arg(long = "sickchill_api_key", env = "SICKCHILL_API_KEY", global = true, value_name = "KEY", hide_env_values = true)]
    sickchill_api_key: Option<String>,

    #[arg(long = "database_path", env = "DATABASE_PATH", global = true, value_name = "PATH")]
    database_path: Option<PathBuf>,

    #[arg(long = "debug_log_path", env = "DEBUG_LOG_PATH", global = true, value_name = "PATH")]
    debug_log_path: Option<PathBuf>,

    /// Rotate the log file once it exceeds this size
    #[arg(long = "debug_max_size_mb", env = "DEBUG_MAX_SIZE_MB", global = true, value_name = "MB")]
    debug_max_size_mb: Option<u64>,

    /// Enable debug logging
    #[arg(long, env = "DEBUG_ENABLED", global = true, action = ArgAction::SetTrue, value_parser = BoolishValueParser::new())]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the sync periodically in the foreground
    #[command(long_about = "Run SickAdd as a long-lived process that syncs every interval. The first sync runs on startup unless --no-startup-run is given. Ctrl-C stops it between runs.")]
    Daemon {
        /// Minutes between runs
        #[arg(long, env = "INTERVAL_MINUTES", value_name = "MINUTES")]
        interval_minutes: Option<u64>,

        /// Skip the run on startup
        #[arg(long, action = ArgAction::SetTrue)]
        no_startup_run: bool,
    },
    /// Inspect the configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration (masks the API key)
    Show {
        /// Show the API key unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
}

impl SettingsArgs {
    fn overrides(&self, interval_minutes: Option<u64>) -> ConfigOverrides {
        ConfigOverrides {
            watchlist_urls: self.watchlist_urls.clone(),
            sickchill_url: self.sickchill_url.clone(),
            sickchill_api_key: self.sickchill_api_key.clone(),
            database_path: self.database_path.clone(),
            log_file: self.debug_log_path.clone(),
            log_max_size_mb: self.debug_max_size_mb,
            debug: self.debug.then_some(true),
            interval_minutes,
        }
    }

    fn load(&self, interval_minutes: Option<u64>) -> color_eyre::Result<(Config, PathBuf)> {
        let paths = PathManager::default();
        let config_file = self.config.clone().unwrap_or_else(|| paths.config_file());
        let config = Config::load(&config_file, self.overrides(interval_minutes), &paths)
            .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;
        Ok((config, config_file))
    }
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let interval_override = match &cli.command {
        Some(Commands::Daemon { interval_minutes, .. }) => *interval_minutes,
        _ => None,
    };
    let (config, config_file) = cli.settings.load(interval_override)?;

    let _log_guard = logging::init_logging(logging::LogSettings {
        quiet: cli.quiet,
        debug: config.logging.debug,
        file: Some(config.logging.file.as_path()),
        max_size_mb: config.logging.max_size_mb,
    })
    .map_err(|e| color_eyre::eyre::eyre!("Failed to initialize logging: {}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Some(Commands::Daemon { no_startup_run, .. }) => daemon::run_daemon(&config, no_startup_run, &output).await,
        Some(Commands::Config {
            cmd: ConfigCommands::Show { full },
        }) => config::show_config(&config, &config_file, full, &output),
        None => {
            if let Some(id) = cli.delete {
                db::delete_record(&config, &id, &output)
            } else if cli.showdb {
                db::show_db(&config, &output)
            } else {
                run::run_once(&config, &output).await
            }
        }
    }
}
