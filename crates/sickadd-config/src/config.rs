use crate::paths::PathManager;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const PLACEHOLDER_SICKCHILL_URL: &str = "http://sickchill_ip:port";
const PLACEHOLDER_SICKCHILL_API_KEY: &str = "your_sickchill_api_key";

/// Settings for one process, built once at startup and passed by reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub imdb: ImdbConfig,
    #[serde(default)]
    pub sickchill: SickChillConfig,
    #[serde(default)]
    pub thetvdb: TheTvdbConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImdbConfig {
    #[serde(default)]
    pub watchlist_urls: Vec<String>,
    #[serde(default = "default_imdb_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SickChillConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TheTvdbConfig {
    #[serde(default = "default_thetvdb_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Empty means `<data dir>/sickadd.db`.
    #[serde(default)]
    pub database_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Empty means `<log dir>/sickadd.log`.
    #[serde(default)]
    pub file: PathBuf,
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_max_log_size")]
    pub max_size_mb: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
    #[serde(default = "default_true")]
    pub run_on_startup: bool,
}

/// Values supplied on the command line or through the environment.
///
/// Every `Some` wins over what the file says.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub watchlist_urls: Option<Vec<String>>,
    pub sickchill_url: Option<String>,
    pub sickchill_api_key: Option<String>,
    pub database_path: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub log_max_size_mb: Option<u64>,
    pub debug: Option<bool>,
    pub interval_minutes: Option<u64>,
}

fn default_true() -> bool {
    true
}

fn default_imdb_base_url() -> String {
    "https://www.imdb.com".to_string()
}

fn default_thetvdb_base_url() -> String {
    "https://thetvdb.com".to_string()
}

fn default_max_log_size() -> u64 {
    20
}

fn default_interval_minutes() -> u64 {
    1440 // Once a day
}

impl Default for ImdbConfig {
    fn default() -> Self {
        Self {
            watchlist_urls: Vec::new(),
            base_url: default_imdb_base_url(),
        }
    }
}

impl Default for TheTvdbConfig {
    fn default() -> Self {
        Self {
            base_url: default_thetvdb_base_url(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::new(),
            debug: false,
            max_size_mb: default_max_log_size(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_interval_minutes(),
            run_on_startup: default_true(),
        }
    }
}

/// Split entries like `"a,b"` and `" c "` into trimmed, non-empty URLs.
pub fn split_url_list<S: AsRef<str>>(entries: &[S]) -> Vec<String> {
    entries
        .iter()
        .flat_map(|entry| entry.as_ref().split(','))
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Defaults, then the file if it exists, then `overrides`; empty paths are
    /// filled from `paths`.
    pub fn load(
        config_file: &Path,
        overrides: ConfigOverrides,
        paths: &PathManager,
    ) -> anyhow::Result<Self> {
        let mut config = if config_file.exists() {
            debug!(path = %config_file.display(), "Loading configuration file");
            Self::load_from_file(config_file).map_err(|e| {
                anyhow::anyhow!("Failed to load config from {}: {}", config_file.display(), e)
            })?
        } else {
            debug!(path = %config_file.display(), "No configuration file, using defaults");
            Self::default()
        };
        config.apply_overrides(overrides);
        config.fill_default_paths(paths);
        Ok(config)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(urls) = overrides.watchlist_urls {
            self.imdb.watchlist_urls = urls;
        }
        if let Some(url) = overrides.sickchill_url {
            self.sickchill.url = url;
        }
        if let Some(api_key) = overrides.sickchill_api_key {
            self.sickchill.api_key = api_key;
        }
        if let Some(path) = overrides.database_path {
            self.storage.database_path = path;
        }
        if let Some(path) = overrides.log_file {
            self.logging.file = path;
        }
        if let Some(size) = overrides.log_max_size_mb {
            self.logging.max_size_mb = size;
        }
        if let Some(debug) = overrides.debug {
            self.logging.debug = self.logging.debug || debug;
        }
        if let Some(minutes) = overrides.interval_minutes {
            self.scheduler.interval_minutes = minutes;
        }
        self.imdb.watchlist_urls = split_url_list(&self.imdb.watchlist_urls);
    }

    pub fn fill_default_paths(&mut self, paths: &PathManager) {
        if self.storage.database_path.as_os_str().is_empty() {
            self.storage.database_path = paths.database_file();
        }
        if self.logging.file.as_os_str().is_empty() {
            self.logging.file = paths.log_file();
        }
    }

    pub fn database_path(&self) -> &Path {
        &self.storage.database_path
    }

    /// Checks what a pipeline run needs; `--showdb` and `--delete` only need storage.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.imdb.watchlist_urls.is_empty() {
            return Err(anyhow::anyhow!("At least one IMDb watchlist URL must be configured"));
        }
        for url in &self.imdb.watchlist_urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(anyhow::anyhow!("Invalid watchlist URL: {}", url));
            }
        }
        if self.sickchill.url.is_empty() || self.sickchill.url == PLACEHOLDER_SICKCHILL_URL {
            return Err(anyhow::anyhow!("SickChill URL is not configured"));
        }
        if self.sickchill.api_key.is_empty() || self.sickchill.api_key == PLACEHOLDER_SICKCHILL_API_KEY {
            return Err(anyhow::anyhow!("SickChill API key is not configured"));
        }
        if self.scheduler.interval_minutes == 0 {
            return Err(anyhow::anyhow!("scheduler.interval_minutes must be greater than zero"));
        }
        Ok(())
    }
}
