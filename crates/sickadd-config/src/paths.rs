use anyhow::Result;
use std::path::PathBuf;

/// Get the container base path from environment variable, defaulting to "/app"
pub fn container_base_path() -> PathBuf {
    std::env::var("SICKADD_BASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/app"))
}

#[derive(Debug, Clone)]
pub struct PathManager {
    config_dir: PathBuf,
    data_dir: PathBuf,
    log_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("sickadd");

        Ok(Self::rooted_at(base_dir))
    }

    pub fn from_docker_env() -> Self {
        // Config file sits directly in the base path, data and logs in subdirs
        Self::rooted_at(container_base_path())
    }

    pub fn rooted_at(base: PathBuf) -> Self {
        Self {
            config_dir: base.clone(),
            data_dir: base.join("data"),
            log_dir: base.join("logs"),
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn database_file(&self) -> PathBuf {
        self.data_dir.join("sickadd.db")
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join("sickadd.log")
    }
}

impl Default for PathManager {
    fn default() -> Self {
        // The container image creates the base directory, so its presence means Docker
        let base = container_base_path();
        if base.exists() {
            return Self::from_docker_env();
        }

        // Otherwise, use platform-specific paths (e.g., ~/.config/sickadd on Linux)
        Self::new().unwrap_or_else(|_| Self::from_docker_env())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rooted_layout() {
        let paths = PathManager::rooted_at(PathBuf::from("/srv/sickadd"));
        assert_eq!(paths.config_file(), PathBuf::from("/srv/sickadd/config.toml"));
        assert_eq!(paths.database_file(), PathBuf::from("/srv/sickadd/data/sickadd.db"));
        assert_eq!(paths.log_file(), PathBuf::from("/srv/sickadd/logs/sickadd.log"));
    }
}
