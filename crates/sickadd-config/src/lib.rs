pub mod config;
pub mod paths;

pub use config::{
    Config, ConfigOverrides, ImdbConfig, LoggingConfig, SchedulerConfig, SickChillConfig,
    StorageConfig, TheTvdbConfig,
};
pub use paths::{container_base_path, PathManager};
