use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("storage at {path} is unavailable: {reason}")]
    StorageUnavailable { path: PathBuf, reason: String },

    #[error("record {0} already exists")]
    DuplicateId(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("catalog connection lock poisoned")]
    LockPoisoned,
}

/// Failures that end a run before or during the pipeline.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Storage(#[from] CatalogError),

    #[error("none of the {0} configured IMDb watchlists are reachable")]
    AllListsUnreachable(usize),

    #[error("SickChill is not reachable. Check the SickChill URL, port and API key: {0}")]
    TrackerUnreachable(String),

    #[error("TheTVDB is not reachable: {0}")]
    ResolverUnreachable(String),

    #[error("another run (pid {pid}) holds the lock {}", path.display())]
    AlreadyRunning { pid: u32, path: PathBuf },

    #[error("run lock {} could not be created: {reason}", path.display())]
    LockUnavailable { path: PathBuf, reason: String },
}
