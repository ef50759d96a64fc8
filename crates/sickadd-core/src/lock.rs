//! Exclusive run lock next to the catalog file.
//!
//! `<database>.lock` holds the owner's PID. It is staged in a temporary file
//! and hard-linked into place, so it never exists without its PID. A lock
//! whose owner is gone, or that names this very process, is replaced; any
//! other live owner refuses the new run.

use crate::error::ReconcileError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

impl RunLock {
    pub fn lock_path(database_path: &Path) -> PathBuf {
        let mut name = database_path.as_os_str().to_os_string();
        name.push(".lock");
        PathBuf::from(name)
    }

    pub fn acquire(database_path: &Path) -> Result<Self, ReconcileError> {
        let path = Self::lock_path(database_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| unavailable(&path, e))?;
        }

        let own_pid = std::process::id();
        let staging = staging_path(&path, own_pid);
        std::fs::write(&staging, own_pid.to_string()).map_err(|e| unavailable(&path, e))?;
        let result = Self::link_staged(&path, &staging, own_pid);
        if let Err(e) = std::fs::remove_file(&staging) {
            debug!(path = %staging.display(), error = %e, "Failed to remove staged lock file");
        }
        result
    }

    // The lock only ever appears with its PID already written, so a reader
    // never sees a half-created lock.
    fn link_staged(path: &Path, staging: &Path, own_pid: u32) -> Result<Self, ReconcileError> {
        // One retry: the first failure may be a stale lock we just removed
        for _ in 0..2 {
            match std::fs::hard_link(staging, path) {
                Ok(()) => {
                    debug!(path = %path.display(), "Acquired run lock");
                    return Ok(Self {
                        path: path.to_path_buf(),
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    let owner = read_owner(path);
                    match owner {
                        // Our own PID is left over from a previous process that
                        // was given the same PID, e.g. PID 1 in a container
                        Some(pid) if pid != own_pid && process_alive(pid) => {
                            return Err(ReconcileError::AlreadyRunning {
                                pid,
                                path: path.to_path_buf(),
                            });
                        }
                        _ => {
                            warn!(path = %path.display(), owner = ?owner, "Removing stale run lock");
                            std::fs::remove_file(path)
                                .or_else(|e| if e.kind() == ErrorKind::NotFound { Ok(()) } else { Err(e) })
                                .map_err(|e| unavailable(path, e))?;
                        }
                    }
                }
                Err(e) => return Err(unavailable(path, e)),
            }
        }

        Err(ReconcileError::LockUnavailable {
            path: path.to_path_buf(),
            reason: "lock file keeps reappearing".to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "Failed to remove run lock");
        }
    }
}

fn unavailable(path: &Path, e: std::io::Error) -> ReconcileError {
    ReconcileError::LockUnavailable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

fn staging_path(path: &Path, pid: u32) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{}.tmp", pid));
    PathBuf::from(name)
}

fn read_owner(path: &Path) -> Option<u32> {
    std::fs::read_to_string(path).ok()?.trim().parse().ok()
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    match kill(Pid::from_raw(raw), None) {
        Ok(()) => true,
        // Exists but belongs to someone else
        Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    // No portable liveness probe; assume another owner is still running
    true
}
