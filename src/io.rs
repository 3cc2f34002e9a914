//! Retry-on-lock file reading.
//!
//! Callers that load a document from disk may race with the process that is
//! still writing it. This helper retries the open while the error looks like
//! a lock, with an explicit, configurable policy — the mapping engine itself
//! never takes a file path and performs no retries of its own.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tokio::time::sleep;
use tracing::warn;

/// How often and how patiently to retry a locked file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(100),
        }
    }
}

#[derive(Error, Debug)]
pub enum FileRetryError {
    #[error("file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("file still locked after {attempts} attempts: {path}")]
    Locked {
        path: PathBuf,
        attempts: u32,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Error kinds that indicate another process holds the file.
///
/// Platform-dependent: sharing violations surface as permission errors on
/// most systems, advisory locks as `WouldBlock`/`ResourceBusy`.
fn is_lock_error(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::PermissionDenied | io::ErrorKind::WouldBlock | io::ErrorKind::ResourceBusy
    )
}

/// Read a file to a string, retrying while it appears locked.
///
/// A missing file fails immediately with [`FileRetryError::NotFound`]; any
/// other non-lock error fails immediately with [`FileRetryError::Io`]. Lock
/// errors are retried up to `policy.max_attempts` times with `policy.delay`
/// between attempts.
pub async fn read_to_string_with_retry(
    path: impl AsRef<Path>,
    policy: &RetryPolicy,
) -> std::result::Result<String, FileRetryError> {
    let path = path.as_ref();
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => return Ok(contents),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Err(FileRetryError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(error) if is_lock_error(&error) => {
                if attempt >= max_attempts {
                    return Err(FileRetryError::Locked {
                        path: path.to_path_buf(),
                        attempts: attempt,
                        source: error,
                    });
                }
                warn!(path = %path.display(), attempt, "file locked, retrying");
                sleep(policy.delay).await;
            }
            Err(error) => return Err(FileRetryError::Io(error)),
        }
    }
}
