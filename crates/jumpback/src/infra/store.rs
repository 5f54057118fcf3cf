//! Durable, race-safe persistence of the jump-point stack.
//!
//! Every push and pop is a short-lived process, so the stack file is the
//! only state that survives between invocations. All mutation goes
//! through [`StackStore::with_lock`], which serializes concurrent
//! invocations with an advisory lock on a companion file and replaces the
//! stack file atomically.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::domain::errors::JumpError;
use crate::domain::model::Stack;

const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(25);

/// Owns the on-disk stack file: load, atomic save, and the lock-guarded
/// read-modify-write cycle.
#[derive(Debug, Clone)]
pub struct StackStore {
    path: PathBuf,
    lock_path: PathBuf,
    lock_timeout: Duration,
}

impl StackStore {
    /// Create a store for the stack file at `path`.
    pub fn new(path: impl Into<PathBuf>, lock_timeout: Duration) -> Self {
        let path = path.into();
        let mut lock_name = path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "stack.json".into());
        lock_name.push(".lock");
        let lock_path = path.with_file_name(lock_name);
        Self {
            path,
            lock_path,
            lock_timeout,
        }
    }

    /// Location of the persisted stack file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stack from disk. A missing file is an empty stack, not an
    /// error; a present but unparseable file is [`JumpError::CorruptStack`]
    /// and the file is left untouched.
    pub fn load(&self) -> Result<Stack, JumpError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Stack::new()),
            Err(err) => return Err(JumpError::StorageUnavailable(err)),
        };
        serde_json::from_str(&data).map_err(|source| JumpError::CorruptStack {
            path: self.path.clone(),
            source,
        })
    }

    /// Write the full stack back, replacing the file atomically.
    ///
    /// The stack is serialized into a temporary file in the same directory
    /// and renamed over the target, so an interrupted save can never leave
    /// a truncated or half-written stack file.
    pub fn save(&self, stack: &Stack) -> Result<(), JumpError> {
        let dir = self.ensure_dir()?;
        let tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&tmp, stack)
            .map_err(|err| JumpError::StorageUnavailable(err.into()))?;
        tmp.persist(&self.path)
            .map_err(|err| JumpError::StorageUnavailable(err.error))?;
        Ok(())
    }

    /// Run `transform` against the current stack under the exclusive
    /// advisory lock, persisting the result before the lock is released.
    ///
    /// This is the only sanctioned way to mutate the stack. The save is
    /// skipped when `transform` leaves the stack unchanged, so a no-op
    /// transaction leaves the file byte-identical (and an absent file
    /// absent).
    pub fn with_lock<T>(&self, transform: impl FnOnce(&mut Stack) -> T) -> Result<T, JumpError> {
        self.ensure_dir()?;
        let _guard = self.acquire_lock()?;

        let mut stack = self.load()?;
        let unchanged = stack.clone();
        let value = transform(&mut stack);
        if stack != unchanged {
            self.save(&stack)?;
        }
        Ok(value)
    }

    fn ensure_dir(&self) -> Result<&Path, JumpError> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;
        Ok(dir)
    }

    /// Acquire the advisory lock, polling until `lock_timeout` elapses.
    ///
    /// The bound exists so an invocation that crashed while holding the
    /// lock cannot deadlock every later invocation; on timeout the caller
    /// reports [`JumpError::LockTimeout`] and exits instead of risking a
    /// lost update.
    fn acquire_lock(&self) -> Result<LockGuard, JumpError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)?;

        let deadline = Instant::now() + self.lock_timeout;
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => {
                    debug!(path = %self.lock_path.display(), "acquired stack lock");
                    return Ok(LockGuard { file });
                }
                Err(_) if Instant::now() < deadline => thread::sleep(LOCK_RETRY_INTERVAL),
                Err(_) => {
                    return Err(JumpError::LockTimeout {
                        path: self.lock_path.clone(),
                    });
                }
            }
        }
    }
}

struct LockGuard {
    file: File,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
    }
}
