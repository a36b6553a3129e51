use crate::error::ErrorCode;
use fs2::FileExt;
use std::{
    fs::{self, File, OpenOptions},
    io,
    path::{Path, PathBuf},
    thread,
    time::{Duration, Instant},
};

/// How long a preference write waits for another `lx` process.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(2);

/// Advisory lock errors for the local preference file.
#[derive(Debug)]
pub enum LockError {
    Timeout { path: PathBuf, waited: Duration },
    IoError(io::Error),
}

impl From<io::Error> for LockError {
    fn from(err: io::Error) -> Self {
        Self::IoError(err)
    }
}

impl LockError {
    /// Machine-readable code associated with this lock error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Timeout { .. } => ErrorCode::LockContention,
            Self::IoError(_) => ErrorCode::PrefsWriteFailed,
        }
    }

    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

impl std::fmt::Display for LockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout { path, waited } => write!(
                f,
                "{}: lock timed out after {:?} at {}",
                self.code().code(),
                waited,
                path.display()
            ),
            Self::IoError(err) => write!(f, "{}: {}", self.code().code(), err),
        }
    }
}

impl std::error::Error for LockError {}

/// RAII exclusive lock held around a preference read-modify-write.
///
/// The lock lives on a sidecar file (`prefs.json.lock`) so the data file
/// itself can be replaced by rename while the lock is held.
#[derive(Debug)]
pub struct PrefsLock {
    file: File,
    path: PathBuf,
}

impl PrefsLock {
    /// Acquire an exclusive advisory lock, polling until `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`LockError::Timeout`] when another holder keeps the lock
    /// past `timeout`, or an I/O error if the lock file cannot be opened.
    pub fn acquire(path: &Path, timeout: Duration) -> Result<Self, LockError> {
        let parent = path.parent().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "lock path has no parent")
        })?;
        fs::create_dir_all(parent)?;

        let start = Instant::now();
        loop {
            let file = OpenOptions::new()
                .create(true)
                .read(true)
                .write(true)
                .truncate(false)
                .open(path)?;

            if file.try_lock_exclusive().is_ok() {
                return Ok(Self {
                    file,
                    path: path.to_path_buf(),
                });
            }

            if start.elapsed() >= timeout {
                return Err(LockError::Timeout {
                    path: path.to_path_buf(),
                    waited: start.elapsed(),
                });
            }

            thread::sleep(Duration::from_millis(10));
        }
    }

    /// Explicitly release the lock. Release also happens on drop.
    pub fn release(self) {
        drop(self);
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PrefsLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}
