//! Local key-value preference store.
//!
//! A single JSON object on disk (`.lexis/prefs.json`), one entry per key.
//! Reads never fail: a missing file, an unparsable file, or a value of the
//! wrong shape all yield the caller's default. Writes take an exclusive
//! advisory lock, re-read the file, replace only the written key, and
//! swap the file in by rename, so several `lx` processes writing different
//! keys never clobber each other. Two writers on the same key race;
//! the last one wins.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::ErrorCode;
use crate::lock::{DEFAULT_LOCK_TIMEOUT, LockError, PrefsLock};

/// Prefix shared by every key this application owns.
pub const KEY_PREFIX: &str = "lexis_";

#[derive(Debug, Error)]
pub enum PrefError {
    #[error("preference lock: {0}")]
    Lock(#[from] LockError),

    #[error("preference file: {0}")]
    Io(#[from] io::Error),

    #[error("preference value: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl PrefError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Lock(err) => err.code(),
            Self::Io(_) | Self::Serialize(_) => ErrorCode::PrefsWriteFailed,
        }
    }
}

type PrefMap = BTreeMap<String, Value>;

#[derive(Debug)]
enum Backing {
    File { path: PathBuf, lock_path: PathBuf },
    Memory(PrefMap),
}

/// JSON key-value store shared by every `lx` process in a project.
#[derive(Debug)]
pub struct PrefStore {
    backing: Backing,
}

impl PrefStore {
    /// Store backed by `path`. The file is created on first write.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut lock_name = path.file_name().unwrap_or_default().to_os_string();
        lock_name.push(".lock");
        let lock_path = path.with_file_name(lock_name);
        Self {
            backing: Backing::File { path, lock_path },
        }
    }

    /// Store that lives only as long as this value.
    #[must_use]
    pub const fn in_memory() -> Self {
        Self {
            backing: Backing::Memory(BTreeMap::new()),
        }
    }

    /// Backing file, `None` for an in-memory store.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match &self.backing {
            Backing::File { path, .. } => Some(path),
            Backing::Memory(_) => None,
        }
    }

    /// Read `key`, or `default` when it is missing or malformed.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(value) = self.snapshot().remove(key) else {
            return default;
        };
        match serde_json::from_value(value) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(key, error = %err, "malformed preference value, using default");
                default
            }
        }
    }

    /// Serialize `value` under `key` and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization, locking, or the file write fails.
    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), PrefError> {
        let value = serde_json::to_value(value)?;
        self.update(|map| {
            map.insert(key.to_string(), value);
        })?;
        debug!(key, "preference written");
        Ok(())
    }

    /// Delete `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if locking or the file write fails.
    pub fn remove(&mut self, key: &str) -> Result<(), PrefError> {
        self.update(|map| {
            map.remove(key);
        })
    }

    /// Delete every application-owned key and return how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if locking or the file write fails.
    pub fn clear(&mut self) -> Result<usize, PrefError> {
        let mut removed = 0;
        self.update(|map| {
            let before = map.len();
            map.retain(|key, _| !key.starts_with(KEY_PREFIX));
            removed = before - map.len();
        })?;
        Ok(removed)
    }

    /// Stored keys in sorted order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.snapshot().into_keys().collect()
    }

    /// Every stored entry as raw JSON.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        match &self.backing {
            Backing::File { path, .. } => read_map(path),
            Backing::Memory(map) => map.clone(),
        }
    }

    fn update(&mut self, apply: impl FnOnce(&mut PrefMap)) -> Result<(), PrefError> {
        match &mut self.backing {
            Backing::Memory(map) => {
                apply(map);
                Ok(())
            }
            Backing::File { path, lock_path } => {
                let lock = PrefsLock::acquire(lock_path, DEFAULT_LOCK_TIMEOUT)?;
                let mut map = read_map(path);
                apply(&mut map);
                write_map(path, &map)?;
                lock.release();
                Ok(())
            }
        }
    }
}

fn read_map(path: &Path) -> PrefMap {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return PrefMap::new(),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "cannot read preferences");
            return PrefMap::new();
        }
    };
    if text.trim().is_empty() {
        return PrefMap::new();
    }
    serde_json::from_str(&text).unwrap_or_else(|err| {
        warn!(path = %path.display(), error = %err, "malformed preference file, ignoring");
        PrefMap::new()
    })
}

fn write_map(path: &Path, map: &PrefMap) -> Result<(), PrefError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    let mut body = serde_json::to_vec_pretty(map)?;
    body.push(b'\n');
    fs::write(&tmp, body)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_key_returns_default() {
        let store = PrefStore::in_memory();
        assert_eq!(store.get::<Vec<i64>>("lexis_favorites", vec![]), Vec::<i64>::new());
    }

    #[test]
    fn file_round_trips_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");
        let mut store = PrefStore::open(&path);
        store.set("lexis_favorites", &vec![3_i64, 5]).unwrap();
        store.set("lexis_unread_favorites", &2_u32).unwrap();

        let reopened = PrefStore::open(&path);
        assert_eq!(reopened.get::<Vec<i64>>("lexis_favorites", vec![]), [3, 5]);
        assert_eq!(reopened.get("lexis_unread_favorites", 0_u32), 2);
        assert_eq!(reopened.keys(), ["lexis_favorites", "lexis_unread_favorites"]);
    }

    #[test]
    fn malformed_file_reads_as_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "{not json").unwrap();

        let mut store = PrefStore::open(&path);
        assert_eq!(store.get::<Vec<i64>>("lexis_favorites", vec![]), Vec::<i64>::new());

        store.set("lexis_favorites", &vec![1_i64]).unwrap();
        assert_eq!(store.get::<Vec<i64>>("lexis_favorites", vec![]), [1]);
    }

    #[test]
    fn wrong_shape_reads_as_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, r#"{"lexis_favorites": "oops"}"#).unwrap();

        let store = PrefStore::open(&path);
        assert_eq!(store.get::<Vec<i64>>("lexis_favorites", vec![7]), [7]);
    }

    #[test]
    fn writers_on_different_keys_do_not_clobber() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");
        let mut tab_a = PrefStore::open(&path);
        let mut tab_b = PrefStore::open(&path);

        tab_a.set("lexis_favorites", &vec![1_i64]).unwrap();
        tab_b.set("lexis_upvoted_words", &vec![2_i64]).unwrap();

        let fresh = PrefStore::open(&path);
        assert_eq!(fresh.get::<Vec<i64>>("lexis_favorites", vec![]), [1]);
        assert_eq!(fresh.get::<Vec<i64>>("lexis_upvoted_words", vec![]), [2]);
    }

    #[test]
    fn same_key_is_last_writer_wins() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");
        let mut tab_a = PrefStore::open(&path);
        let mut tab_b = PrefStore::open(&path);

        tab_a.set("lexis_favorites", &vec![1_i64]).unwrap();
        tab_b.set("lexis_favorites", &vec![2_i64]).unwrap();

        assert_eq!(tab_a.get::<Vec<i64>>("lexis_favorites", vec![]), [2]);
    }

    #[test]
    fn clear_removes_only_owned_keys() {
        let mut store = PrefStore::in_memory();
        store.set("lexis_favorites", &vec![1_i64]).unwrap();
        store.set("lexis_session", "tok").unwrap();
        store.set("theme", "dark").unwrap();

        assert_eq!(store.clear().unwrap(), 2);
        assert_eq!(store.keys(), ["theme"]);
    }

    #[test]
    fn write_into_unusable_directory_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();

        let mut store = PrefStore::open(blocker.join("prefs.json"));
        let err = store.set("lexis_favorites", &vec![1_i64]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::PrefsWriteFailed);
    }
}
