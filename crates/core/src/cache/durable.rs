//! On-disk cache tier: one JSON file per key, survives restarts.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::CacheError;

/// Prefix shared by every durable cache file.
pub const FILE_PREFIX: &str = "fcache.";
const FILE_SUFFIX: &str = ".json";
/// Prefix of in-flight writes; outside [`FILE_PREFIX`] so `clean` skips them.
const TMP_PREFIX: &str = ".fcache-tmp.";

#[derive(Serialize, Deserialize)]
struct StoredEntry<T> {
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    value: T,
}

/// File name for `key`; characters unsafe in file names become `_`.
pub fn file_name(key: &str) -> String {
    let safe: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}{}{}", FILE_PREFIX, safe, FILE_SUFFIX)
}

/// Durable key/value store rooted at one directory.
#[derive(Clone, Debug)]
pub struct DurableCache {
    dir: PathBuf,
}

impl DurableCache {
    /// Opens (and creates if needed) the cache directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(file_name(key))
    }

    /// Stored value for `key`, `None` when absent or expired.
    ///
    /// # Errors
    ///
    /// I/O failures other than a missing file, and files that do not
    /// decode as `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let path = self.path_for(key);
        let body = match fs::read_to_string(&path) {
            Ok(body) => body,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Durable cache miss for '{}'", key);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let entry: StoredEntry<T> = serde_json::from_str(&body)?;
        if entry.expires_at.is_some_and(|deadline| Utc::now() >= deadline) {
            debug!("Durable cache entry '{}' expired", key);
            if let Err(e) = fs::remove_file(&path) {
                warn!("Failed to remove expired cache file {}: {}", path.display(), e);
            }
            return Ok(None);
        }

        debug!("Durable cache hit for '{}'", key);
        Ok(Some(entry.value))
    }

    /// Writes `value` under `key`; `ttl` of `None` never expires.
    ///
    /// The entry goes to a uniquely named temporary file in the same
    /// directory and is renamed into place, so a reader never sees a
    /// half-written entry. The temporary file is removed when the rename
    /// fails.
    pub fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let created_at = Utc::now();
        let expires_at = ttl
            .and_then(|ttl| chrono::Duration::from_std(ttl).ok())
            .map(|ttl| created_at + ttl);
        let entry = StoredEntry {
            created_at,
            expires_at,
            value,
        };
        let body = serde_json::to_vec(&entry)?;

        let path = self.path_for(key);
        let mut tmp = tempfile::Builder::new()
            .prefix(TMP_PREFIX)
            .tempfile_in(&self.dir)?;
        tmp.write_all(&body)?;
        tmp.persist(&path).map_err(|e| e.error)?;
        debug!("Durable cache wrote '{}'", key);
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<bool, CacheError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Removes every durable entry in the directory.
    pub fn clear(&self) -> Result<usize, CacheError> {
        super::maintenance::clean(&self.dir)
    }
}
