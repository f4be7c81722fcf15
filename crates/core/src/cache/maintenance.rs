use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::{debug, info};

use super::durable::FILE_PREFIX;
use crate::errors::CacheError;

/// Removes every durable cache file (`fcache.*`) in `cache_dir`.
///
/// Other files are left alone. A missing directory counts as clean.
pub fn clean(cache_dir: &Path) -> Result<usize, CacheError> {
    let entries = match fs::read_dir(cache_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let mut removed = 0;
    for entry in entries {
        let entry = entry?;
        let is_cache_file = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(FILE_PREFIX));
        if is_cache_file && entry.file_type()?.is_file() {
            debug!("Removing {}", entry.path().display());
            fs::remove_file(entry.path())?;
            removed += 1;
        }
    }

    if removed > 0 {
        info!("Removed {} cache file(s) from {}", removed, cache_dir.display());
    }
    Ok(removed)
}
