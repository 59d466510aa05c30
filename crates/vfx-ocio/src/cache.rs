//! Process-wide cache of parsed CDL files.
//!
//! Files are parsed once per path and shared as `Arc<CdlCollection>`.
//! [`clear_all_caches`] drops everything so edited files are re-read.
//!
//! ```rust,no_run
//! use vfx_ocio::{clear_all_caches, CdlTransform};
//!
//! // First call parses the file
//! let a = CdlTransform::create_from_file("grades.ccc", "shot_010")?;
//! // Second call reuses the parsed collection
//! let b = CdlTransform::create_from_file("grades.ccc", "shot_020")?;
//!
//! clear_all_caches();
//! # Ok::<(), vfx_ocio::OcioError>(())
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, RwLock};

use tracing::debug;
use vfx_lut::CdlCollection;

use crate::error::OcioResult;

type FileCache = RwLock<HashMap<PathBuf, Arc<CdlCollection>>>;

fn file_cache() -> &'static FileCache {
    static CACHE: OnceLock<FileCache> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Returns the parsed collection for `path`, reading it on first use.
pub(crate) fn load_collection(path: &Path) -> OcioResult<Arc<CdlCollection>> {
    let key = path.to_path_buf();

    // Fast path - read lock
    {
        let cache = file_cache().read().unwrap_or_else(|e| e.into_inner());
        if let Some(cached) = cache.get(&key) {
            debug!(path = %path.display(), "CDL cache hit");
            return Ok(Arc::clone(cached));
        }
    }

    // Cache miss - parse outside the lock
    debug!(path = %path.display(), "CDL cache miss");
    let collection = Arc::new(vfx_lut::cdl::read_file(path)?);

    let mut cache = file_cache().write().unwrap_or_else(|e| e.into_inner());
    let entry = cache.entry(key).or_insert(collection);
    Ok(Arc::clone(entry))
}

/// Number of cached files.
#[cfg(test)]
fn cached_files() -> usize {
    file_cache().read().unwrap_or_else(|e| e.into_inner()).len()
}

/// Discards every cached file.
pub fn clear_all_caches() {
    let mut cache = file_cache().write().unwrap_or_else(|e| e.into_inner());
    debug!(entries = cache.len(), "Clearing CDL file cache");
    cache.clear();
}
