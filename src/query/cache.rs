// SPDX-License-Identifier: Apache-2.0

use lru::LruCache;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use super::lock_or_recover;
use super::types::FileIndex;

const DEFAULT_CAPACITY: usize = 100;

/// LRU of per-file indexes, keyed by path and mtime so edits invalidate
/// stale entries without any explicit eviction.
#[derive(Clone)]
pub struct IndexCache {
    cache: Arc<Mutex<LruCache<CacheKey, Arc<FileIndex>>>>,
}

#[derive(Hash, Eq, PartialEq, Debug, Clone)]
struct CacheKey {
    path: PathBuf,
    modified: SystemTime,
}

impl IndexCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or_else(|| {
            log::warn!("invalid cache capacity {capacity}, using {DEFAULT_CAPACITY}");
            NonZeroUsize::new(DEFAULT_CAPACITY).unwrap()
        });

        Self {
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    pub fn get(&self, path: &Path, modified: SystemTime) -> Option<Arc<FileIndex>> {
        let mut cache = lock_or_recover(&self.cache, |c| c.clear());
        let key = CacheKey {
            path: path.to_path_buf(),
            modified,
        };

        cache.get(&key).map(Arc::clone)
    }

    pub fn put(&self, path: PathBuf, modified: SystemTime, index: Arc<FileIndex>) {
        let mut cache = lock_or_recover(&self.cache, |c| c.clear());
        let key = CacheKey { path, modified };

        cache.put(key, index);
    }
}

impl Default for IndexCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
