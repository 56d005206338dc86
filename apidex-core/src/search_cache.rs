// apidex-core/src/search_cache.rs
// Search result caching with LRU eviction and a TTL

use lru::LruCache;
use parking_lot::RwLock;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use crate::executor::SearchPage;

pub const SEARCH_CACHE_CAPACITY: usize = 100;
pub const SEARCH_CACHE_TTL: Duration = Duration::from_secs(120);

/// Hash of a full search request: normalized query plus every flag that
/// changes the result. Queries that normalize identically share an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchKey(u64);

impl SearchKey {
    pub fn new(
        normalized_query: &str,
        case_sensitive: bool,
        regex_mode: bool,
        page: usize,
        per_page: usize,
    ) -> Self {
        let mut hasher = DefaultHasher::new();
        normalized_query.hash(&mut hasher);
        case_sensitive.hash(&mut hasher);
        regex_mode.hash(&mut hasher);
        page.hash(&mut hasher);
        per_page.hash(&mut hasher);
        SearchKey(hasher.finish())
    }
}

/// LRU + TTL cache of search pages.
///
/// Entries expire after `ttl` even if still resident; `get` treats expired
/// entries as misses. Registry mutations call `invalidate_all`, so the TTL
/// only matters as a backstop for externally imported data.
pub struct SearchCache {
    entries: RwLock<LruCache<SearchKey, (Instant, SearchPage)>>,
    ttl: Duration,
    capacity: usize,
}

impl SearchCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = capacity.max(1);
        SearchCache {
            entries: RwLock::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN),
            )),
            ttl,
            capacity,
        }
    }

    /// Cached page for a key, or None on miss/expiry.
    ///
    /// Uses peek() to avoid updating LRU order on read.
    pub fn get(&self, key: &SearchKey) -> Option<SearchPage> {
        let entries = self.entries.read();
        match entries.peek(key) {
            Some((stored_at, page)) if stored_at.elapsed() < self.ttl => Some(page.clone()),
            _ => None,
        }
    }

    pub fn insert(&self, key: SearchKey, page: SearchPage) {
        self.entries.write().put(key, (Instant::now(), page));
    }

    /// Drop everything. Called on every registry mutation.
    pub fn invalidate_all(&self) {
        self.entries.write().clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            capacity: self.capacity,
            size: self.entries.read().len(),
        }
    }
}

impl Default for SearchCache {
    fn default() -> Self {
        Self::new(SEARCH_CACHE_CAPACITY, SEARCH_CACHE_TTL)
    }
}

#[derive(Debug, Clone)]
pub struct CacheStats {
    pub capacity: usize,
    pub size: usize,
}
