// Injected TTL cache.
//
// Lookup utilities that want short-lived memoization take one of these as an
// explicit dependency instead of reaching for a module-level singleton, so
// simulation runs stay deterministic and testable in isolation.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;

/// A small in-memory cache with per-entry time-to-live.
pub struct TtlCache<T> {
    entries: Mutex<HashMap<String, (T, Instant)>>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new() -> Self {
        TtlCache {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch a value if present and not expired. Expired entries are removed.
    pub fn get(&self, key: &str) -> Option<T> {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        match entries.get(key) {
            Some((value, expires_at)) if *expires_at > Instant::now() => {
                debug!("cache hit: {}", key);
                Some(value.clone())
            }
            Some(_) => {
                debug!("cache expired: {}", key);
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert a value with the given time-to-live, replacing any existing
    /// entry for the key.
    pub fn put(&self, key: &str, value: T, ttl: Duration) {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        entries.insert(key.to_string(), (value, Instant::now() + ttl));
    }

    /// Number of live (stored, possibly expired-but-unswept) entries.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> Default for TtlCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
