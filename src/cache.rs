//! Expiring key-value cache.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use web_time::Instant;

/// Map whose entries expire `ttl` after being set. Owned by whoever builds the app
/// services and passed to request handlers, never a global.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    entries: HashMap<K, (Instant, V)>,
}

impl<K, V> Default for TtlCache<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Unexpired value for `key`.
    pub fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    /// Store `value` until `ttl` from now.
    pub fn set(&mut self, key: K, value: V, ttl: Duration) {
        self.set_at(key, value, ttl, Instant::now());
    }

    /// Drop expired entries.
    pub fn purge(&mut self) {
        let now = Instant::now();
        self.entries.retain(|_, (expires, _)| now < *expires);
    }

    fn get_at(&self, key: &K, now: Instant) -> Option<V> {
        self.entries
            .get(key)
            .filter(|(expires, _)| now < *expires)
            .map(|(_, value)| value.clone())
    }

    fn set_at(&mut self, key: K, value: V, ttl: Duration, now: Instant) {
        self.entries.insert(key, (now + ttl, value));
    }
}
