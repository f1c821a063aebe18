//! # Expiring Cache
//!
//! Caller-owned cache for upstream data such as pool metadata. Entries carry
//! the time they were stored; `get` takes the maximum acceptable age so each
//! call site decides its own freshness. Time comes from an injected [`Clock`],
//! which lets tests advance it by hand.

use std::cell::Cell;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Source of the current time
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Cell::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

/// Map whose reads can reject entries older than a given age
#[derive(Debug, Clone)]
pub struct TtlCache<K, V, C = SystemClock> {
    entries: HashMap<K, CacheEntry<V>>,
    clock: C,
}

impl<K: Eq + Hash, V> TtlCache<K, V, SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<K: Eq + Hash, V> Default for TtlCache<K, V, SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V, C: Clock> TtlCache<K, V, C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            entries: HashMap::new(),
            clock,
        }
    }

    /// Value for `key` if it was stored no more than `max_age` ago
    pub fn get(&self, key: &K, max_age: Duration) -> Option<&V> {
        let entry = self.entries.get(key)?;
        let age = self.clock.now().saturating_duration_since(entry.stored_at);
        (age <= max_age).then_some(&entry.value)
    }

    /// Store `value`, replacing any previous entry and resetting its age
    pub fn put(&mut self, key: K, value: V) {
        let stored_at = self.clock.now();
        self.entries.insert(key, CacheEntry { value, stored_at });
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|entry| entry.value)
    }

    /// Drop every entry older than `max_age`, returning how many were removed
    pub fn purge_expired(&mut self, max_age: Duration) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.stored_at) <= max_age);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry() {
        let clock = ManualClock::new();
        let mut cache = TtlCache::with_clock(&clock);
        cache.put("pool", 7);

        assert_eq!(cache.get(&"pool", Duration::from_secs(60)), Some(&7));
        clock.advance(Duration::from_secs(61));
        assert_eq!(cache.get(&"pool", Duration::from_secs(60)), None);
        // A more tolerant reader still sees it
        assert_eq!(cache.get(&"pool", Duration::from_secs(120)), Some(&7));
    }

    #[test]
    fn test_put_resets_age() {
        let clock = ManualClock::new();
        let mut cache = TtlCache::with_clock(&clock);
        cache.put("pool", 1);
        clock.advance(Duration::from_secs(50));
        cache.put("pool", 2);
        clock.advance(Duration::from_secs(50));
        assert_eq!(cache.get(&"pool", Duration::from_secs(60)), Some(&2));
    }

    #[test]
    fn test_purge_expired() {
        let clock = ManualClock::new();
        let mut cache = TtlCache::with_clock(&clock);
        cache.put("a", 1);
        clock.advance(Duration::from_secs(30));
        cache.put("b", 2);
        clock.advance(Duration::from_secs(40));

        assert_eq!(cache.purge_expired(Duration::from_secs(60)), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.remove(&"b"), Some(2));
        assert!(cache.is_empty());
    }
}
