//! # Pool Directory
//!
//! Lookup of pool metadata for the aggregator. The upstream source returns raw
//! records in whatever shape its API uses; [`CachedPoolDirectory`] normalizes
//! them through the adapter and keeps them in a caller-configured cache.

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::adapter::adapt_pool_metadata_for;
use crate::cache::{Clock, SystemClock, TtlCache};
use crate::types::PoolMetadata;

/// Resolves normalized metadata for a pool address
pub trait PoolDirectory {
    fn resolve(&self, pool_address: &str) -> Option<PoolMetadata>;
}

impl PoolDirectory for HashMap<String, PoolMetadata> {
    fn resolve(&self, pool_address: &str) -> Option<PoolMetadata> {
        self.get(pool_address).cloned()
    }
}

/// Upstream provider of raw pool records
pub trait PoolSource {
    fn fetch(&self, pool_address: &str) -> Option<Value>;
}

impl PoolSource for HashMap<String, Value> {
    fn fetch(&self, pool_address: &str) -> Option<Value> {
        self.get(pool_address).cloned()
    }
}

/// Directory backed by a [`PoolSource`] with an expiring cache in front
pub struct CachedPoolDirectory<S, C = SystemClock> {
    source: S,
    cache: RefCell<TtlCache<String, PoolMetadata, C>>,
    max_age: Duration,
}

impl<S: PoolSource> CachedPoolDirectory<S, SystemClock> {
    pub fn new(source: S, max_age: Duration) -> Self {
        Self::with_cache(source, TtlCache::new(), max_age)
    }
}

impl<S: PoolSource, C: Clock> CachedPoolDirectory<S, C> {
    pub fn with_cache(
        source: S,
        cache: TtlCache<String, PoolMetadata, C>,
        max_age: Duration,
    ) -> Self {
        Self {
            source,
            cache: RefCell::new(cache),
            max_age,
        }
    }

    /// Number of pools currently cached
    pub fn cached_pools(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl<S: PoolSource, C: Clock> PoolDirectory for CachedPoolDirectory<S, C> {
    fn resolve(&self, pool_address: &str) -> Option<PoolMetadata> {
        let key = pool_address.to_string();
        if let Some(metadata) = self.cache.borrow().get(&key, self.max_age) {
            return Some(metadata.clone());
        }

        debug!("Pool {} not cached or stale, fetching", pool_address);
        // Misses are not cached so a pool that appears later is picked up
        let record = self.source.fetch(pool_address)?;
        let metadata = adapt_pool_metadata_for(&record, pool_address);
        self.cache.borrow_mut().put(key, metadata.clone());
        Some(metadata)
    }
}
