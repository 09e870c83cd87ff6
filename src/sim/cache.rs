//! The eviction-policy engine.
//!
//! Three adaptive cache variants share one data model: a bounded,
//! insertion/recency-ordered entry map where every entry carries a
//! frequency score. The variants differ only in what a `get` does and in
//! whether a `put` on an existing key counts as a touch:
//!
//! - [`Policy::FifoDecay`]: reads never mutate state.
//! - [`Policy::LruDecay`] / [`Policy::LfuDecay`]: a hit bumps the key's
//!   frequency and moves it to the most-recent position.
//!
//! All variants evict the key with the smallest `(frequency, key)` pair and
//! decay every other key's frequency when an existing key is updated.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::op::{Key, Value};

#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("decay factor {0} is outside (0, 1]")]
    InvalidDecayFactor(f64),
}

/// Which behavioral variant an [`EvictionCache`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Policy {
    /// Reads are pure lookups; only inserts and updates shape eviction.
    FifoDecay,
    /// Reads and updates refresh recency and frequency.
    LruDecay,
    /// Same touch rule as LRU-decay; kept as a distinct label because the
    /// two are configured and reported separately.
    LfuDecay,
}

impl Policy {
    /// Whether a hit (or an update of an existing key) bumps frequency and
    /// moves the key to the most-recent position.
    fn touch_on_access(&self) -> bool {
        !matches!(self, Policy::FifoDecay)
    }
}

impl std::fmt::Display for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Policy::FifoDecay => write!(f, "adaptive-fifo"),
            Policy::LruDecay => write!(f, "adaptive-lru"),
            Policy::LfuDecay => write!(f, "adaptive-lfu"),
        }
    }
}

/// A cached value and its eviction score.
#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    value: Value,
    /// Starts at 1.0 on insert, incremented by touches, multiplied by the
    /// decay factor when some other key is updated. Always > 0.
    frequency: f64,
}

/// A bounded cache driven by one [`Policy`].
///
/// Exclusively owned by a single simulation run; all mutation is confined
/// to the instance's own entry map.
#[derive(Debug)]
pub struct EvictionCache {
    policy: Policy,
    capacity: usize,
    decay_factor: f64,
    /// Entries in insertion order, most-recently-touched last for the
    /// variants that reorder on access.
    entries: IndexMap<Key, CacheEntry>,
}

impl EvictionCache {
    /// Create a cache with a fixed capacity and decay factor.
    ///
    /// `capacity == 0` is valid and degenerates to a permanently empty
    /// cache. `decay_factor` must lie in `(0, 1]`; `1.0` disables decay.
    pub fn new(policy: Policy, capacity: usize, decay_factor: f64) -> Result<Self, PolicyError> {
        if !(decay_factor > 0.0 && decay_factor <= 1.0) {
            return Err(PolicyError::InvalidDecayFactor(decay_factor));
        }

        Ok(Self {
            policy,
            capacity,
            decay_factor,
            entries: IndexMap::with_capacity(capacity),
        })
    }

    /// Look up `key`, returning its value on a hit.
    ///
    /// For LRU/LFU-decay this is a touch: the key's frequency is bumped and
    /// it becomes most-recent. A miss never mutates state in any variant.
    pub fn get(&mut self, key: Key) -> Option<Value> {
        match self.policy {
            Policy::FifoDecay => self.entries.get(&key).map(|entry| entry.value),
            Policy::LruDecay | Policy::LfuDecay => {
                let idx = self.entries.get_index_of(&key)?;
                let last = self.entries.len() - 1;
                self.entries.move_index(idx, last);
                let entry = &mut self.entries[last];
                entry.frequency += 1.0;
                Some(entry.value)
            }
        }
    }

    /// Insert or update `key`.
    ///
    /// Updating an existing key decays every *other* key's frequency; a
    /// fresh insert does not decay anything and starts at frequency 1.
    /// On overflow the minimum-`(frequency, key)` entry is evicted first.
    pub fn put(&mut self, key: Key, value: Value) {
        if self.capacity == 0 {
            return;
        }

        if let Some(idx) = self.entries.get_index_of(&key) {
            let touch = self.policy.touch_on_access();
            let entry = &mut self.entries[idx];
            entry.value = value;
            if touch {
                entry.frequency += 1.0;
                let last = self.entries.len() - 1;
                self.entries.move_index(idx, last);
            }
            self.decay_frequencies(key);
        } else {
            if self.entries.len() >= self.capacity {
                self.evict_one();
            }
            self.entries.insert(key, CacheEntry { value, frequency: 1.0 });
        }
    }

    /// Remove the entry with the lexicographically smallest
    /// `(frequency, key)` pair.
    ///
    /// A full scan per eviction; the key tie-break keeps eviction order
    /// deterministic under replay.
    fn evict_one(&mut self) {
        let victim = self
            .entries
            .iter()
            .map(|(key, entry)| (entry.frequency, *key))
            .min_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
            .map(|(_, key)| key);

        if let Some(key) = victim {
            self.entries.shift_remove(&key);
        }
    }

    /// Multiply every key's frequency by the decay factor, except
    /// `current_key`, the key that was just updated. Untouched keys grow
    /// monotonically cheaper to evict as the run progresses.
    fn decay_frequencies(&mut self, current_key: Key) {
        for (key, entry) in self.entries.iter_mut() {
            if *key != current_key {
                entry.frequency *= self.decay_factor;
            }
        }
    }

    /// Number of entries currently cached.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The fixed capacity this cache was constructed with.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The policy variant driving this cache.
    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// Whether `key` is currently cached, without touching it.
    pub fn contains(&self, key: Key) -> bool {
        self.entries.contains_key(&key)
    }

    /// Current frequency score of `key`, if cached. Read-only.
    pub fn frequency(&self, key: Key) -> Option<f64> {
        self.entries.get(&key).map(|entry| entry.frequency)
    }

    /// Cached keys from least- to most-recently inserted/touched.
    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.entries.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decay_factor_validation() {
        assert!(EvictionCache::new(Policy::FifoDecay, 4, 0.5).is_ok());
        assert!(EvictionCache::new(Policy::FifoDecay, 4, 1.0).is_ok());
        assert!(EvictionCache::new(Policy::FifoDecay, 4, 0.0).is_err());
        assert!(EvictionCache::new(Policy::FifoDecay, 4, -0.5).is_err());
        assert!(EvictionCache::new(Policy::FifoDecay, 4, 1.5).is_err());
        assert!(EvictionCache::new(Policy::FifoDecay, 4, f64::NAN).is_err());
    }

    #[test]
    fn test_zero_capacity_is_permanently_empty() {
        let mut cache = EvictionCache::new(Policy::LruDecay, 0, 0.5).unwrap();
        cache.put(1, 10);
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.get(1), None);
    }

    #[test]
    fn test_fifo_get_does_not_mutate() {
        let mut cache = EvictionCache::new(Policy::FifoDecay, 4, 0.5).unwrap();
        cache.put(1, 10);
        cache.put(2, 20);

        assert_eq!(cache.get(1), Some(10));
        assert_eq!(cache.frequency(1), Some(1.0));
        assert_eq!(cache.keys().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_lru_get_touches() {
        let mut cache = EvictionCache::new(Policy::LruDecay, 4, 0.5).unwrap();
        cache.put(1, 10);
        cache.put(2, 20);

        assert_eq!(cache.get(1), Some(10));
        assert_eq!(cache.frequency(1), Some(2.0));
        assert_eq!(cache.keys().collect::<Vec<_>>(), vec![2, 1]);
    }

    #[test]
    fn test_update_decays_other_keys_only() {
        let mut cache = EvictionCache::new(Policy::LfuDecay, 4, 0.5).unwrap();
        cache.put(1, 10);
        cache.put(2, 20);
        cache.put(3, 30);

        // Updating key 1 bumps it to 2.0 and halves the others.
        cache.put(1, 11);
        assert_eq!(cache.frequency(1), Some(2.0));
        assert_eq!(cache.frequency(2), Some(0.5));
        assert_eq!(cache.frequency(3), Some(0.5));
        assert_eq!(cache.get(1), Some(11));
    }

    #[test]
    fn test_fresh_insert_does_not_decay() {
        let mut cache = EvictionCache::new(Policy::LfuDecay, 4, 0.5).unwrap();
        cache.put(1, 10);
        cache.put(2, 20);
        assert_eq!(cache.frequency(1), Some(1.0));
        assert_eq!(cache.frequency(2), Some(1.0));
    }

    #[test]
    fn test_eviction_min_frequency_then_key() {
        let mut cache = EvictionCache::new(Policy::LfuDecay, 2, 1.0).unwrap();
        cache.put(1, 10);
        cache.put(2, 20);
        cache.get(2); // key 2 now at frequency 2

        cache.put(3, 30);
        assert!(!cache.contains(1));
        assert!(cache.contains(2));
        assert!(cache.contains(3));
    }

    #[test]
    fn test_eviction_tie_break_smaller_key() {
        let mut cache = EvictionCache::new(Policy::FifoDecay, 2, 1.0).unwrap();
        cache.put(7, 70);
        cache.put(3, 30);

        // Both at frequency 1; the smaller key loses.
        cache.put(9, 90);
        assert!(!cache.contains(3));
        assert!(cache.contains(7));
        assert!(cache.contains(9));
    }

    #[test]
    fn test_fifo_update_keeps_position() {
        let mut cache = EvictionCache::new(Policy::FifoDecay, 4, 0.5).unwrap();
        cache.put(1, 10);
        cache.put(2, 20);
        cache.put(1, 11);

        assert_eq!(cache.keys().collect::<Vec<_>>(), vec![1, 2]);
        // The update decayed key 2 but did not bump key 1.
        assert_eq!(cache.frequency(1), Some(1.0));
        assert_eq!(cache.frequency(2), Some(0.5));
    }
}
