//! Software-managed cache with hit/miss accounting.
//!
//! The cache is an address-to-word map: presence in the map *is* the
//! definition of "cached". A lookup that misses synthesizes a value (the
//! caller supplies it, typically from the seeded PRNG), installs it, and
//! counts a miss. The hit and miss counters are monotonic within a run, so
//! `accesses == hits + misses` holds for any instruction sequence.

use std::collections::HashMap;

use tracing::trace;

/// Outcome of one cache lookup, carrying the word that reached the register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheAccess {
    /// The address was present; the stored word is returned.
    Hit(i64),
    /// The address was absent; the synthesized word was installed.
    Miss(i64),
}

impl CacheAccess {
    /// The word delivered by this access, hit or miss.
    pub fn value(self) -> i64 {
        match self {
            CacheAccess::Hit(v) | CacheAccess::Miss(v) => v,
        }
    }

    /// True for a hit.
    pub fn is_hit(self) -> bool {
        matches!(self, CacheAccess::Hit(_))
    }
}

/// Address-to-word cache map with monotonic hit/miss counters.
#[derive(Debug, Clone, Default)]
pub struct Cache {
    entries: HashMap<i64, i64>,
    hits: u64,
    misses: u64,
}

impl Cache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up `addr`, filling from `synthesize` on a miss.
    ///
    /// The closure runs only when the address is absent; its value is
    /// installed and returned.
    pub fn load_or_fill(&mut self, addr: i64, synthesize: impl FnOnce() -> i64) -> CacheAccess {
        if let Some(&value) = self.entries.get(&addr) {
            self.hits += 1;
            trace!(addr, value, "cache hit");
            CacheAccess::Hit(value)
        } else {
            let value = synthesize();
            self.entries.insert(addr, value);
            self.misses += 1;
            trace!(addr, value, "cache miss, filled");
            CacheAccess::Miss(value)
        }
    }

    /// True when `addr` is currently cached.
    pub fn contains(&self, addr: i64) -> bool {
        self.entries.contains_key(&addr)
    }

    /// The cached word at `addr`, if present. Does not count as an access.
    pub fn peek(&self, addr: i64) -> Option<i64> {
        self.entries.get(&addr).copied()
    }

    /// Clears the whole map; returns how many entries were dropped.
    /// Counters are untouched (they are monotonic within a run).
    pub fn flush(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        dropped
    }

    /// Removes one entry; returns whether it was present.
    pub fn invalidate(&mut self, addr: i64) -> bool {
        self.entries.remove(&addr).is_some()
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hits recorded this run.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Misses recorded this run.
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Clears entries and counters for a fresh run.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }
}
