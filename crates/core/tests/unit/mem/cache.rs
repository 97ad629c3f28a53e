//! Cache semantics: hit/miss accounting, flush/invalidate, non-coherence.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::HashSet;
use tiersim_core::mem::Cache;

use crate::common::harness::run_program;

// ══════════════════════════════════════════════════════════
// 1. Hit/miss accounting (direct unit tests)
// ══════════════════════════════════════════════════════════

/// First access misses and fills; second access hits with the same value.
#[test]
fn cold_miss_then_warm_hit() {
    let mut cache = Cache::new();
    let first = cache.load_or_fill(100, || 42);
    assert!(!first.is_hit());
    assert_eq!(first.value(), 42);

    let second = cache.load_or_fill(100, || 7);
    assert!(second.is_hit());
    assert_eq!(second.value(), 42, "fill closure must not run on a hit");

    assert_eq!(cache.hits(), 1);
    assert_eq!(cache.misses(), 1);
}

/// Flush drops every entry but keeps the monotonic counters.
#[test]
fn flush_drops_entries_keeps_counters() {
    let mut cache = Cache::new();
    let _ = cache.load_or_fill(1, || 10);
    let _ = cache.load_or_fill(2, || 20);
    assert_eq!(cache.flush(), 2);
    assert!(cache.is_empty());
    assert_eq!(cache.misses(), 2);

    // Flushed addresses miss again.
    assert!(!cache.load_or_fill(1, || 11).is_hit());
}

/// Invalidate removes exactly one entry and reports presence.
#[test]
fn invalidate_single_entry() {
    let mut cache = Cache::new();
    let _ = cache.load_or_fill(5, || 1);
    let _ = cache.load_or_fill(6, || 2);

    assert!(cache.invalidate(5));
    assert!(!cache.invalidate(5), "already gone");
    assert!(!cache.contains(5));
    assert!(cache.contains(6));
}

/// Counters are monotonic and reconcile for arbitrary access sequences:
/// `accesses == hits + misses`, and a miss happens exactly on first sight.
proptest! {
    #[test]
    fn counters_reconcile(addrs in proptest::collection::vec(-8i64..8, 0..64)) {
        let mut cache = Cache::new();
        let mut seen = HashSet::new();
        let mut last_total = 0;

        for &addr in &addrs {
            let access = cache.load_or_fill(addr, || addr * 10);
            prop_assert_eq!(access.is_hit(), !seen.insert(addr));

            let total = cache.hits() + cache.misses();
            prop_assert_eq!(total, last_total + 1, "counters advance by exactly one");
            last_total = total;
        }

        prop_assert_eq!(cache.hits() + cache.misses(), addrs.len() as u64);
        prop_assert_eq!(cache.misses(), seen.len() as u64);
    }
}

// ══════════════════════════════════════════════════════════
// 2. Instruction-level semantics
// ══════════════════════════════════════════════════════════

/// A repeated CACHE access hits and delivers the same synthesized word.
#[test]
fn cache_instruction_hit_path() {
    let engine = run_program("CACHE R1, 100\nCACHE R2, 100");
    assert_eq!(engine.registers()[0], engine.registers()[1]);

    let stats = engine.stats();
    assert_eq!(stats.cache_misses, 1);
    assert_eq!(stats.cache_hits, 1);
    assert_eq!(stats.read_ops, 1, "only the miss touches the next tier");
    // Miss costs a RAM access (100), hit costs 1.
    assert!((stats.sim_time - 101.0).abs() < 1e-9);
}

/// Writing RAM does not fill or update the cache: the next CACHE access to
/// that address still misses. The two stores are deliberately non-coherent.
#[test]
fn ram_store_does_not_touch_cache() {
    let engine = run_program("MOV R1, 7\nSTORE R1, 50\nCACHE R2, 50");
    let stats = engine.stats();
    assert_eq!(stats.cache_misses, 1);
    assert_eq!(stats.cache_hits, 0);
    assert_eq!(engine.memory()[50], 7);
}

/// CACHE_FLUSH forces the next access to miss again.
#[test]
fn cache_flush_instruction() {
    let engine = run_program("CACHE R1, 5\nCACHE_FLUSH\nCACHE R2, 5");
    let stats = engine.stats();
    assert_eq!(stats.cache_misses, 2);
    assert_eq!(stats.cache_hits, 0);
    assert!(engine.cache().contains(5));
    assert_eq!(engine.cache().len(), 1);
}

/// CACHE_INVALIDATE removes one address and leaves the rest hot.
#[test]
fn cache_invalidate_instruction() {
    let engine =
        run_program("CACHE R1, 5\nCACHE R2, 6\nCACHE_INVALIDATE 5\nCACHE R3, 6\nCACHE R4, 5");
    let stats = engine.stats();
    assert_eq!(stats.cache_hits, 1, "address 6 stayed hot");
    assert_eq!(stats.cache_misses, 3, "address 5 missed twice");
}

/// Cache addresses are not bounds-checked: any integer key is cacheable.
#[test]
fn cache_accepts_any_integer_address() {
    let engine = run_program("CACHE R1, -12\nCACHE R2, -12\nCACHE R3, 99999");
    let stats = engine.stats();
    assert_eq!(stats.cache_hits, 1);
    assert_eq!(stats.cache_misses, 2);
}

/// Synthesized miss values stay inside the configured bound.
#[test]
fn synthesized_values_in_bound() {
    let engine = run_program("CACHE R1, 1\nCACHE R2, 2\nCACHE R3, 3");
    for &reg in &engine.registers()[..3] {
        assert!((0..100).contains(&reg), "synthesized value {reg}");
    }
}
