//! Disk semantics: read/write/seek timing, allocation, persistence.

use pretty_assertions::assert_eq;
use rstest::rstest;
use tiersim_core::common::error::Region;
use tiersim_core::Fault;

use crate::common::harness::run_program;
use crate::common::TestContext;

// ══════════════════════════════════════════════════════════
// 1. Read and write
// ══════════════════════════════════════════════════════════

/// DISK_WRITE stores the register value and marks the sector allocated.
#[test]
fn write_marks_sector_allocated() {
    let engine = run_program("MOV R1, 42\nDISK_WRITE R1, 33");
    assert_eq!(engine.disk().read(33), Some(42));
    assert!(engine.disk().is_allocated(33), "sector 33 starts free");
}

/// DISK_READ pulls the sector value into the register.
#[test]
fn read_roundtrips_written_sector() {
    let engine = run_program("MOV R1, 42\nDISK_WRITE R1, 10\nDISK_READ R2, 10");
    assert_eq!(engine.registers()[1], 42);
}

/// Disk traffic costs a flat 10 time units per operation plus an op count.
#[test]
fn disk_timing_and_op_counts() {
    let engine = run_program("MOV R1, 1\nDISK_WRITE R1, 3\nDISK_READ R2, 3");
    let stats = engine.stats();
    assert_eq!(stats.read_ops, 1);
    assert_eq!(stats.write_ops, 1);
    assert!((stats.sim_time - 20.0).abs() < 1e-9);
}

// ══════════════════════════════════════════════════════════
// 2. Seek timing
// ══════════════════════════════════════════════════════════

/// Seek cost is `0.5 * distance` from the current head position.
#[test]
fn seek_cost_is_distance_based() {
    let engine = run_program("DISK_SEEK 10");
    assert_eq!(engine.disk().head(), 10);
    assert!((engine.stats().sim_time - 5.0).abs() < 1e-9);
}

/// Two seeks accumulate path-dependent cost: `0.5*10 + 0.5*7`, not the
/// distance between the endpoints.
#[test]
fn seek_cost_accumulates_along_the_path() {
    let engine = run_program("DISK_SEEK 10\nDISK_SEEK 3");
    assert_eq!(engine.disk().head(), 3);
    assert!((engine.stats().sim_time - 8.5).abs() < 1e-9);
}

/// Seeking to the current position costs nothing.
#[test]
fn seek_in_place_is_free() {
    let engine = run_program("DISK_SEEK 0");
    assert_eq!(engine.stats().sim_time, 0.0);
}

/// Reads and writes do not move the head; only DISK_SEEK does.
#[test]
fn reads_do_not_move_head() {
    let engine = run_program("DISK_SEEK 8\nDISK_READ R1, 40");
    assert_eq!(engine.disk().head(), 8);
}

// ══════════════════════════════════════════════════════════
// 3. Bounds
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::read_high("DISK_READ R1, 64", 64)]
#[case::write_high("MOV R1,1\nDISK_WRITE R1, 200", 200)]
#[case::seek_high("DISK_SEEK 64", 64)]
#[case::seek_negative("DISK_SEEK -2", -2)]
fn out_of_range_sectors_fault(#[case] source: &str, #[case] index: i64) {
    let mut ctx = TestContext::new();
    ctx.run_faulted(source);
    match ctx.engine.last_fault() {
        Some(Fault::OutOfRange {
            region: Region::Disk,
            index: got,
            size: 64,
            ..
        }) => assert_eq!(*got, index),
        other => panic!("expected disk out-of-range fault, got {other:?}"),
    }
}

// ══════════════════════════════════════════════════════════
// 4. Persistence
// ══════════════════════════════════════════════════════════

/// The disk is the non-volatile tier: contents survive a reset while the
/// head parks at sector 0.
#[test]
fn contents_survive_reset() {
    let mut ctx = TestContext::new();
    ctx.run_ok("MOV R1, 77\nDISK_WRITE R1, 30\nDISK_SEEK 12");
    ctx.engine.reset();

    assert_eq!(ctx.engine.disk().read(30), Some(77));
    assert!(ctx.engine.disk().is_allocated(30));
    assert_eq!(ctx.engine.disk().head(), 0);
}

/// DISK_STATUS writes 0 or 1 into the destination register.
#[test]
fn disk_status_is_boolean() {
    let engine = run_program("DISK_STATUS R1");
    assert!((0..=1).contains(&engine.registers()[0]));
}
