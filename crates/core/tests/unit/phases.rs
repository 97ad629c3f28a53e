//! Phase evaluation: required opcodes, goals, scoring, advancement.

use pretty_assertions::assert_eq;
use tiersim_core::phase::{Phase, builtin_curriculum, efficiency_bonus};
use tiersim_core::{Opcode, PhaseOutcome, RunOutcome};

use crate::common::TestContext;

// ══════════════════════════════════════════════════════════
// 1. Required-instruction coverage
// ══════════════════════════════════════════════════════════

/// Scenario: a phase requiring ADD fails completion when the program never
/// executes ADD, even though the final registers match the goal.
#[test]
fn missing_required_instruction_blocks_completion() {
    let mut ctx = TestContext::new();
    ctx.engine.set_phases(vec![Phase::new(
        1,
        "Addition drill",
        "Make R1 = 8 using ADD",
        100,
        &[Opcode::Add],
        |s| s.registers[0] == 8,
    )]);

    ctx.run_ok("MOV R1, 8");
    assert_eq!(
        ctx.engine.last_phase_outcome(),
        Some(&PhaseOutcome::MissingInstructions(vec![Opcode::Add]))
    );
    assert_eq!(ctx.engine.score(), 0, "no score without coverage");
}

/// The failure lists exactly the missing opcodes, not the covered ones.
#[test]
fn missing_list_is_exact() {
    let mut ctx = TestContext::new();
    ctx.engine.set_phases(vec![Phase::new(
        1,
        "Store and read back",
        "Use STORE and LOAD",
        100,
        &[Opcode::Store, Opcode::Load, Opcode::Mov],
        |_| true,
    )]);

    ctx.run_ok("MOV R1, 1\nSTORE R1, 0");
    assert_eq!(
        ctx.engine.last_phase_outcome(),
        Some(&PhaseOutcome::MissingInstructions(vec![Opcode::Load]))
    );
}

// ══════════════════════════════════════════════════════════
// 2. Goals and scoring
// ══════════════════════════════════════════════════════════

/// An unmet goal is informational, never an error.
#[test]
fn unmet_goal_is_not_an_error() {
    let mut ctx = TestContext::new();
    ctx.run_ok("MOV R1, 3");
    assert_eq!(
        ctx.engine.last_phase_outcome(),
        Some(&PhaseOutcome::NotYetComplete)
    );
    assert_eq!(ctx.engine.score(), 0);
}

/// Clearing builtin phase 1 (R1 = 8) scores reward + efficiency bonus:
/// one cycle keeps 95 of the 100 bonus points.
#[test]
fn clearing_scores_reward_plus_bonus() {
    let mut ctx = TestContext::new();
    ctx.run_ok("MOV R1, 8");
    assert_eq!(
        ctx.engine.last_phase_outcome(),
        Some(&PhaseOutcome::Completed {
            reward: 100,
            bonus: 95,
        })
    );
    assert_eq!(ctx.engine.score(), 195);
}

/// Slow solutions forfeit the bonus entirely past 20 cycles.
#[test]
fn bonus_floors_at_zero() {
    assert_eq!(efficiency_bonus(0), 100);
    assert_eq!(efficiency_bonus(7), 65);
    assert_eq!(efficiency_bonus(20), 0);
    assert_eq!(efficiency_bonus(1000), 0);
}

/// Re-running after a clear does not double-score.
#[test]
fn cleared_phase_does_not_rescore() {
    let mut ctx = TestContext::new();
    ctx.run_ok("MOV R1, 8");
    let score = ctx.engine.score();

    ctx.run_ok("MOV R1, 8");
    assert_eq!(
        ctx.engine.last_phase_outcome(),
        Some(&PhaseOutcome::AlreadyCleared)
    );
    assert_eq!(ctx.engine.score(), score);
}

// ══════════════════════════════════════════════════════════
// 3. Advancement
// ══════════════════════════════════════════════════════════

/// Advancing is explicit: it requires a cleared phase, moves to the next
/// exercise, and resets the machine.
#[test]
fn advance_requires_cleared_phase() {
    let mut ctx = TestContext::new();
    assert!(!ctx.engine.advance_phase(), "nothing cleared yet");

    ctx.run_ok("MOV R1, 8");
    assert!(ctx.engine.advance_phase());
    assert_eq!(ctx.engine.current_phase().map(|p| p.id), Some(2));
    assert_eq!(ctx.engine.registers()[0], 0, "machine reset for the next exercise");
    assert!(!ctx.engine.advance_phase(), "new phase not cleared yet");
}

/// Scores accumulate across phases.
#[test]
fn score_accumulates_across_phases() {
    let mut ctx = TestContext::new();
    ctx.run_ok("MOV R1, 8");
    assert!(ctx.engine.advance_phase());

    // Phase 2: R1 = 15 using ADD, in two cycles (bonus 90).
    ctx.run_ok("MOV R1, 5\nADD R1, 10");
    assert_eq!(
        ctx.engine.last_phase_outcome(),
        Some(&PhaseOutcome::Completed {
            reward: 150,
            bonus: 90,
        })
    );
    assert_eq!(ctx.engine.score(), 195 + 240);
}

/// Walking off the end of the curriculum reports completion.
#[test]
fn exhausted_curriculum_reports_complete() {
    let mut ctx = TestContext::new();
    ctx.engine.set_phases(vec![Phase::new(1, "Only", "R1 = 1", 10, &[], |s| {
        s.registers[0] == 1
    })]);
    ctx.run_ok("MOV R1, 1");
    assert!(ctx.engine.advance_phase());

    ctx.run_ok("MOV R1, 1");
    assert_eq!(
        ctx.engine.last_phase_outcome(),
        Some(&PhaseOutcome::CurriculumComplete)
    );
}

// ══════════════════════════════════════════════════════════
// 4. Builtin curriculum
// ══════════════════════════════════════════════════════════

/// The builtin curriculum is ordered, ids are 1-based and contiguous, and a
/// fresh engine starts on its first phase.
#[test]
fn builtin_curriculum_is_ordered() {
    let phases = builtin_curriculum();
    assert_eq!(phases.len(), 11);
    for (idx, phase) in phases.iter().enumerate() {
        assert_eq!(phase.id as usize, idx + 1);
        assert!(phase.reward > 0);
    }

    let ctx = TestContext::new();
    assert_eq!(ctx.engine.phases().len(), phases.len());
    assert_eq!(ctx.engine.current_phase().map(|p| p.id), Some(1));
}

/// The I/O phase checks the consumed input against the output log.
#[test]
fn io_phase_roundtrip_goal() {
    let mut ctx = TestContext::new();
    let phases = builtin_curriculum();
    ctx.engine.set_phases(phases.into_iter().filter(|p| p.id == 7).collect());

    ctx.load("IN R1, IN0\nADD R1, 10\nOUT R1, OUT0");
    ctx.engine.push_input(0, 7);
    assert_eq!(ctx.engine.run(), RunOutcome::Completed);
    assert!(matches!(
        ctx.engine.last_phase_outcome(),
        Some(PhaseOutcome::Completed { reward: 500, .. })
    ));
}

/// The disk-read phase compares R1 against the actual sector contents.
#[test]
fn disk_phase_goal() {
    let mut ctx = TestContext::new();
    let phases = builtin_curriculum();
    ctx.engine.set_phases(phases.into_iter().filter(|p| p.id == 8).collect());

    ctx.run_ok("DISK_READ R1, 5");
    assert!(matches!(
        ctx.engine.last_phase_outcome(),
        Some(PhaseOutcome::Completed { reward: 100, .. })
    ));
}
