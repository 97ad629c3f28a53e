//! Phases: scored exercises with goal predicates.
//!
//! A phase is a declarative exercise: a title and objective shown to the
//! learner, an optional list of opcodes the solution must use, a point
//! reward, and a predicate over the machine's final state. Evaluation runs
//! once per completed run:
//! 1. Required-opcode coverage first; missing opcodes fail the check and
//!    name exactly what is missing, with no score.
//! 2. Then the goal predicate; success scores
//!    `reward + max(0, 100 - 5 * cycles)` (slower solutions forfeit the
//!    efficiency bonus). An unmet goal is informational, not an error.
//!
//! Advancing to the next phase is a separate explicit action.

use std::fmt;

use crate::isa::Opcode;
use crate::io::Ports;
use crate::mem::Disk;

/// Read-only view of the machine's final state, handed to goal predicates.
#[derive(Debug, Clone, Copy)]
pub struct GoalState<'a> {
    /// Register contents, 0-based (`registers[0]` is `R1`).
    pub registers: &'a [i64],
    /// Main memory contents.
    pub memory: &'a [i64],
    /// The disk, including head position and allocation map.
    pub disk: &'a Disk,
    /// I/O ports: consumed inputs and written outputs.
    pub io: &'a Ports,
}

/// Goal predicate signature.
pub type Goal = dyn Fn(&GoalState<'_>) -> bool + Send + Sync;

/// One scored exercise.
pub struct Phase {
    /// Stable phase id (1-based in the builtin curriculum).
    pub id: u32,
    /// Short title shown to the learner.
    pub title: String,
    /// What the learner is asked to achieve.
    pub objective: String,
    /// Opcodes the solution must execute at least once.
    pub required: Vec<Opcode>,
    /// Base reward in points.
    pub reward: u64,
    goal: Box<Goal>,
}

impl Phase {
    /// Creates a phase from its parts.
    pub fn new(
        id: u32,
        title: &str,
        objective: &str,
        reward: u64,
        required: &[Opcode],
        goal: impl Fn(&GoalState<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            id,
            title: title.to_owned(),
            objective: objective.to_owned(),
            required: required.to_vec(),
            reward,
            goal: Box::new(goal),
        }
    }

    /// Evaluates the goal predicate against a final state.
    pub fn goal_met(&self, state: &GoalState<'_>) -> bool {
        (self.goal)(state)
    }
}

impl fmt::Debug for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Phase")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("required", &self.required)
            .field("reward", &self.reward)
            .finish_non_exhaustive()
    }
}

/// Outcome of evaluating the current phase after a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseOutcome {
    /// The run never executed these required opcodes; no score awarded.
    MissingInstructions(Vec<Opcode>),
    /// Requirements were covered but the goal predicate is false. Not an
    /// error; the learner simply is not done yet.
    NotYetComplete,
    /// The phase was cleared and scored.
    Completed {
        /// Base reward awarded.
        reward: u64,
        /// Efficiency bonus awarded (`max(0, 100 - 5 * cycles)`).
        bonus: u64,
    },
    /// The phase was already cleared by an earlier run; nothing re-scored.
    AlreadyCleared,
    /// Every phase in the curriculum has been cleared.
    CurriculumComplete,
}

/// Efficiency bonus for clearing a phase in `cycles` instructions.
pub fn efficiency_bonus(cycles: u64) -> u64 {
    100u64.saturating_sub(cycles.saturating_mul(5))
}

/// The builtin curriculum: the original game's exercises in teaching order,
/// from register moves up to full-hierarchy integration.
pub fn builtin_curriculum() -> Vec<Phase> {
    vec![
        Phase::new(
            1,
            "First steps",
            "Make R1 = 8",
            100,
            &[],
            |s| s.registers[0] == 8,
        ),
        Phase::new(
            2,
            "Basic operations",
            "Make R1 = 15 using ADD",
            150,
            &[Opcode::Add],
            |s| s.registers[0] == 15,
        ),
        Phase::new(
            3,
            "Multiplication",
            "Make R1 = 20 using MUL",
            200,
            &[Opcode::Mul],
            |s| s.registers[0] == 20,
        ),
        Phase::new(
            4,
            "Memory",
            "Store 42 at memory address 0",
            250,
            &[Opcode::Store],
            |s| s.memory[0] == 42,
        ),
        Phase::new(
            5,
            "Division",
            "Make R1 = 5 using DIV (20 / 4)",
            300,
            &[Opcode::Div],
            |s| s.registers[0] == 5,
        ),
        Phase::new(
            6,
            "Conditional jumps",
            "Use CMP and JE to make R1 = 100",
            400,
            &[Opcode::Cmp, Opcode::Je],
            |s| s.registers[0] == 100,
        ),
        Phase::new(
            7,
            "Input and output",
            "Read a value from IN0, add 10, and send the result to OUT0",
            500,
            &[Opcode::In, Opcode::Out],
            |s| {
                s.io.inputs_read()
                    .first()
                    .is_some_and(|&v| s.io.output_contains(v + 10))
            },
        ),
        Phase::new(
            8,
            "Disk reads",
            "Read sector 5 of the disk into R1",
            100,
            &[Opcode::DiskRead],
            |s| s.disk.read(5).is_some_and(|v| s.registers[0] == v),
        ),
        Phase::new(
            9,
            "Disk writes",
            "Write the value 42 into disk sector 10",
            100,
            &[Opcode::DiskWrite],
            |s| s.disk.read(10) == Some(42),
        ),
        Phase::new(
            10,
            "Seeking",
            "Move the head to sector 20 and read its data",
            100,
            &[Opcode::DiskSeek, Opcode::DiskRead],
            |s| s.disk.head() == 20 && s.registers[0] != 0,
        ),
        Phase::new(
            11,
            "Full hierarchy",
            "Move 100 through registers, RAM, cache, and disk sector 25",
            100,
            &[Opcode::Store, Opcode::Cache, Opcode::DiskWrite],
            |s| s.registers[0] == 100 && s.memory[200] == 100 && s.disk.read(25) == Some(100),
        ),
    ]
}
