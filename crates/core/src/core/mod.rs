//! The execution engine.
//!
//! [`Engine`] owns the whole machine: register file, flags, RAM, cache,
//! disk, I/O ports, DMA, PRNG, the loaded program, and the phase curriculum.
//! It is a plain value: construct as many independent engines as you like
//! and drive each with [`Engine::step`] (one instruction per call) or
//! [`Engine::run`] (loop with a safety valve).
//!
//! The run lifecycle is `Idle -> Running -> {Completed, Faulted}`:
//! 1. `load_program` assembles text and arms the engine (`Idle`).
//! 2. `step` enters `Running` and executes one instruction; blank and
//!    comment lines are skipped without cost.
//! 3. The run completes when the program counter walks off the end, or
//!    faults on the first unrecoverable instruction error.
//!
//! State is consistent between steps; stopping a run at any step is safe,
//! and `reset` returns the machine (minus the non-volatile disk contents)
//! to its zeroed state.

mod exec;
mod flags;
mod regs;

pub use flags::Flags;
pub use regs::RegisterFile;

use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use crate::common::error::{Fault, ParseError};
use crate::common::rng::XorShift64;
use crate::config::Config;
use crate::event::{Effect, InstructionEvent, NoopObserver, Observer, PhaseEvent};
use crate::io::{DmaController, Ports};
use crate::isa::{self, Instruction, Opcode, Program, SourceLine};
use crate::mem::{Cache, Disk, Ram};
use crate::phase::{self, GoalState, Phase, PhaseOutcome};
use crate::stats::RunStats;

/// Lifecycle state of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// No run in progress. Initial state, and the state after a reset.
    Idle,
    /// A run is in progress (or armed and ready to step).
    Running,
    /// The program counter walked off the end of the program.
    Completed,
    /// An instruction faulted; see [`Engine::last_fault`].
    Faulted,
}

/// What one [`Engine::step`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// One instruction executed.
    Executed,
    /// The run is complete; nothing executed.
    Completed,
    /// The run is faulted; nothing executed.
    Faulted,
    /// No program is loaded.
    Idle,
}

/// How an [`Engine::run`] call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The program ran to completion.
    Completed,
    /// The run stopped at a faulting instruction.
    Faulted,
    /// The configured step limit was hit; the engine is still `Running` and
    /// can be stepped or run further.
    StepLimitReached,
    /// No program is loaded.
    Idle,
}

/// The simulated machine.
pub struct Engine {
    pub(crate) config: Config,
    pub(crate) regs: RegisterFile,
    pub(crate) flags: Flags,
    pub(crate) ram: Ram,
    pub(crate) cache: Cache,
    pub(crate) disk: Disk,
    pub(crate) ports: Ports,
    pub(crate) dma: DmaController,
    pub(crate) rng: XorShift64,

    program: Option<Program>,
    pc: usize,
    status: Status,
    fault: Option<Fault>,

    pub(crate) cycles: u64,
    pub(crate) read_ops: u64,
    pub(crate) write_ops: u64,
    pub(crate) sim_time: f64,
    executed: HashSet<Opcode>,

    phases: Vec<Phase>,
    phase_index: usize,
    phase_cleared: bool,
    last_phase_outcome: Option<PhaseOutcome>,
    score: u64,

    observer: Box<dyn Observer>,
}

impl Engine {
    /// Creates an engine from `config` with the builtin curriculum and a
    /// no-op observer.
    pub fn new(config: Config) -> Self {
        Self::with_observer(config, Box::new(NoopObserver))
    }

    /// Creates an engine that notifies `observer` of every state change.
    pub fn with_observer(config: Config, observer: Box<dyn Observer>) -> Self {
        let mut rng = XorShift64::new(config.seed);
        let disk = Disk::new(&config.disk, &mut rng);
        Self {
            regs: RegisterFile::new(config.registers),
            flags: Flags::default(),
            ram: Ram::new(config.memory.words),
            cache: Cache::new(),
            disk,
            ports: Ports::new(&config.io),
            dma: DmaController::new(&config.io),
            rng,
            program: None,
            pc: 0,
            status: Status::Idle,
            fault: None,
            cycles: 0,
            read_ops: 0,
            write_ops: 0,
            sim_time: 0.0,
            executed: HashSet::new(),
            phases: phase::builtin_curriculum(),
            phase_index: 0,
            phase_cleared: false,
            last_phase_outcome: None,
            score: 0,
            config,
            observer,
        }
    }

    /// Assembles `text` and arms the engine for a fresh run.
    ///
    /// An unknown mnemonic rejects the whole program: the previous program
    /// and all machine state are left untouched.
    pub fn load_program(&mut self, text: &str) -> Result<(), ParseError> {
        let program = isa::assemble(text)?;
        self.program = Some(program);
        self.reset();
        Ok(())
    }

    /// Executes exactly one instruction.
    ///
    /// Blank and comment lines between the program counter and the next
    /// instruction are skipped without consuming cycles or time.
    pub fn step(&mut self) -> StepResult {
        match self.status {
            Status::Completed => StepResult::Completed,
            Status::Faulted => StepResult::Faulted,
            Status::Idle | Status::Running => {
                if self.program.is_none() {
                    return StepResult::Idle;
                }
                self.status = Status::Running;
                self.exec_one()
            }
        }
    }

    /// Drives [`Engine::step`] until the run completes, faults, or the
    /// configured step limit is hit.
    pub fn run(&mut self) -> RunOutcome {
        let limit = self.config.step_limit;
        let mut steps: u64 = 0;
        loop {
            match self.step() {
                StepResult::Executed => {
                    steps += 1;
                    if limit.is_some_and(|cap| steps >= cap) && self.status == Status::Running {
                        debug!(steps, "step limit reached");
                        return RunOutcome::StepLimitReached;
                    }
                }
                StepResult::Completed => return RunOutcome::Completed,
                StepResult::Faulted => return RunOutcome::Faulted,
                StepResult::Idle => return RunOutcome::Idle,
            }
        }
    }

    /// Returns the machine to its zeroed state, keeping the loaded program,
    /// the score, the phase position, and the (non-volatile) disk contents.
    /// The disk head parks at sector 0.
    ///
    /// Resetting is idempotent: a second reset observes exactly the state
    /// the first one produced.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.flags.clear();
        self.ram.reset();
        self.cache.reset();
        self.ports.reset();
        self.dma.reset();
        self.disk.park();
        self.pc = 0;
        self.status = Status::Idle;
        self.fault = None;
        self.cycles = 0;
        self.read_ops = 0;
        self.write_ops = 0;
        self.sim_time = 0.0;
        self.executed.clear();
        self.last_phase_outcome = None;
    }

    fn exec_one(&mut self) -> StepResult {
        let instr = loop {
            let fetched = {
                let Some(program) = &self.program else {
                    return StepResult::Idle;
                };
                match program.line(self.pc) {
                    None => Fetch::End,
                    Some(SourceLine::Blank | SourceLine::Comment) => Fetch::Skip,
                    Some(SourceLine::Instr(instr)) => Fetch::Instr(instr.clone()),
                }
            };
            match fetched {
                Fetch::End => {
                    self.status = Status::Completed;
                    debug!(cycles = self.cycles, "run completed");
                    let outcome = self.evaluate_phase();
                    self.last_phase_outcome = Some(outcome);
                    return StepResult::Completed;
                }
                Fetch::Skip => self.pc += 1,
                Fetch::Instr(instr) => break instr,
            }
        };

        let time_before = self.sim_time;
        match self.execute(&instr) {
            Ok(effect) => {
                self.executed.insert(instr.opcode);
                self.cycles += 1;
                let time_delta = self.sim_time - time_before;

                // Device timeline advances on the same simulated clock.
                self.dma.advance(time_delta, &mut self.ports);

                debug!(line = instr.line, opcode = %instr.opcode, %effect, "executed");
                let event = InstructionEvent {
                    line: instr.line,
                    opcode: instr.opcode,
                    args: instr.args.clone(),
                    effect,
                    time_delta,
                };
                self.observer.instruction_executed(&event);

                self.pc = match event.effect {
                    Effect::Jump { target, taken: true } => target as usize - 1,
                    _ => self.pc + 1,
                };
                StepResult::Executed
            }
            Err(fault) => {
                debug!(line = instr.line, %fault, "run faulted");
                self.status = Status::Faulted;
                self.fault = Some(fault);
                StepResult::Faulted
            }
        }
    }

    /// Evaluates the current phase against the machine's final state.
    ///
    /// Called automatically when a run completes; calling it again is
    /// harmless (a cleared phase reports [`PhaseOutcome::AlreadyCleared`]
    /// instead of re-scoring).
    pub fn evaluate_phase(&mut self) -> PhaseOutcome {
        let Some(current) = self.phases.get(self.phase_index) else {
            return PhaseOutcome::CurriculumComplete;
        };
        if self.phase_cleared {
            return PhaseOutcome::AlreadyCleared;
        }

        let missing: Vec<Opcode> = current
            .required
            .iter()
            .copied()
            .filter(|op| !self.executed.contains(op))
            .collect();
        if !missing.is_empty() {
            debug!(?missing, "phase check failed: required instructions missing");
            return PhaseOutcome::MissingInstructions(missing);
        }

        let state = GoalState {
            registers: self.regs.as_slice(),
            memory: self.ram.as_slice(),
            disk: &self.disk,
            io: &self.ports,
        };
        if !current.goal_met(&state) {
            debug!(phase = current.id, "phase not yet complete");
            return PhaseOutcome::NotYetComplete;
        }

        let reward = current.reward;
        let bonus = phase::efficiency_bonus(self.cycles);
        let id = current.id;
        self.score += reward + bonus;
        self.phase_cleared = true;
        debug!(phase = id, reward, bonus, "phase completed");
        let event = PhaseEvent {
            phase: id,
            score_delta: reward + bonus,
            cycles: self.cycles,
        };
        self.observer.phase_completed(&event);
        PhaseOutcome::Completed { reward, bonus }
    }

    /// Moves to the next phase after the current one was cleared. Resets the
    /// machine for the new exercise. Returns `false` when the current phase
    /// is not cleared or the curriculum is exhausted.
    pub fn advance_phase(&mut self) -> bool {
        if !self.phase_cleared || self.phase_index >= self.phases.len() {
            return false;
        }
        self.phase_index += 1;
        self.phase_cleared = false;
        self.reset();
        true
    }

    /// Replaces the curriculum, restarting the phase position and score.
    pub fn set_phases(&mut self, phases: Vec<Phase>) {
        self.phases = phases;
        self.phase_index = 0;
        self.phase_cleared = false;
        self.score = 0;
    }

    /// Queues `value` on input port `idx` for a later `IN`.
    pub fn push_input(&mut self, idx: usize, value: i64) -> bool {
        self.ports.push_input(idx, value)
    }

    /// Current lifecycle state.
    pub fn status(&self) -> Status {
        self.status
    }

    /// The fault that ended the run, if any.
    pub fn last_fault(&self) -> Option<&Fault> {
        self.fault.as_ref()
    }

    /// Phase outcome recorded when the last run completed.
    pub fn last_phase_outcome(&self) -> Option<&PhaseOutcome> {
        self.last_phase_outcome.as_ref()
    }

    /// Register contents, 0-based (`registers()[0]` is `R1`).
    pub fn registers(&self) -> &[i64] {
        self.regs.as_slice()
    }

    /// Reads a register by user-facing name (`"R1"`).
    pub fn read_register(&self, name: &str) -> Option<i64> {
        self.regs.parse_name(name).map(|idx| self.regs.read(idx))
    }

    /// Main memory contents.
    pub fn memory(&self) -> &[i64] {
        self.ram.as_slice()
    }

    /// The cache tier.
    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// The disk tier.
    pub fn disk(&self) -> &Disk {
        &self.disk
    }

    /// The I/O ports.
    pub fn ports(&self) -> &Ports {
        &self.ports
    }

    /// The DMA controller, for queueing toy transfers.
    pub fn dma_mut(&mut self) -> &mut DmaController {
        &mut self.dma
    }

    /// The comparison flags.
    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// The loaded program, if any.
    pub fn program(&self) -> Option<&Program> {
        self.program.as_ref()
    }

    /// 0-based source-line index the next step will consider.
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Snapshot of the execution counters.
    pub fn stats(&self) -> RunStats {
        RunStats {
            cycles: self.cycles,
            read_ops: self.read_ops,
            write_ops: self.write_ops,
            cache_hits: self.cache.hits(),
            cache_misses: self.cache.misses(),
            sim_time: self.sim_time,
        }
    }

    /// Cumulative score across cleared phases.
    pub fn score(&self) -> u64 {
        self.score
    }

    /// The phase the learner is currently on, if any remain.
    pub fn current_phase(&self) -> Option<&Phase> {
        self.phases.get(self.phase_index)
    }

    /// The full curriculum.
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub(crate) fn program_line_count(&self) -> usize {
        self.program.as_ref().map_or(0, Program::line_count)
    }
}

/// What the fetch loop found at the program counter.
enum Fetch {
    End,
    Skip,
    Instr(Instruction),
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("status", &self.status)
            .field("pc", &self.pc)
            .field("cycles", &self.cycles)
            .field("score", &self.score)
            .field("phase_index", &self.phase_index)
            .finish_non_exhaustive()
    }
}
