//! Notification boundary toward a presentation layer.
//!
//! The engine tells an injected [`Observer`] about every state change so a
//! front end (3D scene, log panel, charts) can animate it. The default
//! observer does nothing, and the core never depends on an observer
//! succeeding: it is a one-way, synchronous notification after each
//! mutation.

use std::fmt;

use crate::core::Flags;
use crate::isa::Opcode;

/// The state delta produced by one executed instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// A register received a value (MOV, arithmetic, DISK_STATUS).
    Register {
        /// 0-based register index.
        reg: usize,
        /// The written value.
        value: i64,
    },
    /// Comparison flags were set.
    Flags(Flags),
    /// A jump instruction resolved.
    Jump {
        /// 1-based target source line.
        target: u32,
        /// Whether the jump was taken.
        taken: bool,
    },
    /// A RAM word was read into a register.
    RamRead {
        /// Word address.
        addr: usize,
        /// 0-based destination register.
        reg: usize,
        /// The word read.
        value: i64,
    },
    /// A register was stored into a RAM word.
    RamWrite {
        /// Word address.
        addr: usize,
        /// The word written.
        value: i64,
    },
    /// A cache lookup hit.
    CacheHit {
        /// Cached address.
        addr: i64,
        /// 0-based destination register.
        reg: usize,
        /// The cached word.
        value: i64,
    },
    /// A cache lookup missed and filled.
    CacheFill {
        /// Cached address.
        addr: i64,
        /// 0-based destination register.
        reg: usize,
        /// The synthesized word.
        value: i64,
    },
    /// The whole cache was cleared.
    CacheFlush {
        /// Number of entries dropped.
        dropped: usize,
    },
    /// One cache entry was invalidated.
    CacheInvalidate {
        /// The invalidated address.
        addr: i64,
        /// Whether the entry existed.
        present: bool,
    },
    /// A disk sector was read into a register.
    DiskRead {
        /// Sector index.
        sector: usize,
        /// 0-based destination register.
        reg: usize,
        /// The word read.
        value: i64,
    },
    /// A register was written to a disk sector.
    DiskWrite {
        /// Sector index.
        sector: usize,
        /// The word written.
        value: i64,
    },
    /// The disk head moved.
    DiskSeek {
        /// Head position before the seek.
        from: usize,
        /// Head position after the seek.
        to: usize,
    },
    /// A word was consumed from an input port.
    PortIn {
        /// Port name as written in the program.
        port: String,
        /// 0-based destination register.
        reg: usize,
        /// The consumed word.
        value: i64,
    },
    /// A word was appended to an output port.
    PortOut {
        /// Port name as written in the program.
        port: String,
        /// The written word.
        value: i64,
    },
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Register { reg, value } => write!(f, "R{} = {value}", reg + 1),
            Effect::Flags(flags) => write!(
                f,
                "flags: equal={} greater={} less={} zero={}",
                flags.equal, flags.greater, flags.less, flags.zero
            ),
            Effect::Jump { target, taken: true } => write!(f, "jumped to line {target}"),
            Effect::Jump { target, taken: false } => write!(f, "no jump (target {target})"),
            Effect::RamRead { addr, reg, value } => {
                write!(f, "R{} = mem[{addr}] = {value}", reg + 1)
            }
            Effect::RamWrite { addr, value } => write!(f, "mem[{addr}] = {value}"),
            Effect::CacheHit { addr, reg, value } => {
                write!(f, "CACHE HIT [{addr}] -> R{} = {value}", reg + 1)
            }
            Effect::CacheFill { addr, reg, value } => {
                write!(f, "CACHE MISS [{addr}] -> R{} = {value}", reg + 1)
            }
            Effect::CacheFlush { dropped } => write!(f, "cache flushed ({dropped} entries)"),
            Effect::CacheInvalidate { addr, present: true } => {
                write!(f, "cache entry [{addr}] invalidated")
            }
            Effect::CacheInvalidate { addr, present: false } => {
                write!(f, "cache entry [{addr}] was not present")
            }
            Effect::DiskRead { sector, reg, value } => {
                write!(f, "R{} = disk[{sector}] = {value}", reg + 1)
            }
            Effect::DiskWrite { sector, value } => write!(f, "disk[{sector}] = {value}"),
            Effect::DiskSeek { from, to } => write!(f, "head {from} -> {to}"),
            Effect::PortIn { port, reg, value } => write!(f, "R{} = {port} -> {value}", reg + 1),
            Effect::PortOut { port, value } => write!(f, "{port} <- {value}"),
        }
    }
}

/// Notification for one executed instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct InstructionEvent {
    /// 1-based source line of the instruction.
    pub line: u32,
    /// The executed opcode.
    pub opcode: Opcode,
    /// The instruction's argument tokens as written.
    pub args: Vec<String>,
    /// The resulting state delta.
    pub effect: Effect,
    /// Simulated time consumed by this instruction.
    pub time_delta: f64,
}

/// Notification for a completed phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseEvent {
    /// Phase id.
    pub phase: u32,
    /// Points awarded (reward plus efficiency bonus).
    pub score_delta: u64,
    /// Cycles the clearing run took.
    pub cycles: u64,
}

/// Capability injected into the engine to watch state changes.
///
/// All methods default to no-ops; implement only what the presentation layer
/// needs. Callbacks run synchronously after the mutation they describe, and
/// the engine ignores whatever they do.
pub trait Observer {
    /// Called after each executed instruction.
    fn instruction_executed(&mut self, _event: &InstructionEvent) {}

    /// Called when a phase's goal is met and scored.
    fn phase_completed(&mut self, _event: &PhaseEvent) {}
}

/// The default do-nothing observer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {}
