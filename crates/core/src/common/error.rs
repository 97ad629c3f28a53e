//! Error taxonomies for assembly and execution.
//!
//! Two failure families exist, mirroring the two stages of a run:
//! 1. **`ParseError`:** raised while assembling program text. The whole
//!    program is rejected and nothing executes.
//! 2. **`Fault`:** raised while executing an instruction. The run halts at
//!    the faulting instruction with no rollback of already-applied state.
//!
//! Neither family ever panics the host process. Every variant carries the
//! 1-based source line it originated from and renders as a human-readable
//! message.

use std::fmt;

use thiserror::Error;

/// Failure while turning program text into an instruction sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The first token of an instruction line is not a known mnemonic.
    #[error("line {line}: unknown instruction `{mnemonic}`")]
    UnknownInstruction {
        /// 1-based source line of the offending token.
        line: u32,
        /// The uppercased mnemonic that failed to resolve.
        mnemonic: String,
    },
}

/// Bounded storage region named in an out-of-range fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Main memory words.
    Memory,
    /// Disk sectors.
    Disk,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::Memory => f.write_str("memory address"),
            Region::Disk => f.write_str("disk sector"),
        }
    }
}

/// Unrecoverable instruction error.
///
/// Any fault transitions the run to the `Faulted` state; already-applied
/// state mutations are kept, and no further instructions execute.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Fault {
    /// A register name, numeric literal, or argument count failed validation.
    #[error("line {line}: invalid operand: {reason}")]
    InvalidOperand {
        /// 1-based source line of the faulting instruction.
        line: u32,
        /// What was wrong with the operand.
        reason: String,
    },

    /// A memory address or disk sector fell outside its region.
    #[error("line {line}: {region} {index} out of range (valid: 0..{size})")]
    OutOfRange {
        /// 1-based source line of the faulting instruction.
        line: u32,
        /// Which bounded region was accessed.
        region: Region,
        /// The rejected index, as written in the program.
        index: i64,
        /// Size of the region.
        size: usize,
    },

    /// A jump named a line outside the program.
    #[error("line {line}: jump target {target} outside program (valid: 1..={lines})")]
    JumpOutOfRange {
        /// 1-based source line of the faulting instruction.
        line: u32,
        /// The rejected target line.
        target: i64,
        /// Number of source lines in the program.
        lines: usize,
    },

    /// Division or modulo with a zero divisor. The destination register is
    /// left unmodified.
    #[error("line {line}: division by zero")]
    DivideByZero {
        /// 1-based source line of the faulting instruction.
        line: u32,
    },

    /// An I/O port was missing or used against its direction.
    #[error("line {line}: device error: {reason}")]
    Device {
        /// 1-based source line of the faulting instruction.
        line: u32,
        /// What went wrong with the port access.
        reason: String,
    },
}

impl Fault {
    /// 1-based source line the fault originated from.
    pub fn line(&self) -> u32 {
        match self {
            Fault::InvalidOperand { line, .. }
            | Fault::OutOfRange { line, .. }
            | Fault::JumpOutOfRange { line, .. }
            | Fault::DivideByZero { line }
            | Fault::Device { line, .. } => *line,
        }
    }
}
