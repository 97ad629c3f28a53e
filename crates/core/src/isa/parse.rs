//! Assembler: program text to instruction sequence.
//!
//! The surface syntax is one instruction per line, tokens separated by
//! whitespace and/or commas, `;` starting a comment line. Blank and comment
//! lines stay in the program as non-executable slots so jump targets can use
//! physical line numbers.

use tracing::debug;

use super::{Instruction, Opcode, Program, SourceLine};
use crate::common::error::ParseError;

/// Assembles program text into a [`Program`].
///
/// The first token of each instruction line is uppercased and must name a
/// known opcode; otherwise the whole program is rejected with
/// [`ParseError::UnknownInstruction`] and nothing executes. Remaining tokens
/// are stored verbatim for execution-time validation.
pub fn assemble(text: &str) -> Result<Program, ParseError> {
    let mut lines = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = idx as u32 + 1;
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            lines.push(SourceLine::Blank);
            continue;
        }
        if trimmed.starts_with(';') {
            lines.push(SourceLine::Comment);
            continue;
        }

        let mut tokens = trimmed
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty());

        let Some(head) = tokens.next() else {
            lines.push(SourceLine::Blank);
            continue;
        };
        let mnemonic = head.to_ascii_uppercase();
        let Some(opcode) = Opcode::from_mnemonic(&mnemonic) else {
            return Err(ParseError::UnknownInstruction { line, mnemonic });
        };

        let args = tokens.map(str::to_owned).collect();
        lines.push(SourceLine::Instr(Instruction { opcode, args, line }));
    }

    let program = Program::from_lines(lines);
    debug!(
        lines = program.line_count(),
        instructions = program.instruction_count(),
        "program assembled"
    );
    Ok(program)
}
