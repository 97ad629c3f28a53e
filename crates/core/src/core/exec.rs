//! Per-opcode execution handlers.
//!
//! One exhaustive `match` over [`Opcode`] dispatches to small handlers.
//! Operand validation happens here, at execution time: a bad register name,
//! a bad numeric literal, or a wrong argument count faults the run at the
//! offending instruction. Handlers either apply their full effect or none
//! of it (the divide-by-zero path checks the divisor before touching the
//! destination register).

use super::Engine;
use crate::common::error::{Fault, Region};
use crate::event::Effect;
use crate::isa::{Instruction, Opcode};
use crate::mem::CacheAccess;

/// Two-operand integer operation selected by the arithmetic opcodes.
#[derive(Debug, Clone, Copy)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinOp {
    fn apply(self, lhs: i64, rhs: i64, line: u32) -> Result<i64, Fault> {
        Ok(match self {
            BinOp::Add => lhs.wrapping_add(rhs),
            BinOp::Sub => lhs.wrapping_sub(rhs),
            BinOp::Mul => lhs.wrapping_mul(rhs),
            BinOp::Div => {
                if rhs == 0 {
                    return Err(Fault::DivideByZero { line });
                }
                floor_div(lhs, rhs)
            }
            BinOp::Mod => {
                if rhs == 0 {
                    return Err(Fault::DivideByZero { line });
                }
                lhs.wrapping_rem(rhs)
            }
        })
    }
}

/// Floor division (rounds toward negative infinity, like the original's
/// `Math.floor(a / b)`), with wrapping on the single overflow case.
fn floor_div(a: i64, b: i64) -> i64 {
    let q = a.wrapping_div(b);
    if a.wrapping_rem(b) != 0 && (a < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

/// Condition tested by a jump instruction.
#[derive(Debug, Clone, Copy)]
enum JumpCond {
    Always,
    IfEqual,
    IfNotEqual,
}

impl Engine {
    /// Executes one instruction against the machine, returning the state
    /// delta or the fault that halted the run.
    pub(super) fn execute(&mut self, instr: &Instruction) -> Result<Effect, Fault> {
        match instr.opcode {
            Opcode::Mov => self.exec_mov(instr),
            Opcode::Add => self.exec_arith(instr, BinOp::Add),
            Opcode::Sub => self.exec_arith(instr, BinOp::Sub),
            Opcode::Mul => self.exec_arith(instr, BinOp::Mul),
            Opcode::Div => self.exec_arith(instr, BinOp::Div),
            Opcode::Mod => self.exec_arith(instr, BinOp::Mod),
            Opcode::Cmp => self.exec_cmp(instr),
            Opcode::Jmp => self.exec_jump(instr, JumpCond::Always),
            Opcode::Je => self.exec_jump(instr, JumpCond::IfEqual),
            Opcode::Jne => self.exec_jump(instr, JumpCond::IfNotEqual),
            Opcode::Load => self.exec_load(instr),
            Opcode::Store => self.exec_store(instr),
            Opcode::Cache => self.exec_cache(instr),
            Opcode::DiskRead => self.exec_disk_read(instr),
            Opcode::DiskWrite => self.exec_disk_write(instr),
            Opcode::DiskSeek => self.exec_disk_seek(instr),
            Opcode::DiskStatus => self.exec_disk_status(instr),
            Opcode::CacheFlush => self.exec_cache_flush(instr),
            Opcode::CacheInvalidate => self.exec_cache_invalidate(instr),
            Opcode::In => self.exec_in(instr),
            Opcode::Out => self.exec_out(instr),
        }
    }

    // ── operand helpers ──────────────────────────────────────────────

    fn expect_args(instr: &Instruction, min: usize, max: usize) -> Result<(), Fault> {
        let n = instr.args.len();
        if n < min || n > max {
            let expected = if min == max {
                format!("{min}")
            } else {
                format!("{min} or {max}")
            };
            return Err(Fault::InvalidOperand {
                line: instr.line,
                reason: format!("{} expects {expected} operand(s), got {n}", instr.opcode),
            });
        }
        Ok(())
    }

    fn reg_index(&self, token: &str, line: u32) -> Result<usize, Fault> {
        self.regs
            .parse_name(token)
            .ok_or_else(|| Fault::InvalidOperand {
                line,
                reason: format!("invalid register `{token}`"),
            })
    }

    fn literal(token: &str, line: u32) -> Result<i64, Fault> {
        token.parse().map_err(|_| Fault::InvalidOperand {
            line,
            reason: format!("invalid numeric literal `{token}`"),
        })
    }

    /// Resolves an operand that may be a register name or an immediate.
    /// Anything starting with `R`/`r` is treated as a register and must be
    /// a valid one.
    fn operand_value(&self, token: &str, line: u32) -> Result<i64, Fault> {
        if token.starts_with(['R', 'r']) {
            let idx = self.reg_index(token, line)?;
            Ok(self.regs.read(idx))
        } else {
            Self::literal(token, line)
        }
    }

    fn mem_addr(&self, token: &str, line: u32) -> Result<usize, Fault> {
        let raw = Self::literal(token, line)?;
        let size = self.ram.len();
        if raw < 0 || raw as usize >= size {
            return Err(Fault::OutOfRange {
                line,
                region: Region::Memory,
                index: raw,
                size,
            });
        }
        Ok(raw as usize)
    }

    fn disk_sector(&self, token: &str, line: u32) -> Result<usize, Fault> {
        let raw = Self::literal(token, line)?;
        let size = self.disk.sector_count();
        if raw < 0 || raw as usize >= size {
            return Err(Fault::OutOfRange {
                line,
                region: Region::Disk,
                index: raw,
                size,
            });
        }
        Ok(raw as usize)
    }

    // ── register and arithmetic ──────────────────────────────────────

    fn exec_mov(&mut self, instr: &Instruction) -> Result<Effect, Fault> {
        Self::expect_args(instr, 2, 2)?;
        let dest = self.reg_index(&instr.args[0], instr.line)?;
        let value = self.operand_value(&instr.args[1], instr.line)?;
        self.regs.write(dest, value);
        Ok(Effect::Register { reg: dest, value })
    }

    fn exec_arith(&mut self, instr: &Instruction, op: BinOp) -> Result<Effect, Fault> {
        Self::expect_args(instr, 2, 3)?;
        let dest = self.reg_index(&instr.args[0], instr.line)?;
        let (lhs, rhs) = if instr.args.len() == 2 {
            // Accumulate form: Rd = Rd op src, src may be immediate.
            let rhs = self.operand_value(&instr.args[1], instr.line)?;
            (self.regs.read(dest), rhs)
        } else {
            // Three-address form: Rd = Ra op Rb, registers only.
            let a = self.reg_index(&instr.args[1], instr.line)?;
            let b = self.reg_index(&instr.args[2], instr.line)?;
            (self.regs.read(a), self.regs.read(b))
        };
        let value = op.apply(lhs, rhs, instr.line)?;
        self.regs.write(dest, value);
        Ok(Effect::Register { reg: dest, value })
    }

    fn exec_cmp(&mut self, instr: &Instruction) -> Result<Effect, Fault> {
        Self::expect_args(instr, 2, 2)?;
        let a = self.operand_value(&instr.args[0], instr.line)?;
        let b = self.operand_value(&instr.args[1], instr.line)?;
        self.flags.set(a, b);
        Ok(Effect::Flags(self.flags))
    }

    // ── control flow ─────────────────────────────────────────────────

    fn exec_jump(&mut self, instr: &Instruction, cond: JumpCond) -> Result<Effect, Fault> {
        Self::expect_args(instr, 1, 1)?;
        let target = Self::literal(&instr.args[0], instr.line)?;
        let lines = self.program_line_count();
        if target < 1 || target > lines as i64 {
            return Err(Fault::JumpOutOfRange {
                line: instr.line,
                target,
                lines,
            });
        }
        let taken = match cond {
            JumpCond::Always => true,
            JumpCond::IfEqual => self.flags.equal,
            JumpCond::IfNotEqual => self.flags.is_defined() && !self.flags.equal,
        };
        Ok(Effect::Jump {
            target: target as u32,
            taken,
        })
    }

    // ── RAM and cache ────────────────────────────────────────────────

    fn exec_load(&mut self, instr: &Instruction) -> Result<Effect, Fault> {
        Self::expect_args(instr, 2, 2)?;
        let dest = self.reg_index(&instr.args[0], instr.line)?;
        let addr = self.mem_addr(&instr.args[1], instr.line)?;
        let value = self.ram.read(addr).unwrap_or_default();
        self.regs.write(dest, value);
        self.sim_time += self.config.memory.ram_access_time;
        self.read_ops += 1;
        Ok(Effect::RamRead {
            addr,
            reg: dest,
            value,
        })
    }

    fn exec_store(&mut self, instr: &Instruction) -> Result<Effect, Fault> {
        Self::expect_args(instr, 2, 2)?;
        let src = self.reg_index(&instr.args[0], instr.line)?;
        let addr = self.mem_addr(&instr.args[1], instr.line)?;
        let value = self.regs.read(src);
        // Deliberately no cache update: the cache is software-managed and
        // non-coherent with RAM.
        self.ram.write(addr, value);
        self.sim_time += self.config.memory.ram_access_time;
        self.write_ops += 1;
        Ok(Effect::RamWrite { addr, value })
    }

    fn exec_cache(&mut self, instr: &Instruction) -> Result<Effect, Fault> {
        Self::expect_args(instr, 2, 2)?;
        let dest = self.reg_index(&instr.args[0], instr.line)?;
        // Any integer key is cacheable; there is no bounds check here.
        let addr = Self::literal(&instr.args[1], instr.line)?;

        let bound = self.config.memory.synth_value_bound;
        let access = {
            let Self { cache, rng, .. } = &mut *self;
            cache.load_or_fill(addr, || rng.next_below(bound) as i64)
        };
        match access {
            CacheAccess::Hit(value) => {
                self.regs.write(dest, value);
                self.sim_time += self.config.memory.cache_hit_time;
                Ok(Effect::CacheHit {
                    addr,
                    reg: dest,
                    value,
                })
            }
            CacheAccess::Miss(value) => {
                self.regs.write(dest, value);
                self.sim_time += self.config.memory.ram_access_time;
                self.read_ops += 1;
                Ok(Effect::CacheFill {
                    addr,
                    reg: dest,
                    value,
                })
            }
        }
    }

    fn exec_cache_flush(&mut self, instr: &Instruction) -> Result<Effect, Fault> {
        Self::expect_args(instr, 0, 0)?;
        let dropped = self.cache.flush();
        Ok(Effect::CacheFlush { dropped })
    }

    fn exec_cache_invalidate(&mut self, instr: &Instruction) -> Result<Effect, Fault> {
        Self::expect_args(instr, 1, 1)?;
        let addr = Self::literal(&instr.args[0], instr.line)?;
        let present = self.cache.invalidate(addr);
        Ok(Effect::CacheInvalidate { addr, present })
    }

    // ── disk ─────────────────────────────────────────────────────────

    fn exec_disk_read(&mut self, instr: &Instruction) -> Result<Effect, Fault> {
        Self::expect_args(instr, 2, 2)?;
        let dest = self.reg_index(&instr.args[0], instr.line)?;
        let sector = self.disk_sector(&instr.args[1], instr.line)?;
        let value = self.disk.read(sector).unwrap_or_default();
        self.regs.write(dest, value);
        self.sim_time += self.config.disk.access_time;
        self.read_ops += 1;
        Ok(Effect::DiskRead {
            sector,
            reg: dest,
            value,
        })
    }

    fn exec_disk_write(&mut self, instr: &Instruction) -> Result<Effect, Fault> {
        Self::expect_args(instr, 2, 2)?;
        let src = self.reg_index(&instr.args[0], instr.line)?;
        let sector = self.disk_sector(&instr.args[1], instr.line)?;
        let value = self.regs.read(src);
        self.disk.write(sector, value);
        self.sim_time += self.config.disk.access_time;
        self.write_ops += 1;
        Ok(Effect::DiskWrite { sector, value })
    }

    fn exec_disk_seek(&mut self, instr: &Instruction) -> Result<Effect, Fault> {
        Self::expect_args(instr, 1, 1)?;
        let sector = self.disk_sector(&instr.args[0], instr.line)?;
        let from = self.disk.head();
        let cost = self.disk.seek(sector).unwrap_or_default();
        self.sim_time += cost;
        Ok(Effect::DiskSeek { from, to: sector })
    }

    fn exec_disk_status(&mut self, instr: &Instruction) -> Result<Effect, Fault> {
        Self::expect_args(instr, 1, 1)?;
        let dest = self.reg_index(&instr.args[0], instr.line)?;
        // The toy disk is busy roughly one sample in ten.
        let value = i64::from(self.rng.next_below(10) == 0);
        self.regs.write(dest, value);
        Ok(Effect::Register { reg: dest, value })
    }

    // ── I/O ports ────────────────────────────────────────────────────

    fn exec_in(&mut self, instr: &Instruction) -> Result<Effect, Fault> {
        Self::expect_args(instr, 2, 2)?;
        let dest = self.reg_index(&instr.args[0], instr.line)?;
        let port = instr.args[1].clone();
        let bound = self.config.memory.synth_value_bound;
        let value = {
            let Self { ports, rng, .. } = &mut *self;
            ports
                .read_input(&port, || rng.next_below(bound) as i64)
                .map_err(|reason| Fault::Device {
                    line: instr.line,
                    reason,
                })?
        };
        self.regs.write(dest, value);
        Ok(Effect::PortIn {
            port,
            reg: dest,
            value,
        })
    }

    fn exec_out(&mut self, instr: &Instruction) -> Result<Effect, Fault> {
        Self::expect_args(instr, 2, 2)?;
        let src = self.reg_index(&instr.args[0], instr.line)?;
        let port = instr.args[1].clone();
        let value = self.regs.read(src);
        self.ports
            .write_output(&port, value)
            .map_err(|reason| Fault::Device {
                line: instr.line,
                reason,
            })?;
        Ok(Effect::PortOut { port, value })
    }
}
