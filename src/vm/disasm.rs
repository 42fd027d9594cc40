//! Bytecode disassembler.
//!
//! Debug aid: prints one instruction per line with decoded operands. When a
//! context is supplied, `call` targets are resolved back to their declared
//! names by callback pointer identity (a linear scan; this path is never
//! hot). The textual format is not a stable contract.

use std::io;

use crate::context::Context;
use crate::core::error::Error;
use crate::program::CompiledFunction;
use super::opcode::{FUNCT_WORDS, Opcode, VALUE_WORDS};

pub(crate) fn dump<W: io::Write>(
    fun: &CompiledFunction,
    out: &mut W,
    ctx: Option<&Context>,
) -> Result<(), Error> {
    let code = fun.code();
    writeln!(out, "argc = {}, framesize = {}", fun.argc(), fun.framesize())?;
    writeln!(out)?;

    let mut pc = 0usize;
    loop {
        let Some(&word) = code.get(pc) else {
            return Err(Error::Internal);
        };
        let op = Opcode::try_from(word).map_err(|_| Error::Internal)?;
        write!(out, "{pc:#010x}: ")?;
        match op {
            Opcode::Nop => {
                writeln!(out, "nop")?;
                pc += 1;
            }
            Opcode::Ret => {
                writeln!(out, "ret {}", code[pc + 1])?;
                return Ok(());
            }
            Opcode::Mov => {
                writeln!(out, "mov {}, {}", code[pc + 1], code[pc + 2])?;
                pc += 3;
            }
            Opcode::Val => {
                let imm = f64::from_bits(code[pc + 1]);
                writeln!(out, "val {}, {}", imm, code[pc + 1 + VALUE_WORDS])?;
                pc += 2 + VALUE_WORDS;
            }
            Opcode::Call => {
                let index = code[pc + 1] as usize;
                let base = code[pc + 1 + FUNCT_WORDS];
                let dst = code[pc + 2 + FUNCT_WORDS];
                let entry = fun.funct(index);
                match ctx.and_then(|c| c.funct_name_of(entry.funct)) {
                    Some(name) => writeln!(out, "call {name}, {base}, {dst}")?,
                    None => writeln!(out, "call [{index}], {base}, {dst}")?,
                }
                pc += 3 + FUNCT_WORDS;
            }
            Opcode::Neg | Opcode::Not => {
                writeln!(out, "{} {}, {}", op.mnemonic(), code[pc + 1], code[pc + 2])?;
                pc += 3;
            }
            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Div
            | Opcode::Mod
            | Opcode::Pow
            | Opcode::Eq
            | Opcode::Ne
            | Opcode::Lt
            | Opcode::Gt
            | Opcode::Le
            | Opcode::Ge
            | Opcode::BEq
            | Opcode::BNe => {
                writeln!(
                    out,
                    "{} {}, {}, {}",
                    op.mnemonic(),
                    code[pc + 1],
                    code[pc + 2],
                    code[pc + 3]
                )?;
                pc += 4;
            }
            Opcode::Jmp => {
                writeln!(out, "jmp {:#x}", code[pc + 1])?;
                pc += 2;
            }
            Opcode::Jmpt | Opcode::Jmpf => {
                writeln!(
                    out,
                    "{} {}, {:#x}",
                    op.mnemonic(),
                    code[pc + 1],
                    code[pc + 2]
                )?;
                pc += 3;
            }
            Opcode::Sett | Opcode::Setf => {
                writeln!(out, "{} {}", op.mnemonic(), code[pc + 1])?;
                pc += 2;
            }
            Opcode::In => {
                let bound = if code[pc + 4] != 0 { "incl" } else { "excl" };
                writeln!(
                    out,
                    "in {}, {}, {}, {}, {}",
                    code[pc + 1],
                    code[pc + 2],
                    code[pc + 3],
                    bound,
                    code[pc + 5]
                )?;
                pc += 6;
            }
        }
    }
}
