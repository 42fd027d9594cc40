//! Register-based bytecode interpreter.
//!
//! Executes a compiled function against a frame of register slots whose
//! first `argc` entries the caller has filled. Dispatch is a single `match`
//! per opcode word; there are no loops in the bytecode, so execution is
//! bounded by the code length and always runs to completion.
//!
//! The interpreter itself never raises on overflow or NaN — those propagate
//! as ordinary doubles. Only `MOD` and host callbacks touch the thread-local
//! math-error status; the façade inspects it around each call.

pub(crate) mod disasm;
pub(crate) mod opcode;

use crate::core::error::Error;
use crate::core::value::Value;
use crate::math;
use crate::program::CompiledFunction;
use self::opcode::{FUNCT_WORDS, Opcode, VALUE_WORDS};

/// Execute `fun` on `frame`. The frame must hold at least
/// `fun.framesize()` slots.
pub(crate) fn exec(fun: &CompiledFunction, frame: &mut [Value]) -> Result<Value, Error> {
    let code = fun.code();
    let mut pc = 0usize;

    loop {
        let op = Opcode::try_from(code[pc]).map_err(|_| Error::Internal)?;
        match op {
            Opcode::Nop => pc += 1,

            Opcode::Ret => return Ok(frame[code[pc + 1] as usize]),

            Opcode::Mov => {
                frame[code[pc + 2] as usize] = frame[code[pc + 1] as usize];
                pc += 3;
            }

            Opcode::Val => {
                let imm = f64::from_bits(code[pc + 1]);
                frame[code[pc + 1 + VALUE_WORDS] as usize] = Value::Number(imm);
                pc += 2 + VALUE_WORDS;
            }

            Opcode::Call => {
                let entry = fun.funct(code[pc + 1] as usize);
                let base = code[pc + 1 + FUNCT_WORDS] as usize;
                let dst = code[pc + 2 + FUNCT_WORDS] as usize;
                let result = (entry.funct)(&frame[base..base + entry.argc]);
                frame[dst] = result;
                pc += 3 + FUNCT_WORDS;
            }

            Opcode::Neg => {
                frame[code[pc + 2] as usize] =
                    Value::Number(-frame[code[pc + 1] as usize].number());
                pc += 3;
            }

            Opcode::Add => {
                let l = frame[code[pc + 1] as usize].number();
                let r = frame[code[pc + 2] as usize].number();
                frame[code[pc + 3] as usize] = Value::Number(l + r);
                pc += 4;
            }
            Opcode::Sub => {
                let l = frame[code[pc + 1] as usize].number();
                let r = frame[code[pc + 2] as usize].number();
                frame[code[pc + 3] as usize] = Value::Number(l - r);
                pc += 4;
            }
            Opcode::Mul => {
                let l = frame[code[pc + 1] as usize].number();
                let r = frame[code[pc + 2] as usize].number();
                frame[code[pc + 3] as usize] = Value::Number(l * r);
                pc += 4;
            }
            Opcode::Div => {
                let l = frame[code[pc + 1] as usize].number();
                let r = frame[code[pc + 2] as usize].number();
                frame[code[pc + 3] as usize] = Value::Number(l / r);
                pc += 4;
            }
            Opcode::Mod => {
                let l = frame[code[pc + 1] as usize].number();
                let r = frame[code[pc + 2] as usize].number();
                frame[code[pc + 3] as usize] = Value::Number(math::euclid_mod(l, r));
                pc += 4;
            }
            Opcode::Pow => {
                let l = frame[code[pc + 1] as usize].number();
                let r = frame[code[pc + 2] as usize].number();
                frame[code[pc + 3] as usize] = Value::Number(l.powf(r));
                pc += 4;
            }

            Opcode::Not => {
                frame[code[pc + 2] as usize] =
                    Value::Boolean(!frame[code[pc + 1] as usize].boolean());
                pc += 3;
            }

            Opcode::Eq => {
                let l = frame[code[pc + 1] as usize].number();
                let r = frame[code[pc + 2] as usize].number();
                frame[code[pc + 3] as usize] = Value::Boolean(l == r);
                pc += 4;
            }
            Opcode::Ne => {
                let l = frame[code[pc + 1] as usize].number();
                let r = frame[code[pc + 2] as usize].number();
                frame[code[pc + 3] as usize] = Value::Boolean(l != r);
                pc += 4;
            }
            Opcode::Lt => {
                let l = frame[code[pc + 1] as usize].number();
                let r = frame[code[pc + 2] as usize].number();
                frame[code[pc + 3] as usize] = Value::Boolean(l < r);
                pc += 4;
            }
            Opcode::Gt => {
                let l = frame[code[pc + 1] as usize].number();
                let r = frame[code[pc + 2] as usize].number();
                frame[code[pc + 3] as usize] = Value::Boolean(l > r);
                pc += 4;
            }
            Opcode::Le => {
                let l = frame[code[pc + 1] as usize].number();
                let r = frame[code[pc + 2] as usize].number();
                frame[code[pc + 3] as usize] = Value::Boolean(l <= r);
                pc += 4;
            }
            Opcode::Ge => {
                let l = frame[code[pc + 1] as usize].number();
                let r = frame[code[pc + 2] as usize].number();
                frame[code[pc + 3] as usize] = Value::Boolean(l >= r);
                pc += 4;
            }

            Opcode::BEq => {
                let l = frame[code[pc + 1] as usize].boolean();
                let r = frame[code[pc + 2] as usize].boolean();
                frame[code[pc + 3] as usize] = Value::Boolean(l == r);
                pc += 4;
            }
            Opcode::BNe => {
                let l = frame[code[pc + 1] as usize].boolean();
                let r = frame[code[pc + 2] as usize].boolean();
                frame[code[pc + 3] as usize] = Value::Boolean(l != r);
                pc += 4;
            }

            Opcode::Jmp => pc = code[pc + 1] as usize,

            Opcode::Jmpt => {
                if frame[code[pc + 1] as usize].boolean() {
                    pc = code[pc + 2] as usize;
                } else {
                    pc += 3;
                }
            }
            Opcode::Jmpf => {
                if frame[code[pc + 1] as usize].boolean() {
                    pc += 3;
                } else {
                    pc = code[pc + 2] as usize;
                }
            }

            Opcode::Sett => {
                frame[code[pc + 1] as usize] = Value::Boolean(true);
                pc += 2;
            }
            Opcode::Setf => {
                frame[code[pc + 1] as usize] = Value::Boolean(false);
                pc += 2;
            }

            Opcode::In => {
                let v = frame[code[pc + 1] as usize].number();
                let lo = frame[code[pc + 2] as usize].number();
                let hi = frame[code[pc + 3] as usize].number();
                let inclusive = code[pc + 4] != 0;
                let inside = v >= lo && if inclusive { v <= hi } else { v < hi };
                frame[code[pc + 5] as usize] = Value::Boolean(inside);
                pc += 6;
            }
        }
    }
}
