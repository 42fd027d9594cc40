//! Compiled expression functions and their evaluation frames.

use std::io;

use crate::context::{Context, NativeFn};
use crate::core::errno;
use crate::core::error::Error;
use crate::core::value::Value;
use crate::vm;
use crate::vm::opcode::CodeWord;

/// A host callback copied out of the context at compile time, together with
/// the number of frame slots it reads. `CALL` immediates index into a table
/// of these, so a compiled function never borrows its context.
#[derive(Debug, Clone)]
pub(crate) struct FunctEntry {
    pub(crate) funct: NativeFn,
    pub(crate) argc: usize,
}

/// A compiled expression function: bytecode, its function table and the
/// exact frame size any evaluation needs.
///
/// Immutable after compilation and safe to share across threads; each
/// concurrent evaluation uses its own [`Frame`].
///
/// # Example
///
/// ```
/// let f = mathvm::compile(&["x"], "x * x + 1").unwrap();
/// assert_eq!(f.call(&[3.0]).unwrap(), 10.0);
/// ```
#[derive(Debug, Clone)]
pub struct CompiledFunction {
    pub(crate) argc: usize,
    pub(crate) framesize: usize,
    pub(crate) code: Box<[CodeWord]>,
    pub(crate) functs: Box<[FunctEntry]>,
}

/// A register frame for one evaluation: the only mutable state while a
/// compiled function runs, and the only per-call allocation. Reuse one
/// across calls on hot paths via [`CompiledFunction::call_with_frame`].
#[derive(Debug, Clone)]
pub struct Frame {
    slots: Vec<Value>,
}

impl Frame {
    pub(crate) fn slots_mut(&mut self) -> &mut [Value] {
        &mut self.slots
    }
}

impl CompiledFunction {
    /// Number of arguments the function takes.
    pub fn argc(&self) -> usize {
        self.argc
    }

    /// Number of register slots an evaluation uses, arguments included.
    pub fn framesize(&self) -> usize {
        self.framesize
    }

    pub(crate) fn code(&self) -> &[CodeWord] {
        &self.code
    }

    pub(crate) fn funct(&self, index: usize) -> &FunctEntry {
        &self.functs[index]
    }

    /// Allocate a frame sized for this function.
    pub fn frame(&self) -> Frame {
        Frame {
            slots: vec![Value::Number(0.0); self.framesize],
        }
    }

    /// Evaluate with a freshly allocated frame.
    ///
    /// Missing arguments read as `0.0`; extra arguments are ignored. Fails
    /// with a math or host error if a callback (or `%` by zero) left the
    /// math-error status set.
    pub fn call(&self, args: &[f64]) -> Result<f64, Error> {
        let mut frame = self.frame();
        self.call_with_frame(args, &mut frame)
    }

    /// Evaluate reusing a caller-owned frame.
    ///
    /// The frame is grown if it is too small; no other slots than the
    /// argument registers are reset between calls.
    pub fn call_with_frame(&self, args: &[f64], frame: &mut Frame) -> Result<f64, Error> {
        if frame.slots.len() < self.framesize {
            frame.slots.resize(self.framesize, Value::Number(0.0));
        }
        let filled = args.len().min(self.argc);
        for (slot, &arg) in frame.slots.iter_mut().zip(&args[..filled]) {
            *slot = Value::Number(arg);
        }
        for slot in &mut frame.slots[filled..self.argc] {
            *slot = Value::Number(0.0);
        }

        errno::clear();
        let value = vm::exec(self, frame.slots_mut())?;
        match errno::take() {
            Some(e) => Err(Error::from_errno(e)),
            None => Ok(value.number()),
        }
    }

    /// Write a disassembly listing of the bytecode to `out`.
    ///
    /// `ctx` resolves `call` targets back to their declared names; pass the
    /// context the function was compiled against, or `None` for raw table
    /// indices.
    pub fn dump<W: io::Write>(&self, out: &mut W, ctx: Option<&Context>) -> Result<(), Error> {
        vm::disasm::dump(self, out, ctx)
    }
}
