//! Bytecode generation with register allocation on a stack-like frame.
//!
//! The frame is a single linear array of slots: `[0, argc)` hold the
//! caller's arguments, everything above is an operand stack. `currstack` is
//! the next free slot for the result of the current sub-expression;
//! `maxslots` records how many slots are actually touched (arguments
//! included) and becomes the exact `framesize`.
//!
//! Each emit call receives the slot the parent wants the result in. An
//! `Arg` node emits nothing and redirects the parent to the argument
//! register instead, which is what elides every redundant `MOV` — `x` alone
//! compiles to a single `ret 0`.

use crate::REGS_MAX;
use crate::context::{NativeFn, Signature};
use crate::core::error::Error;
use crate::core::expr::Expr;
use crate::core::value::Value;
use crate::program::{CompiledFunction, FunctEntry};
use crate::vm::opcode::{CodeWord, Opcode};

/// Generate bytecode for an optimized expression with `argc` arguments.
pub(crate) fn generate(expr: &Expr, argc: usize) -> Result<CompiledFunction, Error> {
    if argc > REGS_MAX {
        return Err(Error::TooManyArguments);
    }

    let mut cg = Codegen {
        code: Vec::with_capacity(16),
        functs: Vec::new(),
        currstack: argc,
        maxslots: argc,
    };

    let mut ret = argc;
    cg.expr(expr, &mut ret)?;
    cg.ins1(Opcode::Ret, ret);

    if cg.maxslots > REGS_MAX {
        return Err(Error::ExceedsMaxFrameSize);
    }

    Ok(CompiledFunction {
        argc,
        framesize: cg.maxslots,
        code: cg.code.into_boxed_slice(),
        functs: cg.functs.into_boxed_slice(),
    })
}

struct Codegen {
    code: Vec<CodeWord>,
    functs: Vec<FunctEntry>,
    /// Next free operand slot.
    currstack: usize,
    /// Slots touched so far; arguments count even when never written.
    maxslots: usize,
}

impl Codegen {
    // ------------------------------------------------------------------
    // low-level emitters
    // ------------------------------------------------------------------

    fn mark(&mut self, slot: usize) {
        if self.maxslots < slot + 1 {
            self.maxslots = slot + 1;
        }
    }

    fn ins1(&mut self, op: Opcode, a: usize) {
        self.code.push(op.into());
        self.code.push(a as CodeWord);
    }

    fn ins2(&mut self, op: Opcode, a: usize, b: usize) {
        self.code.push(op.into());
        self.code.push(a as CodeWord);
        self.code.push(b as CodeWord);
    }

    fn ins3(&mut self, op: Opcode, a: usize, b: usize, c: usize) {
        self.code.push(op.into());
        self.code.push(a as CodeWord);
        self.code.push(b as CodeWord);
        self.code.push(c as CodeWord);
    }

    fn val(&mut self, value: f64, target: usize) {
        self.code.push(Opcode::Val.into());
        self.code.push(value.to_bits());
        self.code.push(target as CodeWord);
        self.mark(target);
    }

    fn funct_index(&mut self, funct: NativeFn, argc: usize) -> usize {
        match self
            .functs
            .iter()
            .position(|e| std::ptr::fn_addr_eq(e.funct, funct) && e.argc == argc)
        {
            Some(i) => i,
            None => {
                self.functs.push(FunctEntry { funct, argc });
                self.functs.len() - 1
            }
        }
    }

    // ------------------------------------------------------------------
    // expression emission
    // ------------------------------------------------------------------

    fn expr(&mut self, expr: &Expr, ret: &mut usize) -> Result<(), Error> {
        match expr {
            Expr::Const(Value::Boolean(b)) => {
                self.ins1(if *b { Opcode::Sett } else { Opcode::Setf }, *ret);
                self.mark(*ret);
                Ok(())
            }
            Expr::Const(Value::Number(n)) => {
                self.val(*n, *ret);
                Ok(())
            }

            // no code: the parent reads the argument register directly
            Expr::Arg(i) => {
                *ret = *i;
                Ok(())
            }

            Expr::Neg(e) => self.unary(Opcode::Neg, e, ret),
            Expr::Not(e) => self.unary(Opcode::Not, e, ret),

            Expr::Add(l, r) => self.binary(Opcode::Add, l, r, ret),
            Expr::Sub(l, r) => self.binary(Opcode::Sub, l, r, ret),
            Expr::Mul(l, r) => self.binary(Opcode::Mul, l, r, ret),
            Expr::Div(l, r) => self.binary(Opcode::Div, l, r, ret),
            Expr::Mod(l, r) => self.binary(Opcode::Mod, l, r, ret),
            Expr::Pow(l, r) => self.binary(Opcode::Pow, l, r, ret),

            Expr::Eq(l, r) => self.binary(Opcode::Eq, l, r, ret),
            Expr::Ne(l, r) => self.binary(Opcode::Ne, l, r, ret),
            Expr::Lt(l, r) => self.binary(Opcode::Lt, l, r, ret),
            Expr::Gt(l, r) => self.binary(Opcode::Gt, l, r, ret),
            Expr::Le(l, r) => self.binary(Opcode::Le, l, r, ret),
            Expr::Ge(l, r) => self.binary(Opcode::Ge, l, r, ret),
            Expr::BEq(l, r) => self.binary(Opcode::BEq, l, r, ret),
            Expr::BNe(l, r) => self.binary(Opcode::BNe, l, r, ret),

            Expr::And(l, r) => self.short_circuit(l, r, ret, false),
            Expr::Or(l, r) => self.short_circuit(l, r, ret, true),

            Expr::In(value, range) => self.membership(value, range, ret),
            // ranges are always consumed by `In`
            Expr::RngIncl(..) | Expr::RngExcl(..) => Err(Error::Internal),

            Expr::Iif(cond, then_expr, else_expr) => {
                self.iif(cond, then_expr, else_expr, ret)
            }

            Expr::Call { funct, sig, args } => self.call(*funct, sig, args, ret),
        }
    }

    fn unary(&mut self, op: Opcode, child: &Expr, ret: &mut usize) -> Result<(), Error> {
        let mut operand = *ret;
        self.expr(child, &mut operand)?;
        self.ins2(op, operand, *ret);
        self.mark(*ret);
        Ok(())
    }

    fn binary(&mut self, op: Opcode, l: &Expr, r: &Expr, ret: &mut usize) -> Result<(), Error> {
        let slots = self.operands(&[l, r])?;
        self.ins3(op, slots[0], slots[1], *ret);
        self.mark(*ret);
        Ok(())
    }

    /// Emit operands left to right, each into the operand stack's next free
    /// slot unless it is an argument alias. Restores `currstack` afterwards;
    /// the operand values stay readable until the consuming instruction.
    fn operands(&mut self, children: &[&Expr]) -> Result<Vec<usize>, Error> {
        let entry = self.currstack;
        let mut slots = Vec::with_capacity(children.len());
        for child in children {
            let mut slot = self.currstack;
            self.expr(child, &mut slot)?;
            if slot == self.currstack {
                self.currstack += 1;
            }
            slots.push(slot);
        }
        self.currstack = entry;
        Ok(slots)
    }

    fn membership(&mut self, value: &Expr, range: &Expr, ret: &mut usize) -> Result<(), Error> {
        let (lower, upper, inclusive) = match range {
            Expr::RngIncl(lo, hi) => (&**lo, &**hi, true),
            Expr::RngExcl(lo, hi) => (&**lo, &**hi, false),
            _ => return Err(Error::Internal),
        };
        let slots = self.operands(&[value, lower, upper])?;
        self.code.push(Opcode::In.into());
        self.code.push(slots[0] as CodeWord);
        self.code.push(slots[1] as CodeWord);
        self.code.push(slots[2] as CodeWord);
        self.code.push(CodeWord::from(inclusive));
        self.code.push(*ret as CodeWord);
        self.mark(*ret);
        Ok(())
    }

    fn short_circuit(
        &mut self,
        l: &Expr,
        r: &Expr,
        ret: &mut usize,
        is_or: bool,
    ) -> Result<(), Error> {
        let mut leftret = *ret;
        self.expr(l, &mut leftret)?;

        let patch = self.code.len() + 2;
        self.ins2(
            if is_or { Opcode::Jmpt } else { Opcode::Jmpf },
            leftret,
            0,
        );

        let mut rightret = *ret;
        self.expr(r, &mut rightret)?;
        if rightret != *ret {
            self.ins2(Opcode::Mov, rightret, *ret);
            self.mark(*ret);
        }

        self.code[patch] = self.code.len() as CodeWord;
        if leftret != *ret {
            // the short-circuit path must still leave a definite value
            self.ins1(if is_or { Opcode::Sett } else { Opcode::Setf }, *ret);
            self.mark(*ret);
        }
        Ok(())
    }

    fn iif(
        &mut self,
        cond: &Expr,
        then_expr: &Expr,
        else_expr: &Expr,
        ret: &mut usize,
    ) -> Result<(), Error> {
        let mut cond_slot = *ret;
        self.expr(cond, &mut cond_slot)?;

        let patch_else = self.code.len() + 2;
        self.ins2(Opcode::Jmpf, cond_slot, 0);

        let mut then_slot = *ret;
        self.expr(then_expr, &mut then_slot)?;
        if then_slot != *ret {
            self.ins2(Opcode::Mov, then_slot, *ret);
            self.mark(*ret);
        }

        let patch_end = self.code.len() + 1;
        self.ins1(Opcode::Jmp, 0);
        self.code[patch_else] = self.code.len() as CodeWord;

        let mut else_slot = *ret;
        self.expr(else_expr, &mut else_slot)?;
        if else_slot != *ret {
            self.ins2(Opcode::Mov, else_slot, *ret);
            self.mark(*ret);
        }

        self.code[patch_end] = self.code.len() as CodeWord;
        Ok(())
    }

    fn call(
        &mut self,
        funct: NativeFn,
        sig: &Signature,
        args: &[Expr],
        ret: &mut usize,
    ) -> Result<(), Error> {
        let argc = sig.argc();
        let oldstack = self.currstack;
        let mut firstarg = oldstack;
        let mut packed = 0;

        // Peephole: arguments that already sit consecutively in argument
        // registers need no copies — either all of them, or a prefix that
        // ends exactly at the current stack pointer so the rest can continue
        // in place.
        if argc > 0 {
            if let Expr::Arg(a0) = args[0] {
                firstarg = a0;
                packed = 1;
                while packed < argc {
                    match args[packed] {
                        Expr::Arg(a) if a == firstarg + packed => packed += 1,
                        _ => break,
                    }
                }
                if firstarg + packed != self.currstack && packed != argc {
                    firstarg = oldstack;
                    packed = 0;
                }
            }
        }

        for arg in &args[packed..argc] {
            let mut argret = self.currstack;
            self.expr(arg, &mut argret)?;
            if argret != self.currstack {
                let target = self.currstack;
                self.ins2(Opcode::Mov, argret, target);
                self.mark(target);
            }
            self.currstack += 1;
        }
        self.currstack = oldstack;

        let index = self.funct_index(funct, argc);
        self.code.push(Opcode::Call.into());
        self.code.push(index as CodeWord);
        self.code.push(firstarg as CodeWord);
        self.code.push(*ret as CodeWord);
        self.mark(*ret);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::optimizer;
    use crate::parser;

    fn compile(argnames: &[&str], source: &str) -> CompiledFunction {
        let ctx = Context::with_defaults();
        let expr = parser::parse(&ctx, argnames, source).unwrap();
        let expr = optimizer::optimize(expr).unwrap();
        generate(&expr, argnames.len()).unwrap()
    }

    #[test]
    fn bare_argument_compiles_to_ret_only() {
        let f = compile(&["x"], "x");
        assert_eq!(f.code(), &[CodeWord::from(Opcode::Ret), 0]);
        assert_eq!(f.framesize(), 1);
    }

    #[test]
    fn negation_laws_compile_to_ret_only() {
        let f = compile(&["x"], "-(-x)");
        assert_eq!(f.code(), &[CodeWord::from(Opcode::Ret), 0]);
    }

    #[test]
    fn constant_expression_uses_one_slot() {
        let f = compile(&[], "1 + 2");
        // folded to a single val + ret
        assert_eq!(f.framesize(), 1);
        assert_eq!(f.code()[0], CodeWord::from(Opcode::Val));
    }

    #[test]
    fn binary_on_arguments_needs_one_extra_slot() {
        let f = compile(&["x", "y"], "x + y");
        // add 0, 1, 2; ret 2
        assert_eq!(f.framesize(), 3);
        assert_eq!(
            f.code(),
            &[
                CodeWord::from(Opcode::Add),
                0,
                1,
                2,
                CodeWord::from(Opcode::Ret),
                2
            ]
        );
    }

    #[test]
    fn call_peephole_uses_argument_registers_in_place() {
        let f = compile(&["x", "y"], "atan2(x, y)");
        // no movs: call reads the argument registers directly
        assert_eq!(
            f.code(),
            &[
                CodeWord::from(Opcode::Call),
                0,
                0,
                2,
                CodeWord::from(Opcode::Ret),
                2
            ]
        );
        assert_eq!(f.framesize(), 3);
    }

    #[test]
    fn call_with_swapped_arguments_moves_one() {
        let f = compile(&["x", "y"], "atan2(y, x)");
        // y is already at slot 1, x is copied to slot 2, call reads base 1
        assert_eq!(
            f.code(),
            &[
                CodeWord::from(Opcode::Mov),
                0,
                2,
                CodeWord::from(Opcode::Call),
                0,
                1,
                2,
                CodeWord::from(Opcode::Ret),
                2
            ]
        );
        assert_eq!(f.framesize(), 3);
    }

    #[test]
    fn framesize_matches_operand_depth() {
        // (x+x) + ((x+x) + (x+x)) forces genuine stack growth
        let f = compile(&["x"], "(x + x) + ((x + x) + (x + x))");
        assert_eq!(f.framesize(), 4);
    }

    #[test]
    fn deep_expression_exceeds_frame_limit() {
        // right-leaning comb of non-trivial operands; every level holds one
        // live slot
        let mut source = String::from("x + x");
        for _ in 0..crate::REGS_MAX {
            source = format!("(x + x) + ({source})");
        }
        let ctx = Context::with_defaults();
        let expr = parser::parse(&ctx, &["x"], &source).unwrap();
        let expr = optimizer::optimize(expr).unwrap();
        assert!(matches!(
            generate(&expr, 1),
            Err(Error::ExceedsMaxFrameSize)
        ));
    }

    #[test]
    fn short_circuit_emits_conditional_jump() {
        let f = compile(&["x"], "x > 0 && x < 1");
        let has_jmpf = f
            .code()
            .iter()
            .any(|&w| w == CodeWord::from(Opcode::Jmpf));
        assert!(has_jmpf);
    }

    #[test]
    fn function_table_is_deduplicated() {
        let f = compile(&["x"], "sin(x) + sin(x + 1)");
        assert_eq!(f.functs.len(), 1);
    }
}
