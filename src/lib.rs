#![forbid(unsafe_code)]
//! Compiled arithmetic/logic expression functions.
//!
//! This crate parses small expression functions such as
//! `sin(x) + cos(y * pi)` whose free variables are declared by the caller,
//! type-checks and algebraically simplifies them, compiles them to a
//! compact register-based bytecode and evaluates that bytecode repeatedly
//! at high speed.
//!
//! # Pipeline
//!
//! ```text
//! ┌────────┐   ┌───────────┐   ┌───────────┐   ┌──────────┐
//! │ source │ → │ parser    │ → │ optimizer │ → │ codegen  │ → bytecode
//! └────────┘   │ (typed    │   │ (folding, │   │ (register│
//!              │  AST)     │   │  algebra) │   │  frames) │
//!              └───────────┘   └───────────┘   └──────────┘
//! ```
//!
//! A call allocates (or reuses) a frame of register slots, writes the
//! argument values into the first `argc` slots and runs the interpreter.
//!
//! # Language
//!
//! Numbers are IEEE-754 doubles; `true`/`false`, comparisons and `&&`/`||`
//! (short-circuit) give a boolean type that exists at compile time only.
//! `%` is Euclidean modulo, `**` is exponentiation, `x in 0..10` /
//! `x in 0...10` test range membership (exclusive / inclusive upper bound),
//! `c ? a : b` is the conditional. Callers may bind their own constants and
//! native callbacks through [`Context`]; [`Context::with_defaults`] carries
//! the usual math-library repertoire (`sin`, `atan2`, `gamma`, `j0`, ...)
//! and constants (`pi`, `e`, `tau`, ...).
//!
//! # Example
//!
//! ```
//! let f = mathvm::compile(&["x", "y"], "sin(x) + cos(y * pi)").unwrap();
//! assert!((f.call(&[0.0, 0.0]).unwrap() - 1.0).abs() < 1e-12);
//!
//! // one-shot evaluation without compiling
//! assert_eq!(mathvm::run("x % y", &["x", "y"], &[-1.0, 3.0]).unwrap(), 2.0);
//! ```
//!
//! Compiled functions are immutable and `Send + Sync`; every evaluation
//! uses its own [`Frame`], which hot callers can allocate once and reuse
//! via [`CompiledFunction::call_with_frame`].

mod codegen;
pub mod context;
mod core;
mod math;
mod optimizer;
mod parser;
mod program;
mod vm;

#[cfg(test)]
mod tests;

pub use crate::context::{Context, Decl, NativeFn, Signature, valid_name};
pub use crate::core::errno::Errno;
pub use crate::core::error::{Error, ParseErrorKind, Position};
pub use crate::core::expr::Expr;
pub use crate::core::value::{Type, Value};
pub use crate::math::euclid_mod;
pub use crate::program::{CompiledFunction, Frame};

use crate::core::errno;

/// Maximum number of arguments and maximum register index of a compiled
/// function. Exceeding it is a hard compile error.
pub const REGS_MAX: usize = 256;

/// Compile an expression function against a default context.
///
/// Equivalent to [`Context::compile`] on [`Context::with_defaults`]; build
/// a context yourself to add constants or callbacks.
pub fn compile(argnames: &[&str], source: &str) -> Result<CompiledFunction, Error> {
    Context::with_defaults().compile(argnames, source)
}

/// Parse and evaluate once, directly on the syntax tree.
///
/// No optimizer, no code generation: for one-shot evaluations the compile
/// cost would never amortize. Missing argument values read as `0.0`. The
/// result is identical to compiling and calling on every well-typed input.
pub fn run(source: &str, argnames: &[&str], args: &[f64]) -> Result<f64, Error> {
    context::validate_argnames(argnames)?;
    if argnames.len() > REGS_MAX {
        return Err(Error::TooManyArguments);
    }
    let ctx = Context::with_defaults();
    let expr = parser::parse(&ctx, argnames, source)?;

    let mut values = vec![Value::Number(0.0); argnames.len()];
    for (slot, &arg) in values.iter_mut().zip(args) {
        *slot = Value::Number(arg);
    }

    errno::clear();
    let value = expr.eval(&values);
    match errno::take() {
        Some(e) => Err(Error::from_errno(e)),
        None => Ok(value.number()),
    }
}
