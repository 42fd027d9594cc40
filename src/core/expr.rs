//! Typed abstract syntax tree for expression functions.
//!
//! The parser produces this tree already type-checked (see the invariants on
//! each constructor site in `parser`), the optimizer rewrites it, the code
//! generator lowers it to bytecode, and [`Expr::eval`] walks it directly for
//! one-shot evaluation where compiling would only add overhead.
//!
//! Children are owned through `Box`: the tree is a tree, never a DAG.

use std::fmt;

use crate::context::{NativeFn, Signature};
use crate::core::value::{Type, Value};
use crate::math;

/// One node of the expression tree.
#[derive(Debug, Clone, PartialEq)]
#[allow(unpredictable_function_pointer_comparisons)]
pub enum Expr {
    /// Literal value (number or boolean).
    Const(Value),
    /// Caller-supplied argument by index.
    Arg(usize),

    /// Numeric negation.
    Neg(Box<Expr>),
    /// Boolean negation.
    Not(Box<Expr>),

    /// Addition.
    Add(Box<Expr>, Box<Expr>),
    /// Subtraction.
    Sub(Box<Expr>, Box<Expr>),
    /// Multiplication.
    Mul(Box<Expr>, Box<Expr>),
    /// Division.
    Div(Box<Expr>, Box<Expr>),
    /// Euclidean modulo.
    Mod(Box<Expr>, Box<Expr>),
    /// Exponentiation.
    Pow(Box<Expr>, Box<Expr>),

    /// Numeric equality.
    Eq(Box<Expr>, Box<Expr>),
    /// Numeric inequality.
    Ne(Box<Expr>, Box<Expr>),
    /// Less than.
    Lt(Box<Expr>, Box<Expr>),
    /// Greater than.
    Gt(Box<Expr>, Box<Expr>),
    /// Less than or equal.
    Le(Box<Expr>, Box<Expr>),
    /// Greater than or equal.
    Ge(Box<Expr>, Box<Expr>),

    /// Boolean equality.
    BEq(Box<Expr>, Box<Expr>),
    /// Boolean inequality.
    BNe(Box<Expr>, Box<Expr>),

    /// Short-circuit conjunction.
    And(Box<Expr>, Box<Expr>),
    /// Short-circuit disjunction.
    Or(Box<Expr>, Box<Expr>),

    /// Range with inclusive upper bound. Only appears inside [`Expr::In`].
    RngIncl(Box<Expr>, Box<Expr>),
    /// Range with exclusive upper bound. Only appears inside [`Expr::In`].
    RngExcl(Box<Expr>, Box<Expr>),
    /// Range membership: value on the left, range on the right.
    In(Box<Expr>, Box<Expr>),

    /// Conditional expression `cond ? then : else`.
    Iif(Box<Expr>, Box<Expr>, Box<Expr>),

    /// Call of a host function binding.
    Call {
        /// The bound callback.
        funct: NativeFn,
        /// Its declared signature.
        sig: Signature,
        /// One argument expression per signature slot.
        args: Vec<Expr>,
    },
}

impl Expr {
    /// The static type of this expression.
    ///
    /// Ranges have no type of their own; they report `Number` (the type of
    /// their endpoints) and are never queried in a typed position.
    pub fn ty(&self) -> Type {
        match self {
            Expr::Const(v) => v.ty(),
            Expr::Call { sig, .. } => sig.rettype,
            Expr::Iif(_, then_expr, _) => then_expr.ty(),
            Expr::Arg(_)
            | Expr::Neg(_)
            | Expr::Add(..)
            | Expr::Sub(..)
            | Expr::Mul(..)
            | Expr::Div(..)
            | Expr::Mod(..)
            | Expr::Pow(..)
            | Expr::RngIncl(..)
            | Expr::RngExcl(..) => Type::Number,
            Expr::Not(_)
            | Expr::Eq(..)
            | Expr::Ne(..)
            | Expr::Lt(..)
            | Expr::Gt(..)
            | Expr::Le(..)
            | Expr::Ge(..)
            | Expr::BEq(..)
            | Expr::BNe(..)
            | Expr::And(..)
            | Expr::Or(..)
            | Expr::In(..) => Type::Boolean,
        }
    }

    /// Evaluate the tree directly against argument values.
    ///
    /// Math errors are reported through the thread-local status, exactly like
    /// the bytecode interpreter: the caller clears it before and inspects it
    /// after. Short-circuit operators do not evaluate their right operand
    /// when the left one decides.
    pub(crate) fn eval(&self, args: &[Value]) -> Value {
        match self {
            Expr::Const(v) => *v,
            Expr::Arg(i) => args[*i],

            Expr::Neg(e) => Value::Number(-e.eval(args).number()),
            Expr::Not(e) => Value::Boolean(!e.eval(args).boolean()),

            Expr::Add(l, r) => Value::Number(l.eval(args).number() + r.eval(args).number()),
            Expr::Sub(l, r) => Value::Number(l.eval(args).number() - r.eval(args).number()),
            Expr::Mul(l, r) => Value::Number(l.eval(args).number() * r.eval(args).number()),
            Expr::Div(l, r) => Value::Number(l.eval(args).number() / r.eval(args).number()),
            Expr::Mod(l, r) => Value::Number(math::euclid_mod(
                l.eval(args).number(),
                r.eval(args).number(),
            )),
            Expr::Pow(l, r) => {
                Value::Number(l.eval(args).number().powf(r.eval(args).number()))
            }

            Expr::Eq(l, r) => Value::Boolean(l.eval(args).number() == r.eval(args).number()),
            Expr::Ne(l, r) => Value::Boolean(l.eval(args).number() != r.eval(args).number()),
            Expr::Lt(l, r) => Value::Boolean(l.eval(args).number() < r.eval(args).number()),
            Expr::Gt(l, r) => Value::Boolean(l.eval(args).number() > r.eval(args).number()),
            Expr::Le(l, r) => Value::Boolean(l.eval(args).number() <= r.eval(args).number()),
            Expr::Ge(l, r) => Value::Boolean(l.eval(args).number() >= r.eval(args).number()),

            Expr::BEq(l, r) => Value::Boolean(l.eval(args).boolean() == r.eval(args).boolean()),
            Expr::BNe(l, r) => Value::Boolean(l.eval(args).boolean() != r.eval(args).boolean()),

            Expr::And(l, r) => {
                Value::Boolean(l.eval(args).boolean() && r.eval(args).boolean())
            }
            Expr::Or(l, r) => Value::Boolean(l.eval(args).boolean() || r.eval(args).boolean()),

            Expr::In(value, range) => {
                let v = value.eval(args).number();
                match &**range {
                    Expr::RngIncl(lo, hi) => {
                        let lo = lo.eval(args).number();
                        let hi = hi.eval(args).number();
                        Value::Boolean(v >= lo && v <= hi)
                    }
                    Expr::RngExcl(lo, hi) => {
                        let lo = lo.eval(args).number();
                        let hi = hi.eval(args).number();
                        Value::Boolean(v >= lo && v < hi)
                    }
                    // a range is the only thing the parser puts here
                    _ => Value::Boolean(false),
                }
            }
            // bare ranges never appear outside `In`
            Expr::RngIncl(..) | Expr::RngExcl(..) => Value::Number(f64::NAN),

            Expr::Iif(cond, then_expr, else_expr) => {
                if cond.eval(args).boolean() {
                    then_expr.eval(args)
                } else {
                    else_expr.eval(args)
                }
            }

            Expr::Call { funct, args: call_args, .. } => {
                let values: Vec<Value> = call_args.iter().map(|a| a.eval(args)).collect();
                funct(&values)
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(v) => write!(f, "{v}"),
            Expr::Arg(i) => write!(f, "${i}"),
            Expr::Neg(e) => write!(f, "(-{e})"),
            Expr::Not(e) => write!(f, "(!{e})"),
            Expr::Add(l, r) => write!(f, "({l} + {r})"),
            Expr::Sub(l, r) => write!(f, "({l} - {r})"),
            Expr::Mul(l, r) => write!(f, "({l} * {r})"),
            Expr::Div(l, r) => write!(f, "({l} / {r})"),
            Expr::Mod(l, r) => write!(f, "({l} % {r})"),
            Expr::Pow(l, r) => write!(f, "({l} ** {r})"),
            Expr::Eq(l, r) => write!(f, "({l} == {r})"),
            Expr::Ne(l, r) => write!(f, "({l} != {r})"),
            Expr::Lt(l, r) => write!(f, "({l} < {r})"),
            Expr::Gt(l, r) => write!(f, "({l} > {r})"),
            Expr::Le(l, r) => write!(f, "({l} <= {r})"),
            Expr::Ge(l, r) => write!(f, "({l} >= {r})"),
            Expr::BEq(l, r) => write!(f, "({l} == {r})"),
            Expr::BNe(l, r) => write!(f, "({l} != {r})"),
            Expr::And(l, r) => write!(f, "({l} && {r})"),
            Expr::Or(l, r) => write!(f, "({l} || {r})"),
            Expr::RngIncl(l, r) => write!(f, "{l} ... {r}"),
            Expr::RngExcl(l, r) => write!(f, "{l} .. {r}"),
            Expr::In(v, range) => write!(f, "({v} in {range})"),
            Expr::Iif(c, t, e) => write!(f, "({c} ? {t} : {e})"),
            Expr::Call { args, .. } => {
                f.write_str("<funct>(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}
