//! Constant folding and algebraic simplification.
//!
//! A single bottom-up pass over the tree, run once between parsing and code
//! generation. Every rule preserves the semantics of evaluations that do not
//! raise a math error on the unoptimized tree, and the pass is idempotent.
//!
//! Folding `**`, `%` and host calls goes through the errno-aware math
//! routines; a raised status aborts the compile with a math error, exactly
//! as the same operation would fail at runtime.
//!
//! Set `MATHVM_TRACE=1` to log every node rewrite to stderr.

use crate::core::errno;
use crate::core::error::Error;
use crate::core::expr::Expr;
use crate::core::value::Value;
use crate::math;

fn trace_enabled() -> bool {
    std::env::var("MATHVM_TRACE")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Simplify `expr`, consuming it.
pub(crate) fn optimize(expr: Expr) -> Result<Expr, Error> {
    let before = if trace_enabled() {
        Some(expr.to_string())
    } else {
        None
    };
    let result = rewrite(expr)?;
    if let Some(before) = before {
        let after = result.to_string();
        if after != before {
            eprintln!("[mathvm] simplify: {before} => {after}");
        }
    }
    Ok(result)
}

fn rewrite(expr: Expr) -> Result<Expr, Error> {
    match expr {
        Expr::Const(_) | Expr::Arg(_) => Ok(expr),

        Expr::Neg(inner) => {
            let inner = optimize(*inner)?;
            Ok(match inner {
                Expr::Neg(child) => *child,
                Expr::Const(v) => Expr::Const(Value::Number(-v.number())),
                other => Expr::Neg(Box::new(other)),
            })
        }

        Expr::Not(inner) => {
            let inner = optimize(*inner)?;
            Ok(match inner {
                Expr::Not(child) => *child,
                Expr::Const(v) => Expr::Const(Value::Boolean(!v.boolean())),
                // the four complementable comparisons; the orderings and `in`
                // are not complementary under NaN
                Expr::Eq(l, r) => Expr::Ne(l, r),
                Expr::Ne(l, r) => Expr::Eq(l, r),
                Expr::BEq(l, r) => Expr::BNe(l, r),
                Expr::BNe(l, r) => Expr::BEq(l, r),
                other => Expr::Not(Box::new(other)),
            })
        }

        Expr::Add(l, r) => fold_arith(Expr::Add, |a, b| a + b, Some(0.0), true, *l, *r),
        Expr::Sub(l, r) => fold_arith(Expr::Sub, |a, b| a - b, Some(0.0), false, *l, *r),
        Expr::Mul(l, r) => fold_arith(Expr::Mul, |a, b| a * b, Some(1.0), true, *l, *r),
        Expr::Div(l, r) => fold_arith(Expr::Div, |a, b| a / b, Some(1.0), false, *l, *r),
        Expr::Mod(l, r) => fold_arith(Expr::Mod, math::euclid_mod, None, false, *l, *r),
        Expr::Pow(l, r) => fold_arith(Expr::Pow, math::pow, Some(1.0), false, *l, *r),

        Expr::Eq(l, r) => fold_cmp(Expr::Eq, |a, b| a == b, *l, *r),
        Expr::Ne(l, r) => fold_cmp(Expr::Ne, |a, b| a != b, *l, *r),
        Expr::Lt(l, r) => fold_cmp(Expr::Lt, |a, b| a < b, *l, *r),
        Expr::Gt(l, r) => fold_cmp(Expr::Gt, |a, b| a > b, *l, *r),
        Expr::Le(l, r) => fold_cmp(Expr::Le, |a, b| a <= b, *l, *r),
        Expr::Ge(l, r) => fold_cmp(Expr::Ge, |a, b| a >= b, *l, *r),

        Expr::BEq(l, r) => fold_bool_cmp(true, *l, *r),
        Expr::BNe(l, r) => fold_bool_cmp(false, *l, *r),

        Expr::And(l, r) => {
            let l = optimize(*l)?;
            let r = optimize(*r)?;
            let lc = const_boolean(&l);
            let rc = const_boolean(&r);
            Ok(match (lc, rc) {
                (Some(a), Some(b)) => Expr::Const(Value::Boolean(a && b)),
                (Some(true), None) => r,
                (None, Some(true)) => l,
                (Some(false), None) | (None, Some(false)) => {
                    Expr::Const(Value::Boolean(false))
                }
                (None, None) => Expr::And(Box::new(l), Box::new(r)),
            })
        }

        Expr::Or(l, r) => {
            let l = optimize(*l)?;
            let r = optimize(*r)?;
            let lc = const_boolean(&l);
            let rc = const_boolean(&r);
            Ok(match (lc, rc) {
                (Some(a), Some(b)) => Expr::Const(Value::Boolean(a || b)),
                (Some(false), None) => r,
                (None, Some(false)) => l,
                (Some(true), None) | (None, Some(true)) => {
                    Expr::Const(Value::Boolean(true))
                }
                (None, None) => Expr::Or(Box::new(l), Box::new(r)),
            })
        }

        Expr::RngIncl(l, r) => Ok(Expr::RngIncl(
            Box::new(optimize(*l)?),
            Box::new(optimize(*r)?),
        )),
        Expr::RngExcl(l, r) => Ok(Expr::RngExcl(
            Box::new(optimize(*l)?),
            Box::new(optimize(*r)?),
        )),

        Expr::In(value, range) => fold_in(*value, *range),

        Expr::Iif(cond, then_expr, else_expr) => {
            let cond = optimize(*cond)?;
            let then_expr = optimize(*then_expr)?;
            let else_expr = optimize(*else_expr)?;
            if let Expr::Const(v) = &cond {
                Ok(if v.boolean() { then_expr } else { else_expr })
            } else {
                Ok(Expr::Iif(
                    Box::new(cond),
                    Box::new(then_expr),
                    Box::new(else_expr),
                ))
            }
        }

        Expr::Call { funct, sig, args } => {
            let args: Vec<Expr> = args
                .into_iter()
                .map(optimize)
                .collect::<Result<_, _>>()?;
            let mut values = Vec::with_capacity(args.len());
            for arg in &args {
                if let Expr::Const(v) = arg {
                    values.push(*v);
                }
            }
            if values.len() == args.len() {
                errno::clear();
                let result = funct(&values);
                if let Some(e) = errno::take() {
                    return Err(Error::from_errno(e));
                }
                return Ok(Expr::Const(result));
            }
            Ok(Expr::Call { funct, sig, args })
        }
    }
}

fn const_number(expr: &Expr) -> Option<f64> {
    match expr {
        Expr::Const(v) => Some(v.number()),
        _ => None,
    }
}

fn const_boolean(expr: &Expr) -> Option<bool> {
    match expr {
        Expr::Const(v) => Some(v.boolean()),
        _ => None,
    }
}

fn fold_arith(
    ctor: fn(Box<Expr>, Box<Expr>) -> Expr,
    op: fn(f64, f64) -> f64,
    neutral: Option<f64>,
    commutative: bool,
    l: Expr,
    r: Expr,
) -> Result<Expr, Error> {
    let l = optimize(l)?;
    let r = optimize(r)?;

    if let (Some(a), Some(b)) = (const_number(&l), const_number(&r)) {
        errno::clear();
        let value = op(a, b);
        if let Some(e) = errno::take() {
            return Err(Error::from_errno(e));
        }
        return Ok(Expr::Const(Value::Number(value)));
    }

    if let Some(n) = neutral {
        if const_number(&r) == Some(n) {
            return Ok(l);
        }
        if commutative && const_number(&l) == Some(n) {
            return Ok(r);
        }
    }

    Ok(ctor(Box::new(l), Box::new(r)))
}

fn fold_cmp(
    ctor: fn(Box<Expr>, Box<Expr>) -> Expr,
    cmp: fn(f64, f64) -> bool,
    l: Expr,
    r: Expr,
) -> Result<Expr, Error> {
    let l = optimize(l)?;
    let r = optimize(r)?;
    if let (Some(a), Some(b)) = (const_number(&l), const_number(&r)) {
        return Ok(Expr::Const(Value::Boolean(cmp(a, b))));
    }
    Ok(ctor(Box::new(l), Box::new(r)))
}

fn fold_bool_cmp(is_eq: bool, l: Expr, r: Expr) -> Result<Expr, Error> {
    let l = optimize(l)?;
    let r = optimize(r)?;
    let lc = const_boolean(&l);
    let rc = const_boolean(&r);

    match (lc, rc) {
        (Some(a), Some(b)) => Ok(Expr::Const(Value::Boolean(if is_eq {
            a == b
        } else {
            a != b
        }))),
        (Some(value), None) | (None, Some(value)) => {
            let other = if lc.is_some() { r } else { l };
            if (is_eq && value) || (!is_eq && !value) {
                Ok(other)
            } else {
                // x beq false == !x; re-optimized so comparison negations apply
                optimize(Expr::Not(Box::new(other)))
            }
        }
        (None, None) => Ok(if is_eq {
            Expr::BEq(Box::new(l), Box::new(r))
        } else {
            Expr::BNe(Box::new(l), Box::new(r))
        }),
    }
}

fn fold_in(value: Expr, range: Expr) -> Result<Expr, Error> {
    let value = optimize(value)?;
    let range = optimize(range)?;

    let Some(v) = const_number(&value) else {
        return Ok(Expr::In(Box::new(value), Box::new(range)));
    };
    let (lower, upper, inclusive) = match range {
        Expr::RngIncl(lo, hi) => (lo, hi, true),
        Expr::RngExcl(lo, hi) => (lo, hi, false),
        other => return Ok(Expr::In(Box::new(value), Box::new(other))),
    };

    let lo_const = const_number(&lower);
    let hi_const = const_number(&upper);
    match (lo_const, hi_const) {
        (Some(lo), Some(hi)) => {
            let result = if inclusive {
                v >= lo && v <= hi
            } else {
                v >= lo && v < hi
            };
            Ok(Expr::Const(Value::Boolean(result)))
        }
        (Some(lo), None) => {
            if v >= lo {
                // only the upper comparison is left to decide
                Ok(if inclusive {
                    Expr::Le(Box::new(value), upper)
                } else {
                    Expr::Lt(Box::new(value), upper)
                })
            } else {
                Ok(Expr::Const(Value::Boolean(false)))
            }
        }
        (None, Some(hi)) => {
            let upper_holds = if inclusive { v <= hi } else { v < hi };
            if upper_holds {
                Ok(Expr::Ge(Box::new(value), lower))
            } else {
                Ok(Expr::Const(Value::Boolean(false)))
            }
        }
        (None, None) => {
            let range = if inclusive {
                Expr::RngIncl(lower, upper)
            } else {
                Expr::RngExcl(lower, upper)
            };
            Ok(Expr::In(Box::new(value), Box::new(range)))
        }
    }
}
