//! The default constant and function set.
//!
//! Every binding is a plain `fn` so the disassembler can resolve calls back
//! to names by pointer identity. Functions the standard library lacks
//! (`erf`, `gamma`, the Bessel family, `logb`, `nextafter`, `remainder`)
//! come from [`crate::math`]; the rest wrap the float intrinsics through the
//! errno-reporting helpers so domain and range errors surface the way the
//! math library's protocol promises.

use std::f64::consts;

use super::{Context, Signature};
use crate::core::error::Error;
use crate::core::value::Value;
use crate::math;

fn funct_acos(args: &[Value]) -> Value {
    Value::Number(math::checked_unary(args[0].number(), f64::acos))
}

fn funct_acosh(args: &[Value]) -> Value {
    Value::Number(math::checked_unary(args[0].number(), f64::acosh))
}

fn funct_asin(args: &[Value]) -> Value {
    Value::Number(math::checked_unary(args[0].number(), f64::asin))
}

fn funct_asinh(args: &[Value]) -> Value {
    Value::Number(math::checked_unary(args[0].number(), f64::asinh))
}

fn funct_atan(args: &[Value]) -> Value {
    Value::Number(args[0].number().atan())
}

fn funct_atan2(args: &[Value]) -> Value {
    Value::Number(args[0].number().atan2(args[1].number()))
}

fn funct_atanh(args: &[Value]) -> Value {
    Value::Number(math::checked_unary(args[0].number(), f64::atanh))
}

fn funct_cbrt(args: &[Value]) -> Value {
    Value::Number(args[0].number().cbrt())
}

fn funct_ceil(args: &[Value]) -> Value {
    Value::Number(args[0].number().ceil())
}

fn funct_copysign(args: &[Value]) -> Value {
    Value::Number(args[0].number().copysign(args[1].number()))
}

fn funct_cos(args: &[Value]) -> Value {
    Value::Number(math::checked_unary(args[0].number(), f64::cos))
}

fn funct_cosh(args: &[Value]) -> Value {
    Value::Number(math::checked_unary(args[0].number(), f64::cosh))
}

fn funct_erf(args: &[Value]) -> Value {
    Value::Number(math::special::erf(args[0].number()))
}

fn funct_erfc(args: &[Value]) -> Value {
    Value::Number(math::special::erfc(args[0].number()))
}

fn funct_exp(args: &[Value]) -> Value {
    Value::Number(math::checked_unary(args[0].number(), f64::exp))
}

fn funct_exp2(args: &[Value]) -> Value {
    Value::Number(math::checked_unary(args[0].number(), f64::exp2))
}

fn funct_expm1(args: &[Value]) -> Value {
    Value::Number(math::checked_unary(args[0].number(), f64::exp_m1))
}

fn funct_abs(args: &[Value]) -> Value {
    Value::Number(args[0].number().abs())
}

fn funct_fdim(args: &[Value]) -> Value {
    Value::Number(math::fdim(args[0].number(), args[1].number()))
}

fn funct_floor(args: &[Value]) -> Value {
    Value::Number(args[0].number().floor())
}

fn funct_fma(args: &[Value]) -> Value {
    Value::Number(math::checked_ternary(
        args[0].number(),
        args[1].number(),
        args[2].number(),
        f64::mul_add,
    ))
}

fn funct_fmod(args: &[Value]) -> Value {
    Value::Number(math::checked_binary(
        args[0].number(),
        args[1].number(),
        |x, y| x % y,
    ))
}

fn funct_max(args: &[Value]) -> Value {
    // not fmax: NaN propagates through the left operand
    let x = args[0].number();
    let y = args[1].number();
    Value::Number(if x >= y || x.is_nan() { x } else { y })
}

fn funct_min(args: &[Value]) -> Value {
    let x = args[0].number();
    let y = args[1].number();
    Value::Number(if x <= y || x.is_nan() { x } else { y })
}

fn funct_hypot(args: &[Value]) -> Value {
    Value::Number(math::checked_binary(
        args[0].number(),
        args[1].number(),
        f64::hypot,
    ))
}

fn funct_j0(args: &[Value]) -> Value {
    Value::Number(math::checked_unary(args[0].number(), math::bessel::j0))
}

fn funct_j1(args: &[Value]) -> Value {
    Value::Number(math::checked_unary(args[0].number(), math::bessel::j1))
}

fn funct_jn(args: &[Value]) -> Value {
    let n = args[0].number() as i32;
    Value::Number(math::checked_unary(args[1].number(), |x| {
        math::bessel::jn(n, x)
    }))
}

fn funct_ldexp(args: &[Value]) -> Value {
    let exp = args[1].number() as i32;
    Value::Number(math::checked_unary(args[0].number(), |x| {
        math::ldexp(x, exp)
    }))
}

fn funct_log(args: &[Value]) -> Value {
    Value::Number(math::checked_unary(args[0].number(), f64::ln))
}

fn funct_log10(args: &[Value]) -> Value {
    Value::Number(math::checked_unary(args[0].number(), f64::log10))
}

fn funct_log1p(args: &[Value]) -> Value {
    Value::Number(math::checked_unary(args[0].number(), f64::ln_1p))
}

fn funct_log2(args: &[Value]) -> Value {
    Value::Number(math::checked_unary(args[0].number(), f64::log2))
}

fn funct_logb(args: &[Value]) -> Value {
    Value::Number(math::checked_unary(args[0].number(), math::logb))
}

fn funct_nearbyint(args: &[Value]) -> Value {
    Value::Number(args[0].number().round_ties_even())
}

fn funct_nextafter(args: &[Value]) -> Value {
    Value::Number(math::checked_binary(
        args[0].number(),
        args[1].number(),
        math::next_after,
    ))
}

fn funct_nexttoward(args: &[Value]) -> Value {
    Value::Number(math::checked_binary(
        args[0].number(),
        args[1].number(),
        math::next_after,
    ))
}

fn funct_remainder(args: &[Value]) -> Value {
    Value::Number(math::checked_binary(
        args[0].number(),
        args[1].number(),
        math::remainder,
    ))
}

fn funct_round(args: &[Value]) -> Value {
    Value::Number(args[0].number().round())
}

fn funct_scalbln(args: &[Value]) -> Value {
    let exp = args[1].number() as i32;
    Value::Number(math::checked_unary(args[0].number(), |x| {
        math::ldexp(x, exp)
    }))
}

fn funct_sin(args: &[Value]) -> Value {
    Value::Number(math::checked_unary(args[0].number(), f64::sin))
}

fn funct_sinh(args: &[Value]) -> Value {
    Value::Number(math::checked_unary(args[0].number(), f64::sinh))
}

fn funct_sqrt(args: &[Value]) -> Value {
    Value::Number(math::checked_unary(args[0].number(), f64::sqrt))
}

fn funct_tan(args: &[Value]) -> Value {
    Value::Number(math::checked_unary(args[0].number(), f64::tan))
}

fn funct_tanh(args: &[Value]) -> Value {
    Value::Number(args[0].number().tanh())
}

fn funct_gamma(args: &[Value]) -> Value {
    Value::Number(math::checked_unary(args[0].number(), math::special::gamma))
}

fn funct_trunc(args: &[Value]) -> Value {
    Value::Number(args[0].number().trunc())
}

fn funct_y0(args: &[Value]) -> Value {
    Value::Number(math::checked_unary(args[0].number(), math::bessel::y0))
}

fn funct_y1(args: &[Value]) -> Value {
    Value::Number(math::checked_unary(args[0].number(), math::bessel::y1))
}

fn funct_yn(args: &[Value]) -> Value {
    let n = args[0].number() as i32;
    Value::Number(math::checked_unary(args[1].number(), |x| {
        math::bessel::yn(n, x)
    }))
}

fn funct_isnan(args: &[Value]) -> Value {
    Value::Boolean(args[0].number().is_nan())
}

fn funct_isinf(args: &[Value]) -> Value {
    Value::Boolean(args[0].number().is_infinite())
}

fn funct_isfinite(args: &[Value]) -> Value {
    Value::Boolean(args[0].number().is_finite())
}

fn funct_isnormal(args: &[Value]) -> Value {
    Value::Boolean(args[0].number().is_normal())
}

pub(super) fn define_defaults(ctx: &mut Context) -> Result<(), Error> {
    ctx.define_const("e", consts::E)?;
    ctx.define_const("log2e", consts::LOG2_E)?;
    ctx.define_const("log10e", consts::LOG10_E)?;
    ctx.define_const("ln2", consts::LN_2)?;
    ctx.define_const("ln10", consts::LN_10)?;
    ctx.define_const("pi", consts::PI)?;
    ctx.define_const("tau", consts::TAU)?;
    ctx.define_const("pi_2", consts::FRAC_PI_2)?;
    ctx.define_const("pi_4", consts::FRAC_PI_4)?;
    ctx.define_const("_1_pi", consts::FRAC_1_PI)?;
    ctx.define_const("_2_pi", consts::FRAC_2_PI)?;
    ctx.define_const("_2_sqrtpi", consts::FRAC_2_SQRT_PI)?;
    ctx.define_const("sqrt2", consts::SQRT_2)?;
    ctx.define_const("sqrt1_2", consts::FRAC_1_SQRT_2)?;

    ctx.define_funct("acos", funct_acos, Signature::numeric(1))?;
    ctx.define_funct("acosh", funct_acosh, Signature::numeric(1))?;
    ctx.define_funct("asin", funct_asin, Signature::numeric(1))?;
    ctx.define_funct("asinh", funct_asinh, Signature::numeric(1))?;
    ctx.define_funct("atan", funct_atan, Signature::numeric(1))?;
    ctx.define_funct("atan2", funct_atan2, Signature::numeric(2))?;
    ctx.define_funct("atanh", funct_atanh, Signature::numeric(1))?;
    ctx.define_funct("cbrt", funct_cbrt, Signature::numeric(1))?;
    ctx.define_funct("ceil", funct_ceil, Signature::numeric(1))?;
    ctx.define_funct("copysign", funct_copysign, Signature::numeric(2))?;
    ctx.define_funct("cos", funct_cos, Signature::numeric(1))?;
    ctx.define_funct("cosh", funct_cosh, Signature::numeric(1))?;
    ctx.define_funct("erf", funct_erf, Signature::numeric(1))?;
    ctx.define_funct("erfc", funct_erfc, Signature::numeric(1))?;
    ctx.define_funct("exp", funct_exp, Signature::numeric(1))?;
    ctx.define_funct("exp2", funct_exp2, Signature::numeric(1))?;
    ctx.define_funct("expm1", funct_expm1, Signature::numeric(1))?;
    ctx.define_funct("abs", funct_abs, Signature::numeric(1))?;
    ctx.define_funct("fdim", funct_fdim, Signature::numeric(2))?;
    ctx.define_funct("floor", funct_floor, Signature::numeric(1))?;
    ctx.define_funct("fma", funct_fma, Signature::numeric(3))?;
    ctx.define_funct("fmod", funct_fmod, Signature::numeric(2))?;
    ctx.define_funct("max", funct_max, Signature::numeric(2))?;
    ctx.define_funct("min", funct_min, Signature::numeric(2))?;
    ctx.define_funct("hypot", funct_hypot, Signature::numeric(2))?;
    ctx.define_funct("j0", funct_j0, Signature::numeric(1))?;
    ctx.define_funct("j1", funct_j1, Signature::numeric(1))?;
    ctx.define_funct("jn", funct_jn, Signature::numeric(2))?;
    ctx.define_funct("ldexp", funct_ldexp, Signature::numeric(2))?;
    ctx.define_funct("log", funct_log, Signature::numeric(1))?;
    ctx.define_funct("log10", funct_log10, Signature::numeric(1))?;
    ctx.define_funct("log1p", funct_log1p, Signature::numeric(1))?;
    ctx.define_funct("log2", funct_log2, Signature::numeric(1))?;
    ctx.define_funct("logb", funct_logb, Signature::numeric(1))?;
    ctx.define_funct("nearbyint", funct_nearbyint, Signature::numeric(1))?;
    ctx.define_funct("nextafter", funct_nextafter, Signature::numeric(2))?;
    ctx.define_funct("nexttoward", funct_nexttoward, Signature::numeric(2))?;
    ctx.define_funct("remainder", funct_remainder, Signature::numeric(2))?;
    ctx.define_funct("round", funct_round, Signature::numeric(1))?;
    ctx.define_funct("scalbln", funct_scalbln, Signature::numeric(2))?;
    ctx.define_funct("sin", funct_sin, Signature::numeric(1))?;
    ctx.define_funct("sinh", funct_sinh, Signature::numeric(1))?;
    ctx.define_funct("sqrt", funct_sqrt, Signature::numeric(1))?;
    ctx.define_funct("tan", funct_tan, Signature::numeric(1))?;
    ctx.define_funct("tanh", funct_tanh, Signature::numeric(1))?;
    ctx.define_funct("gamma", funct_gamma, Signature::numeric(1))?;
    ctx.define_funct("trunc", funct_trunc, Signature::numeric(1))?;
    ctx.define_funct("y0", funct_y0, Signature::numeric(1))?;
    ctx.define_funct("y1", funct_y1, Signature::numeric(1))?;
    ctx.define_funct("yn", funct_yn, Signature::numeric(2))?;

    ctx.define_funct("isnan", funct_isnan, Signature::predicate())?;
    ctx.define_funct("isinf", funct_isinf, Signature::predicate())?;
    ctx.define_funct("isfinite", funct_isfinite, Signature::predicate())?;
    ctx.define_funct("isnormal", funct_isnormal, Signature::predicate())?;

    Ok(())
}
