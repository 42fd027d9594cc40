//! Compile-and-call scenarios, boundary behaviors and the compile/run
//! round-trip.

use crate::core::errno::Errno;
use crate::{Context, Error, ParseErrorKind, REGS_MAX, Signature, Value, compile, run};

fn eval(source: &str) -> f64 {
    compile(&[], source).unwrap().call(&[]).unwrap()
}

#[test]
fn operator_precedence() {
    assert_eq!(eval("1 + 2 * 3"), 7.0);
    assert_eq!(eval("(1 + 2) * 3"), 9.0);
    assert_eq!(eval("2 ** 10"), 1024.0);
}

#[test]
fn unary_and_power() {
    assert_eq!(eval("-2 ** 2"), -4.0);
    assert_eq!(eval("2 ** -1"), 0.5);
}

#[test]
fn sin_of_zero() {
    let f = compile(&["x"], "sin(x)").unwrap();
    assert_eq!(f.call(&[0.0]).unwrap(), 0.0);
}

#[test]
fn euclidean_modulo() {
    let f = compile(&["x", "y"], "x % y").unwrap();
    assert_eq!(f.call(&[-1.0, 3.0]).unwrap(), 2.0);
    assert_eq!(f.call(&[7.0, 3.0]).unwrap(), 1.0);
    assert_eq!(f.call(&[-7.0, -3.0]).unwrap(), -1.0);
}

#[test]
fn modulo_by_zero_is_a_math_error() {
    let f = compile(&["x", "y"], "x % y").unwrap();
    assert!(matches!(
        f.call(&[1.0, 0.0]),
        Err(Error::Math {
            errno: Errno::Domain
        })
    ));
    assert!(matches!(
        run("x % y", &["x", "y"], &[1.0, 0.0]),
        Err(Error::Math {
            errno: Errno::Domain
        })
    ));
}

#[test]
fn range_membership_bounds() {
    let f = compile(&["x"], "x in 0..10").unwrap();
    assert_eq!(f.call(&[10.0]).unwrap(), 0.0);
    assert_eq!(f.call(&[9.5]).unwrap(), 1.0);
    assert_eq!(f.call(&[0.0]).unwrap(), 1.0);
    assert_eq!(f.call(&[-0.1]).unwrap(), 0.0);

    let g = compile(&["x"], "x in 0...10").unwrap();
    assert_eq!(g.call(&[10.0]).unwrap(), 1.0);
    assert_eq!(g.call(&[10.1]).unwrap(), 0.0);
}

#[test]
fn conditional_with_calls() {
    let f = compile(&["x"], "x > 0 ? sqrt(x) : -sqrt(-x)").unwrap();
    assert_eq!(f.call(&[-4.0]).unwrap(), -2.0);
    assert_eq!(f.call(&[4.0]).unwrap(), 2.0);
    assert_eq!(f.call(&[0.0]).unwrap(), 0.0);
}

#[test]
fn short_circuit_hides_infinity() {
    // 1/0 is IEEE +inf, no error; +inf > 0 is true
    assert_eq!(eval("true && (1/0 > 0)"), 1.0);
}

#[test]
fn dead_branches_still_resolve_names() {
    let err = compile(&[], "false && undefined_name").unwrap_err();
    assert!(matches!(
        err,
        Error::Parse {
            kind: ParseErrorKind::UndefinedReference { .. },
            ..
        }
    ));
}

#[test]
fn max_propagates_left_nan() {
    assert!(eval("max(nan, 1)").is_nan());
    assert_eq!(eval("max(1, 2)"), 2.0);
}

#[test]
fn zero_argument_function() {
    let f = compile(&[], "1 + 2").unwrap();
    assert_eq!(f.argc(), 0);
    assert_eq!(f.call(&[]).unwrap(), 3.0);
}

#[test]
fn missing_arguments_read_as_zero() {
    let f = compile(&["x", "y"], "x + y").unwrap();
    assert_eq!(f.call(&[2.0]).unwrap(), 2.0);
    assert_eq!(f.call(&[2.0, 3.0, 99.0]).unwrap(), 5.0);
}

#[test]
fn argc_boundary() {
    let names: Vec<String> = (0..=REGS_MAX).map(|i| format!("a{i}")).collect();

    let max_names: Vec<&str> = names[..REGS_MAX].iter().map(String::as_str).collect();
    let f = compile(&max_names, "a5").unwrap();
    let mut args = vec![0.0; REGS_MAX];
    args[5] = 42.0;
    assert_eq!(f.call(&args).unwrap(), 42.0);

    let too_many: Vec<&str> = names.iter().map(String::as_str).collect();
    assert!(matches!(
        compile(&too_many, "a5"),
        Err(Error::TooManyArguments)
    ));
}

#[test]
fn duplicate_argument_name() {
    assert!(matches!(
        compile(&["x", "x"], "x"),
        Err(Error::DuplicateArgument { .. })
    ));
}

#[test]
fn invalid_argument_name() {
    assert!(matches!(
        compile(&["2x"], "2x"),
        Err(Error::IllegalName { .. })
    ));
    assert!(matches!(
        compile(&["in"], "in"),
        Err(Error::IllegalName { .. })
    ));
}

#[test]
fn wrong_arity_for_sin() {
    let err = compile(&["x"], "sin(x, x)").unwrap_err();
    assert!(matches!(
        err,
        Error::Parse {
            kind: ParseErrorKind::IllegalNumberOfArguments {
                expected: 1,
                got: 2
            },
            ..
        }
    ));
}

#[test]
fn trailing_garbage_column() {
    let err = compile(&[], "1 + 2 )").unwrap_err();
    let pos = err.position().unwrap();
    assert_eq!((pos.lineno, pos.column), (1, 7));
}

#[test]
fn compile_and_run_agree() {
    let cases: &[(&str, &[&str], &[f64])] = &[
        ("1 + 2 * 3", &[], &[]),
        ("x * y - y / x", &["x", "y"], &[3.0, 7.0]),
        ("sin(x) * cos(y) + tan(x * y)", &["x", "y"], &[0.3, 1.7]),
        ("x % y", &["x", "y"], &[-8.5, 3.25]),
        ("x in 1..5 ? x * 2 : x / 2", &["x"], &[3.0]),
        ("x in 1..5 ? x * 2 : x / 2", &["x"], &[7.0]),
        ("hypot(x, y) ** 2", &["x", "y"], &[3.0, 4.0]),
        ("isnan(x / y) ? -1 : x / y", &["x", "y"], &[0.0, 0.0]),
        ("max(x, min(y, 10))", &["x", "y"], &[2.0, 20.0]),
        ("-(-x)", &["x"], &[1.5]),
        ("!(x == 1) ? 10 : 20", &["x"], &[1.0]),
    ];
    for &(source, argnames, args) in cases {
        let compiled = compile(argnames, source).unwrap().call(args).unwrap();
        let direct = run(source, argnames, args).unwrap();
        assert_eq!(
            compiled.to_bits(),
            direct.to_bits(),
            "source {source:?} args {args:?}"
        );
    }
}

#[test]
fn frame_reuse_across_calls() {
    let f = compile(&["x"], "x * x + 1").unwrap();
    let mut frame = f.frame();
    for i in 0..100 {
        let x = f64::from(i);
        assert_eq!(f.call_with_frame(&[x], &mut frame).unwrap(), x * x + 1.0);
    }
}

#[test]
fn custom_context_declarations() {
    fn twice(args: &[Value]) -> Value {
        Value::Number(args[0].number() * 2.0)
    }

    let mut ctx = Context::with_defaults();
    ctx.define_const("answer", 42.0).unwrap();
    ctx.define_funct("twice", twice, Signature::numeric(1))
        .unwrap();

    let f = ctx.compile(&["x"], "twice(x) + answer").unwrap();
    assert_eq!(f.call(&[4.0]).unwrap(), 50.0);
}

#[test]
fn context_can_be_dropped_before_calls() {
    let f = {
        let ctx = Context::with_defaults();
        ctx.compile(&["x"], "sqrt(x) + pi").unwrap()
    };
    assert_eq!(f.call(&[4.0]).unwrap(), 2.0 + std::f64::consts::PI);
}

#[test]
fn compiled_functions_are_shareable() {
    let f = compile(&["x"], "x * 2 + 1").unwrap();
    std::thread::scope(|scope| {
        for t in 0..4 {
            let f = &f;
            scope.spawn(move || {
                for i in 0..50 {
                    let x = f64::from(t * 100 + i);
                    assert_eq!(f.call(&[x]).unwrap(), x * 2.0 + 1.0);
                }
            });
        }
    });
}

#[test]
fn predicates_flow_through_booleans() {
    let f = compile(&["x"], "isinf(x) == isnan(x - x)").unwrap();
    // for finite x: false == false
    assert_eq!(f.call(&[1.0]).unwrap(), 1.0);
    // for +inf: true == true (inf - inf is NaN)
    assert_eq!(f.call(&[f64::INFINITY]).unwrap(), 1.0);
}

#[test]
fn runtime_math_error_from_callback() {
    let f = compile(&["x"], "sqrt(x)").unwrap();
    assert!(matches!(
        f.call(&[-1.0]),
        Err(Error::Math {
            errno: Errno::Domain
        })
    ));
    // the status does not leak into the next call
    assert_eq!(f.call(&[9.0]).unwrap(), 3.0);
}

#[test]
fn constant_folding_surfaces_math_errors_at_compile_time() {
    assert!(matches!(
        compile(&[], "sqrt(-1)"),
        Err(Error::Math { .. })
    ));
    assert!(matches!(compile(&[], "1 % 0"), Err(Error::Math { .. })));
}
