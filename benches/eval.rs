//! Compile and evaluation throughput benchmarks.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

fn bench_compile(c: &mut Criterion) {
    let source = "sin(x) * cos(y * pi) + x % 3 - sqrt(abs(y))";
    c.bench_function("compile", |b| {
        b.iter(|| mathvm::compile(black_box(&["x", "y"]), black_box(source)).unwrap());
    });
}

fn bench_call(c: &mut Criterion) {
    let f = mathvm::compile(&["x", "y"], "sin(x) * cos(y * pi) + x % 3").unwrap();
    c.bench_function("call", |b| {
        b.iter(|| f.call(black_box(&[1.25, -0.75])).unwrap());
    });
}

fn bench_call_with_frame(c: &mut Criterion) {
    let f = mathvm::compile(&["x", "y"], "sin(x) * cos(y * pi) + x % 3").unwrap();
    let mut frame = f.frame();
    c.bench_function("call_with_frame", |b| {
        b.iter(|| {
            f.call_with_frame(black_box(&[1.25, -0.75]), &mut frame)
                .unwrap()
        });
    });
}

fn bench_run(c: &mut Criterion) {
    let source = "sin(x) * cos(y * pi) + x % 3";
    c.bench_function("run", |b| {
        b.iter(|| mathvm::run(black_box(source), &["x", "y"], black_box(&[1.25, -0.75])).unwrap());
    });
}

criterion_group!(
    benches,
    bench_compile,
    bench_call,
    bench_call_with_frame,
    bench_run
);
criterion_main!(benches);
