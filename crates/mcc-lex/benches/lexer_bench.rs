//! Run with: `cargo bench --package mcc-lex`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use mcc_lex::tokenize;

fn token_count(source: &str) -> usize {
    tokenize(source).unwrap().len()
}

fn bench_lexer(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer");

    let small = "int main()\n{\n    return 0;\n}\n";
    group.throughput(Throughput::Bytes(small.len() as u64));
    group.bench_function("small_function", |b| {
        b.iter(|| token_count(black_box(small)))
    });

    let with_control_flow = "int f(int n)\n{\n    int i = 0;\n    while (i < n) {\n        if (i == 5) {\n            i = i + 2;\n        } else {\n            i = i + 1;\n        }\n    }\n    return i;\n}\n";
    group.throughput(Throughput::Bytes(with_control_flow.len() as u64));
    group.bench_function("control_flow", |b| {
        b.iter(|| token_count(black_box(with_control_flow)))
    });

    group.finish();
}

criterion_group!(benches, bench_lexer);
criterion_main!(benches);
