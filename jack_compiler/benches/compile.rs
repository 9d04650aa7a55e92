use criterion::{black_box, criterion_group, criterion_main, Criterion};

use jack_compiler::{compile::CodeGen, lex::tokenize, parse_class};

const SOURCE: &str = include_str!("../tests/fixtures/Average.jack");

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("tokenize average", |b| {
        b.iter(|| black_box(tokenize(black_box(SOURCE))))
    });

    c.bench_function("parse average", |b| {
        b.iter(|| black_box(parse_class(black_box(SOURCE))))
    });

    {
        let class = parse_class(SOURCE).unwrap();
        let mut codegen = CodeGen::default();

        c.bench_function("codegen average", |b| {
            b.iter(|| black_box(codegen.compile(black_box(&class))))
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
