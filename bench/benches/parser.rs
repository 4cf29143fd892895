use criterion::{criterion_group, criterion_main, Criterion};
use humanscript::{
    lexer::{self, SUGGESTED_TOKENS_CAPACITY},
    parser::parse_program,
    token::{Spanned, Token},
};
use std::hint::black_box;

fn parser(input: &str, tokens: &mut Vec<Token>, errors: &mut Vec<Spanned<lexer::Error>>) {
    let program = parse_program(input, tokens, errors).unwrap();
    _ = black_box(program);
}

fn criterion_benchmark(c: &mut Criterion) {
    let input = bench::big_program();
    let mut tokens = Vec::with_capacity(SUGGESTED_TOKENS_CAPACITY * 64);
    let mut errors = Vec::new();

    c.bench_function("parser", |b| {
        b.iter(|| {
            tokens.clear();
            errors.clear();
            parser(black_box(&input), &mut tokens, &mut errors);
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
