use criterion::{criterion_group, criterion_main, Criterion};
use docstash_core::model::Language;
use docstash_core::tokenizer::tokenize;

fn bench_tokenize(c: &mut Criterion) {
    let text = "Invoice total due March; meeting notes, quarterly budget review. ".repeat(200);
    c.bench_function("tokenize_latin", |b| b.iter(|| tokenize(&text, Language::Eng)));

    let cjk = "文件管理系统索引".repeat(200);
    c.bench_function("tokenize_cjk", |b| b.iter(|| tokenize(&cjk, Language::ChiSim)));
}

criterion_group!(benches, bench_tokenize);
criterion_main!(benches);
