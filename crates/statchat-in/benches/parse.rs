use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::sync::Arc;

use statchat_core::QuestionContext;
use statchat_in::{ParserOptions, PlayerDirectory, QuestionParser};
use statchat_registry::StatRegistry;

fn parser() -> QuestionParser {
    let registry = Arc::new(StatRegistry::builtin().expect("builtin catalog"));
    let names: Vec<String> = (0..400)
        .map(|i| format!("Player{} Surname{}", i, i))
        .chain(["Luke Bangs".to_string(), "Oli Goddard".to_string()])
        .collect();
    let directory = Arc::new(PlayerDirectory::new(names).expect("directory"));
    QuestionParser::new(registry, directory, ParserOptions::default())
}

fn bench_parse(c: &mut Criterion) {
    let parser = parser();
    let questions = [
        "How many goals has Luke Bangs scored for the 3rd XI in 2019/20?",
        "Who has more assists, Luke Bangs or Oli Goddard?",
        "Who are the top 5 goal scorers?",
        "What is my most common position?",
    ];
    c.bench_function("parse_question", |b| {
        b.iter(|| {
            for question in questions {
                let context = QuestionContext::new(question, "Luke Bangs");
                black_box(parser.parse(black_box(&context)));
            }
        })
    });
}

fn bench_registry_compile(c: &mut Criterion) {
    c.bench_function("registry_builtin", |b| {
        b.iter(|| black_box(StatRegistry::builtin().unwrap().len()))
    });
}

criterion_group!(benches, bench_parse, bench_registry_compile);
criterion_main!(benches);
