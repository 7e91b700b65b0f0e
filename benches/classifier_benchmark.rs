use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tokenstat::{MemoryStore, StatisticalClassifier, Store, Tokenizer, WordTokenizer};

const SHORT_TEXT: &str = "free money now";
const LONG_TEXT: &str = "This is a much longer text that contains multiple paragraphs and should \
     take significantly more time to process. It includes various words, \
     punctuation marks, and different types of sentences. The second paragraph \
     adds more content and complexity to the text, making it a good test case \
     for scoring performance with longer documents.";

fn setup_benchmark_classifier() -> StatisticalClassifier {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let mut classifier = StatisticalClassifier::create(store, "bench", 4).unwrap();
    let corpus = [
        ("buy now free money limited offer click here", 0),
        ("meeting notes project update schedule review", 1),
        ("football match championship goal striker victory", 2),
        ("compiler release programming language performance", 3),
    ];
    for _ in 0..100 {
        classifier.train_batch(corpus.iter().copied()).unwrap();
    }
    classifier
}

fn bench_tokenization(c: &mut Criterion) {
    let tokenizer = WordTokenizer::new();
    let mut group = c.benchmark_group("Tokenization");
    group.sample_size(50);

    group.bench_function("short_text", |b| b.iter(|| tokenizer.tokenize(black_box(SHORT_TEXT)).unwrap()));
    group.bench_function("long_text", |b| b.iter(|| tokenizer.tokenize(black_box(LONG_TEXT)).unwrap()));

    group.finish();
}

fn bench_training(c: &mut Criterion) {
    let mut classifier = setup_benchmark_classifier();
    let mut group = c.benchmark_group("Training");
    group.sample_size(50);

    group.bench_function("short_text", |b| b.iter(|| classifier.train(black_box(SHORT_TEXT), 0).unwrap()));
    group.bench_function("long_text", |b| b.iter(|| classifier.train(black_box(LONG_TEXT), 1).unwrap()));

    group.finish();
}

fn bench_classification(c: &mut Criterion) {
    let classifier = setup_benchmark_classifier();
    let mut group = c.benchmark_group("Classification");
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    group.bench_function("short_text", |b| b.iter(|| classifier.classify(black_box(SHORT_TEXT)).unwrap()));
    group.bench_function("long_text", |b| b.iter(|| classifier.predict(black_box(LONG_TEXT)).unwrap()));

    group.finish();
}

criterion_group!(benches, bench_tokenization, bench_training, bench_classification);
criterion_main!(benches);
