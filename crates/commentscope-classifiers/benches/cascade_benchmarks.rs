//! Latency benchmarks for the sentiment cascade and batch pipeline
//!
//! Measures per-comment cascade latency for each stage that can decide a
//! comment, topic classification, and end-to-end batch throughput with the
//! polarity backend.
//!
//! Run with: cargo bench -p commentscope-classifiers

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tokio::runtime::Runtime;

use commentscope_classifiers::{AnalysisPipeline, Lexicon, SentimentClassifier, TopicClassifier};
use commentscope_core::Comment;

/// Benchmark the cascade for texts decided at different stages
fn benchmark_sentiment_cascade(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let classifier = SentimentClassifier::polarity_only(&Lexicon::default())
        .expect("Failed to create sentiment classifier");

    let test_cases = vec![
        ("empty", ""),
        ("short_question", "price?"),
        ("info_request", "please send me the link to this product"),
        ("positive_emoji", "😍😍 love it"),
        ("polarity_short", "terrible quality, broke in 2 days"),
        (
            "polarity_long",
            "I ordered this three weeks ago and it still has not arrived, the tracking \
             page says nothing and support never answers my messages @shop #disappointed",
        ),
    ];

    let mut group = c.benchmark_group("Sentiment_Cascade");
    group.sample_size(100);

    for (name, text) in test_cases {
        group.bench_with_input(BenchmarkId::new("classify", name), &text, |b, text| {
            b.iter(|| rt.block_on(async { classifier.classify(black_box(text)).await.unwrap() }));
        });
    }

    group.finish();
}

/// Benchmark topic assignment for keyword hits and fallbacks
fn benchmark_topic_classifier(c: &mut Criterion) {
    let classifier =
        TopicClassifier::new(&Lexicon::default()).expect("Failed to create topic classifier");

    let test_cases = vec![
        ("keywords", "terrible quality, broke in 2 days"),
        ("phrase", "customer service never replied, no response at all"),
        ("fallback", "juda yomon"),
        ("length", "this thing is not what my kid wanted"),
    ];

    let mut group = c.benchmark_group("Topic_Classifier");

    for (name, text) in test_cases {
        group.bench_with_input(BenchmarkId::new("classify", name), &text, |b, text| {
            b.iter(|| classifier.classify(black_box(text)));
        });
    }

    group.finish();
}

/// Benchmark batch throughput with the polarity backend
fn benchmark_batch_pipeline(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let pipeline = AnalysisPipeline::builder()
        .progress_interval(0)
        .build()
        .expect("Failed to build pipeline");

    let samples = [
        "😍 love it",
        "terrible quality, broke in 2 days",
        "price?",
        "waiting 3 weeks for delivery, still nothing",
        "not bad but the box was damaged",
    ];

    let mut group = c.benchmark_group("Batch_Pipeline");

    for size in [10usize, 100, 1000] {
        let comments: Vec<Comment> = (0..size)
            .map(|i| Comment::new(i.to_string(), samples[i % samples.len()]))
            .collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("analyze", size), &comments, |b, comments| {
            b.iter(|| {
                rt.block_on(async {
                    let classified = pipeline.analyze_batch(comments.clone()).await;
                    pipeline.summarize(black_box(&classified))
                })
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_sentiment_cascade,
    benchmark_topic_classifier,
    benchmark_batch_pipeline
);

criterion_main!(benches);
