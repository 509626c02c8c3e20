//! Command Parsing Benchmarks
//!
//! Performance benchmarks for the streamed-command extraction pipeline.
//! The recognizer sits on the hot path of every response token, so plain
//! prose must stay near zero-cost and command-bearing fragments cheap.
//!
//! Run with: `cargo bench --bench command_parsing`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use lector_server::pipeline::{PipelineOptions, StreamPipeline};

/// Typical narration fragment with no commands at all.
fn plain_fragment() -> String {
    "The author begins by laying out the historical context of the debate, \
     then walks through the three competing interpretations before settling \
     on the synthesis developed in the remainder of the chapter. "
        .to_string()
}

/// Fragment carrying two commands amid prose.
fn command_fragment() -> String {
    "The definition is stated here [HIGHLIGHT 1 80 240 420 60] and the \
     corollary is circled below [CIRCLE 1 300 520 45], both on this page. "
        .to_string()
}

/// The same content cut into small stream-sized pieces, one command split
/// across a boundary.
fn chunked_fragments() -> Vec<String> {
    vec![
        "The definition is stated ".to_string(),
        "here [HIGH".to_string(),
        "LIGHT 1 80 240 420 60] and the corollary ".to_string(),
        "is circled below [CIRCLE 1 300 520 45]. ".to_string(),
    ]
}

fn bench_plain_prose(c: &mut Criterion) {
    let fragment = plain_fragment();

    let mut group = c.benchmark_group("recognizer");
    group.throughput(Throughput::Bytes(fragment.len() as u64));
    group.bench_function("plain_prose_fragment", |b| {
        b.iter(|| {
            let mut pipeline = StreamPipeline::new(1, PipelineOptions::default());
            black_box(pipeline.process_fragment(black_box(&fragment)))
        })
    });
    group.finish();
}

fn bench_command_fragment(c: &mut Criterion) {
    let fragment = command_fragment();

    let mut group = c.benchmark_group("recognizer");
    group.throughput(Throughput::Bytes(fragment.len() as u64));
    group.bench_function("two_command_fragment", |b| {
        b.iter(|| {
            let mut pipeline = StreamPipeline::new(1, PipelineOptions::default());
            black_box(pipeline.process_fragment(black_box(&fragment)))
        })
    });
    group.finish();
}

fn bench_chunked_stream(c: &mut Criterion) {
    let fragments = chunked_fragments();
    let total: usize = fragments.iter().map(|f| f.len()).sum();

    let mut group = c.benchmark_group("recognizer");
    group.throughput(Throughput::Bytes(total as u64));
    group.bench_function("chunked_stream_with_split_command", |b| {
        b.iter(|| {
            let mut pipeline = StreamPipeline::new(1, PipelineOptions::default());
            for fragment in &fragments {
                black_box(pipeline.process_fragment(black_box(fragment)));
            }
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_plain_prose,
    bench_command_fragment,
    bench_chunked_stream
);
criterion_main!(benches);
