//! Criterion benchmarks for the Hanami codec.
//!
//! Run with:
//! ```bash
//! cargo bench --package hanami-core --bench codec_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hanami_core::{is_hanami_protocol, ErrorLogMessage, HanamiMessage};

// ── Message fixtures ──────────────────────────────────────────────────────────

fn make_small() -> ErrorLogMessage {
    ErrorLogMessage {
        user_uuid: "a1b2".to_string(),
        component: "core".to_string(),
        error_msg: "oops".to_string(),
        context: "{}".to_string(),
        values: "[]".to_string(),
    }
}

fn make_typical() -> ErrorLogMessage {
    ErrorLogMessage::new("storage", "failed to open segment file")
        .with_context(r#"{"segment":"0000042.log","mode":"read"}"#)
        .with_values(r#"["ENOENT",2]"#)
}

fn make_large() -> ErrorLogMessage {
    ErrorLogMessage::new("scheduler", "x".repeat(4096)).with_context("y".repeat(16 * 1024))
}

fn fixtures() -> Vec<(&'static str, ErrorLogMessage)> {
    vec![
        ("small", make_small()),
        ("typical", make_typical()),
        ("large", make_large()),
    ]
}

// ── Benchmark groups ──────────────────────────────────────────────────────────

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("error_log_encode");
    for (name, msg) in fixtures() {
        group.bench_with_input(BenchmarkId::new("msg", name), &msg, |b, msg| {
            b.iter(|| black_box(msg).encode().expect("encode must succeed"))
        });
    }
    group.finish();
}

fn bench_encode_into(c: &mut Criterion) {
    let mut group = c.benchmark_group("error_log_encode_into");
    for (name, msg) in fixtures() {
        let mut buf = vec![0u8; msg.encoded_size()];
        group.bench_with_input(BenchmarkId::new("msg", name), &msg, |b, msg| {
            b.iter(|| {
                black_box(msg)
                    .encode_into(black_box(&mut buf))
                    .expect("encode must succeed")
            })
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("error_log_decode");
    for (name, msg) in fixtures() {
        let bytes = msg.encode().expect("encode must succeed for benchmark setup");
        group.bench_with_input(BenchmarkId::new("msg", name), &bytes, |b, bytes| {
            b.iter(|| ErrorLogMessage::decode(black_box(bytes)).expect("decode must succeed"))
        });
    }
    group.finish();
}

fn bench_sniff(c: &mut Criterion) {
    let bytes = make_typical().encode().expect("encode");
    let http = b"POST /v1/errors HTTP/1.1\r\nHost: localhost\r\n\r\n".to_vec();

    let mut group = c.benchmark_group("sniff");
    group.bench_function("hanami", |b| b.iter(|| is_hanami_protocol(black_box(&bytes))));
    group.bench_function("foreign", |b| b.iter(|| is_hanami_protocol(black_box(&http))));
    group.finish();
}

criterion_group!(benches, bench_encode, bench_encode_into, bench_decode, bench_sniff);
criterion_main!(benches);
