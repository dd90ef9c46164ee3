//! Criterion benchmarks for rust_module_logger

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_module_logger::prelude::*;
use rust_module_logger::{callsite, debug, info, Appender, ModuleIdentifier};

/// Discards everything; measures the logger, not the output
struct NullAppender;

impl Appender for NullAppender {
    fn append(&mut self, _entry: &LogEntry) -> Result<()> {
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}

fn runtime(raw: &str) -> LoggingRuntime {
    LoggingRuntime::builder()
        .root_module("logger_benchmarks")
        .appender(NullAppender)
        .config(raw)
        .build()
        .expect("valid configuration")
}

// ============================================================================
// Dispatch Benchmarks
// ============================================================================

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(1));

    let rt = runtime("info");

    group.bench_function("enabled_info", |b| {
        b.iter(|| {
            info!(runtime: rt, "request {} served", black_box(42));
        });
    });

    group.bench_function("filtered_debug", |b| {
        b.iter(|| {
            debug!(runtime: rt, "request {} served", black_box(42));
        });
    });

    let tagged = runtime("info,ln,gr");
    group.bench_function("enabled_info_with_tags", |b| {
        b.iter(|| {
            info!(runtime: tagged, "request {} served", black_box(42));
        });
    });

    let entry = rt.with_field(&callsite!(), "request_id", "abc");
    group.bench_function("bound_entry", |b| {
        b.iter(|| {
            info!(entry: entry, "request {} served", black_box(42));
        });
    });

    group.finish();
}

// ============================================================================
// Resolution and Lookup Benchmarks
// ============================================================================

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");

    let identifier = ModuleIdentifier::new("my_app");
    let site = CallSite::new("my_app::net::server", "src/net/server.rs", 10);
    identifier.resolve(&site);

    group.bench_function("cached_site", |b| {
        b.iter(|| black_box(identifier.resolve(black_box(&site))));
    });

    for modules in [1usize, 16, 256] {
        let raw: Vec<String> = (0..modules).map(|i| format!("module{}=debug", i)).collect();
        let rt = runtime(&raw.join(","));
        group.bench_with_input(BenchmarkId::new("lookup", modules), &modules, |b, _| {
            b.iter(|| black_box(rt.lookup(black_box("module0"))));
        });
    }

    group.finish();
}

// ============================================================================
// Reconfiguration Benchmarks
// ============================================================================

fn bench_reconfigure(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconfigure");

    group.bench_function("parse", |b| {
        b.iter(|| LogConfig::parse(black_box("warn,net/server=debug,db=error,ln,gr")));
    });

    let rt = runtime("");
    group.bench_function("swap", |b| {
        b.iter(|| rt.reconfigure(black_box("warn,net/server=debug,db=error")));
    });

    group.finish();
}

criterion_group!(benches, bench_dispatch, bench_resolution, bench_reconfigure);
criterion_main!(benches);
