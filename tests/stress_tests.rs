//! Stress tests for concurrent logging and reconfiguration
//!
//! These tests verify:
//! - Lookups racing with table swaps always see one whole generation
//! - Records are never lost or duplicated while the table is swapped
//! - The thread reporter starts, reports and stops under load

use rust_module_logger::appenders::MemoryAppender;
use rust_module_logger::{info, LogLevel, LoggingRuntime};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

fn runtime(raw: &str) -> (Arc<LoggingRuntime>, MemoryAppender) {
    let memory = MemoryAppender::new();
    let runtime = LoggingRuntime::builder()
        .root_module("stress_tests")
        .appender(memory.clone())
        .config(raw)
        .report_interval(Duration::from_millis(20))
        .build()
        .expect("Failed to build runtime");
    (Arc::new(runtime), memory)
}

/// Two configurations that disagree on every key; a reader that mixes
/// generations would see one key from each.
const EVEN: &str = "a=debug,b=debug,c=debug";
const ODD: &str = "a=error,b=error,c=error";

#[test]
fn test_snapshot_is_coherent_during_swaps() {
    let (runtime, _) = runtime(EVEN);
    let stop = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let runtime = Arc::clone(&runtime);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let mut observed = 0usize;
                while !stop.load(Ordering::Relaxed) {
                    let table = runtime.routing().snapshot();
                    let levels: Vec<LogLevel> =
                        ["a", "b", "c"].iter().map(|k| table.lookup(k).level()).collect();
                    assert!(
                        levels.windows(2).all(|pair| pair[0] == pair[1]),
                        "mixed generations: {:?}",
                        levels
                    );
                    assert!(table
                        .module_keys()
                        .all(|key| table.lookup(key).generation() == table.generation()));
                    observed += 1;
                }
                observed
            })
        })
        .collect();

    for i in 0..500 {
        runtime
            .reconfigure(if i % 2 == 0 { ODD } else { EVEN })
            .expect("valid configuration");
    }
    stop.store(true, Ordering::Relaxed);

    for reader in readers {
        assert!(reader.join().expect("reader panicked") > 0);
    }
    assert_eq!(runtime.generation(), 501);
    assert_eq!(runtime.metrics().reconfiguration_count(), 500);
}

mod always_on {
    use super::*;

    pub fn emit(runtime: &LoggingRuntime, thread: usize, seq: usize) {
        info!(runtime: runtime, "thread {} record {}", thread, seq);
    }
}

#[test]
fn test_no_records_lost_while_swapping() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 500;

    // `always_on` stays at Info in both configurations
    let (runtime, memory) = runtime("warn,always_on=info");
    let barrier = Arc::new(Barrier::new(THREADS + 1));

    let writers: Vec<_> = (0..THREADS)
        .map(|t| {
            let runtime = Arc::clone(&runtime);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for seq in 0..PER_THREAD {
                    always_on::emit(&runtime, t, seq);
                }
            })
        })
        .collect();

    barrier.wait();
    for i in 0..200 {
        let raw = if i % 2 == 0 { "error,always_on=debug,ln" } else { "warn,always_on=info" };
        runtime.reconfigure(raw).expect("valid configuration");
    }

    for writer in writers {
        writer.join().expect("writer panicked");
    }

    assert_eq!(memory.len(), THREADS * PER_THREAD);
    assert_eq!(runtime.metrics().emitted_count(), (THREADS * PER_THREAD) as u64);
    assert_eq!(runtime.metrics().dropped_count(), 0);
}

#[cfg(target_os = "linux")]
#[test]
fn test_thread_reporter_reports_and_stops() {
    let (runtime, memory) = runtime("grl");
    assert!(runtime.is_reporting());

    let deadline = Instant::now() + Duration::from_secs(5);
    while memory.count_at(LogLevel::Info) < 2 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    let reports = memory.messages();
    assert!(reports.len() >= 2, "reporter did not run: {:?}", reports);
    assert!(reports.iter().all(|m| m.starts_with("Threads: ")));

    runtime.reconfigure("info").expect("valid configuration");
    assert!(!runtime.is_reporting());

    let after_stop = memory.len();
    thread::sleep(Duration::from_millis(100));
    assert_eq!(memory.len(), after_stop);
}

#[test]
fn test_reporter_toggled_concurrently() {
    let (runtime, _) = runtime("");

    let togglers: Vec<_> = (0..4)
        .map(|t| {
            let runtime = Arc::clone(&runtime);
            thread::spawn(move || {
                for i in 0..50 {
                    let raw = if (i + t) % 2 == 0 { "grl" } else { "info" };
                    runtime.reconfigure(raw).expect("valid configuration");
                }
            })
        })
        .collect();

    for toggler in togglers {
        toggler.join().expect("toggler panicked");
    }

    let reporting = runtime.routing().flags().thread_report;
    assert_eq!(runtime.is_reporting(), reporting);
    runtime.shutdown();
    assert!(!runtime.is_reporting());
}
