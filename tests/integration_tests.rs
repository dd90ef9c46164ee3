//! Integration tests for the module logger
//!
//! These tests verify:
//! - Per-module level filtering and fallback to the default entry
//! - Reconfiguration (applied, idempotent, rejected)
//! - Fatal and Panic side effects
//! - Error-check helpers and timers
//! - Source line and thread tags
//! - File output through the shared sink

use rust_module_logger::appenders::{FileAppender, JsonAppender, MemoryAppender};
use rust_module_logger::core::LoggerError;
use rust_module_logger::{
    debug, error, fatal, info, must_fatal, should, trace, warn, with_field, FieldValue, LogConfig,
    LogLevel, LoggingRuntime, UNKNOWN_TIMER,
};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

const ROOT: &str = "integration_tests";

fn runtime(raw: &str) -> (LoggingRuntime, MemoryAppender) {
    let memory = MemoryAppender::new();
    let runtime = LoggingRuntime::builder()
        .root_module(ROOT)
        .appender(memory.clone())
        .config(raw)
        .build()
        .expect("Failed to build runtime");
    (runtime, memory)
}

mod net {
    use super::*;

    pub fn handle(runtime: &LoggingRuntime) {
        debug!(runtime: runtime, "net debug");
        info!(runtime: runtime, "net info");
    }

    pub mod server {
        use super::*;

        pub fn accept(runtime: &LoggingRuntime) {
            trace!(runtime: runtime, "server trace");
            warn!(runtime: runtime, "server warn");
        }
    }
}

mod db {
    use super::*;

    pub fn query(runtime: &LoggingRuntime) {
        info!(runtime: runtime, "db info");
        error!(runtime: runtime, "db error");
    }
}

#[test]
fn test_module_levels_filter_independently() {
    let (runtime, memory) = runtime("warn,net=debug,net/server=trace");

    net::handle(&runtime);
    net::server::accept(&runtime);
    db::query(&runtime);

    assert_eq!(
        memory.messages(),
        vec!["net debug", "net info", "server trace", "server warn", "db error"]
    );

    let modules: Vec<String> = memory
        .entries()
        .iter()
        .filter_map(|entry| entry.module().map(String::from))
        .collect();
    assert_eq!(modules, vec!["net", "net", "net/server", "net/server", "db"]);
}

#[test]
fn test_root_module_keeps_crate_name() {
    let (runtime, memory) = runtime("warn,integration_tests=debug");

    debug!(runtime: runtime, "from the crate root");

    let entries = memory.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].module(), Some("integration_tests"));
}

#[test]
fn test_unconfigured_module_falls_back_to_default() {
    let (runtime, memory) = runtime("error,net=trace");

    db::query(&runtime);

    assert_eq!(memory.messages(), vec!["db error"]);
    assert!(runtime.lookup("db").is_default());
}

#[test]
fn test_empty_config_defaults_to_info() {
    let (runtime, memory) = runtime("");

    net::handle(&runtime);

    assert_eq!(memory.messages(), vec!["net info"]);
}

#[test]
fn test_reconfigure_changes_module_level() {
    let (runtime, memory) = runtime("net=error");

    net::handle(&runtime);
    assert!(memory.is_empty());

    runtime.reconfigure("net=debug").expect("valid configuration");
    net::handle(&runtime);

    assert_eq!(memory.messages(), vec!["net debug", "net info"]);
}

#[test]
fn test_reconfigure_is_idempotent() {
    let (runtime, memory) = runtime("");

    runtime.reconfigure("warn,db=info").unwrap();
    db::query(&runtime);
    let once = memory.drain();

    runtime.reconfigure("warn,db=info").unwrap();
    db::query(&runtime);
    let twice = memory.drain();

    let messages = |entries: &[rust_module_logger::LogEntry]| {
        entries.iter().map(|e| e.message.clone()).collect::<Vec<_>>()
    };
    assert_eq!(messages(&once), messages(&twice));
    assert_eq!(runtime.config(), "warn,db=info".parse::<LogConfig>().unwrap());
}

#[test]
fn test_rejected_reconfigure_keeps_previous_table() {
    let (runtime, memory) = runtime("net=debug");

    let err = runtime.reconfigure("moduleA=debug=extra").unwrap_err();
    assert!(matches!(err, LoggerError::MalformedConfig { ref token } if token == "moduleA=debug=extra"));

    net::handle(&runtime);
    assert_eq!(memory.len(), 2);
    assert_eq!(runtime.generation(), 1);
}

#[test]
fn test_unknown_level_name_is_info() {
    let (runtime, memory) = runtime("net=verbose");

    net::handle(&runtime);

    assert_eq!(runtime.lookup("net").level(), LogLevel::Info);
    assert_eq!(memory.messages(), vec!["net info"]);
}

fn exit_by_panicking(code: i32) -> ! {
    panic!("process exit requested with status {code}")
}

#[test]
fn test_fatal_writes_then_exits() {
    let memory = MemoryAppender::new();
    let runtime = LoggingRuntime::builder()
        .root_module(ROOT)
        .appender(memory.clone())
        .exit_fn(exit_by_panicking)
        .build()
        .unwrap();

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        fatal!(runtime: runtime, "cannot continue: {}", "disk gone");
    }));

    let panic = outcome.unwrap_err();
    assert_eq!(
        panic.downcast_ref::<String>().map(String::as_str),
        Some("process exit requested with status 1")
    );
    let entries = memory.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].level, LogLevel::Fatal);
    assert_eq!(entries[0].message, "cannot continue: disk gone");
}

#[test]
fn test_must_fatal_on_error() {
    let memory = MemoryAppender::new();
    let runtime = LoggingRuntime::builder()
        .root_module(ROOT)
        .appender(memory.clone())
        .exit_fn(exit_by_panicking)
        .build()
        .unwrap();

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let port: u16 = must_fatal!(runtime: runtime, "http".parse::<u16>());
        port
    }));

    assert!(outcome.is_err());
    let messages = memory.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("Fatal Error: "), "{}", messages[0]);
}

#[test]
fn test_should_reports_error_text() {
    let (runtime, memory) = runtime("");

    let result: Result<(), std::io::Error> = Err(std::io::Error::other("connection reset"));
    assert!(should!(runtime: runtime, result));

    let entries = memory.entries();
    assert_eq!(entries[0].level, LogLevel::Error);
    assert_eq!(entries[0].message, "connection reset");
    assert_eq!(entries[0].module(), Some("integration_tests"));
}

#[test]
fn test_timers_round_trip() {
    let (runtime, _) = runtime("");

    let key = runtime.timers().start("load");
    std::thread::sleep(std::time::Duration::from_millis(5));
    let elapsed = runtime.timers().end(&key);

    assert_ne!(elapsed, UNKNOWN_TIMER);
    assert!(elapsed.ends_with("ms") || elapsed.ends_with('s'), "{elapsed}");
    assert_eq!(runtime.timers().end("never-started"), "unknown timer");
}

#[test]
fn test_source_lines_tag() {
    let (runtime, memory) = runtime("ln");

    let line = line!() + 1;
    info!(runtime: runtime, "tagged");

    let expected = format!("'tests/integration_tests.rs:{}'", line);
    let entries = memory.entries();
    assert_eq!(
        entries[0].field("file").and_then(FieldValue::as_str),
        Some(expected.as_str())
    );

    runtime.reconfigure("info").unwrap();
    info!(runtime: runtime, "untagged");
    assert!(memory.entries()[1].field("file").is_none());
}

#[cfg(target_os = "linux")]
#[test]
fn test_thread_count_tag() {
    let (runtime, memory) = runtime("gr");

    info!(runtime: runtime, "with threads");

    match memory.entries()[0].field("threads") {
        Some(FieldValue::Int(count)) => assert!(*count >= 1),
        other => panic!("unexpected threads field: {:?}", other),
    }
}

#[test]
fn test_pinned_fields_survive_reuse() {
    let (runtime, memory) = runtime("");
    let request = with_field!(runtime: runtime, "request_id", "abc-123");

    info!(entry: request, "received");
    request.with_field("status", 200).info("responded");

    let entries = memory.entries();
    assert_eq!(entries.len(), 2);
    for entry in &entries {
        assert_eq!(
            entry.field("request_id").and_then(FieldValue::as_str),
            Some("abc-123")
        );
    }
    assert!(entries[0].field("status").is_none());
    assert_eq!(entries[1].field("status"), Some(&FieldValue::Int(200)));
}

#[test]
fn test_file_appender_receives_all_modules() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("modules.log");

    let runtime = LoggingRuntime::builder()
        .root_module(ROOT)
        .appender(FileAppender::new(&log_file).expect("Failed to create appender"))
        .config("warn,net=info")
        .build()
        .unwrap();

    net::handle(&runtime);
    db::query(&runtime);
    runtime.flush().expect("Failed to flush");

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("net info module=net"), "{}", lines[0]);
    assert!(lines[1].ends_with("db error module=db"), "{}", lines[1]);
}

#[test]
fn test_json_appender_flattens_tags() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("modules.jsonl");

    let runtime = Arc::new(
        LoggingRuntime::builder()
            .root_module(ROOT)
            .appender(JsonAppender::new(&log_file).expect("Failed to create appender"))
            .config("ln")
            .build()
            .unwrap(),
    );

    net::server::accept(&runtime);
    runtime.flush().unwrap();

    let content = fs::read_to_string(&log_file).unwrap();
    let record: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
    assert_eq!(record["level"], "WARN");
    assert_eq!(record["message"], "server warn");
    assert_eq!(record["module"], "net/server");
    assert!(record["file"]
        .as_str()
        .is_some_and(|file| file.starts_with("'tests/integration_tests.rs:")));
}

#[test]
fn test_log_injection_prevention() {
    let (runtime, memory) = runtime("");

    info!(runtime: runtime, "User login\nERROR [2024-10-17] Fake error injected");

    assert_eq!(
        memory.messages(),
        vec!["User login\\nERROR [2024-10-17] Fake error injected"]
    );
}
