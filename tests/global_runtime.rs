//! The process-wide runtime and the global macro forms.
//!
//! Kept in its own test binary with a single test: the global can only be
//! installed once per process.

use rust_module_logger::appenders::MemoryAppender;
use rust_module_logger::{
    debug, global, info, init, init_global, logger_for, set_global_config, set_level,
    set_source_lines, should_warn, time, time_end, warn, with_fields, FieldValue, LogLevel,
    LoggerError, LoggingRuntime, UNKNOWN_TIMER,
};

mod worker {
    use super::*;

    pub fn run() {
        debug!("worker debug");
        info!("worker info");
    }
}

#[test]
fn test_global_runtime_lifecycle() {
    let memory = MemoryAppender::new();
    let runtime = LoggingRuntime::builder()
        .root_module(env!("CARGO_CRATE_NAME"))
        .appender(memory.clone())
        .config("warn,worker=debug")
        .build()
        .expect("Failed to build runtime");
    init_global(runtime).expect("first installation succeeds");

    // Only the first installation wins
    let second = LoggingRuntime::builder()
        .appender(MemoryAppender::new())
        .build()
        .unwrap();
    assert!(matches!(init_global(second), Err(LoggerError::AlreadyInitialized)));
    assert!(matches!(init!(), Err(LoggerError::AlreadyInitialized)));

    worker::run();
    info!("root info is below warn");
    warn!("root warn");
    assert_eq!(memory.messages(), vec!["worker debug", "worker info", "root warn"]);
    assert_eq!(memory.entries()[0].module(), Some("worker"));
    assert_eq!(memory.entries()[2].module(), Some("global_runtime"));
    memory.clear();

    set_global_config("error").expect("valid configuration");
    worker::run();
    assert!(memory.is_empty());
    assert_eq!(global().config_string(), "error");

    assert!(set_global_config("worker=a=b").is_err());
    assert_eq!(global().config_string(), "error");

    set_global_config("info").unwrap();
    let failed: Result<(), String> = Err("cache miss".to_string());
    assert!(should_warn!(failed));
    with_fields!([("job", "reindex")]).info("started");

    let entries = memory.drain();
    assert_eq!(entries[0].level, LogLevel::Warn);
    assert_eq!(entries[0].message, "cache miss");
    assert_eq!(
        entries[1].field("job").and_then(FieldValue::as_str),
        Some("reindex")
    );

    let key = time("global");
    assert_ne!(time_end(&key), UNKNOWN_TIMER);
    assert_eq!(time_end(&key), UNKNOWN_TIMER);

    // Programmatic edits keep the rest of the configuration
    set_global_config("warn,worker=debug").unwrap();
    set_level(LogLevel::Error);
    set_source_lines(true);
    assert_eq!(global().config_string(), "error,worker=debug,ln");

    worker::run();
    logger_for("billing").warn("below the new default");
    logger_for("worker").debug("named worker debug");

    let entries = memory.drain();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[2].message, "named worker debug");
    assert_eq!(entries[2].module(), Some("worker"));
    assert!(entries
        .iter()
        .all(|entry| entry.field("file").is_some()));
}
