//! Core logger types and traits

pub mod appender;
pub mod config;
pub mod dispatcher;
pub mod entry;
pub mod error;
pub mod log_context;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod module_id;
pub mod output_format;
pub mod routines;
pub mod routing;
pub mod runtime;
pub mod timer;
pub mod timestamp;

pub use appender::{Appender, Sink};
pub use config::{ConfigRule, FeatureFlags, LogConfig, RulePattern};
pub use dispatcher::{Dispatcher, ExitFn};
pub use entry::Entry;
pub use error::{LoggerError, Result};
pub use log_context::{FieldValue, LogContext};
pub use log_entry::LogEntry;
pub use log_level::LogLevel;
pub use logger::Logger;
pub use metrics::LoggerMetrics;
pub use module_id::{CallSite, ModuleIdentifier, ModuleKey, ResolvedSite};
pub use output_format::OutputFormat;
pub use routines::{live_thread_count, ThreadReporter, DEFAULT_REPORT_INTERVAL};
pub use routing::{RoutingHandle, RoutingTable};
pub use runtime::{
    global, global_at, global_handle, init_from_env, init_global, logger_for, set_global_config,
    set_level, set_source_lines, time, time_end, LoggingRuntime, RuntimeBuilder,
    DEFAULT_CONFIG_ENV, DEFAULT_CONTROL_PORT, LEGACY_CONFIG_ENV,
};
pub use timer::{Timers, UNKNOWN_TIMER};
pub use timestamp::TimestampFormat;
