//! # Rust Module Logger
//!
//! A process-wide logging facade with per-module levels. Call sites never
//! name their module: every macro captures where it is written, the
//! runtime resolves that to a module key such as `net/server`, and the
//! record is filtered against the level configured for that key.
//!
//! ## Features
//!
//! - **Per-module levels**: `warn,net/server=debug` keeps everything at Warn
//!   except one module
//! - **Runtime reconfiguration**: swap the whole configuration atomically
//!   while other threads keep logging
//! - **Contextual tags**: `module`, optionally `file='path:line'` (`ln`) and
//!   the live thread count (`gr`, `grl`)
//! - **Control plane**: optional HTTP endpoint to read and replace the
//!   configuration (feature `control-plane`)
//!
//! ```no_run
//! use rust_module_logger::{info, init, warn};
//!
//! // LOG="info,db=debug,ln" ./my_app
//! init!().unwrap();
//! info!("starting on port {}", 8080);
//! warn!("cache disabled");
//! ```

pub mod appenders;
#[cfg(feature = "control-plane")]
pub mod control;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, FileAppender, JsonAppender, MemoryAppender};
    pub use crate::core::{
        Appender, CallSite, Entry, FieldValue, LogConfig, LogContext, LogEntry, LogLevel,
        LoggerError, LoggerMetrics, LoggingRuntime, OutputFormat, Result, Sink, TimestampFormat,
    };
}

pub use crate::appenders::{ConsoleAppender, FileAppender, JsonAppender, MemoryAppender};
pub use crate::core::{
    global, global_at, global_handle, init_from_env, init_global, logger_for, set_global_config,
    set_level, set_source_lines, time, time_end, Appender, CallSite, ConfigRule, Dispatcher, Entry, ExitFn, FeatureFlags, FieldValue,
    LogConfig, LogContext, LogEntry, LogLevel, Logger, LoggerError, LoggerMetrics,
    LoggingRuntime, ModuleIdentifier, ModuleKey, OutputFormat, Result, RoutingHandle,
    RoutingTable, RulePattern, RuntimeBuilder, Sink, Timers, TimestampFormat,
    DEFAULT_CONFIG_ENV, DEFAULT_CONTROL_PORT, LEGACY_CONFIG_ENV, UNKNOWN_TIMER,
};
