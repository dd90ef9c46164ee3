//! Logging macros.
//!
//! Every macro captures the call site (`module_path!()`, `file!()`,
//! `line!()`) where it is written, which is how records find their module
//! without naming it. Each level macro has three forms:
//!
//! - `info!("listening on {}", port)` logs through the process-wide runtime
//! - `info!(runtime: rt, "listening on {}", port)` logs through `rt`
//! - `info!(entry: e, "listening on {}", port)` logs through a bound [`Entry`](crate::Entry)
//!
//! The message is formatted only after the level check passes.
//!
//! ```
//! use rust_module_logger::prelude::*;
//! use rust_module_logger::{debug, info};
//!
//! let memory = MemoryAppender::new();
//! let runtime = LoggingRuntime::builder()
//!     .root_module("rust_out")
//!     .appender(memory.clone())
//!     .config("info")
//!     .build()
//!     .unwrap();
//!
//! info!(runtime: runtime, "Server listening on port {}", 8080);
//! debug!(runtime: runtime, "not written at the default level");
//!
//! assert_eq!(memory.messages(), vec!["Server listening on port 8080".to_string()]);
//! ```

/// The [`CallSite`](crate::CallSite) of the macro invocation
#[macro_export]
macro_rules! callsite {
    () => {
        $crate::CallSite::new(module_path!(), file!(), line!())
    };
}

/// Install the process-wide runtime for the calling crate, configured from
/// `LOG` (or the given variable).
///
/// Returns the installed runtime, or `AlreadyInitialized` if one exists.
#[macro_export]
macro_rules! init {
    () => {
        $crate::init_from_env(env!("CARGO_CRATE_NAME"), $crate::DEFAULT_CONFIG_ENV)
    };
    ($var:expr) => {
        $crate::init_from_env(env!("CARGO_CRATE_NAME"), $var)
    };
}

/// Log at an explicit level.
///
/// ```
/// # use rust_module_logger::prelude::*;
/// # let runtime = LoggingRuntime::builder().appender(MemoryAppender::new()).build().unwrap();
/// use rust_module_logger::log;
/// log!(runtime: runtime, LogLevel::Warn, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! log {
    (entry: $entry:expr, $level:expr, $($arg:tt)+) => {{
        let __entry: &$crate::Entry = &$entry;
        let __level: $crate::LogLevel = $level;
        if __level.is_terminal() || __entry.enabled(__level) {
            __entry.log(__level, format!($($arg)+));
        }
    }};
    (runtime: $runtime:expr, $level:expr, $($arg:tt)+) => {{
        let __level: $crate::LogLevel = $level;
        if let Some(__entry) = $runtime.prepare(&$crate::callsite!(), __level) {
            __entry.log(__level, format!($($arg)+));
        }
    }};
    ($level:expr, $($arg:tt)+) => {
        $crate::log!(runtime: $crate::global_at(&$crate::callsite!()), $level, $($arg)+)
    };
}

#[macro_export]
macro_rules! trace {
    (entry: $entry:expr, $($arg:tt)+) => {
        $crate::log!(entry: $entry, $crate::LogLevel::Trace, $($arg)+)
    };
    (runtime: $runtime:expr, $($arg:tt)+) => {
        $crate::log!(runtime: $runtime, $crate::LogLevel::Trace, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log!($crate::LogLevel::Trace, $($arg)+)
    };
}

#[macro_export]
macro_rules! debug {
    (entry: $entry:expr, $($arg:tt)+) => {
        $crate::log!(entry: $entry, $crate::LogLevel::Debug, $($arg)+)
    };
    (runtime: $runtime:expr, $($arg:tt)+) => {
        $crate::log!(runtime: $runtime, $crate::LogLevel::Debug, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log!($crate::LogLevel::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    (entry: $entry:expr, $($arg:tt)+) => {
        $crate::log!(entry: $entry, $crate::LogLevel::Info, $($arg)+)
    };
    (runtime: $runtime:expr, $($arg:tt)+) => {
        $crate::log!(runtime: $runtime, $crate::LogLevel::Info, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log!($crate::LogLevel::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! warn {
    (entry: $entry:expr, $($arg:tt)+) => {
        $crate::log!(entry: $entry, $crate::LogLevel::Warn, $($arg)+)
    };
    (runtime: $runtime:expr, $($arg:tt)+) => {
        $crate::log!(runtime: $runtime, $crate::LogLevel::Warn, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log!($crate::LogLevel::Warn, $($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    (entry: $entry:expr, $($arg:tt)+) => {
        $crate::log!(entry: $entry, $crate::LogLevel::Error, $($arg)+)
    };
    (runtime: $runtime:expr, $($arg:tt)+) => {
        $crate::log!(runtime: $runtime, $crate::LogLevel::Error, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log!($crate::LogLevel::Error, $($arg)+)
    };
}

/// Log at Fatal level, flush, and exit with status 1
#[macro_export]
macro_rules! fatal {
    (entry: $entry:expr, $($arg:tt)+) => {
        $crate::log!(entry: $entry, $crate::LogLevel::Fatal, $($arg)+)
    };
    (runtime: $runtime:expr, $($arg:tt)+) => {
        $crate::log!(runtime: $runtime, $crate::LogLevel::Fatal, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log!($crate::LogLevel::Fatal, $($arg)+)
    };
}

/// Log at Panic level, flush, and panic with the message
#[macro_export]
macro_rules! panic_log {
    (entry: $entry:expr, $($arg:tt)+) => {
        $crate::log!(entry: $entry, $crate::LogLevel::Panic, $($arg)+)
    };
    (runtime: $runtime:expr, $($arg:tt)+) => {
        $crate::log!(runtime: $runtime, $crate::LogLevel::Panic, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log!($crate::LogLevel::Panic, $($arg)+)
    };
}

/// An [`Entry`](crate::Entry) for this call site with one field pinned
#[macro_export]
macro_rules! with_field {
    (runtime: $runtime:expr, $key:expr, $value:expr) => {
        $runtime.with_field(&$crate::callsite!(), $key, $value)
    };
    ($key:expr, $value:expr) => {
        $crate::with_field!(runtime: $crate::global_at(&$crate::callsite!()), $key, $value)
    };
}

/// An [`Entry`](crate::Entry) for this call site with several fields pinned
///
/// ```
/// # use rust_module_logger::prelude::*;
/// # let runtime = LoggingRuntime::builder().appender(MemoryAppender::new()).build().unwrap();
/// use rust_module_logger::{info, with_fields};
/// let entry = with_fields!(runtime: runtime, [("user", "ann"), ("role", "admin")]);
/// info!(entry: entry, "signed in");
/// ```
#[macro_export]
macro_rules! with_fields {
    (runtime: $runtime:expr, $fields:expr) => {
        $runtime.with_fields(&$crate::callsite!(), $fields)
    };
    ($fields:expr) => {
        $crate::with_fields!(runtime: $crate::global_at(&$crate::callsite!()), $fields)
    };
}

/// An [`Entry`](crate::Entry) for this call site with `error` set to the rendered error
#[macro_export]
macro_rules! with_error {
    (runtime: $runtime:expr, $err:expr) => {
        $runtime.with_error(&$crate::callsite!(), $err)
    };
    ($err:expr) => {
        $crate::with_error!(runtime: $crate::global_at(&$crate::callsite!()), $err)
    };
}

/// Log the error of a `Result` at Error level; evaluates to true when there was one
///
/// ```
/// # use rust_module_logger::prelude::*;
/// # let runtime = LoggingRuntime::builder().appender(MemoryAppender::new()).build().unwrap();
/// use rust_module_logger::should;
/// let parsed = "x1".parse::<u32>();
/// if should!(runtime: runtime, parsed) {
///     // fall back to a default
/// }
/// ```
#[macro_export]
macro_rules! should {
    (entry: $entry:expr, $result:expr) => {
        $entry.should(&$result)
    };
    (runtime: $runtime:expr, $result:expr) => {
        $runtime.should(&$crate::callsite!(), &$result)
    };
    ($result:expr) => {
        $crate::should!(runtime: $crate::global_at(&$crate::callsite!()), $result)
    };
}

/// Like [`should!`] at Warn level
#[macro_export]
macro_rules! should_warn {
    (entry: $entry:expr, $result:expr) => {
        $entry.should_warn(&$result)
    };
    (runtime: $runtime:expr, $result:expr) => {
        $runtime.should_warn(&$crate::callsite!(), &$result)
    };
    ($result:expr) => {
        $crate::should_warn!(runtime: $crate::global_at(&$crate::callsite!()), $result)
    };
}

/// Unwrap a `Result`, or log `Error on must: <err>` at Panic level and panic
#[macro_export]
macro_rules! must {
    (entry: $entry:expr, $result:expr) => {
        $entry.must($result)
    };
    (runtime: $runtime:expr, $result:expr) => {
        $runtime.must(&$crate::callsite!(), $result)
    };
    ($result:expr) => {
        $crate::must!(runtime: $crate::global_at(&$crate::callsite!()), $result)
    };
}

/// Unwrap a `Result`, or log `Fatal Error: <err>` at Fatal level and exit
#[macro_export]
macro_rules! must_fatal {
    (entry: $entry:expr, $result:expr) => {
        $entry.must_fatal($result)
    };
    (runtime: $runtime:expr, $result:expr) => {
        $runtime.must_fatal(&$crate::callsite!(), $result)
    };
    ($result:expr) => {
        $crate::must_fatal!(runtime: $crate::global_at(&$crate::callsite!()), $result)
    };
}

/// Run a closure, logging its panic message at Panic level before the
/// panic continues
///
/// ```
/// # use rust_module_logger::prelude::*;
/// # let runtime = LoggingRuntime::builder().appender(MemoryAppender::new()).build().unwrap();
/// use rust_module_logger::log_panics;
/// let total = log_panics!(runtime: runtime, || 2 + 2);
/// assert_eq!(total, 4);
/// ```
#[macro_export]
macro_rules! log_panics {
    (runtime: $runtime:expr, $f:expr) => {
        $runtime.log_panics(&$crate::callsite!(), $f)
    };
    ($f:expr) => {
        $crate::log_panics!(runtime: $crate::global_at(&$crate::callsite!()), $f)
    };
}
