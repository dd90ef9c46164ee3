//! Pre-bound log entry handle

use super::{
    config::FeatureFlags,
    dispatcher::Dispatcher,
    log_context::{FieldValue, LogContext},
    log_entry::LogEntry,
    log_level::LogLevel,
    logger::Logger,
    module_id::{clean_file_path, CallSite, ModuleKey, ResolvedSite},
    routines::live_thread_count,
};
use std::borrow::Cow;
use std::fmt;
use std::any::Any;
use std::panic::{self, Location, UnwindSafe};
use std::sync::Arc;

/// A logger already bound to one call site's module, carrying any fields
/// pinned on it.
///
/// Entries are produced by [`Dispatcher::prepare`] and [`Dispatcher::entry`]
/// (or the `with_field!`/`with_fields!`/`with_error!` macros). Adding a field
/// returns a new entry and leaves the original untouched, so an entry can
/// be kept around and reused as a template.
///
/// ```
/// use rust_module_logger::prelude::*;
///
/// let memory = MemoryAppender::new();
/// let runtime = LoggingRuntime::builder()
///     .root_module("my_app")
///     .appender(memory.clone())
///     .config("debug")
///     .build()
///     .unwrap();
///
/// let request = runtime.with_field(&rust_module_logger::callsite!(), "request_id", 7);
/// request.info("accepted");
/// request.debug("parsed headers");
///
/// assert_eq!(memory.len(), 2);
/// ```
#[derive(Clone)]
pub struct Entry {
    dispatcher: Dispatcher,
    logger: Arc<Logger>,
    flags: FeatureFlags,
    site: CallSite,
    origin: ResolvedSite,
    context: LogContext,
}

impl Entry {
    pub(crate) fn tagged(
        dispatcher: Dispatcher,
        logger: Arc<Logger>,
        flags: FeatureFlags,
        site: CallSite,
        origin: ResolvedSite,
    ) -> Self {
        let context = LogContext::new().with_field("module", origin.key.as_str());
        Self {
            dispatcher,
            logger,
            flags,
            site,
            origin,
            context,
        }
    }

    pub fn with_field(&self, key: impl Into<String>, value: impl Into<FieldValue>) -> Entry {
        let mut entry = self.clone();
        entry.context.add_field(key, value);
        entry
    }

    pub fn with_fields<K, V, I>(&self, fields: I) -> Entry
    where
        K: Into<String>,
        V: Into<FieldValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.with_context(fields.into_iter().collect())
    }

    /// Attach the rendered error under the `error` field
    pub fn with_error(&self, err: impl fmt::Display) -> Entry {
        self.with_field("error", err.to_string())
    }

    pub fn with_context(&self, context: LogContext) -> Entry {
        let mut entry = self.clone();
        entry.context.extend(context);
        entry
    }

    /// True when a record at `level` would reach the sink
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.logger.enabled(level)
    }

    /// Configured minimum level of the module this entry is bound to
    pub fn level(&self) -> LogLevel {
        self.logger.level()
    }

    pub fn module(&self) -> &ModuleKey {
        &self.origin.key
    }

    pub fn fields(&self) -> &LogContext {
        &self.context
    }

    #[track_caller]
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.emit(level, message.into(), Some(Location::caller()));
    }

    #[track_caller]
    pub fn trace(&self, message: impl Into<String>) {
        self.emit(LogLevel::Trace, message.into(), Some(Location::caller()));
    }

    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) {
        self.emit(LogLevel::Debug, message.into(), Some(Location::caller()));
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<String>) {
        self.emit(LogLevel::Info, message.into(), Some(Location::caller()));
    }

    #[track_caller]
    pub fn warn(&self, message: impl Into<String>) {
        self.emit(LogLevel::Warn, message.into(), Some(Location::caller()));
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<String>) {
        self.emit(LogLevel::Error, message.into(), Some(Location::caller()));
    }

    /// Write at Fatal, flush, then hand exit status 1 to the runtime's exit function
    #[track_caller]
    pub fn fatal(&self, message: impl Into<String>) -> ! {
        self.terminate(LogLevel::Fatal, message.into(), Some(Location::caller()))
    }

    /// Write at Panic, flush, then panic with the message
    #[track_caller]
    pub fn panic(&self, message: impl Into<String>) -> ! {
        self.terminate(LogLevel::Panic, message.into(), Some(Location::caller()))
    }

    /// Log the error at Error level; true when there was one
    #[track_caller]
    pub fn should<T, E: fmt::Display>(&self, result: &Result<T, E>) -> bool {
        self.check(LogLevel::Error, result)
    }

    /// Log the error at Warn level; true when there was one
    #[track_caller]
    pub fn should_warn<T, E: fmt::Display>(&self, result: &Result<T, E>) -> bool {
        self.check(LogLevel::Warn, result)
    }

    /// Unwrap `result`, or log `Error on must: <err>` at Panic level and panic
    #[track_caller]
    pub fn must<T, E: fmt::Display>(&self, result: Result<T, E>) -> T {
        match result {
            Ok(value) => value,
            Err(err) => self.terminate(
                LogLevel::Panic,
                format!("Error on must: {}", err),
                Some(Location::caller()),
            ),
        }
    }

    /// Unwrap `result`, or log `Fatal Error: <err>` at Fatal level and exit
    #[track_caller]
    pub fn must_fatal<T, E: fmt::Display>(&self, result: Result<T, E>) -> T {
        match result {
            Ok(value) => value,
            Err(err) => self.terminate(
                LogLevel::Fatal,
                format!("Fatal Error: {}", err),
                Some(Location::caller()),
            ),
        }
    }

    /// Run `f`; if it panics, log the panic message at Panic level and
    /// resume panicking with it.
    #[track_caller]
    pub fn log_panics<R>(&self, f: impl FnOnce() -> R + UnwindSafe) -> R {
        match panic::catch_unwind(f) {
            Ok(value) => value,
            Err(payload) => self.terminate(
                LogLevel::Panic,
                panic_message(payload.as_ref()),
                Some(Location::caller()),
            ),
        }
    }

    /// Start the runtime timer `key`
    pub fn time(&self, key: impl Into<String>) -> String {
        self.dispatcher.timers().start(key)
    }

    /// End the runtime timer `key`, rendering the elapsed time
    pub fn time_end(&self, key: &str) -> String {
        self.dispatcher.timers().end(key)
    }

    #[track_caller]
    fn check<T, E: fmt::Display>(&self, level: LogLevel, result: &Result<T, E>) -> bool {
        match result {
            Ok(_) => false,
            Err(err) => {
                self.emit(level, err.to_string(), Some(Location::caller()));
                true
            }
        }
    }

    pub(crate) fn emit(
        &self,
        level: LogLevel,
        message: String,
        caller: Option<&'static Location<'static>>,
    ) {
        if level.is_terminal() {
            self.terminate(level, message, caller);
        }
        if self.logger.enabled(level) {
            self.write(level, message, caller);
        } else {
            self.dispatcher.metrics().record_filtered();
        }
    }

    fn terminate(
        &self,
        level: LogLevel,
        message: String,
        caller: Option<&'static Location<'static>>,
    ) -> ! {
        let reason = message.clone();
        if self.logger.enabled(level) {
            self.write(level, message, caller);
        } else {
            self.dispatcher.metrics().record_filtered();
        }
        if let Err(e) = self.logger.sink().flush() {
            eprintln!("[LOGGER ERROR] Failed to flush before {}: {}", level, e);
        }

        match level {
            LogLevel::Fatal => (self.dispatcher.exit_fn())(1),
            _ => panic!("{}", reason),
        }
    }

    fn write(&self, level: LogLevel, message: String, caller: Option<&'static Location<'static>>) {
        let record = self.render(level, message, caller);
        match self.logger.sink().write(&record) {
            Ok(()) => {
                self.dispatcher.metrics().record_emitted();
            }
            Err(e) => {
                self.dispatcher.metrics().record_dropped();
                eprintln!("[LOGGER ERROR] Failed to write log entry: {}", e);
            }
        }
    }

    fn render(
        &self,
        level: LogLevel,
        message: String,
        caller: Option<&'static Location<'static>>,
    ) -> LogEntry {
        // A caller location only differs from the bound site when the entry
        // was kept and used from another line
        let (file, line): (Cow<'_, str>, u32) = match caller {
            Some(loc) if loc.file() != self.site.file => (
                Cow::Owned(clean_file_path(loc.file(), self.dispatcher.identifier().root())),
                loc.line(),
            ),
            Some(loc) => (Cow::Borrowed(&*self.origin.file), loc.line()),
            None => (Cow::Borrowed(&*self.origin.file), self.origin.line),
        };

        let mut context = self.context.clone();
        if self.flags.source_lines {
            context.add_field("file", format!("'{}:{}'", file, line));
        }
        if self.flags.thread_count {
            if let Some(count) = live_thread_count() {
                context.add_field("threads", count);
            }
        }

        LogEntry::new(level, message)
            .with_location(&file, line, self.origin.key.as_str())
            .with_context(context)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with a non-string payload".to_string()
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("module", &self.origin.key)
            .field("level", &self.logger.level())
            .field("fields", &self.context)
            .finish()
    }
}
