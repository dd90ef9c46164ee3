//! Logging runtime: owns the routing table, the reconfiguration path and
//! the optional process-wide instance.

use super::{
    appender::{Appender, Sink},
    config::{FeatureFlags, LogConfig},
    dispatcher::{Dispatcher, ExitFn},
    entry::Entry,
    error::{LoggerError, Result},
    log_context::FieldValue,
    log_level::LogLevel,
    logger::Logger,
    metrics::LoggerMetrics,
    module_id::{strip_version_suffix, CallSite, ModuleIdentifier},
    routines::{ThreadReporter, DEFAULT_REPORT_INTERVAL},
    routing::{RoutingHandle, RoutingTable},
    timer::Timers,
};
use crate::appenders::ConsoleAppender;
use parking_lot::Mutex;
use std::fmt;
use std::panic::UnwindSafe;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// Environment variable read for the initial configuration of the global runtime
pub const DEFAULT_CONFIG_ENV: &str = "LOG";

/// Read instead of the configuration variable when that one is unset
pub const LEGACY_CONFIG_ENV: &str = "GOLANG_LOG";

/// Port the control plane listens on when started by the `pp` flag
pub const DEFAULT_CONTROL_PORT: u16 = 11111;

/// Everything one logging setup needs: the dispatcher every call goes
/// through, the base sink new routing tables are built from, and the
/// thread reporter.
///
/// Most programs use the process-wide instance through the macros and
/// [`init!`](crate::init); tests and libraries that want isolation build
/// their own with [`LoggingRuntime::builder`].
pub struct LoggingRuntime {
    dispatcher: Dispatcher,
    base_sink: Sink,
    reconfigure_lock: Mutex<()>,
    report_interval: Duration,
    reporter: Mutex<Option<ThreadReporter>>,
}

impl LoggingRuntime {
    /// ```
    /// use rust_module_logger::prelude::*;
    ///
    /// let runtime = LoggingRuntime::builder()
    ///     .root_module("my_app")
    ///     .appender(ConsoleAppender::with_colors(false))
    ///     .config("warn,net/server=debug")
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(runtime.lookup("net/server").level(), LogLevel::Debug);
    /// assert_eq!(runtime.lookup("db").level(), LogLevel::Warn);
    /// ```
    #[must_use]
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Console output configured from the environment variable `var`.
    ///
    /// An unset variable is the empty configuration.
    pub fn from_env(root_module: &str, var: &str) -> Result<Self> {
        let raw = std::env::var(var).unwrap_or_default();
        Self::builder().root_module(root_module).config(raw).build()
    }

    fn assemble(
        root_module: &str,
        base_sink: Sink,
        config: LogConfig,
        exit: ExitFn,
        report_interval: Duration,
    ) -> Self {
        let table = RoutingTable::build(&config, &base_sink, 1);
        let dispatcher = Dispatcher::new(
            RoutingHandle::new(table),
            ModuleIdentifier::new(root_module),
            exit,
        );

        let runtime = Self {
            dispatcher,
            base_sink,
            reconfigure_lock: Mutex::new(()),
            report_interval,
            reporter: Mutex::new(None),
        };
        runtime.sync_reporter(config.flags());
        runtime
    }

    /// Parse `raw` and replace the routing table with one built from it.
    ///
    /// On a parse error the current table stays active and the error is
    /// returned. Concurrent log calls see either the old table or the new
    /// one, never a mix. Applying the same string twice is equivalent to
    /// applying it once.
    pub fn reconfigure(&self, raw: &str) -> Result<()> {
        let config = LogConfig::parse(raw)?;

        let _guard = self.reconfigure_lock.lock();
        self.install(&config);
        Ok(())
    }

    /// Set the level of the default entry, keeping module rules and flags
    pub fn set_level(&self, level: LogLevel) {
        self.update(|config| config.with_global(level));
    }

    /// Switch the `file` tag on or off, keeping every other rule
    pub fn set_source_lines(&self, enabled: bool) {
        self.update(|config| config.with_source_lines(enabled));
    }

    fn update(&self, change: impl FnOnce(LogConfig) -> LogConfig) {
        let _guard = self.reconfigure_lock.lock();
        let config = change(self.config());
        self.install(&config);
    }

    // Callers hold `reconfigure_lock`
    fn install(&self, config: &LogConfig) {
        let routing = self.dispatcher.routing();
        let table = RoutingTable::build(config, &self.base_sink, routing.generation() + 1);
        routing.swap(table);
        self.sync_reporter(config.flags());
        self.dispatcher.metrics().record_reconfiguration();
    }

    fn sync_reporter(&self, flags: FeatureFlags) {
        let mut reporter = self.reporter.lock();
        match (flags.thread_report, reporter.is_some()) {
            (true, false) => {
                match ThreadReporter::spawn(self.dispatcher.clone(), self.report_interval) {
                    Ok(started) => *reporter = Some(started),
                    Err(e) => eprintln!("[LOGGER ERROR] Failed to start thread reporter: {}", e),
                }
            }
            (false, true) => {
                if let Some(running) = reporter.take() {
                    running.stop();
                }
            }
            _ => {}
        }
    }

    /// The configuration the active table was built from
    pub fn config(&self) -> LogConfig {
        self.dispatcher
            .routing()
            .with_current(|table| table.config().clone())
    }

    /// The active configuration string, as it was applied
    pub fn config_string(&self) -> String {
        self.dispatcher
            .routing()
            .with_current(|table| table.config().source().to_string())
    }

    pub fn routing(&self) -> &RoutingHandle {
        self.dispatcher.routing()
    }

    /// The logger a record tagged `key` would be routed to
    pub fn lookup(&self, key: &str) -> Arc<Logger> {
        self.dispatcher.routing().lookup(key)
    }

    pub fn generation(&self) -> u64 {
        self.dispatcher.routing().generation()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn root_module(&self) -> &str {
        self.dispatcher.identifier().root()
    }

    pub fn enabled(&self, site: &CallSite, level: LogLevel) -> bool {
        self.dispatcher.enabled(site, level)
    }

    pub fn prepare(&self, site: &CallSite, level: LogLevel) -> Option<Entry> {
        self.dispatcher.prepare(site, level)
    }

    pub fn entry(&self, site: &CallSite) -> Entry {
        self.dispatcher.entry(site)
    }

    /// An entry for the module `key`, for code that names its module explicitly
    pub fn entry_for(&self, key: &str) -> Entry {
        self.dispatcher.entry_for(key)
    }

    pub fn log(&self, site: &CallSite, level: LogLevel, message: impl Into<String>) {
        self.dispatcher.log(site, level, message);
    }

    pub fn with_field(
        &self,
        site: &CallSite,
        key: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Entry {
        self.entry(site).with_field(key, value)
    }

    pub fn with_fields<K, V, I>(&self, site: &CallSite, fields: I) -> Entry
    where
        K: Into<String>,
        V: Into<FieldValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.entry(site).with_fields(fields)
    }

    pub fn with_error(&self, site: &CallSite, err: impl fmt::Display) -> Entry {
        self.entry(site).with_error(err)
    }

    #[track_caller]
    pub fn should<T, E: fmt::Display>(
        &self,
        site: &CallSite,
        result: &std::result::Result<T, E>,
    ) -> bool {
        result.is_err() && self.entry(site).should(result)
    }

    #[track_caller]
    pub fn should_warn<T, E: fmt::Display>(
        &self,
        site: &CallSite,
        result: &std::result::Result<T, E>,
    ) -> bool {
        result.is_err() && self.entry(site).should_warn(result)
    }

    #[track_caller]
    pub fn must<T, E: fmt::Display>(
        &self,
        site: &CallSite,
        result: std::result::Result<T, E>,
    ) -> T {
        match result {
            Ok(value) => value,
            Err(err) => self.entry(site).must(Err(err)),
        }
    }

    #[track_caller]
    pub fn must_fatal<T, E: fmt::Display>(
        &self,
        site: &CallSite,
        result: std::result::Result<T, E>,
    ) -> T {
        match result {
            Ok(value) => value,
            Err(err) => self.entry(site).must_fatal(Err(err)),
        }
    }

    /// Run `f`, logging a panic's message at Panic level before it propagates
    #[track_caller]
    pub fn log_panics<R>(&self, site: &CallSite, f: impl FnOnce() -> R + UnwindSafe) -> R {
        self.entry(site).log_panics(f)
    }

    pub fn timers(&self) -> &Timers {
        self.dispatcher.timers()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        self.dispatcher.metrics()
    }

    pub fn flush(&self) -> Result<()> {
        self.base_sink.flush()
    }

    pub fn is_reporting(&self) -> bool {
        self.reporter
            .lock()
            .as_ref()
            .is_some_and(ThreadReporter::is_running)
    }

    /// Stop the thread reporter and flush the sink
    pub fn shutdown(&self) {
        if let Some(running) = self.reporter.lock().take() {
            running.stop();
        }
        if let Err(e) = self.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
        }
    }
}

impl Drop for LoggingRuntime {
    fn drop(&mut self) {
        if let Some(running) = self.reporter.get_mut().take() {
            running.stop();
        }
        if let Err(e) = self.base_sink.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
        }
    }
}

impl fmt::Debug for LoggingRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingRuntime")
            .field("root_module", &self.root_module())
            .field("config", &self.config_string())
            .field("generation", &self.generation())
            .field("sink", &self.base_sink)
            .finish()
    }
}

/// Builder for [`LoggingRuntime`]
pub struct RuntimeBuilder {
    root_module: Option<String>,
    sink: Option<Sink>,
    config: String,
    exit: ExitFn,
    report_interval: Duration,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            root_module: None,
            sink: None,
            config: String::new(),
            exit: std::process::exit,
            report_interval: DEFAULT_REPORT_INTERVAL,
        }
    }

    /// Crate name whose modules get short keys. Defaults to the executable's name.
    #[must_use = "builder methods return a new value"]
    pub fn root_module(mut self, root: impl Into<String>) -> Self {
        self.root_module = Some(root.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.sink = Some(Sink::new(appender));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn sink(mut self, sink: Sink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Initial configuration string; empty by default
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, raw: impl Into<String>) -> Self {
        self.config = raw.into();
        self
    }

    /// Replace `std::process::exit` as the Fatal handler
    #[must_use = "builder methods return a new value"]
    pub fn exit_fn(mut self, exit: ExitFn) -> Self {
        self.exit = exit;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn report_interval(mut self, interval: Duration) -> Self {
        self.report_interval = interval;
        self
    }

    pub fn build(self) -> Result<LoggingRuntime> {
        if self.report_interval.is_zero() {
            return Err(LoggerError::config(
                "ThreadReporter",
                "report interval must be greater than zero",
            ));
        }
        let config = LogConfig::parse(&self.config)?;
        let root = self.root_module.unwrap_or_else(default_root);
        let sink = self
            .sink
            .unwrap_or_else(|| Sink::new(ConsoleAppender::new()));

        Ok(LoggingRuntime::assemble(
            &root,
            sink,
            config,
            self.exit,
            self.report_interval,
        ))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Crate name of the running executable, derived from its file name
pub fn default_root() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|path| {
            path.file_stem()
                .map(|stem| crate_name_from_stem(&stem.to_string_lossy()))
        })
        .unwrap_or_default()
}

// Test and bench binaries are named `<crate>-<16 hex>`
fn crate_name_from_stem(stem: &str) -> String {
    strip_version_suffix(stem).replace('-', "_")
}

static GLOBAL: OnceLock<Arc<LoggingRuntime>> = OnceLock::new();

/// Install `runtime` as the process-wide instance used by the macros.
///
/// Only the first installation wins; afterwards (including after the
/// instance was lazily created by a logging call) this returns
/// [`LoggerError::AlreadyInitialized`].
pub fn init_global(runtime: LoggingRuntime) -> Result<()> {
    GLOBAL
        .set(Arc::new(runtime))
        .map_err(|_| LoggerError::AlreadyInitialized)
}

/// The process-wide runtime, created on first use from `LOG`.
///
/// A runtime created here is rooted at the executable's crate name. The
/// macros go through [`global_at`] instead, which roots it at the crate of
/// the first logging call.
pub fn global() -> &'static LoggingRuntime {
    global_arc(default_root)
}

/// The process-wide runtime; when this call creates it, its root module
/// is the crate `site` was compiled in.
pub fn global_at(site: &CallSite) -> &'static LoggingRuntime {
    global_arc(|| match site.crate_name() {
        "" => default_root(),
        name => name.to_string(),
    })
}

/// Shared handle to the process-wide runtime, e.g. for the control plane
pub fn global_handle() -> Arc<LoggingRuntime> {
    Arc::clone(global_arc(default_root))
}

fn global_arc(root: impl FnOnce() -> String) -> &'static Arc<LoggingRuntime> {
    GLOBAL.get_or_init(|| {
        Arc::new(startup_runtime(
            &root(),
            DEFAULT_CONFIG_ENV,
            Sink::new(ConsoleAppender::new()),
            std::process::exit,
        ))
    })
}

/// Build the process-wide runtime for `root` from the variable `var` and
/// install it. Used by [`init!`](crate::init).
///
/// When `var` is unset, [`LEGACY_CONFIG_ENV`] is read instead. A malformed
/// configuration is logged at Fatal level and the process exits with
/// status 1. When the configuration carries the `pp` flag the control
/// plane is started on [`DEFAULT_CONTROL_PORT`].
pub fn init_from_env(root: &str, var: &str) -> Result<&'static LoggingRuntime> {
    let runtime = Arc::new(startup_runtime(
        root,
        var,
        Sink::new(ConsoleAppender::new()),
        std::process::exit,
    ));
    let control_plane = runtime.config().flags().control_plane;

    GLOBAL
        .set(runtime)
        .map_err(|_| LoggerError::AlreadyInitialized)?;
    let installed = global_arc(default_root);

    if control_plane {
        start_control_plane(installed);
    }
    Ok(installed)
}

/// The configuration string in `var`, or in `fallback` when `var` is unset,
/// with the name of the variable it came from
fn config_from_env(var: &str, fallback: &str) -> (String, String) {
    match std::env::var(var) {
        Ok(raw) => (var.to_string(), raw),
        Err(_) => match std::env::var(fallback) {
            Ok(raw) => (fallback.to_string(), raw),
            Err(_) => (var.to_string(), String::new()),
        },
    }
}

fn startup_runtime(root: &str, var: &str, sink: Sink, exit: ExitFn) -> LoggingRuntime {
    let (origin, raw) = config_from_env(var, LEGACY_CONFIG_ENV);
    let assemble = |config: LogConfig| {
        LoggingRuntime::assemble(root, sink, config, exit, DEFAULT_REPORT_INTERVAL)
    };

    match LogConfig::parse(&raw) {
        Ok(config) => assemble(config),
        Err(e) => assemble(LogConfig::default())
            .entry(&crate::callsite!())
            .fatal(format!("Error parsing log configuration from {}: {}", origin, e)),
    }
}

#[cfg(feature = "control-plane")]
fn start_control_plane(runtime: &Arc<LoggingRuntime>) {
    match crate::control::spawn_control_plane(Arc::clone(runtime), DEFAULT_CONTROL_PORT) {
        Ok(_) => runtime.log(
            &crate::callsite!(),
            LogLevel::Info,
            format!("Log control plane listening on port {}", DEFAULT_CONTROL_PORT),
        ),
        Err(e) => eprintln!("[LOGGER ERROR] Failed to start control plane: {}", e),
    }
}

#[cfg(not(feature = "control-plane"))]
fn start_control_plane(_runtime: &Arc<LoggingRuntime>) {
    eprintln!(
        "[LOGGER WARNING] '{}' is set but this build has no control-plane feature",
        super::config::CONTROL_PLANE_TOKEN
    );
}

/// Reconfigure the process-wide runtime
pub fn set_global_config(raw: &str) -> Result<()> {
    global().reconfigure(raw)
}

/// Entry for the module `key` on the process-wide runtime
pub fn logger_for(key: &str) -> Entry {
    global().entry_for(key)
}

/// Set the default level of the process-wide runtime
pub fn set_level(level: LogLevel) {
    global().set_level(level);
}

/// Switch the `file` tag of the process-wide runtime on or off
pub fn set_source_lines(enabled: bool) {
    global().set_source_lines(enabled);
}

/// Start the process-wide timer `key`
pub fn time(key: impl Into<String>) -> String {
    global().timers().start(key)
}

/// End the process-wide timer `key`, rendering the elapsed time
pub fn time_end(key: &str) -> String {
    global().timers().end(key)
}
