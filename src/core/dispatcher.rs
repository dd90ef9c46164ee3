//! Per-call dispatch: resolve the call site, pick its logger, tag the record

use super::{
    config::{normalize_module_key, FeatureFlags},
    entry::Entry,
    log_context::LogContext,
    log_level::LogLevel,
    logger::Logger,
    metrics::LoggerMetrics,
    module_id::{CallSite, ModuleIdentifier, ModuleKey, ResolvedSite},
    routing::RoutingHandle,
    timer::Timers,
};
use std::fmt;
use std::sync::Arc;

/// Called with exit status 1 after a Fatal record is written
pub type ExitFn = fn(i32) -> !;

/// Shared entry point for every logging call of one runtime.
///
/// Cheap to clone; clones share the routing table, the resolution cache,
/// metrics and timers.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Shared>,
}

struct Shared {
    routing: RoutingHandle,
    identifier: ModuleIdentifier,
    metrics: LoggerMetrics,
    timers: Timers,
    exit: ExitFn,
}

impl Dispatcher {
    pub fn new(routing: RoutingHandle, identifier: ModuleIdentifier, exit: ExitFn) -> Self {
        Self {
            inner: Arc::new(Shared {
                routing,
                identifier,
                metrics: LoggerMetrics::new(),
                timers: Timers::new(),
                exit,
            }),
        }
    }

    pub fn routing(&self) -> &RoutingHandle {
        &self.inner.routing
    }

    pub fn identifier(&self) -> &ModuleIdentifier {
        &self.inner.identifier
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.inner.metrics
    }

    pub fn timers(&self) -> &Timers {
        &self.inner.timers
    }

    pub(crate) fn exit_fn(&self) -> ExitFn {
        self.inner.exit
    }

    /// True when a record at `level` from `site` would reach the sink
    pub fn enabled(&self, site: &CallSite, level: LogLevel) -> bool {
        let resolved = self.inner.identifier.resolve(site);
        self.inner
            .routing
            .with_current(|table| table.lookup(resolved.key.as_str()).enabled(level))
    }

    /// Resolve `site` and return a tagged entry, or `None` when `level` is
    /// below the module's configured level.
    ///
    /// Nothing is formatted or allocated for the record itself before this
    /// check, which is what lets the macros skip `format!` entirely for
    /// disabled levels. Fatal and Panic always produce an entry because
    /// their side effects do not depend on the configured level.
    pub fn prepare(&self, site: &CallSite, level: LogLevel) -> Option<Entry> {
        let resolved = self.inner.identifier.resolve(site);
        let selected = self.inner.routing.with_current(|table| {
            let logger = table.lookup(resolved.key.as_str());
            (logger.enabled(level) || level.is_terminal())
                .then(|| (Arc::clone(logger), table.flags()))
        });

        match selected {
            Some((logger, flags)) => Some(Entry::tagged(self.clone(), logger, flags, *site, resolved)),
            None => {
                self.inner.metrics.record_filtered();
                None
            }
        }
    }

    /// A tagged entry for `site` regardless of level, for pinning fields
    pub fn entry(&self, site: &CallSite) -> Entry {
        let resolved = self.inner.identifier.resolve(site);
        let (logger, flags): (Arc<Logger>, FeatureFlags) = self.inner.routing.with_current(|table| {
            (Arc::clone(table.lookup(resolved.key.as_str())), table.flags())
        });
        Entry::tagged(self.clone(), logger, flags, *site, resolved)
    }

    /// An entry for an explicitly named module key instead of a call site.
    ///
    /// Routes to the key's logger when one is configured and to the default
    /// entry otherwise; either way the record is tagged with `key`. Source
    /// locations come from wherever the entry is used.
    pub fn entry_for(&self, key: &str) -> Entry {
        let origin = ResolvedSite {
            key: ModuleKey::new(normalize_module_key(key)),
            file: Arc::from(""),
            line: 0,
        };
        let (logger, flags): (Arc<Logger>, FeatureFlags) = self.inner.routing.with_current(|table| {
            (Arc::clone(table.lookup(origin.key.as_str())), table.flags())
        });
        Entry::tagged(self.clone(), logger, flags, CallSite::UNKNOWN, origin)
    }

    pub fn log(&self, site: &CallSite, level: LogLevel, message: impl Into<String>) {
        if let Some(entry) = self.prepare(site, level) {
            entry.emit(level, message.into(), None);
        }
    }

    pub fn log_with_fields(
        &self,
        site: &CallSite,
        level: LogLevel,
        message: impl Into<String>,
        fields: LogContext,
    ) {
        if let Some(entry) = self.prepare(site, level) {
            entry.with_context(fields).emit(level, message.into(), None);
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("root", &self.inner.identifier.root())
            .field("generation", &self.inner.routing.generation())
            .finish()
    }
}
