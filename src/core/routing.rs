//! Routing table and its atomically swapped handle

use super::{
    appender::Sink,
    config::{FeatureFlags, LogConfig},
    logger::Logger,
    module_id::ModuleKey,
};
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::Arc;

/// One immutable generation of routing: module key → logger, plus the
/// default logger used when no key matches.
#[derive(Debug)]
pub struct RoutingTable {
    generation: u64,
    default: Arc<Logger>,
    modules: HashMap<String, Arc<Logger>>,
    config: LogConfig,
}

impl RoutingTable {
    /// Build a table from a parsed configuration.
    ///
    /// Every logger clones `base`, so module loggers share the default
    /// logger's destination and record format. The global rule sets the
    /// default level, `Info` when the configuration has none.
    pub fn build(config: &LogConfig, base: &Sink, generation: u64) -> Self {
        let modules = config
            .modules()
            .map(|(key, level)| {
                let logger = Logger::new(Some(ModuleKey::new(key)), level, base.clone(), generation);
                (key.to_string(), Arc::new(logger))
            })
            .collect();

        Self {
            generation,
            default: Arc::new(Logger::new(
                None,
                config.default_level(),
                base.clone(),
                generation,
            )),
            modules,
            config: config.clone(),
        }
    }

    /// The logger for `key`, or the default logger
    #[inline]
    pub fn lookup(&self, key: &str) -> &Arc<Logger> {
        self.modules.get(key).unwrap_or(&self.default)
    }

    /// The logger configured for exactly `key`, without fallback
    pub fn get(&self, key: &str) -> Option<&Arc<Logger>> {
        self.modules.get(key)
    }

    pub fn default_entry(&self) -> &Arc<Logger> {
        &self.default
    }

    pub fn module_keys(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn flags(&self) -> FeatureFlags {
        self.config.flags()
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// The process's active routing table.
///
/// Readers load the current table without locking; [`swap`](Self::swap)
/// replaces it in one pointer store, so a lookup sees either the whole old
/// table or the whole new one.
#[derive(Debug)]
pub struct RoutingHandle {
    current: ArcSwap<RoutingTable>,
}

impl RoutingHandle {
    pub fn new(table: RoutingTable) -> Self {
        Self {
            current: ArcSwap::from_pointee(table),
        }
    }

    /// A coherent view for reading several keys from the same generation
    pub fn snapshot(&self) -> Arc<RoutingTable> {
        self.current.load_full()
    }

    pub fn lookup(&self, key: &str) -> Arc<Logger> {
        Arc::clone(self.current.load().lookup(key))
    }

    /// Install `table`, returning the table it replaced
    pub fn swap(&self, table: RoutingTable) -> Arc<RoutingTable> {
        self.current.swap(Arc::new(table))
    }

    pub fn flags(&self) -> FeatureFlags {
        self.current.load().flags()
    }

    pub fn generation(&self) -> u64 {
        self.current.load().generation()
    }

    /// Run `f` against the current table without cloning the `Arc`
    #[inline]
    pub fn with_current<R>(&self, f: impl FnOnce(&RoutingTable) -> R) -> R {
        f(&self.current.load())
    }
}
