//! Per-module logger: one routing table entry

use super::{appender::Sink, log_level::LogLevel, module_id::ModuleKey};

/// A configured logger: the minimum level for one module (or the default)
/// and the sink its records go to.
///
/// Loggers are immutable; a reconfiguration builds new ones rather than
/// mutating levels in place, so a lookup never sees a half-applied change.
#[derive(Debug, Clone)]
pub struct Logger {
    key: Option<ModuleKey>,
    level: LogLevel,
    sink: Sink,
    generation: u64,
}

impl Logger {
    pub fn new(key: Option<ModuleKey>, level: LogLevel, sink: Sink, generation: u64) -> Self {
        Self {
            key,
            level,
            sink,
            generation,
        }
    }

    /// Module this logger was configured for; `None` for the default entry
    pub fn key(&self) -> Option<&ModuleKey> {
        self.key.as_ref()
    }

    pub fn is_default(&self) -> bool {
        self.key.is_none()
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// True when a record at `level` would be written
    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.level
    }

    pub fn sink(&self) -> &Sink {
        &self.sink
    }

    /// Routing table generation this logger was built for
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
