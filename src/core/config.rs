//! Configuration string parser
//!
//! A configuration string is a comma-delimited list of tokens:
//!
//! - `debug`: a bare level name sets the global (default) level
//! - `net/server=trace`: a `module=level` pair sets one module's level
//! - `ln`, `gr`, `grl`, `pp`: reserved flags (see [`FeatureFlags`])
//!
//! ```
//! use rust_module_logger::{LogConfig, LogLevel};
//!
//! let config: LogConfig = "warn,net/server=debug,ln".parse().unwrap();
//! assert_eq!(config.global(), Some(LogLevel::Warn));
//! assert_eq!(config.module_level("net/server"), Some(LogLevel::Debug));
//! assert!(config.flags().source_lines);
//! ```

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Tag every record with `file='path:line'`
pub const SOURCE_LINES_TOKEN: &str = "ln";
/// Tag every record with the live thread count
pub const THREAD_COUNT_TOKEN: &str = "gr";
/// Tag with the thread count and report it periodically
pub const THREAD_REPORT_TOKEN: &str = "grl";
/// Start the HTTP control plane
pub const CONTROL_PLANE_TOKEN: &str = "pp";

/// Process-wide switches carried by a configuration string
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    pub source_lines: bool,
    pub thread_count: bool,
    pub thread_report: bool,
    pub control_plane: bool,
}

impl FeatureFlags {
    /// Apply a reserved token, returning false if `token` is not one
    fn apply_token(&mut self, token: &str) -> bool {
        match token {
            SOURCE_LINES_TOKEN => self.source_lines = true,
            THREAD_COUNT_TOKEN => self.thread_count = true,
            THREAD_REPORT_TOKEN => {
                self.thread_count = true;
                self.thread_report = true;
            }
            CONTROL_PLANE_TOKEN => self.control_plane = true,
            _ => return false,
        }
        true
    }

    fn tokens(&self) -> Vec<&'static str> {
        let mut tokens = Vec::new();
        if self.source_lines {
            tokens.push(SOURCE_LINES_TOKEN);
        }
        if self.thread_report {
            tokens.push(THREAD_REPORT_TOKEN);
        } else if self.thread_count {
            tokens.push(THREAD_COUNT_TOKEN);
        }
        if self.control_plane {
            tokens.push(CONTROL_PLANE_TOKEN);
        }
        tokens
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RulePattern {
    /// The default entry, used when no module rule matches
    Global,
    Module(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRule {
    pub pattern: RulePattern,
    pub level: LogLevel,
}

/// A parsed configuration string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogConfig {
    global: Option<LogLevel>,
    modules: BTreeMap<String, LogLevel>,
    flags: FeatureFlags,
    source: String,
}

impl LogConfig {
    /// Parse a raw configuration string.
    ///
    /// Fails with [`LoggerError::MalformedConfig`] when a token holds more
    /// than one `=` or names no module before its `=`. Unknown level names
    /// are accepted as `Info`.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut config = LogConfig {
            source: raw.trim().to_string(),
            ..LogConfig::default()
        };

        for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let parts: Vec<&str> = token.split('=').collect();
            match parts.as_slice() {
                [single] => {
                    if !config.flags.apply_token(single) {
                        config.global = Some(LogLevel::from_config_name(single));
                    }
                }
                [key, level] => {
                    let key = normalize_module_key(key);
                    if key.is_empty() {
                        return Err(LoggerError::malformed(token));
                    }
                    config
                        .modules
                        .insert(key, LogLevel::from_config_name(level));
                }
                _ => return Err(LoggerError::malformed(token)),
            }
        }

        Ok(config)
    }

    /// Level of the global rule, if the string named one
    pub fn global(&self) -> Option<LogLevel> {
        self.global
    }

    /// Level the default entry will use
    pub fn default_level(&self) -> LogLevel {
        self.global.unwrap_or_default()
    }

    pub fn module_level(&self, key: &str) -> Option<LogLevel> {
        self.modules.get(key).copied()
    }

    pub fn modules(&self) -> impl Iterator<Item = (&str, LogLevel)> {
        self.modules.iter().map(|(key, level)| (key.as_str(), *level))
    }

    pub fn flags(&self) -> FeatureFlags {
        self.flags
    }

    /// The string this configuration was parsed from, trimmed
    pub fn source(&self) -> &str {
        &self.source
    }

    /// This configuration with the global rule set to `level`.
    ///
    /// The source string becomes the canonical rendering.
    #[must_use]
    pub fn with_global(mut self, level: LogLevel) -> Self {
        self.global = Some(level);
        self.source = self.to_string();
        self
    }

    /// This configuration with the `ln` flag switched on or off
    #[must_use]
    pub fn with_source_lines(mut self, enabled: bool) -> Self {
        self.flags.source_lines = enabled;
        self.source = self.to_string();
        self
    }

    /// All level rules, the global rule first
    pub fn rules(&self) -> Vec<ConfigRule> {
        let global = self.global.map(|level| ConfigRule {
            pattern: RulePattern::Global,
            level,
        });
        global
            .into_iter()
            .chain(self.modules.iter().map(|(key, level)| ConfigRule {
                pattern: RulePattern::Module(key.clone()),
                level: *level,
            }))
            .collect()
    }
}

impl FromStr for LogConfig {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        LogConfig::parse(s)
    }
}

/// Canonical rendering: global level, module rules sorted by key, then flags
impl fmt::Display for LogConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tokens: Vec<String> = Vec::new();
        if let Some(level) = self.global {
            tokens.push(level.config_name().to_string());
        }
        for (key, level) in &self.modules {
            tokens.push(format!("{}={}", key, level.config_name()));
        }
        tokens.extend(self.flags.tokens().into_iter().map(String::from));
        write!(f, "{}", tokens.join(","))
    }
}

/// Module keys may be written with Rust path separators; both forms route the same.
pub fn normalize_module_key(key: &str) -> String {
    key.trim().replace("::", "/").trim_matches('/').to_string()
}
