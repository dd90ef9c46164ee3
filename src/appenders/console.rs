//! Console appender implementation

use crate::core::{Appender, LogEntry, OutputFormat, Result, TimestampFormat};
use colored::Colorize;

/// Writes records to the terminal. Error and above go to stderr, the rest
/// to stdout.
pub struct ConsoleAppender {
    use_colors: bool,
    timestamp_format: TimestampFormat,
    output_format: OutputFormat,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        Self {
            use_colors: true,
            timestamp_format: TimestampFormat::default(),
            output_format: OutputFormat::default(),
        }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors,
            ..Self::new()
        }
    }

    /// Set the output format for this appender
    ///
    /// ```
    /// use rust_module_logger::appenders::ConsoleAppender;
    /// use rust_module_logger::OutputFormat;
    ///
    /// let appender = ConsoleAppender::new().with_output_format(OutputFormat::Logfmt);
    /// ```
    #[must_use]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Render `entry` the way it would appear on the terminal
    pub fn render(&self, entry: &LogEntry) -> String {
        match self.output_format {
            OutputFormat::Text if self.use_colors => self.format_colored(entry),
            _ => self.output_format.format(entry, &self.timestamp_format),
        }
    }

    fn format_colored(&self, entry: &LogEntry) -> String {
        let level = format!("{:5}", entry.level.to_str()).color(entry.level.color_code());
        let mut output = format!(
            "[{}] [{}] {}",
            self.timestamp_format.format(&entry.timestamp).dimmed(),
            level,
            entry.message
        );

        if let Some(ref context) = entry.context {
            for (key, value) in context.fields() {
                output.push(' ');
                output.push_str(&format!("{}={}", key.color(entry.level.color_code()), value));
            }
        }

        output
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for ConsoleAppender {
    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        let output = self.render(entry);

        if entry.level.is_critical() {
            eprintln!("{}", output);
        } else {
            println!("{}", output);
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        use std::io::Write;
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogContext, LogLevel};

    #[test]
    fn test_plain_render_matches_text_format() {
        let appender = ConsoleAppender::with_colors(false);
        let entry = LogEntry::new(LogLevel::Warn, "disk low".to_string())
            .with_context(LogContext::new().with_field("module", "storage"));

        let rendered = appender.render(&entry);
        assert!(rendered.contains("[WARN ] disk low module=storage"), "{rendered}");
    }

    #[test]
    fn test_colored_render_keeps_message() {
        colored::control::set_override(true);
        let appender = ConsoleAppender::new();
        let entry = LogEntry::new(LogLevel::Error, "boom".to_string());

        let rendered = appender.render(&entry);
        assert!(rendered.contains("boom"));
        assert!(rendered.contains("\u{1b}["));
    }
}
