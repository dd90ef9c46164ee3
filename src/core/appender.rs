//! Appender trait for log output destinations, and the shared [`Sink`] handle

use super::{
    error::{LoggerError, Result},
    log_entry::LogEntry,
};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

pub trait Appender: Send + Sync {
    fn append(&mut self, entry: &LogEntry) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}

/// A cloneable handle to one output destination.
///
/// Every logger built from the same routing table clones the runtime's
/// base sink, so per-module loggers write to the same place in the same
/// format as the default logger. The appender is locked only for the
/// duration of a single write.
#[derive(Clone)]
pub struct Sink {
    appender: Arc<Mutex<Box<dyn Appender>>>,
}

impl Sink {
    pub fn new<A: Appender + 'static>(appender: A) -> Self {
        Self::from_boxed(Box::new(appender))
    }

    pub fn from_boxed(appender: Box<dyn Appender>) -> Self {
        Self {
            appender: Arc::new(Mutex::new(appender)),
        }
    }

    /// Write one already-filtered entry.
    ///
    /// A panicking appender is caught and reported as an error so it cannot
    /// take the calling thread down with it.
    pub fn write(&self, entry: &LogEntry) -> Result<()> {
        let mut appender = self.appender.lock();
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| appender.append(entry))) {
            Ok(result) => result,
            Err(panic_info) => Err(LoggerError::writer(format!(
                "appender '{}' panicked: {}",
                appender.name(),
                panic_message(panic_info.as_ref())
            ))),
        }
    }

    pub fn flush(&self) -> Result<()> {
        self.appender.lock().flush()
    }

    pub fn name(&self) -> String {
        self.appender.lock().name().to_string()
    }

    /// True when both handles point at the same destination
    pub fn same_destination(&self, other: &Sink) -> bool {
        Arc::ptr_eq(&self.appender, &other.appender)
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink").field("appender", &self.name()).finish()
    }
}

pub(crate) fn panic_message(panic_info: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;

    struct PanickingAppender;

    impl Appender for PanickingAppender {
        fn append(&mut self, _entry: &LogEntry) -> Result<()> {
            panic!("boom");
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    #[test]
    fn test_panicking_appender_is_isolated() {
        let sink = Sink::new(PanickingAppender);
        let err = sink
            .write(&LogEntry::new(LogLevel::Info, "x".to_string()))
            .unwrap_err();

        assert!(err.to_string().contains("panicking"));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_clones_share_destination() {
        let sink = Sink::new(PanickingAppender);
        let other = Sink::new(PanickingAppender);

        assert!(sink.same_destination(&sink.clone()));
        assert!(!sink.same_destination(&other));
    }
}
