//! Named stopwatch timers

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Returned by [`Timers::end`] for a key that was never started
pub const UNKNOWN_TIMER: &str = "unknown timer";

/// Named timers shared by every caller of one runtime.
///
/// Starting a key that is already running restarts it. A timer that is
/// never ended stays in the map until the runtime is dropped.
#[derive(Debug, Default)]
pub struct Timers {
    started: Mutex<HashMap<String, Instant>>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) the timer `key`, returning the key
    pub fn start(&self, key: impl Into<String>) -> String {
        let key = key.into();
        self.started.lock().insert(key.clone(), Instant::now());
        key
    }

    /// Stop the timer `key` and render the elapsed time, e.g. `1.234ms`
    pub fn end(&self, key: &str) -> String {
        let started = self.started.lock().remove(key);
        match started {
            Some(at) => format!("{:?}", at.elapsed()),
            None => UNKNOWN_TIMER.to_string(),
        }
    }

    /// Time since `key` was started, without stopping it
    pub fn elapsed(&self, key: &str) -> Option<Duration> {
        self.started.lock().get(key).map(Instant::elapsed)
    }

    pub fn is_running(&self, key: &str) -> bool {
        self.started.lock().contains_key(key)
    }

    /// Number of started, not yet ended timers
    pub fn len(&self) -> usize {
        self.started.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
