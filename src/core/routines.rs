//! Live thread count and the periodic thread-count reporter

use super::{
    dispatcher::Dispatcher,
    error::Result,
    log_level::LogLevel,
};
use crossbeam_channel::{bounded, select, tick, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How often the reporter logs the thread count unless configured otherwise
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Number of live threads in this process, when the platform exposes it
pub fn live_thread_count() -> Option<usize> {
    #[cfg(target_os = "linux")]
    {
        std::fs::read_dir("/proc/self/task")
            .ok()
            .map(|tasks| tasks.count())
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

/// Background thread that logs `Threads: N` at Info once per interval.
///
/// Cancelled by [`stop`](Self::stop) or on drop; either way the thread is
/// joined before returning.
#[derive(Debug)]
pub struct ThreadReporter {
    cancel: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ThreadReporter {
    pub fn spawn(dispatcher: Dispatcher, interval: Duration) -> Result<Self> {
        let (cancel_tx, cancel_rx) = bounded::<()>(1);

        let handle = thread::Builder::new()
            .name("log-thread-reporter".to_string())
            .spawn(move || {
                let ticker = tick(interval);
                loop {
                    select! {
                        recv(cancel_rx) -> _ => break,
                        recv(ticker) -> _ => {
                            if let Some(count) = live_thread_count() {
                                dispatcher.log(
                                    &crate::callsite!(),
                                    LogLevel::Info,
                                    format!("Threads: {}", count),
                                );
                            }
                        }
                    }
                }
            })?;

        Ok(Self {
            cancel: Some(cancel_tx),
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Dropping the sender disconnects the channel, which also wakes the loop
        drop(self.cancel.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                eprintln!("[LOGGER ERROR] Thread reporter panicked during shutdown");
            }
        }
    }
}

impl Drop for ThreadReporter {
    fn drop(&mut self) {
        self.shutdown();
    }
}
