//! Changing module levels at runtime
//!
//! Builds an explicit runtime, logs from two modules while switching
//! configurations, and shows that a malformed configuration is rejected
//! without touching the active one.
//!
//! Run with: cargo run --example runtime_reconfigure

use rust_module_logger::prelude::*;
use rust_module_logger::{debug, info};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

mod ingest {
    use super::*;

    pub fn tick(runtime: &LoggingRuntime, n: u32) {
        debug!(runtime: runtime, "ingest batch {} parsed", n);
        info!(runtime: runtime, "ingest batch {} stored", n);
    }
}

mod billing {
    use super::*;

    pub fn tick(runtime: &LoggingRuntime, n: u32) {
        debug!(runtime: runtime, "billing run {} computed", n);
    }
}

fn main() -> Result<()> {
    println!("=== Module Logger - Runtime Reconfiguration Example ===\n");

    let runtime = Arc::new(
        LoggingRuntime::builder()
            .root_module("runtime_reconfigure")
            .appender(ConsoleAppender::new().with_timestamp_format(TimestampFormat::Clock))
            .config("info")
            .build()?,
    );

    let worker = {
        let runtime = Arc::clone(&runtime);
        thread::spawn(move || {
            for n in 0..6 {
                ingest::tick(&runtime, n);
                billing::tick(&runtime, n);
                thread::sleep(Duration::from_millis(150));
            }
        })
    };

    for raw in ["info,billing=debug", "warn,ingest=debug,ln", "info"] {
        thread::sleep(Duration::from_millis(300));
        runtime.reconfigure(raw)?;
        println!("-- applied {:?} (generation {})", raw, runtime.generation());
    }

    match runtime.reconfigure("ingest=debug=oops") {
        Ok(()) => println!("-- unexpected: malformed configuration accepted"),
        Err(e) => println!("-- rejected: {} (still {:?})", e, runtime.config_string()),
    }

    if worker.join().is_err() {
        eprintln!("worker thread panicked");
    }

    let metrics = runtime.metrics();
    println!(
        "\nemitted={} filtered={} reconfigurations={}",
        metrics.emitted_count(),
        metrics.filtered_count(),
        metrics.reconfiguration_count()
    );

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
