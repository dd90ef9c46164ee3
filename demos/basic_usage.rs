//! Basic module logger usage
//!
//! Demonstrates the global macros, per-module levels and pinned fields.
//!
//! Run with: LOG="info,storage=debug,ln" cargo run --example basic_usage

use rust_module_logger::{debug, info, init, should, warn, with_field};

mod storage {
    use rust_module_logger::{debug, info};

    pub fn open(path: &str) {
        debug!("opening {}", path);
        info!("storage ready");
    }
}

mod http {
    use rust_module_logger::{debug, warn};

    pub fn serve(port: u16) {
        debug!("binding port {}", port);
        warn!("serving without TLS on port {}", port);
    }
}

fn main() -> rust_module_logger::Result<()> {
    println!("=== Module Logger - Basic Usage Example ===\n");

    // Reads LOG; the crate name becomes the root module
    let runtime = init!()?;
    println!("Active configuration: {:?}\n", runtime.config_string());

    println!("1. Each module is filtered by its own level:");
    storage::open("/var/lib/demo");
    http::serve(8080);
    debug!("main debug (visible only when the default level allows it)");
    info!("main info");

    println!("\n2. Fields pinned on an entry:");
    let request = with_field!("request_id", "r-42");
    request.info("request received");
    request.with_field("status", 200).info("request served");

    println!("\n3. Error-check helpers:");
    let parsed = "eighty".parse::<u16>();
    if should!(parsed) {
        warn!("falling back to the default port");
    }

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
