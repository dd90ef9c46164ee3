//! HTTP control plane for reading and replacing the active configuration.
//!
//! | Method | Path         | Behavior                                       |
//! |--------|--------------|------------------------------------------------|
//! | GET    | `/`          | empty 200, a liveness probe                    |
//! | GET    | `/logstring` | the active configuration string                |
//! | POST   | `/logstring` | body (trimmed) is applied with `reconfigure`   |
//!
//! A rejected configuration answers 400 and leaves the active table alone.

use crate::core::{LogLevel, LoggerError, LoggingRuntime, Result};
use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

pub fn router(runtime: Arc<LoggingRuntime>) -> Router {
    Router::new()
        .route("/", get(|| async {}))
        .route("/logstring", get(get_logstring).post(set_logstring))
        .with_state(runtime)
}

async fn get_logstring(State(runtime): State<Arc<LoggingRuntime>>) -> String {
    runtime.config_string()
}

async fn set_logstring(
    State(runtime): State<Arc<LoggingRuntime>>,
    body: String,
) -> (StatusCode, String) {
    let raw = body.trim();
    match runtime.reconfigure(raw) {
        Ok(()) => {
            runtime
                .with_field(&crate::callsite!(), "config", raw)
                .info("log configuration applied");
            (StatusCode::OK, format!("New log config: {}", raw))
        }
        Err(e) => {
            runtime.log(
                &crate::callsite!(),
                LogLevel::Warn,
                format!("rejected log configuration {:?}: {}", raw, e),
            );
            (StatusCode::BAD_REQUEST, format!("Error: {}", e))
        }
    }
}

/// Serve the control plane on `addr` until the listener fails
pub async fn serve(runtime: Arc<LoggingRuntime>, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(runtime)).await?;
    Ok(())
}

/// Bind `0.0.0.0:port` and serve the control plane from a background thread
/// with its own single-threaded tokio runtime.
///
/// The port is bound before returning, so a port already in use is
/// reported to the caller.
pub fn spawn_control_plane(runtime: Arc<LoggingRuntime>, port: u16) -> Result<JoinHandle<()>> {
    let listener = std::net::TcpListener::bind(("0.0.0.0", port))
        .map_err(|e| LoggerError::ControlPlane(format!("cannot bind port {}: {}", port, e)))?;
    listener.set_nonblocking(true)?;

    let executor = tokio::runtime::Builder::new_current_thread()
        .enable_io()
        .build()?;

    let handle = thread::Builder::new()
        .name("log-control-plane".to_string())
        .spawn(move || {
            let outcome = executor.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener)?;
                axum::serve(listener, router(runtime)).await?;
                Ok::<(), LoggerError>(())
            });
            if let Err(e) = outcome {
                eprintln!("[LOGGER ERROR] Control plane stopped: {}", e);
            }
        })?;

    Ok(handle)
}
