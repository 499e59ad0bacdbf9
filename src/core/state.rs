//! Shutdown state.
//!
//! `SHUTDOWN` is set by the Ctrl+C handler and polled between asset copies
//! and before each served request. A registered HTTP server is unblocked so
//! its request loop returns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use tiny_http::Server;

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// HTTP server reference for graceful shutdown
static SERVER: OnceLock<Arc<Server>> = OnceLock::new();

/// Setup the global Ctrl+C handler. Call once at program start
///
/// - Before `register_server()`: sets the flag; an in-flight build stops
///   after the copies already running, leaving no partial files
/// - After `register_server()`: unblocks the server's request loop
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        // Second Ctrl+C exits immediately
        if SHUTDOWN.swap(true, Ordering::SeqCst) {
            std::process::exit(130);
        }

        if let Some(server) = SERVER.get() {
            crate::log!("serve"; "shutting down...");
            server.unblock();
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register the HTTP server for graceful shutdown
pub fn register_server(server: Arc<Server>) {
    let _ = SERVER.set(server);
}

/// Check if shutdown has been requested
///
/// Relaxed ordering: at worst a few more items are processed before stopping
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_shutdown_by_default() {
        // Tests never install the handler, so the flag stays clear
        assert!(!is_shutdown());
    }
}
