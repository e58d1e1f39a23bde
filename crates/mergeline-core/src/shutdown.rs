//! Graceful shutdown support via atomic flag
//!
//! The CLI registers a SIGINT/SIGTERM handler that sets the flag; the
//! orchestrator checks it between records, so a run stops at a record
//! boundary and the summary still reports what was done.

use std::sync::atomic::{AtomicBool, Ordering};

/// Global shutdown flag.
pub fn shutdown_flag() -> &'static AtomicBool {
    static FLAG: AtomicBool = AtomicBool::new(false);
    &FLAG
}

/// Check if shutdown was requested.
pub fn is_shutdown_requested() -> bool {
    shutdown_flag().load(Ordering::Relaxed)
}

/// Request shutdown (called from signal handlers).
pub fn request_shutdown() {
    shutdown_flag().store(true, Ordering::Relaxed);
}
