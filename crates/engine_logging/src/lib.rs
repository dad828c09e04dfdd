#![deny(missing_docs)]
//! Shared logging utilities for the crawler workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase,
//! the per-thread worker id stamped on every event, and a minimal test
//! initializer for the global logger.

use std::cell::Cell;

#[doc(hidden)]
pub use log;

/// Worker id used for events emitted outside of any crawl worker.
pub const ORCHESTRATOR_ID: usize = 0;

thread_local! {
    /// Thread-local storage for the id of the crawl worker owning this thread.
    static WORKER_ID: Cell<usize> = const { Cell::new(ORCHESTRATOR_ID) };
}

/// Sets the worker id for the current thread.
/// Each worker calls this once when its thread starts.
pub fn set_worker_id(id: usize) {
    WORKER_ID.with(|v| v.set(id));
}

/// Retrieves the worker id for the current thread.
/// Returns [`ORCHESTRATOR_ID`] if the id has not been set.
pub fn worker_id() -> usize {
    WORKER_ID.with(|v| v.get())
}

/// Logs a trace-level message tagged with the current worker id.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        $crate::log::trace!("[worker {}] {}", $crate::worker_id(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message tagged with the current worker id.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        $crate::log::info!("[worker {}] {}", $crate::worker_id(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message tagged with the current worker id.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        $crate::log::debug!("[worker {}] {}", $crate::worker_id(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message tagged with the current worker id.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        $crate::log::warn!("[worker {}] {}", $crate::worker_id(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message tagged with the current worker id.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        $crate::log::error!("[worker {}] {}", $crate::worker_id(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_id_defaults_to_orchestrator() {
        assert_eq!(worker_id(), ORCHESTRATOR_ID);
    }

    #[test]
    fn worker_id_is_per_thread() {
        set_worker_id(3);
        let other = std::thread::spawn(worker_id).join().unwrap();
        assert_eq!(worker_id(), 3);
        assert_eq!(other, ORCHESTRATOR_ID);
    }

    #[test]
    fn macros_accept_format_arguments() {
        initialize_for_tests();
        set_worker_id(2);
        engine_info!("unit {} started", "a");
        engine_warn!("unit {unit} skipped", unit = "b");
        engine_debug!("plain");
        engine_trace!("{:?}", [1, 2]);
        engine_error!("failed: {}", 42);
    }
}
