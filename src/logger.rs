// This file implements the application's logging system.
// It provides macros for different log levels (INFO, WARN, ERROR, DEBUG)
// and handles conditional output, especially for debug messages, with colored terminal output.
// Everything goes to stderr so that protoc's own stdout stays untouched.

use colored::Colorize; // Used for adding color to the level tags.
use std::sync::OnceLock; // Ensures the DEBUG_ENABLED flag is initialized exactly once.
use std::sync::atomic::{AtomicBool, Ordering}; // For atomic control of the debug flag.

/// Log levels understood by [`write_line`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
    Debug,
}

// `log_info!` for general progress messages (tool resolved, cache hit, fetch started).
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => ($crate::logger::write_line($crate::logger::Level::Info, &format!($($arg)*)));
}

// `log_warn!` for non-critical issues, such as a lost cache race.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => ($crate::logger::write_line($crate::logger::Level::Warn, &format!($($arg)*)));
}

// `log_error!` for failures that abort the invocation.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => ($crate::logger::write_line($crate::logger::Level::Error, &format!($($arg)*)));
}

// `log_debug!` for detailed internal tracing (command lines, URLs, resolved tokens).
// Messages are only formatted and printed if debug mode is enabled.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if $crate::logger::is_debug_enabled() {
            $crate::logger::write_line($crate::logger::Level::Debug, &format!($($arg)*));
        }
    };
}

// Global flag to control debug logging, ensured to be initialized once.
static DEBUG_ENABLED: OnceLock<AtomicBool> = OnceLock::new();

/// Initializes the logger, setting the global debug mode.
/// This function should be called once at application startup.
///
/// # Arguments
/// * `debug`: If `true`, enables debug logging; otherwise, only info, warn, and error messages are printed.
pub fn init(debug: bool) {
    set_flag(&DEBUG_ENABLED, debug);

    if debug {
        log_debug!("Logger initialized in DEBUG mode");
    }
}

/// Checks if debug logging is currently enabled.
/// Used primarily by the `log_debug!` macro. Defaults to `false` if `init` was never called.
pub fn is_debug_enabled() -> bool {
    read_flag(&DEBUG_ENABLED)
}

fn set_flag(flag: &OnceLock<AtomicBool>, value: bool) {
    flag.get_or_init(|| AtomicBool::new(value))
        .store(value, Ordering::Relaxed);
}

fn read_flag(flag: &OnceLock<AtomicBool>) -> bool {
    flag.get().map(|f| f.load(Ordering::Relaxed)).unwrap_or(false)
}

/// Writes a single tagged line to stderr. Called by the logging macros.
pub fn write_line(level: Level, message: &str) {
    let tag = match level {
        Level::Info => "[INFO]".bright_green(),
        Level::Warn => "[WARN]".bright_yellow(),
        Level::Error => "[ERROR]".bright_red(),
        Level::Debug => "[DEBUG]".dimmed(),
    };
    eprintln!("{tag} {message}");
}
