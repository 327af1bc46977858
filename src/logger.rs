// This file implements the installer's logging system.
// Every message goes to stderr with a colored level tag; debug messages are
// only emitted once `init(true)` has been called from `main`.

use colored::{ColoredString, Colorize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// `log_info!` for pipeline progress the user should always see.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => ($crate::logger::emit($crate::logger::Level::Info, format_args!($($arg)*)));
}

/// `log_warn!` for conditions that do not stop the install but deserve attention.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => ($crate::logger::emit($crate::logger::Level::Warn, format_args!($($arg)*)));
}

/// `log_error!` for the final diagnostic of a failed run.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => ($crate::logger::emit($crate::logger::Level::Error, format_args!($($arg)*)));
}

/// `log_debug!` for request URLs, stage transitions and other internals.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if $crate::logger::is_debug_enabled() {
            $crate::logger::emit($crate::logger::Level::Debug, format_args!($($arg)*));
        }
    };
}

// Set once at startup, read by every `log_debug!` call site.
static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

/// Severity attached to each emitted line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
    Debug,
}

impl Level {
    fn tag(self) -> ColoredString {
        match self {
            Level::Info => "[INFO]".bright_green(),
            Level::Warn => "[WARN]".bright_yellow(),
            Level::Error => "[ERROR]".bright_red(),
            Level::Debug => "[DEBUG]".dimmed(),
        }
    }
}

/// Writes a single tagged line to stderr. Used by the macros above.
pub fn emit(level: Level, message: fmt::Arguments<'_>) {
    eprintln!("{} {}", level.tag(), message);
}

/// Initializes the logger, setting the global debug mode.
/// Call once from `main` before the pipeline starts.
pub fn init(debug: bool) {
    DEBUG_ENABLED.store(debug, Ordering::Relaxed);
    if debug {
        crate::log_debug!("Logger initialized in DEBUG mode");
    }
}

/// Checks if debug logging is currently enabled.
pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::Relaxed)
}
