//! Logging module
//!
//! Module-tagged log lines written to stderr and, once a log file is
//! attached, appended to it. Use the `log_*!` macros rather than calling
//! [`log`] directly.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Mutex;

use once_cell::sync::Lazy;

use crate::config;

/// Log severity, ordered from most to least verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => Level::Debug,
            1 => Level::Info,
            2 => Level::Warn,
            _ => Level::Error,
        }
    }

    /// Parse a level name as accepted by `WINNEW_LOG`
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "debug" | "trace" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warn" | "warning" => Some(Level::Warn),
            "error" => Some(Level::Error),
            _ => None,
        }
    }
}

static MIN_LEVEL: AtomicU8 = AtomicU8::new(Level::Info as u8);
static LOG_FILE: Lazy<Mutex<Option<File>>> = Lazy::new(|| Mutex::new(None));

/// Initialize logging from the environment.
///
/// `WINNEW_LOG` overrides the default INFO level.
pub fn init() {
    if let Some(level) = std::env::var(config::logging::LEVEL_ENV)
        .ok()
        .as_deref()
        .and_then(Level::parse)
    {
        MIN_LEVEL.store(level as u8, Ordering::SeqCst);
    }
}

/// Switch between DEBUG (developer mode) and INFO
pub fn set_log_level(developer_mode: bool) {
    let level = if developer_mode {
        Level::Debug
    } else {
        Level::Info
    };
    MIN_LEVEL.store(level as u8, Ordering::SeqCst);
}

/// Current minimum level
pub fn log_level() -> Level {
    Level::from_u8(MIN_LEVEL.load(Ordering::SeqCst))
}

/// Append log lines to `path` in addition to stderr
pub fn attach_file(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut guard = LOG_FILE.lock().unwrap_or_else(|e| e.into_inner());
    *guard = Some(file);
    Ok(())
}

#[doc(hidden)]
pub fn log(level: Level, module: &str, args: std::fmt::Arguments<'_>) {
    if level < log_level() {
        return;
    }

    let line = format!(
        "[{}] [{}] [{}] {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
        level.as_str(),
        module,
        args
    );

    eprintln!("{}", line);

    let mut guard = LOG_FILE.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(file) = guard.as_mut() {
        let _ = writeln!(file, "{}", line);
    }
}

#[macro_export]
macro_rules! log_debug {
    ($module:expr, $($arg:tt)*) => {
        $crate::logging::log($crate::logging::Level::Debug, $module, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($module:expr, $($arg:tt)*) => {
        $crate::logging::log($crate::logging::Level::Info, $module, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($module:expr, $($arg:tt)*) => {
        $crate::logging::log($crate::logging::Level::Warn, $module, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($module:expr, $($arg:tt)*) => {
        $crate::logging::log($crate::logging::Level::Error, $module, format_args!($($arg)*))
    };
}
