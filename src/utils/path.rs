//! Path utility functions
//!
//! Per-user directories used for settings and logs.

use std::path::PathBuf;

/// Cache directory for the application (logs), falling back to the temp dir
pub fn get_cache_dir(app_name: &str) -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(app_name)
}

/// Configuration directory for the application, if the platform has one
pub fn get_config_dir(app_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(app_name))
}
