//! Application configuration
//!
//! Compile-time constants grouped by concern, plus API host resolution.

/// Application identity
pub mod app {
    /// Name used for config and cache directories
    pub const NAME: &str = "winnew";
    /// User agent sent with every backend request
    pub const USER_AGENT: &str = concat!("WinNew/", env!("CARGO_PKG_VERSION"));
    /// Settings file name inside the config directory
    pub const SETTINGS_FILE: &str = "settings.json";
    /// Log file name inside the cache directory
    pub const LOG_FILE: &str = "winnew.log";
}

/// Backend endpoints
pub mod urls {
    /// Backend used by debug builds
    pub const DEV_API_HOST: &str = "http://localhost:3333";
    /// Backend used by release builds
    pub const PROD_API_HOST: &str = "https://api.hotpe.top";
    /// Environment variable overriding the backend host
    pub const API_HOST_ENV: &str = "WINNEW_API_HOST";

    pub const FILE_LIST: &str = "/winnew/file-list";
    pub const VERSION_OPTIONS: &str = "/winnew/options/version";
    pub const EDITION_OPTIONS: &str = "/winnew/options/edition";
    pub const LANGUAGE_OPTIONS: &str = "/winnew/options/language";

    /// Build default host for the current profile
    pub fn default_api_host() -> &'static str {
        if cfg!(debug_assertions) {
            DEV_API_HOST
        } else {
            PROD_API_HOST
        }
    }

    /// Resolve the backend host.
    ///
    /// Precedence: explicit value, then `WINNEW_API_HOST`, then the
    /// persisted setting, then the build default.
    pub fn resolve_api_host(explicit: Option<&str>, persisted: Option<&str>) -> String {
        let from_env = std::env::var(API_HOST_ENV).ok();
        pick_api_host(explicit, from_env.as_deref(), persisted)
    }

    pub(crate) fn pick_api_host(
        explicit: Option<&str>,
        from_env: Option<&str>,
        persisted: Option<&str>,
    ) -> String {
        [explicit, from_env, persisted]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|host| !host.is_empty())
            .unwrap_or(default_api_host())
            .trim_end_matches('/')
            .to_string()
    }
}

/// HTTP client settings
pub mod http {
    use std::time::Duration;

    /// Absolute timeout for every backend request
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
}

/// Parameters of the "latest" query shown on the home screen
pub mod latest {
    pub const SYSTEM_CODES: [&str; 2] = ["11", "10"];
    pub const VERSION: &str = "latest";
    pub const LANGUAGE_CODE: &str = "zh-cn";
    pub const ARCHITECTURE: &str = "x64";
    pub const EDITION: &str = "consumer";
}

/// Notice display durations
pub mod notify {
    use std::time::Duration;

    pub const ERROR_DURATION: Duration = Duration::from_millis(3000);
    pub const SUCCESS_DURATION: Duration = Duration::from_millis(2000);
}

/// Logging configuration
pub mod logging {
    /// Environment variable overriding the startup log level
    pub const LEVEL_ENV: &str = "WINNEW_LOG";
    /// Interval in MB between hashing progress logs
    pub const VERIFY_LOG_INTERVAL_MB: u64 = 512;
}
