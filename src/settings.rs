//! Persisted user settings
//!
//! Settings live in `settings.json` under the per-user config directory.
//! Missing or unreadable files yield defaults so a corrupt file never
//! blocks startup; writes always replace the whole file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::config;
use crate::error::SettingsError;
use crate::utils::get_config_dir;
use crate::{log_debug, log_info, log_warn};

const MODULE: &str = "settings";

/// Theme preference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Auto,
    Dark,
    Light,
}

impl ThemeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Auto => "auto",
            ThemeMode::Dark => "dark",
            ThemeMode::Light => "light",
        }
    }
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "system" => Ok(ThemeMode::Auto),
            "dark" => Ok(ThemeMode::Dark),
            "light" => Ok(ThemeMode::Light),
            other => Err(format!("unknown theme mode: {}", other)),
        }
    }
}

/// Theme actually applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

/// Effective theme; `Auto` follows the system preference
pub fn resolve_theme(mode: ThemeMode, system_prefers_dark: bool) -> Theme {
    match mode {
        ThemeMode::Dark => Theme::Dark,
        ThemeMode::Light => Theme::Light,
        ThemeMode::Auto if system_prefers_dark => Theme::Dark,
        ThemeMode::Auto => Theme::Light,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme_mode: ThemeMode,
    pub developer_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_host: Option<String>,
}

/// File-backed settings with change notification
pub struct SettingsStore {
    path: PathBuf,
    // Serializes writes so the file matches the last published value
    write_lock: Mutex<()>,
    tx: watch::Sender<Settings>,
}

impl SettingsStore {
    /// Open the store at `path`, falling back to defaults when the file is
    /// missing or malformed
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let settings = match load(&path) {
            Ok(Some(settings)) => {
                log_debug!(MODULE, "Loaded settings from {}", path.display());
                settings
            }
            Ok(None) => Settings::default(),
            Err(e) => {
                log_warn!(MODULE, "Ignoring settings at {}: {}", path.display(), e);
                Settings::default()
            }
        };
        let (tx, _) = watch::channel(settings);
        Self {
            path,
            write_lock: Mutex::new(()),
            tx,
        }
    }

    /// Open the store in the platform config directory
    pub fn open_default() -> Result<Self, SettingsError> {
        let dir = get_config_dir(config::app::NAME).ok_or(SettingsError::NoConfigDir)?;
        Ok(Self::open(dir.join(config::app::SETTINGS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self) -> Settings {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Settings> {
        self.tx.subscribe()
    }

    pub fn set_theme_mode(&self, mode: ThemeMode) -> Result<(), SettingsError> {
        log_info!(MODULE, "Theme mode set to {}", mode);
        self.update(|settings| settings.theme_mode = mode)
    }

    pub fn set_developer_mode(&self, enabled: bool) -> Result<(), SettingsError> {
        log_info!(MODULE, "Developer mode {}", if enabled { "enabled" } else { "disabled" });
        self.update(|settings| settings.developer_mode = enabled)
    }

    /// Persist first, then notify subscribers
    fn update(&self, change: impl FnOnce(&mut Settings)) -> Result<(), SettingsError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut next = self.get();
        change(&mut next);
        if next == *self.tx.borrow() {
            return Ok(());
        }
        save(&self.path, &next)?;
        self.tx.send_replace(next);
        Ok(())
    }
}

fn load(path: &Path) -> Result<Option<Settings>, SettingsError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn save(path: &Path, settings: &Settings) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(settings)?;
    fs::write(path, content)?;
    log_debug!(MODULE, "Saved settings to {}", path.display());
    Ok(())
}
