//! System utilities commands
//!
//! Platform-specific system operations like opening URLs, copying to the
//! clipboard and locale detection.

use std::io::Write;
use std::process::{Command, Stdio};

use reqwest::Url;
use sys_locale::get_locale;

use crate::error::ActionError;
use crate::{log_debug, log_info, log_warn};

const MODULE: &str = "commands::system";

/// Get the system locale (e.g., "en-US", "zh-CN")
pub fn get_system_locale() -> String {
    let locale = get_locale().unwrap_or_else(|| "en-US".to_string());
    log_info!(MODULE, "Detected system locale: {}", locale);
    locale
}

/// Whether localized (Chinese) option labels should be preferred
pub fn prefers_localized_labels(locale: &str) -> bool {
    locale.to_ascii_lowercase().starts_with("zh")
}

/// Accept only absolute http(s) links
pub fn validate_download_url(raw: &str) -> Result<Url, ActionError> {
    let url = Url::parse(raw.trim()).map_err(|e| ActionError::MalformedUrl(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ActionError::UnsupportedScheme(other.to_string())),
    }
}

/// Open a URL in the default browser
pub fn open_url(url: &Url) -> Result<(), ActionError> {
    log_info!(MODULE, "Opening URL: {}", url);

    #[cfg(target_os = "linux")]
    let mut command = {
        let mut command = Command::new("xdg-open");
        command.arg(url.as_str());
        command
    };

    #[cfg(target_os = "macos")]
    let mut command = {
        let mut command = Command::new("open");
        command.arg(url.as_str());
        command
    };

    #[cfg(target_os = "windows")]
    let mut command = {
        let mut command = Command::new("cmd");
        command.args(["/c", "start", "", url.as_str()]);
        command
    };

    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| ActionError::Launch(e.to_string()))?;

    Ok(())
}

/// Clipboard helpers tried in order
#[cfg(target_os = "linux")]
const CLIPBOARD_HELPERS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

#[cfg(target_os = "macos")]
const CLIPBOARD_HELPERS: &[(&str, &[&str])] = &[("pbcopy", &[])];

#[cfg(target_os = "windows")]
const CLIPBOARD_HELPERS: &[(&str, &[&str])] = &[("clip", &[])];

/// Copy text to the system clipboard
pub fn copy_to_clipboard(text: &str) -> Result<(), ActionError> {
    let mut last_error = String::from("no clipboard helper available");

    for (program, args) in CLIPBOARD_HELPERS {
        match pipe_to(program, args, text) {
            Ok(()) => {
                log_debug!(MODULE, "Copied {} bytes with {}", text.len(), program);
                return Ok(());
            }
            Err(e) => {
                log_debug!(MODULE, "{} failed: {}", program, e);
                last_error = format!("{}: {}", program, e);
            }
        }
    }

    log_warn!(MODULE, "Clipboard copy failed: {}", last_error);
    Err(ActionError::Clipboard(last_error))
}

fn pipe_to(program: &str, args: &[&str], text: &str) -> std::io::Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes())?;
    }

    let status = child.wait()?;
    if status.success() {
        Ok(())
    } else {
        Err(std::io::Error::other(format!("exited with {}", status)))
    }
}
