//! WinNew - Browse and download official Windows installation images
//!
//! Cascading filters (system, version, language, edition, architecture)
//! drive queries against the WinNew backend. Superseded responses are
//! discarded so the displayed list always matches the latest selection.

pub mod logging;

pub mod api;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod filters;
pub mod notify;
pub mod projector;
pub mod render;
pub mod session;
pub mod settings;
pub mod utils;
pub mod verify;

pub use api::{ApiClient, WinNewApi};
pub use error::{ActionError, ApiError, SettingsError, VerifyError};
pub use session::Session;
