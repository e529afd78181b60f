//! Utility functions shared across the application
//!
//! This module contains common helpers for formatting, version ordering,
//! path management, and progress tracking.

mod format;
mod path;
mod progress;
mod version;

pub use format::*;
pub use path::*;
pub use progress::*;
pub use version::*;
