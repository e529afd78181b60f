//! Platform commands
//!
//! Side effects outside the process: browser, clipboard, locale.

mod system;

pub use system::{
    copy_to_clipboard, get_system_locale, open_url, prefers_localized_labels,
    validate_download_url,
};
