//! Code to display-label resolution
//!
//! The backend is inconsistent about returning option codes or human labels
//! in file records, so a record field is matched against both.

use crate::api::SelectOption;

/// Find the option whose value or label equals `raw`, ignoring case
pub fn find_option<'a>(options: &'a [SelectOption], raw: &str) -> Option<&'a SelectOption> {
    if raw.is_empty() {
        return None;
    }
    let needle = raw.to_lowercase();
    options
        .iter()
        .find(|o| o.value.to_lowercase() == needle || o.label.to_lowercase() == needle)
}

/// Display label for `raw`, or `raw` itself when no option matches
pub fn resolve_label(options: &[SelectOption], raw: &str, localized: bool) -> String {
    match find_option(options, raw) {
        Some(option) => option_label(option, localized),
        None => raw.to_string(),
    }
}

/// Label of an option, preferring the localized one when asked and present
pub fn option_label(option: &SelectOption, localized: bool) -> String {
    if localized {
        if let Some(label) = option.label_cn.as_deref().filter(|l| !l.is_empty()) {
            return label.to_string();
        }
    }
    option.label.clone()
}
