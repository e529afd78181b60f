//! Dropdown enablement derived from the filter state and catalogs

use crate::api::{EditionAndLanguage, SelectOption, VersionsOption};
use crate::utils::sort_versions_desc;

use super::state::FilterState;

/// What each selector offers and whether it is enabled
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorView {
    pub system_options: Vec<SelectOption>,
    /// Newest first
    pub version_options: Vec<SelectOption>,
    pub language_options: Vec<SelectOption>,
    pub edition_options: Vec<SelectOption>,
    pub version_disabled: bool,
    pub language_disabled: bool,
    pub edition_disabled: bool,
}

impl SelectorView {
    pub fn new(
        state: &FilterState,
        versions: Option<&VersionsOption>,
        options: &EditionAndLanguage,
    ) -> Self {
        let system_options = versions
            .map(|v| v.system_codes.clone())
            .unwrap_or_default();

        let version_options = match versions {
            Some(v) if !state.system_code.is_empty() => {
                sort_versions_desc(v.versions_for(&state.system_code))
            }
            _ => Vec::new(),
        };

        let version_disabled = state.system_code.is_empty();
        let language_disabled = options.language.is_empty() || state.version.is_empty();
        let edition_disabled =
            state.language.is_empty() || options.edition.is_empty() || state.version.is_empty();

        Self {
            system_options,
            version_options,
            language_options: options.language.clone(),
            edition_options: options.edition.clone(),
            version_disabled,
            language_disabled,
            edition_disabled,
        }
    }

    pub fn allows_system(&self, value: &str) -> bool {
        contains_value(&self.system_options, value)
    }

    pub fn allows_version(&self, value: &str) -> bool {
        !self.version_disabled && contains_value(&self.version_options, value)
    }

    pub fn allows_language(&self, value: &str) -> bool {
        !self.language_disabled && contains_value(&self.language_options, value)
    }

    pub fn allows_edition(&self, value: &str) -> bool {
        !self.edition_disabled && contains_value(&self.edition_options, value)
    }
}

fn contains_value(options: &[SelectOption], value: &str) -> bool {
    options.iter().any(|o| o.value == value)
}
