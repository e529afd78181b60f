//! Display-ready file records

use serde::Serialize;

use crate::api::{EditionAndLanguage, WinFileInfo};
use crate::utils::{format_date, format_file_size_str};

use super::labels::{find_option, option_label, resolve_label};

/// One file prepared for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRecord {
    /// "Windows {system} {version} {edition}"
    pub title: String,
    pub file_name: String,
    pub system_code: String,
    pub ver_code: String,
    pub build_ver: String,
    pub edition: String,
    pub language: String,
    pub architecture: String,
    pub size: String,
    pub push_date: String,
    pub push_time: String,
    pub sha1: String,
    pub sha256: String,
    pub download_url: String,
}

impl DisplayRecord {
    pub fn from_file(file: &WinFileInfo, catalog: &EditionAndLanguage, localized: bool) -> Self {
        let edition = resolve_label(&catalog.edition, &file.edition, localized);
        let language = language_label(file, catalog, localized);

        Self {
            title: format!("Windows {} {} {}", file.system_code, file.ver_code, edition),
            file_name: file.file_name.clone(),
            system_code: file.system_code.clone(),
            ver_code: file.ver_code.clone(),
            build_ver: file.build_ver.clone(),
            edition,
            language,
            architecture: file.architecture.clone(),
            size: format_file_size_str(&file.size),
            push_date: format_date(&file.push_time, localized),
            push_time: file.push_time.clone(),
            sha1: file.sha1.clone(),
            sha256: file.sha256.clone(),
            download_url: file.file_path.clone(),
        }
    }
}

/// Try the language code first, then the language name; fall back to the raw code
fn language_label(file: &WinFileInfo, catalog: &EditionAndLanguage, localized: bool) -> String {
    find_option(&catalog.language, &file.language_code)
        .or_else(|| find_option(&catalog.language, &file.language))
        .map(|option| option_label(option, localized))
        .unwrap_or_else(|| {
            if file.language_code.is_empty() {
                file.language.clone()
            } else {
                file.language_code.clone()
            }
        })
}

/// Map raw files to display records using the current catalog
pub fn project<'a, I>(files: I, catalog: &EditionAndLanguage, localized: bool) -> Vec<DisplayRecord>
where
    I: IntoIterator<Item = &'a WinFileInfo>,
{
    files
        .into_iter()
        .map(|file| DisplayRecord::from_file(file, catalog, localized))
        .collect()
}
