//! Result projection module
//!
//! Maps raw file records to display records and filters them by a
//! free-text search.

mod labels;
mod record;
mod search;

pub use labels::{find_option, option_label, resolve_label};
pub use record::{project, DisplayRecord};
pub use search::{SearchFilter, SearchScope};

use crate::api::{EditionAndLanguage, WinFileInfo};

/// Search outcome with the counts shown next to the search box
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    pub records: Vec<DisplayRecord>,
    pub total: usize,
}

impl SearchResults {
    pub fn matched(&self) -> usize {
        self.records.len()
    }

    /// "matched/total"
    pub fn count_label(&self) -> String {
        format!("{}/{}", self.matched(), self.total)
    }
}

/// Search the full set, then project the matches
pub fn search_and_project(
    files: &[WinFileInfo],
    catalog: &EditionAndLanguage,
    filter: &SearchFilter,
    localized: bool,
) -> SearchResults {
    SearchResults {
        records: project(filter.apply(files), catalog, localized),
        total: files.len(),
    }
}
