//! Free-text search over a result set

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::api::WinFileInfo;

/// Which fields a search term is matched against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchScope {
    /// FileName, VerCode, BuildVer, Sha1, Sha256 and Edition
    #[default]
    All,
    Filename,
    Version,
    Build,
    Sha1,
    Sha256,
}

impl SearchScope {
    pub const ALL: [SearchScope; 6] = [
        SearchScope::All,
        SearchScope::Filename,
        SearchScope::Version,
        SearchScope::Build,
        SearchScope::Sha1,
        SearchScope::Sha256,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SearchScope::All => "all",
            SearchScope::Filename => "filename",
            SearchScope::Version => "version",
            SearchScope::Build => "build",
            SearchScope::Sha1 => "sha1",
            SearchScope::Sha256 => "sha256",
        }
    }

    fn fields(self, file: &WinFileInfo) -> Vec<&str> {
        match self {
            SearchScope::All => vec![
                file.file_name.as_str(),
                file.ver_code.as_str(),
                file.build_ver.as_str(),
                file.sha1.as_str(),
                file.sha256.as_str(),
                file.edition.as_str(),
            ],
            SearchScope::Filename => vec![file.file_name.as_str()],
            SearchScope::Version => vec![file.ver_code.as_str()],
            SearchScope::Build => vec![file.build_ver.as_str()],
            SearchScope::Sha1 => vec![file.sha1.as_str()],
            SearchScope::Sha256 => vec![file.sha256.as_str()],
        }
    }
}

impl fmt::Display for SearchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchScope::ALL
            .into_iter()
            .find(|scope| scope.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown search scope: {}", s))
    }
}

/// A search term with its scope
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub term: String,
    pub scope: SearchScope,
}

impl SearchFilter {
    pub fn new(term: impl Into<String>, scope: SearchScope) -> Self {
        Self {
            term: term.into(),
            scope,
        }
    }

    /// Blank terms do not filter
    pub fn is_active(&self) -> bool {
        !self.term.trim().is_empty()
    }

    pub fn matches(&self, file: &WinFileInfo) -> bool {
        if !self.is_active() {
            return true;
        }
        let needle = self.term.trim().to_lowercase();
        self.scope
            .fields(file)
            .into_iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Files of the full set that match, in their original order
    pub fn apply<'a>(&self, files: &'a [WinFileInfo]) -> Vec<&'a WinFileInfo> {
        files.iter().filter(|file| self.matches(file)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files() -> Vec<WinFileInfo> {
        vec![
            WinFileInfo {
                file_name: "abc_Win11_24H2_x64.iso".to_string(),
                ver_code: "24H2".to_string(),
                build_ver: "26100.1742".to_string(),
                sha1: "ffff00".to_string(),
                edition: "consumer".to_string(),
                ..Default::default()
            },
            WinFileInfo {
                file_name: "Win11_23H2_x64.iso".to_string(),
                ver_code: "23H2".to_string(),
                build_ver: "22631.2861".to_string(),
                sha1: "abc123".to_string(),
                sha256: "DEADBEEF".to_string(),
                edition: "business".to_string(),
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_sha1_scope_ignores_filename() {
        let files = files();
        let found = SearchFilter::new("ABC", SearchScope::Sha1).apply(&files);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].sha1, "abc123");
    }

    #[test]
    fn test_all_scope_covers_every_field() {
        let files = files();
        assert_eq!(SearchFilter::new("abc", SearchScope::All).apply(&files).len(), 2);
        assert_eq!(SearchFilter::new("business", SearchScope::All).apply(&files).len(), 1);
        assert_eq!(SearchFilter::new("deadbeef", SearchScope::All).apply(&files).len(), 1);
        assert_eq!(SearchFilter::new("22631", SearchScope::Build).apply(&files).len(), 1);
        assert_eq!(SearchFilter::new("24h2", SearchScope::Version).apply(&files).len(), 1);
    }

    #[test]
    fn test_blank_term_returns_everything() {
        let files = files();
        assert_eq!(SearchFilter::new("   ", SearchScope::Sha256).apply(&files).len(), 2);
        assert!(!SearchFilter::default().is_active());
    }

    #[test]
    fn test_term_is_trimmed() {
        let files = files();
        assert_eq!(SearchFilter::new("  23H2 ", SearchScope::Filename).apply(&files).len(), 1);
    }

    #[test]
    fn test_scope_parse() {
        assert_eq!("SHA256".parse::<SearchScope>().unwrap(), SearchScope::Sha256);
        assert!("hash".parse::<SearchScope>().is_err());
    }
}
