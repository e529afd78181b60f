//! Backend data models
//!
//! Types mirroring the JSON returned by the WinNew backend.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// One discoverable installation image
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct WinFileInfo {
    #[serde(deserialize_with = "string_or_null")]
    pub file_name: String,
    #[serde(deserialize_with = "string_or_null")]
    pub language_code: String,
    #[serde(deserialize_with = "string_or_null")]
    pub language: String,
    #[serde(deserialize_with = "string_or_null")]
    pub edition: String,
    #[serde(deserialize_with = "string_or_null")]
    pub architecture: String,
    /// Byte count as sent by the backend (usually a numeric string)
    #[serde(deserialize_with = "string_or_number")]
    pub size: String,
    #[serde(deserialize_with = "string_or_null")]
    pub sha1: String,
    #[serde(deserialize_with = "string_or_null")]
    pub sha256: String,
    /// Absolute download URL, validated before use
    #[serde(deserialize_with = "string_or_null")]
    pub file_path: String,
    #[serde(rename = "Architecture_Loc", deserialize_with = "string_or_null")]
    pub architecture_loc: String,
    #[serde(rename = "Edition_Loc", deserialize_with = "string_or_null")]
    pub edition_loc: String,
    #[serde(deserialize_with = "string_or_null")]
    pub push_time: String,
    #[serde(deserialize_with = "string_or_null")]
    pub build_ver: String,
    #[serde(deserialize_with = "string_or_null")]
    pub ver_code: String,
    #[serde(deserialize_with = "string_or_null")]
    pub system_code: String,
}

/// A selectable `{label, value}` pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
    /// Localized (Chinese) label, when the backend provides one
    #[serde(default, alias = "localizedLabel", skip_serializing_if = "Option::is_none")]
    pub label_cn: Option<String>,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            label_cn: None,
        }
    }

    pub fn with_localized(mut self, label_cn: impl Into<String>) -> Self {
        self.label_cn = Some(label_cn.into());
        self
    }
}

/// Systems and their versions, fetched once per session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionsOption {
    #[serde(rename = "SystemCodes", default)]
    pub system_codes: Vec<SelectOption>,
    #[serde(rename = "Versions", default)]
    pub versions: IndexMap<String, Vec<SelectOption>>,
}

impl VersionsOption {
    /// Versions offered for a system, empty for unknown systems
    pub fn versions_for(&self, system_code: &str) -> &[SelectOption] {
        self.versions
            .get(system_code)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Editions and languages valid for one system + version
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditionAndLanguage {
    #[serde(rename = "Language", default)]
    pub language: Vec<SelectOption>,
    #[serde(rename = "Edition", default)]
    pub edition: Vec<SelectOption>,
}

impl EditionAndLanguage {
    pub fn is_empty(&self) -> bool {
        self.language.is_empty() && self.edition.is_empty()
    }
}

/// Payload of the edition options endpoint
#[derive(Debug, Default, Deserialize)]
pub(crate) struct EditionList {
    #[serde(rename = "Edition", default, deserialize_with = "vec_or_null")]
    pub edition: Vec<SelectOption>,
}

/// Payload of the language options endpoint
#[derive(Debug, Default, Deserialize)]
pub(crate) struct LanguageList {
    #[serde(rename = "Language", default, deserialize_with = "vec_or_null")]
    pub language: Vec<SelectOption>,
}

fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

fn vec_or_null<'de, D>(deserializer: D) -> Result<Vec<SelectOption>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<SelectOption>>::deserialize(deserializer)?.unwrap_or_default())
}
