//! Scripted in-memory backend shared by the integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::oneshot;

use winnew::api::{
    EditionAndLanguage, FileQuery, OptionsQuery, SelectOption, VersionsOption, WinFileInfo, WinNewApi,
};
use winnew::ApiError;

type FileReply = Result<Vec<WinFileInfo>, ApiError>;
type CatalogReply = Result<EditionAndLanguage, ApiError>;

/// Replies are immediate unless a gate is registered for the system code
/// (file lists) or the version (catalogs), in which case the request waits
/// until the test releases it.
#[derive(Default)]
pub struct ScriptedApi {
    files: Mutex<HashMap<String, FileReply>>,
    gates: Mutex<HashMap<String, oneshot::Receiver<FileReply>>>,
    catalog: Mutex<Option<CatalogReply>>,
    catalog_gates: Mutex<HashMap<String, oneshot::Receiver<CatalogReply>>>,
    versions: Mutex<Option<Result<VersionsOption, ApiError>>>,
    file_queries: Mutex<Vec<FileQuery>>,
    option_queries: Mutex<Vec<OptionsQuery>>,
    version_calls: AtomicUsize,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply_files(&self, system_code: &str, reply: FileReply) {
        self.files
            .lock()
            .unwrap()
            .insert(system_code.to_string(), reply);
    }

    /// Hold the next file request for `system_code` until the sender is used
    pub fn gate(&self, system_code: &str) -> oneshot::Sender<FileReply> {
        let (tx, rx) = oneshot::channel();
        self.gates
            .lock()
            .unwrap()
            .insert(system_code.to_string(), rx);
        tx
    }

    pub fn reply_catalog(&self, reply: CatalogReply) {
        *self.catalog.lock().unwrap() = Some(reply);
    }

    /// Hold the next catalog request for `version` until the sender is used
    pub fn gate_catalog(&self, version: &str) -> oneshot::Sender<CatalogReply> {
        let (tx, rx) = oneshot::channel();
        self.catalog_gates
            .lock()
            .unwrap()
            .insert(version.to_string(), rx);
        tx
    }

    pub fn reply_versions(&self, reply: Result<VersionsOption, ApiError>) {
        *self.versions.lock().unwrap() = Some(reply);
    }

    pub fn file_queries(&self) -> Vec<FileQuery> {
        self.file_queries.lock().unwrap().clone()
    }

    pub fn option_queries(&self) -> Vec<OptionsQuery> {
        self.option_queries.lock().unwrap().clone()
    }

    pub fn version_calls(&self) -> usize {
        self.version_calls.load(Ordering::SeqCst)
    }

    /// Wait until at least `count` file requests have reached the backend
    pub async fn wait_for_file_queries(&self, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.file_queries.lock().unwrap().len() < count {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("file requests were not issued");
    }

    /// Wait until at least `count` catalog requests have reached the backend
    pub async fn wait_for_option_queries(&self, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.option_queries.lock().unwrap().len() < count {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("catalog requests were not issued");
    }
}

impl WinNewApi for ScriptedApi {
    async fn fetch_file_list(&self, query: &FileQuery) -> Result<Vec<WinFileInfo>, ApiError> {
        self.file_queries.lock().unwrap().push(query.clone());

        let gate = self.gates.lock().unwrap().remove(&query.system_code);
        if let Some(gate) = gate {
            return gate
                .await
                .unwrap_or_else(|_| Err(ApiError::Network("gate dropped".to_string())));
        }

        self.files
            .lock()
            .unwrap()
            .get(&query.system_code)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn fetch_version_options(&self) -> Result<VersionsOption, ApiError> {
        self.version_calls.fetch_add(1, Ordering::SeqCst);
        self.versions
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(versions()))
    }

    async fn fetch_edition_and_language(
        &self,
        query: &OptionsQuery,
    ) -> Result<EditionAndLanguage, ApiError> {
        self.option_queries.lock().unwrap().push(query.clone());

        let gate = self.catalog_gates.lock().unwrap().remove(&query.version);
        if let Some(gate) = gate {
            return gate
                .await
                .unwrap_or_else(|_| Err(ApiError::Network("gate dropped".to_string())));
        }

        self.catalog
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(catalog()))
    }
}

pub fn file(system_code: &str, ver_code: &str, file_name: &str) -> WinFileInfo {
    WinFileInfo {
        file_name: file_name.to_string(),
        system_code: system_code.to_string(),
        ver_code: ver_code.to_string(),
        language_code: "zh-cn".to_string(),
        edition: "consumer".to_string(),
        architecture: "x64".to_string(),
        size: "5368709120".to_string(),
        push_time: "2024-10-01 08:00:00".to_string(),
        file_path: format!("https://example.com/{}", file_name),
        ..Default::default()
    }
}

pub fn versions() -> VersionsOption {
    let mut options = VersionsOption {
        system_codes: vec![
            SelectOption::new("Windows 11", "11"),
            SelectOption::new("Windows 10", "10"),
        ],
        ..Default::default()
    };
    options.versions.insert(
        "11".to_string(),
        vec![
            SelectOption::new("23H2", "23H2"),
            SelectOption::new("24H2 (2024 Update)", "24H2"),
        ],
    );
    options
        .versions
        .insert("10".to_string(), vec![SelectOption::new("22H2", "22H2")]);
    options
}

pub fn catalog() -> EditionAndLanguage {
    EditionAndLanguage {
        language: vec![
            SelectOption::new("Chinese (Simplified)", "zh-cn").with_localized("简体中文"),
            SelectOption::new("English", "en-us").with_localized("英语"),
        ],
        edition: vec![
            SelectOption::new("Consumer", "consumer").with_localized("消费者版"),
            SelectOption::new("Business", "business").with_localized("商业版"),
        ],
    }
}
