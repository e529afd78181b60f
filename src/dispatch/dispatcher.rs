//! Query dispatcher
//!
//! Owns the fetched data (latest files, filtered files, option catalogs)
//! and decides which responses may be applied to it.

use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::future::try_join_all;
use tokio::sync::OnceCell;

use super::slot::{QuerySlot, RequestToken};
use crate::api::{EditionAndLanguage, FileQuery, OptionsQuery, VersionsOption, WinFileInfo, WinNewApi};
use crate::config;
use crate::error::ApiError;
use crate::filters::FilterState;
use crate::notify::Notifier;
use crate::{log_debug, log_error, log_info};

const MODULE: &str = "dispatch";

/// Data shown to the user, cloned out by [`QueryDispatcher::snapshot`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchState {
    pub latest_files: Vec<WinFileInfo>,
    pub filtered_files: Vec<WinFileInfo>,
    pub edition_and_language: EditionAndLanguage,
    pub is_loading_latest: bool,
    pub is_loading_filtered: bool,
    pub is_loading_options: bool,
    /// Message of the last surfaced failure
    pub error: Option<String>,
}

pub struct QueryDispatcher<A: WinNewApi> {
    api: Arc<A>,
    notifier: Notifier,
    filtered: QuerySlot,
    options: QuerySlot,
    versions: OnceCell<VersionsOption>,
    state: Mutex<DispatchState>,
}

impl<A: WinNewApi> QueryDispatcher<A> {
    pub fn new(api: Arc<A>, notifier: Notifier) -> Self {
        Self {
            api,
            notifier,
            filtered: QuerySlot::new("filtered"),
            options: QuerySlot::new("options"),
            versions: OnceCell::new(),
            state: Mutex::new(DispatchState::default()),
        }
    }

    pub fn snapshot(&self) -> DispatchState {
        self.state().clone()
    }

    pub fn filtered_files(&self) -> Vec<WinFileInfo> {
        self.state().filtered_files.clone()
    }

    pub fn edition_and_language(&self) -> EditionAndLanguage {
        self.state().edition_and_language.clone()
    }

    /// Cached systems and versions, if loaded
    pub fn version_options(&self) -> Option<&VersionsOption> {
        self.versions.get()
    }

    /// Fetch systems and versions once; later calls return the cache.
    ///
    /// A failed load is logged and may be retried.
    pub async fn load_version_options(&self) -> Option<&VersionsOption> {
        let api = &self.api;
        match self
            .versions
            .get_or_try_init(|| async { api.fetch_version_options().await })
            .await
        {
            Ok(options) => Some(options),
            Err(e) => {
                log_error!(MODULE, "Failed to load version options: {}", e);
                None
            }
        }
    }

    /// Fetch the newest consumer image of each system, once per session
    pub async fn refresh_latest(&self) {
        {
            let mut state = self.state();
            if state.is_loading_latest || !state.latest_files.is_empty() {
                log_debug!(MODULE, "Latest files already loaded or loading");
                return;
            }
            state.is_loading_latest = true;
            state.error = None;
        }

        let api = &self.api;
        let requests = config::latest::SYSTEM_CODES.iter().map(|code| {
            let query = FileQuery::latest(code);
            async move { api.fetch_file_list(&query).await }
        });
        let result = try_join_all(requests).await;

        let mut state = self.state();
        state.is_loading_latest = false;
        match result {
            Ok(lists) => {
                state.latest_files = lists
                    .into_iter()
                    .filter_map(|files| files.into_iter().next())
                    .collect();
                log_info!(MODULE, "Loaded {} latest files", state.latest_files.len());
            }
            Err(e) => {
                state.error = Some(e.to_string());
                drop(state);
                log_error!(MODULE, "Failed to load latest files: {}", e);
                self.notifier
                    .error(format!("Failed to load latest versions: {}", e));
            }
        }
    }

    /// Drop the edition/language catalog and any request for it
    pub fn reset_edition_and_language(&self) {
        self.options.cancel();
        let mut state = self.state();
        state.edition_and_language = EditionAndLanguage::default();
        state.is_loading_options = false;
    }

    /// Replace the edition/language catalog for a system + version.
    ///
    /// Any failure leaves empty lists rather than partial data.
    pub async fn load_edition_and_language(&self, query: OptionsQuery) {
        if let Some(token) = self.prepare_edition_and_language(&query) {
            self.run_edition_and_language(token, query).await;
        }
    }

    /// Synchronous half of [`load_edition_and_language`](Self::load_edition_and_language):
    /// supersede the previous catalog request and return the token for the new one,
    /// or reset the catalog when system or version is missing.
    pub fn prepare_edition_and_language(&self, query: &OptionsQuery) -> Option<RequestToken> {
        if query.system_code.is_empty() || query.version.is_empty() {
            self.reset_edition_and_language();
            return None;
        }

        let token = self.options.issue();
        self.state().is_loading_options = true;
        log_debug!(
            MODULE,
            "Loading editions and languages for {} {} (#{})",
            query.system_code,
            query.version,
            token.generation()
        );
        Some(token)
    }

    pub async fn run_edition_and_language(&self, token: RequestToken, query: OptionsQuery) {
        let api = Arc::clone(&self.api);
        let result = self
            .options
            .run(token, async move { api.fetch_edition_and_language(&query).await })
            .await;

        if !self.options.is_current(token) {
            log_debug!(MODULE, "Discarding stale option catalog #{}", token.generation());
            return;
        }

        let mut state = self.state();
        state.is_loading_options = false;
        match result {
            Ok(catalog) => state.edition_and_language = catalog,
            Err(e) if e.is_cancelled() => {}
            Err(e) => {
                log_error!(MODULE, "Failed to load edition and language options: {}", e);
                state.edition_and_language = EditionAndLanguage::default();
            }
        }
    }

    /// Re-run the filtered query for `filters`.
    ///
    /// Incomplete filters clear the results and cancel any request.
    pub async fn refresh_filtered(&self, filters: &FilterState) {
        if let Some((token, query)) = self.prepare_filtered(filters) {
            self.run_filtered(token, query).await;
        }
    }

    /// Synchronous half of [`refresh_filtered`](Self::refresh_filtered)
    pub fn prepare_filtered(&self, filters: &FilterState) -> Option<(RequestToken, FileQuery)> {
        if !filters.is_queryable() {
            self.clear_filtered();
            return None;
        }

        let token = self.begin_filtered();
        let query = filters.file_query();
        log_debug!(
            MODULE,
            "Query #{}: system={} version={} language={} edition={} arch={}",
            token.generation(),
            query.system_code,
            query.version,
            query.language_code,
            query.edition,
            filters.architecture
        );
        Some((token, query))
    }

    pub async fn run_filtered(&self, token: RequestToken, query: FileQuery) {
        let api = Arc::clone(&self.api);
        let result = self
            .filtered
            .run(token, async move { api.fetch_file_list(&query).await })
            .await;

        self.apply_filtered(token, result);
    }

    /// Issue a new token for the filtered slot, superseding the previous one
    pub fn begin_filtered(&self) -> RequestToken {
        let token = self.filtered.issue();
        let mut state = self.state();
        state.is_loading_filtered = true;
        state.error = None;
        token
    }

    /// Apply a filtered-query result if `token` is still current.
    ///
    /// Returns false when the result was discarded.
    pub fn apply_filtered(
        &self,
        token: RequestToken,
        result: Result<Vec<WinFileInfo>, ApiError>,
    ) -> bool {
        if !self.filtered.is_current(token) {
            log_debug!(MODULE, "Discarding stale response #{}", token.generation());
            return false;
        }

        let mut state = self.state();
        state.is_loading_filtered = false;
        match result {
            Ok(files) => {
                log_info!(MODULE, "Query #{} returned {} files", token.generation(), files.len());
                state.filtered_files = files;
                state.error = None;
                true
            }
            Err(e) if e.is_cancelled() => false,
            Err(e) => {
                state.error = Some(e.to_string());
                state.filtered_files.clear();
                drop(state);
                log_error!(MODULE, "Query #{} failed: {}", token.generation(), e);
                self.notifier.error(format!("Failed to load file list: {}", e));
                true
            }
        }
    }

    fn clear_filtered(&self) {
        self.filtered.cancel();
        let mut state = self.state();
        state.filtered_files.clear();
        state.is_loading_filtered = false;
    }

    /// Abort every outstanding request
    pub fn shutdown(&self) {
        self.filtered.cancel();
        self.options.cancel();
        let mut state = self.state();
        state.is_loading_filtered = false;
        state.is_loading_options = false;
    }

    fn state(&self) -> MutexGuard<'_, DispatchState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
