//! Browsing session
//!
//! Ties the filter state machine to the query dispatcher: every filter
//! change is reduced, stored, and its effects are executed. Also owns the
//! download and copy actions and their notices.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;

use crate::api::WinNewApi;
use crate::commands::{copy_to_clipboard, open_url, validate_download_url};
use crate::dispatch::{DispatchState, QueryDispatcher};
use crate::error::ActionError;
use crate::filters::{transition_all, Architecture, FilterAction, FilterState, SelectorView};
use crate::notify::{Notice, Notifier};
use crate::projector::{project, search_and_project, DisplayRecord, SearchFilter, SearchResults};
use crate::{log_info, log_warn};

const MODULE: &str = "session";

pub struct Session<A: WinNewApi> {
    dispatcher: QueryDispatcher<A>,
    filters: Mutex<FilterState>,
    notifier: Notifier,
    localized: bool,
}

impl<A: WinNewApi> Session<A> {
    pub fn new(api: Arc<A>, localized: bool) -> Self {
        let notifier = Notifier::new();
        Self {
            dispatcher: QueryDispatcher::new(api, notifier.clone()),
            filters: Mutex::new(FilterState::default()),
            notifier,
            localized,
        }
    }

    pub fn dispatcher(&self) -> &QueryDispatcher<A> {
        &self.dispatcher
    }

    pub fn localized(&self) -> bool {
        self.localized
    }

    pub fn filters(&self) -> FilterState {
        self.lock_filters().clone()
    }

    pub fn snapshot(&self) -> DispatchState {
        self.dispatcher.snapshot()
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.notifier.subscribe()
    }

    /// Load the system/version catalog and the latest images
    pub async fn start(&self) {
        log_info!(MODULE, "Starting session (localized labels: {})", self.localized);
        tokio::join!(
            self.dispatcher.load_version_options(),
            self.dispatcher.refresh_latest()
        );
    }

    pub async fn dispatch(&self, action: FilterAction) {
        self.apply([action]).await;
    }

    /// Reduce `actions` as one batch, then run the resulting effects.
    ///
    /// Tokens are issued while the filter lock is held, so concurrent
    /// batches supersede each other in the order their states were stored.
    pub async fn apply<I>(&self, actions: I)
    where
        I: IntoIterator<Item = FilterAction>,
    {
        let (options, filtered) = {
            let mut filters = self.lock_filters();
            let (next, effects) = transition_all(&filters, actions);
            *filters = next;

            if effects.reset_options {
                self.dispatcher.reset_edition_and_language();
            }
            let options = effects.load_options.and_then(|query| {
                self.dispatcher
                    .prepare_edition_and_language(&query)
                    .map(|token| (token, query))
            });
            let filtered = if effects.refresh {
                self.dispatcher.prepare_filtered(&filters)
            } else {
                None
            };
            (options, filtered)
        };

        tokio::join!(
            async {
                if let Some((token, query)) = options {
                    self.dispatcher.run_edition_and_language(token, query).await;
                }
            },
            async {
                if let Some((token, query)) = filtered {
                    self.dispatcher.run_filtered(token, query).await;
                }
            }
        );
    }

    pub async fn set_system_code(&self, system_code: impl Into<String>) {
        self.dispatch(FilterAction::SetSystemCode(system_code.into())).await;
    }

    pub async fn set_version(&self, version: impl Into<String>) {
        self.dispatch(FilterAction::SetVersion(version.into())).await;
    }

    pub async fn set_language(&self, language: impl Into<String>) {
        self.dispatch(FilterAction::SetLanguage(language.into())).await;
    }

    pub async fn set_edition(&self, edition: impl Into<String>) {
        self.dispatch(FilterAction::SetEdition(edition.into())).await;
    }

    pub async fn set_architecture(&self, architecture: Architecture) {
        self.dispatch(FilterAction::SetArchitecture(architecture)).await;
    }

    /// Dropdown contents and enablement for the current filters
    pub fn selector_view(&self) -> SelectorView {
        SelectorView::new(
            &self.filters(),
            self.dispatcher.version_options(),
            &self.dispatcher.edition_and_language(),
        )
    }

    /// Filtered results after a search, labelled with the current catalog
    pub fn display_records(&self, search: &SearchFilter) -> SearchResults {
        let state = self.dispatcher.snapshot();
        search_and_project(
            &state.filtered_files,
            &state.edition_and_language,
            search,
            self.localized,
        )
    }

    pub fn latest_records(&self) -> Vec<DisplayRecord> {
        let state = self.dispatcher.snapshot();
        project(&state.latest_files, &state.edition_and_language, self.localized)
    }

    /// Open a download link. A non-http(s) link is refused as invalid; one
    /// that does not parse is reported as a failure to open.
    pub fn handle_download(&self, url: &str) -> bool {
        let url = match validate_download_url(url) {
            Ok(url) => url,
            Err(e @ ActionError::UnsupportedScheme(_)) => {
                log_warn!(MODULE, "Refusing download link {:?}: {}", url, e);
                self.notifier.error("Invalid download link");
                return false;
            }
            Err(e) => {
                log_warn!(MODULE, "Cannot parse download link {:?}: {}", url, e);
                self.notifier.error("Failed to open download link");
                return false;
            }
        };

        match open_url(&url) {
            Ok(()) => true,
            Err(e) => {
                log_warn!(MODULE, "{}", e);
                self.notifier.error("Failed to open download link");
                false
            }
        }
    }

    /// Copy a download link to the clipboard
    pub fn handle_copy(&self, url: &str) -> bool {
        match copy_to_clipboard(url) {
            Ok(()) => {
                self.notifier.success("Copied");
                true
            }
            Err(e) => {
                log_warn!(MODULE, "{}", e);
                self.notifier.brief_error("Copy failed");
                false
            }
        }
    }

    /// Abort every outstanding request
    pub fn shutdown(&self) {
        log_info!(MODULE, "Shutting down session");
        self.dispatcher.shutdown();
    }

    fn lock_filters(&self) -> MutexGuard<'_, FilterState> {
        self.filters.lock().unwrap_or_else(|e| e.into_inner())
    }
}
