//! Backend API module
//!
//! Handles fetching file lists and option catalogs from the WinNew backend.

mod client;
mod models;
mod request;

pub use client::ApiClient;
pub use models::{EditionAndLanguage, SelectOption, VersionsOption, WinFileInfo};
pub use request::{decode_payload, endpoint_url, unwrap_envelope, FileQuery, OptionsQuery};

use std::future::Future;

use crate::error::ApiError;

/// The backend as seen by the dispatcher.
///
/// [`ApiClient`] talks HTTP; tests substitute scripted implementations.
pub trait WinNewApi: Send + Sync + 'static {
    /// Files matching a query
    fn fetch_file_list(
        &self,
        query: &FileQuery,
    ) -> impl Future<Output = Result<Vec<WinFileInfo>, ApiError>> + Send;

    /// Systems and their versions
    fn fetch_version_options(&self) -> impl Future<Output = Result<VersionsOption, ApiError>> + Send;

    /// Editions and languages for one system + version
    fn fetch_edition_and_language(
        &self,
        query: &OptionsQuery,
    ) -> impl Future<Output = Result<EditionAndLanguage, ApiError>> + Send;
}
