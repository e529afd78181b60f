//! HTTP client for the WinNew backend

use std::time::Duration;

use futures_util::future::try_join;
use reqwest::Client;
use serde::de::DeserializeOwned;

use super::models::{EditionAndLanguage, EditionList, LanguageList, VersionsOption, WinFileInfo};
use super::request::{decode_payload, endpoint_url, FileQuery, OptionsQuery};
use super::WinNewApi;
use crate::config;
use crate::error::ApiError;
use crate::{log_debug, log_error};

const MODULE: &str = "api";

/// reqwest-backed implementation of [`WinNewApi`]
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    host: String,
    timeout: Duration,
}

impl ApiClient {
    /// Create a client with the default 30 second request timeout
    pub fn new(host: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_timeout(host, config::http::REQUEST_TIMEOUT)
    }

    pub fn with_timeout(host: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(config::app::USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        Ok(Self {
            client,
            host: host.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = endpoint_url(&self.host, path, params)?;
        log_debug!(MODULE, "GET {}", url);

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            log_error!(MODULE, "Request to {} failed: {}", url, e);
            ApiError::from_reqwest(e, self.timeout)
        })?;

        let status = response.status();
        if !status.is_success() {
            log_error!(MODULE, "Request to {} returned status {}", url, status);
            return Err(ApiError::Http {
                status: status.as_u16(),
            });
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            log_error!(MODULE, "Failed to parse JSON from {}: {}", url, e);
            ApiError::from_reqwest(e, self.timeout)
        })?;

        decode_payload(body, status.as_u16())
    }
}

impl WinNewApi for ApiClient {
    async fn fetch_file_list(&self, query: &FileQuery) -> Result<Vec<WinFileInfo>, ApiError> {
        let files: Vec<WinFileInfo> = self.get_json(config::urls::FILE_LIST, &query.params()).await?;
        log_debug!(MODULE, "Received {} files", files.len());
        Ok(files)
    }

    async fn fetch_version_options(&self) -> Result<VersionsOption, ApiError> {
        self.get_json(config::urls::VERSION_OPTIONS, &[]).await
    }

    async fn fetch_edition_and_language(
        &self,
        query: &OptionsQuery,
    ) -> Result<EditionAndLanguage, ApiError> {
        // Either list failing fails the whole catalog
        let (editions, languages) = try_join(
            self.get_json::<EditionList>(config::urls::EDITION_OPTIONS, &query.edition_params()),
            self.get_json::<LanguageList>(config::urls::LANGUAGE_OPTIONS, &query.language_params()),
        )
        .await?;

        Ok(EditionAndLanguage {
            language: languages.language,
            edition: editions.edition,
        })
    }
}
