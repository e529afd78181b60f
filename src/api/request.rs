//! Request building and response envelope handling

use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::config;
use crate::error::ApiError;

/// Parameters of a file list query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileQuery {
    pub system_code: String,
    pub version: String,
    pub language_code: String,
    /// Empty means all architectures
    pub architecture: String,
    pub edition: String,
}

impl FileQuery {
    /// The fixed query used for the "latest" section of one system
    pub fn latest(system_code: &str) -> Self {
        Self {
            system_code: system_code.to_string(),
            version: config::latest::VERSION.to_string(),
            language_code: config::latest::LANGUAGE_CODE.to_string(),
            architecture: config::latest::ARCHITECTURE.to_string(),
            edition: config::latest::EDITION.to_string(),
        }
    }

    pub fn params(&self) -> [(&'static str, &str); 5] {
        [
            ("SystemCode", self.system_code.as_str()),
            ("Version", self.version.as_str()),
            ("LanguageCode", self.language_code.as_str()),
            ("Architecture", self.architecture.as_str()),
            ("Edition", self.edition.as_str()),
        ]
    }
}

/// Parameters of the edition/language option queries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionsQuery {
    pub system_code: String,
    pub version: String,
    pub language_code: String,
    pub architecture: String,
}

impl OptionsQuery {
    pub fn edition_params(&self) -> [(&'static str, &str); 4] {
        [
            ("SystemCode", self.system_code.as_str()),
            ("Version", self.version.as_str()),
            ("LanguageCode", self.language_code.as_str()),
            ("Architecture", self.architecture.as_str()),
        ]
    }

    /// The language endpoint is not scoped by language
    pub fn language_params(&self) -> [(&'static str, &str); 3] {
        [
            ("SystemCode", self.system_code.as_str()),
            ("Version", self.version.as_str()),
            ("Architecture", self.architecture.as_str()),
        ]
    }
}

/// Build an endpoint URL, omitting empty parameters.
///
/// Omission, not a blank value, tells the backend a filter is unset.
pub fn endpoint_url(host: &str, path: &str, params: &[(&str, &str)]) -> Result<Url, ApiError> {
    let base = format!("{}{}", host.trim_end_matches('/'), path);
    let present: Vec<(&str, &str)> = params
        .iter()
        .copied()
        .filter(|(_, value)| !value.is_empty())
        .collect();

    let url = if present.is_empty() {
        Url::parse(&base)
    } else {
        Url::parse_with_params(&base, &present)
    };

    url.map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base, e)))
}

/// Unwrap the optional `{state, data, message, code}` envelope
pub fn unwrap_envelope(body: serde_json::Value, status: u16) -> Result<serde_json::Value, ApiError> {
    let serde_json::Value::Object(mut map) = body else {
        return Ok(body);
    };

    if map.get("state").and_then(|s| s.as_str()) == Some("error") {
        let message = map
            .get("message")
            .and_then(|m| m.as_str())
            .filter(|m| !m.is_empty())
            .unwrap_or("Unknown error")
            .to_string();
        let code = map.get("code").and_then(|c| match c {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
        return Err(ApiError::Backend {
            message,
            code,
            status,
        });
    }

    match map.remove("data") {
        Some(data) => Ok(data),
        None => Ok(serde_json::Value::Object(map)),
    }
}

/// Decode a response body into `T` after envelope handling
pub fn decode_payload<T: DeserializeOwned>(body: serde_json::Value, status: u16) -> Result<T, ApiError> {
    let payload = unwrap_envelope(body, status)?;
    serde_json::from_value(payload).map_err(|e| ApiError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::WinFileInfo;
    use serde_json::json;

    #[test]
    fn test_empty_params_are_omitted() {
        let query = FileQuery {
            system_code: "11".to_string(),
            version: "24H2".to_string(),
            language_code: "zh-cn".to_string(),
            ..Default::default()
        };
        let url = endpoint_url("http://localhost:3333/", config::urls::FILE_LIST, &query.params()).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3333/winnew/file-list?SystemCode=11&Version=24H2&LanguageCode=zh-cn"
        );
    }

    #[test]
    fn test_no_params_means_no_query_string() {
        let url = endpoint_url("https://api.hotpe.top", config::urls::VERSION_OPTIONS, &[]).unwrap();
        assert_eq!(url.as_str(), "https://api.hotpe.top/winnew/options/version");
        assert!(url.query().is_none());
    }

    #[test]
    fn test_language_params_skip_language() {
        let query = OptionsQuery {
            system_code: "10".to_string(),
            version: "22H2".to_string(),
            language_code: "en-us".to_string(),
            architecture: String::new(),
        };
        let url = endpoint_url("http://h", config::urls::LANGUAGE_OPTIONS, &query.language_params()).unwrap();
        assert_eq!(url.query(), Some("SystemCode=10&Version=22H2"));
    }

    #[test]
    fn test_invalid_host_is_rejected() {
        assert!(matches!(
            endpoint_url("not a host", "/x", &[]),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_envelope_error_state() {
        let err = unwrap_envelope(json!({"state": "error", "message": "bad version", "code": "E1"}), 200)
            .unwrap_err();
        assert_eq!(err.to_string(), "bad version");
        assert_eq!(err.code(), Some("E1"));

        let err = unwrap_envelope(json!({"state": "error"}), 200).unwrap_err();
        assert_eq!(err.to_string(), "Unknown error");
    }

    #[test]
    fn test_envelope_data_is_unwrapped() {
        let body = json!({"state": "success", "data": [{"FileName": "a.iso"}]});
        let files: Vec<WinFileInfo> = decode_payload(body, 200).unwrap();
        assert_eq!(files[0].file_name, "a.iso");
    }

    #[test]
    fn test_bare_payload_passes_through() {
        let files: Vec<WinFileInfo> = decode_payload(json!([{"FileName": "b.iso"}]), 200).unwrap();
        assert_eq!(files.len(), 1);

        let body = json!({"Edition": [{"label": "Pro", "value": "professional"}]});
        assert_eq!(unwrap_envelope(body.clone(), 200).unwrap(), body);
    }

    #[test]
    fn test_wrong_shape_is_a_parse_error() {
        let result: Result<Vec<WinFileInfo>, _> = decode_payload(json!({"oops": true}), 200);
        assert!(matches!(result, Err(ApiError::Parse(_))));
    }
}
