//! Configuration models: the raw JSON file and the resolved, validated view.

use std::fmt::{self, Debug, Formatter};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::defaults::{DEFAULT_DOWNLOAD_ENDPOINT, DEFAULT_UPLOAD_ENDPOINT};

/// On-disk configuration document.
///
/// Every key is optional; missing or `null` values fall back to the defaults
/// during [`crate::resolve`]. Unknown keys are ignored.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Open Cloud API key sent as `x-api-key`.
    #[serde(default)]
    pub x_api_key: Option<String>,
    /// Session cookie value sent as `.ROBLOSECURITY`.
    #[serde(default)]
    pub roblosecurity: Option<String>,
    /// Download URL template containing `{assetId}`.
    #[serde(default)]
    pub download_endpoint: Option<String>,
    /// Upload URL.
    #[serde(default)]
    pub upload_endpoint: Option<String>,
    /// Download request timeout override in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_timeout_secs: Option<u64>,
    /// Upload request timeout override in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_timeout_secs: Option<u64>,
}

impl ConfigFile {
    /// Template written when no configuration file exists yet.
    #[must_use]
    pub fn template() -> Self {
        Self {
            x_api_key: None,
            roblosecurity: None,
            download_endpoint: Some(DEFAULT_DOWNLOAD_ENDPOINT.to_string()),
            upload_endpoint: Some(DEFAULT_UPLOAD_ENDPOINT.to_string()),
            download_timeout_secs: None,
            upload_timeout_secs: None,
        }
    }
}

impl Debug for ConfigFile {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ConfigFile")
            .field("x_api_key", &self.x_api_key.as_ref().map(|_| "<redacted>"))
            .field(
                "roblosecurity",
                &self.roblosecurity.as_ref().map(|_| "<redacted>"),
            )
            .field("download_endpoint", &self.download_endpoint)
            .field("upload_endpoint", &self.upload_endpoint)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("upload_timeout_secs", &self.upload_timeout_secs)
            .finish()
    }
}

/// Authentication material; at least one field is always present once resolved.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// API key for the `x-api-key` header.
    pub api_key: Option<String>,
    /// Session cookie for the `Cookie` header.
    pub session_cookie: Option<String>,
}

impl Credentials {
    /// Human-readable summary of which credentials are configured.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match (&self.api_key, &self.session_cookie) {
            (Some(_), Some(_)) => "api key + session cookie",
            (Some(_), None) => "api key",
            (None, Some(_)) => "session cookie",
            (None, None) => "none",
        }
    }
}

impl Debug for Credentials {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Credentials")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field(
                "session_cookie",
                &self.session_cookie.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Validated configuration consumed by the transport layer.
#[derive(Debug, Clone)]
pub struct ReuploaderConfig {
    /// Credentials attached to every request.
    pub credentials: Credentials,
    /// Download URL template containing `{assetId}`.
    pub download_endpoint: String,
    /// Upload URL.
    pub upload_endpoint: Url,
    /// Per-request download timeout.
    pub download_timeout: Duration,
    /// Per-request upload timeout.
    pub upload_timeout: Duration,
}
