//! Validation helpers turning a raw [`ConfigFile`] into a [`ReuploaderConfig`].

use std::time::Duration;

use url::Url;

use crate::defaults::{
    ASSET_ID_PLACEHOLDER, DEFAULT_DOWNLOAD_ENDPOINT, DEFAULT_DOWNLOAD_TIMEOUT_SECS,
    DEFAULT_UPLOAD_ENDPOINT, DEFAULT_UPLOAD_TIMEOUT_SECS,
};
use crate::error::{ConfigError, ConfigResult};
use crate::model::{ConfigFile, Credentials, ReuploaderConfig};

/// Apply defaults and validate a configuration document.
///
/// # Errors
///
/// Returns [`ConfigError::MissingCredentials`] when neither credential is set,
/// or [`ConfigError::InvalidField`] when an endpoint or timeout is unusable.
pub fn resolve(file: ConfigFile) -> ConfigResult<ReuploaderConfig> {
    let credentials = Credentials {
        api_key: non_blank(file.x_api_key),
        session_cookie: non_blank(file.roblosecurity),
    };
    if credentials.api_key.is_none() && credentials.session_cookie.is_none() {
        return Err(ConfigError::MissingCredentials);
    }

    let download_endpoint = non_blank(file.download_endpoint)
        .unwrap_or_else(|| DEFAULT_DOWNLOAD_ENDPOINT.to_string());
    validate_download_template(&download_endpoint)?;

    let upload_endpoint = non_blank(file.upload_endpoint)
        .unwrap_or_else(|| DEFAULT_UPLOAD_ENDPOINT.to_string());
    let upload_endpoint = parse_http_url("upload_endpoint", &upload_endpoint)?;

    let download_timeout = parse_timeout(
        "download_timeout_secs",
        file.download_timeout_secs
            .unwrap_or(DEFAULT_DOWNLOAD_TIMEOUT_SECS),
    )?;
    let upload_timeout = parse_timeout(
        "upload_timeout_secs",
        file.upload_timeout_secs.unwrap_or(DEFAULT_UPLOAD_TIMEOUT_SECS),
    )?;

    Ok(ReuploaderConfig {
        credentials,
        download_endpoint,
        upload_endpoint,
        download_timeout,
        upload_timeout,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

fn validate_download_template(template: &str) -> ConfigResult<()> {
    if !template.contains(ASSET_ID_PLACEHOLDER) {
        return Err(ConfigError::invalid_field(
            "download_endpoint",
            "must contain the {assetId} placeholder",
            Some(template),
        ));
    }
    let sample = template.replace(ASSET_ID_PLACEHOLDER, "1");
    parse_http_url("download_endpoint", &sample)?;
    Ok(())
}

fn parse_http_url(field: &'static str, value: &str) -> ConfigResult<Url> {
    let url = Url::parse(value)
        .map_err(|_| ConfigError::invalid_field(field, "must be an absolute URL", Some(value)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::invalid_field(
            field,
            "must use http or https",
            Some(value),
        ));
    }
    Ok(url)
}

fn parse_timeout(field: &'static str, secs: u64) -> ConfigResult<Duration> {
    if secs == 0 {
        return Err(ConfigError::invalid_field(
            field,
            "must be greater than zero",
            Some("0"),
        ));
    }
    Ok(Duration::from_secs(secs))
}
