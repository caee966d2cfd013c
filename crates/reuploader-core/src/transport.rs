//! Authenticated HTTP access to the asset platform.
//!
//! # Design
//! - [`AssetTransport`] is the seam the pipeline drives; [`HttpTransport`] is the
//!   production implementation backed by `reqwest`.
//! - Credentials live in the client's default headers so every request carries them.
//! - Any status >= 400 is a failure; the truncated body becomes the diagnostic text.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{
    CONTENT_DISPOSITION, CONTENT_TYPE, COOKIE, HeaderMap, HeaderName, HeaderValue, USER_AGENT,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use reuploader_config::{ASSET_ID_PLACEHOLDER, Credentials, ReuploaderConfig};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::asset::{AssetId, DownloadedAsset, UploadMetadata};
use crate::error::{TransportError, TransportResult};

/// Header carrying the Open Cloud API key.
pub const HEADER_API_KEY: &str = "x-api-key";
/// Cookie name carrying the session credential.
pub const SESSION_COOKIE_NAME: &str = ".ROBLOSECURITY";
/// Longest download error body kept as diagnostic text, in characters.
pub const DOWNLOAD_ERROR_BODY_LIMIT: usize = 400;
/// Longest upload error body kept as diagnostic text, in characters.
pub const UPLOAD_ERROR_BODY_LIMIT: usize = 1000;

const MIME_JSON: &str = "application/json";
const XML_EXTENSION: &str = ".rbxm";
const BINARY_EXTENSION: &str = ".bin";

/// Retrieval and publication of raw assets.
#[async_trait]
pub trait AssetTransport: Send + Sync {
    /// Fetch the bytes of `asset_id`.
    async fn fetch(&self, asset_id: AssetId) -> TransportResult<DownloadedAsset>;

    /// Publish `asset` as a new asset and return the decoded JSON response.
    async fn publish(
        &self,
        asset: DownloadedAsset,
        metadata: &UploadMetadata,
    ) -> TransportResult<Value>;
}

/// `reqwest`-backed transport configured from a [`ReuploaderConfig`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    download_template: String,
    upload_endpoint: Url,
    download_timeout: Duration,
    upload_timeout: Duration,
}

impl HttpTransport {
    /// Build the HTTP client and authentication headers.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when a credential contains characters that
    /// are not valid in an HTTP header or the client cannot be built.
    pub fn new(config: &ReuploaderConfig) -> TransportResult<Self> {
        let client = Client::builder()
            .default_headers(build_headers(&config.credentials)?)
            .build()
            .map_err(|err| {
                TransportError::configure(format!("failed to build HTTP client: {err}"))
            })?;

        Ok(Self {
            client,
            download_template: config.download_endpoint.clone(),
            upload_endpoint: config.upload_endpoint.clone(),
            download_timeout: config.download_timeout,
            upload_timeout: config.upload_timeout,
        })
    }

    /// Download URL for `asset_id`, substituted into the configured template.
    ///
    /// # Errors
    ///
    /// Returns a download [`TransportError`] when the substituted URL is invalid.
    pub fn download_url(&self, asset_id: AssetId) -> TransportResult<Url> {
        let raw = self
            .download_template
            .replace(ASSET_ID_PLACEHOLDER, &asset_id.to_string());
        Url::parse(&raw).map_err(|err| {
            TransportError::download(None, format!("invalid download URL '{raw}': {err}"))
        })
    }
}

#[async_trait]
impl AssetTransport for HttpTransport {
    async fn fetch(&self, asset_id: AssetId) -> TransportResult<DownloadedAsset> {
        let url = self.download_url(asset_id)?;
        debug!(%asset_id, %url, "requesting asset download");

        let response = self
            .client
            .get(url)
            .timeout(self.download_timeout)
            .send()
            .await
            .map_err(|err| TransportError::download(None, format!("request error: {err}")))?;

        let status = response.status();
        if is_failure(status) {
            let body = error_body(response, DOWNLOAD_ERROR_BODY_LIMIT).await;
            return Err(TransportError::download(
                Some(status.as_u16()),
                format!("status {status}: {body}"),
            ));
        }

        let filename = filename_for_response(asset_id, &response);
        let bytes = response.bytes().await.map_err(|err| {
            TransportError::download(
                Some(status.as_u16()),
                format!("failed to read content: {err}"),
            )
        })?;
        debug!(%asset_id, %filename, size = bytes.len(), "asset downloaded");

        Ok(DownloadedAsset {
            bytes: bytes.to_vec(),
            filename,
        })
    }

    async fn publish(
        &self,
        asset: DownloadedAsset,
        metadata: &UploadMetadata,
    ) -> TransportResult<Value> {
        let payload = serde_json::to_string(&UploadRequest::from(metadata)).map_err(|err| {
            TransportError::upload(None, format!("failed to encode request: {err}"))
        })?;
        let mime = guess_mime(&asset.filename);
        debug!(filename = %asset.filename, %mime, size = asset.bytes.len(), "publishing asset");

        let request_part = Part::text(payload)
            .mime_str(MIME_JSON)
            .map_err(|err| TransportError::upload(None, format!("invalid request part: {err}")))?;
        let file_part = Part::bytes(asset.bytes)
            .file_name(asset.filename)
            .mime_str(&mime)
            .map_err(|err| TransportError::upload(None, format!("invalid file part: {err}")))?;
        let form = Form::new()
            .part("request", request_part)
            .part("fileContent", file_part);

        let response = self
            .client
            .post(self.upload_endpoint.clone())
            .timeout(self.upload_timeout)
            .multipart(form)
            .send()
            .await
            .map_err(|err| TransportError::upload(None, format!("request error: {err}")))?;

        let status = response.status();
        let body = response.text().await.map_err(|err| {
            TransportError::upload(
                Some(status.as_u16()),
                format!("failed to read response: {err}"),
            )
        })?;

        if is_failure(status) {
            return Err(TransportError::upload(
                Some(status.as_u16()),
                format!(
                    "status {status}: {}",
                    truncate_chars(&body, UPLOAD_ERROR_BODY_LIMIT)
                ),
            ));
        }

        serde_json::from_str(&body).map_err(|_| {
            TransportError::upload(
                Some(status.as_u16()),
                format!(
                    "response is not JSON: {}",
                    truncate_chars(&body, UPLOAD_ERROR_BODY_LIMIT)
                ),
            )
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadRequest<'a> {
    asset_type: &'a str,
    display_name: &'a str,
    description: &'a str,
    creation_context: CreationContext,
}

#[derive(Serialize)]
struct CreationContext {}

impl<'a> From<&'a UploadMetadata> for UploadRequest<'a> {
    fn from(metadata: &'a UploadMetadata) -> Self {
        Self {
            asset_type: &metadata.asset_type,
            display_name: &metadata.display_name,
            description: &metadata.description,
            creation_context: CreationContext {},
        }
    }
}

fn build_headers(credentials: &Credentials) -> TransportResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(concat!("AssetReuploader/", env!("CARGO_PKG_VERSION"))),
    );

    if let Some(api_key) = &credentials.api_key {
        headers.insert(
            HeaderName::from_static(HEADER_API_KEY),
            sensitive_value(api_key, "x_api_key")?,
        );
    }
    if let Some(cookie) = &credentials.session_cookie {
        headers.insert(
            COOKIE,
            sensitive_value(&format!("{SESSION_COOKIE_NAME}={cookie}"), "roblosecurity")?,
        );
    }
    Ok(headers)
}

fn sensitive_value(raw: &str, field: &str) -> TransportResult<HeaderValue> {
    let mut value = HeaderValue::from_str(raw).map_err(|_| {
        TransportError::configure(format!("{field} contains characters not allowed in a header"))
    })?;
    value.set_sensitive(true);
    Ok(value)
}

fn filename_for_response(asset_id: AssetId, response: &Response) -> String {
    let headers = response.headers();
    headers
        .get(CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .and_then(filename_from_content_disposition)
        .unwrap_or_else(|| {
            let content_type = headers
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok());
            synthesize_filename(asset_id, content_type)
        })
}

/// Extract the `filename` parameter from a `Content-Disposition` header value.
///
/// Quotes are stripped and only the final path component is kept.
#[must_use]
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("filename"))
        .map(|(_, value)| value.trim().trim_matches(|ch: char| ch == '"' || ch == '\''))
        .and_then(|value| {
            value
                .rsplit(['/', '\\'])
                .next()
                .map(str::trim)
                .filter(|name| !name.is_empty() && *name != "." && *name != "..")
                .map(str::to_string)
        })
}

/// Synthesise `asset_<id><ext>` from the declared content type.
#[must_use]
pub fn synthesize_filename(asset_id: AssetId, content_type: Option<&str>) -> String {
    let is_xml = content_type.is_some_and(|value| value.to_ascii_lowercase().contains("xml"));
    let extension = if is_xml { XML_EXTENSION } else { BINARY_EXTENSION };
    format!("asset_{asset_id}{extension}")
}

/// MIME type inferred from the file extension, `application/octet-stream` when unknown.
#[must_use]
pub fn guess_mime(filename: &str) -> String {
    mime_guess::from_path(Path::new(filename))
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

const fn is_failure(status: StatusCode) -> bool {
    status.as_u16() >= 400
}

async fn error_body(response: Response, limit: usize) -> String {
    let text = response.text().await.unwrap_or_default();
    truncate_chars(&text, limit)
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
