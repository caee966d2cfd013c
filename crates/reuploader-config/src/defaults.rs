//! Default endpoints, file names and timeouts.
//!
//! # Design
//! - Mirror the public asset platform endpoints so a bootstrapped file works once
//!   credentials are filled in.
//! - Keep timeouts asymmetric: downloads are small reads, uploads wait on processing.

/// File name looked up in the working directory when no path is given.
pub const CONFIG_FILE_NAME: &str = "config.json";
/// Placeholder substituted with the numeric asset id in the download template.
pub const ASSET_ID_PLACEHOLDER: &str = "{assetId}";
/// Download endpoint template used when the file omits one.
pub const DEFAULT_DOWNLOAD_ENDPOINT: &str =
    "https://apis.roblox.com/asset-delivery-api/v1/assetId/{assetId}";
/// Upload endpoint used when the file omits one.
pub const DEFAULT_UPLOAD_ENDPOINT: &str = "https://apis.roblox.com/assets/v1/assets";
/// Download request timeout in seconds.
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 15;
/// Upload request timeout in seconds.
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 30;
