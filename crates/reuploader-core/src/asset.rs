//! Asset identifiers, downloaded payloads and upload metadata.

use std::fmt::{self, Display, Formatter};
use std::num::NonZeroU64;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseAssetIdError;

/// Asset type used when the caller leaves the tag blank.
pub const DEFAULT_ASSET_TYPE: &str = "Model";

/// Positive integer naming an asset on the remote platform.
///
/// Serialises as a bare JSON integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct AssetId(NonZeroU64);

impl AssetId {
    /// Raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl TryFrom<u64> for AssetId {
    type Error = ParseAssetIdError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        NonZeroU64::new(value)
            .map(Self)
            .ok_or_else(|| ParseAssetIdError::new(value.to_string()))
    }
}

impl From<AssetId> for u64 {
    fn from(id: AssetId) -> Self {
        id.get()
    }
}

impl FromStr for AssetId {
    type Err = ParseAssetIdError;

    /// Accepts surrounding whitespace but otherwise only ASCII digits.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(ParseAssetIdError::new(input));
        }
        let value = trimmed
            .parse::<u64>()
            .map_err(|_| ParseAssetIdError::new(input))?;
        Self::try_from(value).map_err(|_| ParseAssetIdError::new(input))
    }
}

impl Display for AssetId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, formatter)
    }
}

/// Bytes fetched for one asset; consumed by the upload that follows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedAsset {
    /// Raw asset content.
    pub bytes: Vec<u8>,
    /// File name from `Content-Disposition` or synthesised from the content type.
    pub filename: String,
}

/// Caller-supplied description of the asset being republished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadMetadata {
    /// Display name of the new asset.
    pub display_name: String,
    /// Description of the new asset; may be empty.
    pub description: String,
    /// Platform asset type tag such as `Model`, `Decal`, `Animation` or `Audio`.
    pub asset_type: String,
}

impl UploadMetadata {
    /// Build metadata, substituting [`DEFAULT_ASSET_TYPE`] for a blank type tag.
    #[must_use]
    pub fn new(
        display_name: impl Into<String>,
        description: impl Into<String>,
        asset_type: impl Into<String>,
    ) -> Self {
        let asset_type = asset_type.into();
        let asset_type = if asset_type.trim().is_empty() {
            DEFAULT_ASSET_TYPE.to_string()
        } else {
            asset_type.trim().to_string()
        };
        Self {
            display_name: display_name.into(),
            description: description.into(),
            asset_type,
        }
    }
}
