//! # Design
//!
//! - Every per-asset failure is a value the caller can inspect and report; none is fatal.
//! - Transport failures carry a truncated response body as diagnostic text.
//! - Network faults and HTTP error statuses share one [`TransportError`] shape.

use std::fmt::{self, Display, Formatter};
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::asset::AssetId;

/// Result type for transport calls.
pub type TransportResult<T> = Result<T, TransportError>;
/// Result type for a single reupload.
pub type PipelineResult<T> = Result<T, PipelineError>;
/// Result type for identifier map persistence.
pub type MapStoreResult<T> = Result<T, MapStoreError>;
/// Result type for scene document scanning.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Input that is not a positive integer asset identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{input}' is not a positive integer asset id")]
pub struct ParseAssetIdError {
    /// Rejected input, verbatim.
    pub input: String,
}

impl ParseAssetIdError {
    pub(crate) fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// Which transport step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportOperation {
    /// Building the HTTP client or request headers.
    Configure,
    /// Fetching asset bytes.
    Download,
    /// Publishing the new asset.
    Upload,
}

impl Display for TransportOperation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Configure => "transport setup",
            Self::Download => "download",
            Self::Upload => "upload",
        })
    }
}

/// Failure talking to the remote platform.
///
/// `status` is informational; callers must not branch on network-level versus
/// HTTP-level failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed: {detail}")]
pub struct TransportError {
    /// Step that failed.
    pub operation: TransportOperation,
    /// HTTP status when a response was received.
    pub status: Option<u16>,
    /// Diagnostic text, including a truncated response body where available.
    pub detail: String,
}

impl TransportError {
    pub(crate) fn configure(detail: impl Into<String>) -> Self {
        Self {
            operation: TransportOperation::Configure,
            status: None,
            detail: detail.into(),
        }
    }

    pub(crate) fn download(status: Option<u16>, detail: impl Into<String>) -> Self {
        Self {
            operation: TransportOperation::Download,
            status,
            detail: detail.into(),
        }
    }

    pub(crate) fn upload(status: Option<u16>, detail: impl Into<String>) -> Self {
        Self {
            operation: TransportOperation::Upload,
            status,
            detail: detail.into(),
        }
    }
}

/// Outcome of a failed reupload; each variant aborts only the asset at hand.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The identifier was not a positive integer; nothing was sent.
    #[error("invalid asset id")]
    InvalidIdentifier(#[from] ParseAssetIdError),
    /// Fetching the source asset failed.
    #[error("download failed for asset {asset_id}")]
    DownloadFailed {
        /// Source asset.
        asset_id: AssetId,
        /// Underlying transport failure.
        source: TransportError,
    },
    /// Publishing the downloaded bytes failed.
    #[error("upload failed for asset {asset_id}")]
    UploadFailed {
        /// Source asset.
        asset_id: AssetId,
        /// Underlying transport failure.
        source: TransportError,
    },
    /// The upload succeeded but its response held no usable new identifier.
    #[error("no new asset id in upload response for asset {asset_id}: {response}")]
    IdentifierNotFound {
        /// Source asset.
        asset_id: AssetId,
        /// Upload response body as compact JSON.
        response: String,
    },
}

impl PipelineError {
    /// Stable machine-readable label for the failure kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier(_) => "invalid_identifier",
            Self::DownloadFailed { .. } => "download_failed",
            Self::UploadFailed { .. } => "upload_failed",
            Self::IdentifierNotFound { .. } => "identifier_not_found",
        }
    }
}

/// Failure reading or writing the identifier map artifact.
#[derive(Debug, Error)]
pub enum MapStoreError {
    /// Writing the artifact failed; the in-memory map is untouched.
    #[error("failed to persist identifier map to '{}'", path.display())]
    Persist {
        /// Target path.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Reading an artifact failed.
    #[error("failed to read identifier map from '{}'", path.display())]
    Read {
        /// Source path.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// JSON encoding or decoding failed.
    #[error("identifier map {operation} failed")]
    Json {
        /// Operation that triggered the JSON failure.
        operation: &'static str,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}

/// Failure scanning a scene document for asset references.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The document is not well-formed.
    #[error("scene document parse failed at byte {position}: {detail}")]
    Parse {
        /// Byte offset reached by the reader.
        position: u64,
        /// Parser diagnostic.
        detail: String,
    },
    /// The document could not be read from disk.
    #[error("failed to read scene document '{}'", path.display())]
    Io {
        /// Source path.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
}
