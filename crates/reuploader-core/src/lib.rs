#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Download, republish and map assets between platform accounts.
//!
//! Layout:
//! - `asset.rs`: identifiers, downloaded payloads and upload metadata
//! - `transport.rs`: the [`AssetTransport`] seam and its HTTP implementation
//! - `pipeline.rs`: the per-asset download → upload → id resolution sequence
//! - `map_store.rs`: the ordered old → new identifier map and its JSON artifact
//! - `extractor.rs`: asset reference scanning for XML scene documents
//! - `error.rs`: error taxonomy shared by the modules above

pub mod asset;
pub mod error;
pub mod extractor;
pub mod map_store;
pub mod pipeline;
pub mod transport;

pub use asset::{AssetId, DEFAULT_ASSET_TYPE, DownloadedAsset, UploadMetadata};
pub use error::{
    ExtractError, ExtractResult, MapStoreError, MapStoreResult, ParseAssetIdError,
    PipelineError, PipelineResult, TransportError, TransportOperation, TransportResult,
};
pub use extractor::{
    ASSET_URI_PREFIXES, DEFAULT_REFERENCE_MARKER, ReferenceScanner, extract_references,
    parse_reference,
};
pub use map_store::{IdMapping, IdentifierMap};
pub use pipeline::{IdLookup, NEW_ID_LOOKUPS, ReuploadPipeline, SUCCESS_PAUSE, resolve_new_id};
pub use transport::{AssetTransport, HttpTransport};
