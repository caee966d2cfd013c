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

//! File-backed configuration for the asset reuploader.
//!
//! Layout: `model.rs` (raw file model and resolved config), `validate.rs`
//! (credential/endpoint validation), `loader.rs` (read, write and bootstrap the
//! JSON file), `defaults.rs` (endpoint and timeout defaults).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use defaults::{
    ASSET_ID_PLACEHOLDER, CONFIG_FILE_NAME, DEFAULT_DOWNLOAD_ENDPOINT,
    DEFAULT_DOWNLOAD_TIMEOUT_SECS, DEFAULT_UPLOAD_ENDPOINT, DEFAULT_UPLOAD_TIMEOUT_SECS,
};
pub use error::{ConfigError, ConfigResult};
pub use loader::{LoadOutcome, load_or_bootstrap, read_config_file, write_config_file};
pub use model::{ConfigFile, Credentials, ReuploaderConfig};
pub use validate::resolve;
