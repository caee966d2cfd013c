//! Reading, writing and bootstrapping the JSON configuration file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};
use crate::model::{ConfigFile, ReuploaderConfig};
use crate::validate::resolve;

/// Result of [`load_or_bootstrap`].
#[derive(Debug)]
pub enum LoadOutcome {
    /// The file existed and resolved into a usable configuration.
    Loaded(ReuploaderConfig),
    /// The file was missing; a template was written to this path.
    Bootstrapped(PathBuf),
}

/// Load the configuration at `path`, writing a template when it is missing.
///
/// # Errors
///
/// Returns an error when the file cannot be read, parsed or written, or when
/// the resolved configuration fails validation.
pub fn load_or_bootstrap(path: &Path) -> ConfigResult<LoadOutcome> {
    match fs::read_to_string(path) {
        Ok(raw) => {
            let file = parse_config(path, &raw)?;
            debug!(path = %path.display(), ?file, "loaded configuration file");
            resolve(file).map(LoadOutcome::Loaded)
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            write_config_file(path, &ConfigFile::template(), false)?;
            info!(path = %path.display(), "wrote configuration template");
            Ok(LoadOutcome::Bootstrapped(path.to_path_buf()))
        }
        Err(err) => Err(ConfigError::io("read", path, err)),
    }
}

/// Read the raw configuration document without applying defaults.
///
/// # Errors
///
/// Returns an error when the file cannot be read or is not valid JSON.
pub fn read_config_file(path: &Path) -> ConfigResult<ConfigFile> {
    let raw = fs::read_to_string(path).map_err(|err| ConfigError::io("read", path, err))?;
    parse_config(path, &raw)
}

/// Write a configuration document as pretty JSON.
///
/// # Errors
///
/// Returns [`ConfigError::AlreadyExists`] when the file exists and `overwrite`
/// is false, or an IO/JSON error when writing fails.
pub fn write_config_file(path: &Path, file: &ConfigFile, overwrite: bool) -> ConfigResult<()> {
    if !overwrite && path.exists() {
        return Err(ConfigError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| ConfigError::io("create_dir", parent, err))?;
    }
    let serialised =
        serde_json::to_string_pretty(file).map_err(|err| ConfigError::json("serialize", path, err))?;
    fs::write(path, serialised).map_err(|err| ConfigError::io("write", path, err))
}

fn parse_config(path: &Path, raw: &str) -> ConfigResult<ConfigFile> {
    // an empty file behaves like `{}`
    if raw.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_json::from_str(raw).map_err(|err| ConfigError::json("parse", path, err))
}
