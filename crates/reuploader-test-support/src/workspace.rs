//! Temporary directories for tests that touch config and map files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tempfile::TempDir;

/// Scratch directory removed when dropped.
#[derive(Debug)]
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    /// Create a fresh scratch directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("reuploader-")
            .tempdir()
            .context("failed to create temp dir")?;
        Ok(Self { dir })
    }

    /// Root of the scratch directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path for `name` inside the scratch directory.
    #[must_use]
    pub fn join(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write `contents` to `name` and return the full path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.join(name);
        fs::write(&path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Write a JSON document to `name` and return the full path.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialised or written.
    pub fn write_json(&self, name: &str, value: &Value) -> Result<PathBuf> {
        let body = serde_json::to_string_pretty(value).context("failed to serialise JSON")?;
        self.write(name, &body)
    }

    /// Read a file inside the scratch directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn read(&self, name: &str) -> Result<String> {
        let path = self.join(name);
        fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))
    }
}
