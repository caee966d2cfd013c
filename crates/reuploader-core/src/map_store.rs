//! Ordered old → new identifier map and its JSON artifact.
//!
//! The artifact is a pretty-printed JSON array of `{"oldId": n, "newId": m}`
//! objects with integer values; downstream tooling depends on that shape.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::asset::AssetId;
use crate::error::{MapStoreError, MapStoreResult};

/// One successful reupload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdMapping {
    /// Identifier of the source asset.
    pub old_id: AssetId,
    /// Identifier of the republished asset.
    pub new_id: AssetId,
}

/// Append-only list of mappings for the current session, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentifierMap {
    entries: Vec<IdMapping>,
}

impl IdentifierMap {
    /// Empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a mapping. Reprocessed ids are kept as separate entries.
    pub fn record(&mut self, old_id: AssetId, new_id: AssetId) {
        self.entries.push(IdMapping { old_id, new_id });
    }

    /// Drop every mapping; called when a new session starts.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Mappings in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[IdMapping] {
        &self.entries
    }

    /// Number of mappings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no mapping has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pretty JSON (2-space indentation) of the map.
    ///
    /// # Errors
    ///
    /// Returns [`MapStoreError::Json`] if serialisation fails.
    pub fn to_json(&self) -> MapStoreResult<String> {
        serde_json::to_string_pretty(self).map_err(|source| MapStoreError::Json {
            operation: "serialize",
            source,
        })
    }

    /// Write the map to `path`, replacing any existing content.
    ///
    /// # Errors
    ///
    /// Returns [`MapStoreError::Persist`] when the file cannot be written. The
    /// in-memory map is unaffected, so the caller may retry.
    pub fn persist(&self, path: &Path) -> MapStoreResult<()> {
        let body = self.to_json()?;
        fs::write(path, body).map_err(|source| MapStoreError::Persist {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), entries = self.len(), "identifier map written");
        Ok(())
    }

    /// Read a previously persisted map.
    ///
    /// # Errors
    ///
    /// Returns [`MapStoreError::Read`] when the file cannot be read and
    /// [`MapStoreError::Json`] when it is not a valid map artifact.
    pub fn load(path: &Path) -> MapStoreResult<Self> {
        let raw = fs::read_to_string(path).map_err(|source| MapStoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| MapStoreError::Json {
            operation: "parse",
            source,
        })
    }
}

impl<'a> IntoIterator for &'a IdentifierMap {
    type Item = &'a IdMapping;
    type IntoIter = std::slice::Iter<'a, IdMapping>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
