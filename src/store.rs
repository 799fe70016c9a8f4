//! Registry file persistence.
//!
//! The registry is stored as pretty-printed JSON, by default in
//! `prefabs.json` next to the project's `prefabs.toml`:
//!
//! ```json
//! {
//!   "version": 1,
//!   "updated_at": "2024-01-15T10:35:00Z",
//!   "entries": [
//!     {
//!       "tag": "Tree",
//!       "id": 0,
//!       "reference": { "path": "props/Tree.prefab", "content_hash": "ab12..." }
//!     }
//!   ]
//! }
//! ```
//!
//! Entry order in the file is the registry order.

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::Entry;
use crate::registry::PrefabRegistry;

/// Current registry file format version.
pub const REGISTRY_VERSION: u32 = 1;

/// Default registry filename.
pub const REGISTRY_FILENAME: &str = "prefabs.json";

/// Error reading or writing a registry file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// Registry file does not exist
    #[error("Registry file '{0}' not found (run 'pfab init' first)")]
    NotFound(PathBuf),
    /// IO error
    #[error("Failed to access '{path}': {source}")]
    Io { path: PathBuf, source: std::io::Error },
    /// JSON parsing or encoding error
    #[error("Failed to parse registry '{path}': {source}")]
    Json { path: PathBuf, source: serde_json::Error },
    /// File written by an incompatible version
    #[error("Registry version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// On-disk registry document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryFile {
    pub version: u32,
    /// When the file was last written
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub entries: Vec<Entry>,
}

impl RegistryFile {
    /// Snapshot a registry for writing.
    pub fn from_registry(registry: &PrefabRegistry) -> Self {
        Self {
            version: REGISTRY_VERSION,
            updated_at: crate::telemetry::timestamp_now(),
            entries: registry.entries().to_vec(),
        }
    }

    /// Convert into a registry, checking the format version.
    pub fn into_registry(self) -> Result<PrefabRegistry, StoreError> {
        if self.version != REGISTRY_VERSION {
            return Err(StoreError::VersionMismatch {
                expected: REGISTRY_VERSION,
                found: self.version,
            });
        }
        Ok(PrefabRegistry::from_entries(self.entries))
    }
}

/// Load a registry from `path`.
///
/// A missing file is [`StoreError::NotFound`].
pub fn load(path: &Path) -> Result<PrefabRegistry, StoreError> {
    if !path.exists() {
        return Err(StoreError::NotFound(path.to_path_buf()));
    }

    let file = File::open(path).map_err(|source| StoreError::Io { path: path.into(), source })?;
    let document: RegistryFile = serde_json::from_reader(BufReader::new(file))
        .map_err(|source| StoreError::Json { path: path.into(), source })?;

    let registry = document.into_registry()?;
    tracing::debug!(path = %path.display(), entries = registry.len(), "loaded registry");
    Ok(registry)
}

/// Load a registry from `path`, or an empty one if the file does not exist.
pub fn load_or_default(path: &Path) -> Result<PrefabRegistry, StoreError> {
    match load(path) {
        Err(StoreError::NotFound(_)) => Ok(PrefabRegistry::new()),
        other => other,
    }
}

/// Write `registry` to `path`, creating parent directories as needed.
pub fn save(registry: &PrefabRegistry, path: &Path) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io { path: path.into(), source };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
    }

    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &RegistryFile::from_registry(registry))
        .map_err(|source| StoreError::Json { path: path.into(), source })?;
    writeln!(writer).map_err(io_err)?;
    writer.flush().map_err(io_err)?;

    tracing::debug!(path = %path.display(), entries = registry.len(), "saved registry");
    Ok(())
}
