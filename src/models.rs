//! Data models for registered prefabs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to a prefab asset on disk.
///
/// `path` is relative to the catalog root and always uses `/` as separator so
/// registry files stay portable between platforms. `content_hash` is the hex
/// SHA-256 digest of the file's bytes, or empty for references that were not
/// produced by scanning a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRef {
    pub path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content_hash: String,
}

impl AssetRef {
    /// Create a reference with a known content hash.
    pub fn new(path: impl Into<String>, content_hash: impl Into<String>) -> Self {
        Self { path: path.into(), content_hash: content_hash.into() }
    }

    /// Create a reference identified by path only.
    pub fn from_path(path: impl Into<String>) -> Self {
        Self { path: path.into(), content_hash: String::new() }
    }

    /// Check whether two references denote the same asset under `key`.
    pub fn same_asset(&self, other: &AssetRef, key: DedupKey) -> bool {
        match key {
            DedupKey::Path => self.path == other.path,
            DedupKey::Content => {
                if self.content_hash.is_empty() || other.content_hash.is_empty() {
                    self.path == other.path
                } else {
                    self.content_hash == other.content_hash
                }
            }
        }
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

/// Rule deciding when a catalog candidate is already registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupKey {
    /// Same relative path
    #[default]
    Path,
    /// Same file contents (falls back to path when a hash is missing)
    Content,
}

impl DedupKey {
    /// Parse a dedup key name ("path" or "content").
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "path" => Some(DedupKey::Path),
            "content" => Some(DedupKey::Content),
            _ => None,
        }
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DedupKey::Path => write!(f, "path"),
            DedupKey::Content => write!(f, "content"),
        }
    }
}

/// One registered prefab: a tag, an integer id, and the asset it points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub tag: String,
    pub id: i64,
    pub reference: AssetRef,
}

impl Entry {
    pub fn new(tag: impl Into<String>, id: i64, reference: AssetRef) -> Self {
        Self { tag: tag.into(), id, reference }
    }
}
