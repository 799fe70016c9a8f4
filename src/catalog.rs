//! Prefab asset catalogs.
//!
//! A catalog enumerates the assets available for registration. The populator
//! only ever asks a catalog for its full candidate list; it never queries
//! individual assets.
//!
//! [`DirectoryCatalog`] discovers prefab files under an asset root using glob
//! patterns from the configuration. A plain `Vec<CatalogItem>` is also a
//! catalog, which is what tests and embedding callers use.

use glob::glob;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

use crate::models::AssetRef;

/// Default pattern for prefab discovery.
pub const DEFAULT_PATTERN: &str = "**/*.prefab";

/// Error while enumerating a catalog.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    /// Invalid glob pattern
    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidPattern { pattern: String, source: glob::PatternError },
    /// Asset root does not exist or is not a directory
    #[error("Asset directory '{0}' does not exist")]
    MissingRoot(PathBuf),
    /// Failed to read an asset file
    #[error("Failed to read '{path}': {source}")]
    Io { path: PathBuf, source: std::io::Error },
    /// Asset path that does not resolve to a location under the asset root
    #[error("Asset path '{path}' is outside the asset directory '{root}'")]
    OutsideRoot { path: PathBuf, root: PathBuf },
}

/// One asset a catalog offers for registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    /// Display name, used as the tag of a newly registered entry
    pub name: String,
    pub reference: AssetRef,
}

impl CatalogItem {
    pub fn new(name: impl Into<String>, reference: AssetRef) -> Self {
        Self { name: name.into(), reference }
    }
}

/// Source of candidate assets.
pub trait Catalog {
    /// Enumerate all candidate assets.
    fn candidates(&self) -> Result<Vec<CatalogItem>, CatalogError>;
}

impl Catalog for Vec<CatalogItem> {
    fn candidates(&self) -> Result<Vec<CatalogItem>, CatalogError> {
        Ok(self.clone())
    }
}

impl Catalog for [CatalogItem] {
    fn candidates(&self) -> Result<Vec<CatalogItem>, CatalogError> {
        Ok(self.to_vec())
    }
}

/// Catalog backed by prefab files under a directory.
#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    root: PathBuf,
    patterns: Vec<String>,
}

impl DirectoryCatalog {
    /// Create a catalog over `root` with the default `**/*.prefab` pattern.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), patterns: vec![DEFAULT_PATTERN.to_string()] }
    }

    /// Replace the glob patterns (relative to the root).
    pub fn with_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// The asset root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The glob patterns in use.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Discover matching files, deduplicated and sorted.
    pub fn discover(&self) -> Result<Vec<PathBuf>, CatalogError> {
        if !self.root.is_dir() {
            return Err(CatalogError::MissingRoot(self.root.clone()));
        }

        let mut files = BTreeSet::new();
        for pattern in &self.patterns {
            files.extend(discover_files(&self.root, pattern)?);
        }
        Ok(files.into_iter().collect())
    }
}

impl Catalog for DirectoryCatalog {
    fn candidates(&self) -> Result<Vec<CatalogItem>, CatalogError> {
        let files = self.discover()?;
        tracing::debug!(root = %self.root.display(), count = files.len(), "discovered prefab files");

        let mut items = Vec::with_capacity(files.len());
        for path in files {
            let name = match (path.to_str(), path.file_stem().and_then(|s| s.to_str())) {
                (Some(_), Some(stem)) => stem.to_string(),
                _ => {
                    tracing::warn!("skipping '{}': file name is not valid UTF-8", path.display());
                    continue;
                }
            };
            let relative = normalize_asset_path(&self.root, &path)?;
            let content_hash = hash_file(&path)?;
            items.push(CatalogItem::new(name, AssetRef::new(relative, content_hash)));
        }
        Ok(items)
    }
}

/// Discover files matching a glob pattern under `base_dir`.
pub fn discover_files(base_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, CatalogError> {
    let escaped_base = glob::Pattern::escape(&base_dir.to_string_lossy());
    let full_pattern = Path::new(&escaped_base).join(pattern);
    let pattern_str = full_pattern.to_string_lossy();

    let paths = glob(&pattern_str)
        .map_err(|source| CatalogError::InvalidPattern { pattern: pattern.to_string(), source })?;

    let mut files = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) => {
                if path.is_file() {
                    files.push(path);
                }
            }
            Err(e) => {
                tracing::warn!("error reading path: {}", e);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Registry key for `path`: relative to `root`, `/`-separated, with `.` and
/// `..` resolved.
///
/// Paths under `root` are made relative to it; other absolute paths are
/// rejected. Remaining relative paths are taken as relative to `root`, and
/// one that climbs above it is rejected.
pub fn normalize_asset_path(root: &Path, path: &Path) -> Result<String, CatalogError> {
    let outside = || CatalogError::OutsideRoot { path: path.to_path_buf(), root: root.to_path_buf() };

    let relative = match path.strip_prefix(root) {
        Ok(r) => r.to_path_buf(),
        Err(_) if path.is_absolute() => {
            let canonical_root = root.canonicalize().map_err(|_| outside())?;
            path.strip_prefix(&canonical_root).map_err(|_| outside())?.to_path_buf()
        }
        Err(_) => path.to_path_buf(),
    };

    let mut parts: Vec<String> = Vec::new();
    for component in relative.components() {
        match component {
            Component::CurDir => {}
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::ParentDir => {
                if parts.pop().is_none() {
                    return Err(outside());
                }
            }
            Component::RootDir | Component::Prefix(_) => return Err(outside()),
        }
    }

    if parts.is_empty() {
        return Err(outside());
    }
    Ok(parts.join("/"))
}

/// Hex SHA-256 digest of a file's contents.
pub fn hash_file(path: &Path) -> Result<String, CatalogError> {
    let bytes =
        fs::read(path).map_err(|source| CatalogError::Io { path: path.to_path_buf(), source })?;
    Ok(hash_bytes(&bytes))
}

/// Hex SHA-256 digest of `data`.
pub fn hash_bytes(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}
