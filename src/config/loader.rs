//! Configuration loading and discovery for `prefabs.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::{PrefabsConfig, CONFIG_FILENAME};
use crate::models::DedupKey;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse prefabs.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override asset directory
    pub assets: Option<PathBuf>,
    /// Override registry file
    pub registry: Option<PathBuf>,
    /// Override dedup key
    pub dedup: Option<DedupKey>,
    /// Override strict populate
    pub strict: Option<bool>,
    /// Enable error collection
    pub collect_errors: Option<bool>,
}

/// A loaded configuration together with the directory its paths are relative to.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: PrefabsConfig,
    /// Directory containing `prefabs.toml`, or the working directory when
    /// running on defaults
    pub root: PathBuf,
    /// Path of the file the config came from, if any
    pub source: Option<PathBuf>,
}

impl LoadedConfig {
    /// Absolute-or-root-relative asset directory.
    pub fn assets_dir(&self) -> PathBuf {
        resolve_path(&self.root, &self.config.project.assets)
    }

    /// Absolute-or-root-relative registry file.
    pub fn registry_path(&self) -> PathBuf {
        resolve_path(&self.root, &self.config.project.registry)
    }

    /// Absolute-or-root-relative error log.
    pub fn error_file(&self) -> PathBuf {
        resolve_path(&self.root, &self.config.telemetry.error_file)
    }
}

/// Find prefabs.toml by walking up from the current working directory.
///
/// Only the working directory and its ancestors are searched: a registry
/// always belongs to the project that contains it.
pub fn find_config() -> Option<PathBuf> {
    env::current_dir().ok().and_then(find_config_from)
}

/// Find prefabs.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns a default
/// configuration rooted at the working directory.
pub fn load_config(path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => {
            let config = load_config_file(&p)?;
            let root = match project_root(&p).filter(|r| !r.as_os_str().is_empty()) {
                Some(r) if r.is_absolute() => r.to_path_buf(),
                Some(r) => env::current_dir()?.join(r),
                None => env::current_dir()?,
            };
            tracing::debug!(path = %p.display(), "loaded config");
            Ok(LoadedConfig { config, root, source: Some(p) })
        }
        None => {
            let root = env::current_dir()?;
            Ok(LoadedConfig { config: default_config(), root, source: None })
        }
    }
}

/// Load configuration from a specific file path.
pub fn load_config_file(path: &Path) -> Result<PrefabsConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parse and validate configuration text.
pub fn parse_config(contents: &str) -> Result<PrefabsConfig, ConfigError> {
    let config: PrefabsConfig = toml::from_str(contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

/// Create a default configuration when no prefabs.toml is found.
///
/// The project name is the current directory name.
pub fn default_config() -> PrefabsConfig {
    let project_name = env::current_dir()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "unnamed".to_string());

    PrefabsConfig::new(project_name)
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut PrefabsConfig, overrides: &CliOverrides) {
    if let Some(ref assets) = overrides.assets {
        config.project.assets = assets.clone();
    }

    if let Some(ref registry) = overrides.registry {
        config.project.registry = registry.clone();
    }

    if let Some(dedup) = overrides.dedup {
        config.populate.dedup = dedup;
    }

    if let Some(strict) = overrides.strict {
        config.populate.strict = strict;
    }

    if let Some(collect_errors) = overrides.collect_errors {
        config.telemetry.collect_errors = collect_errors;
    }
}

/// Get the project root directory from a config file path.
pub fn project_root(config_path: &Path) -> Option<&Path> {
    config_path.parent()
}

/// Resolve a path relative to the project root.
///
/// Absolute paths are returned unchanged.
pub fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}
