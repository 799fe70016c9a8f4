//! Configuration schema types for `prefabs.toml`
//!
//! Defines the structure and validation rules for a prefab project.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::catalog::DEFAULT_PATTERN;
use crate::models::DedupKey;
use crate::store::REGISTRY_FILENAME;

/// Config filename searched for by the loader.
pub const CONFIG_FILENAME: &str = "prefabs.toml";

/// Project metadata section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name (required)
    pub name: String,
    /// Directory scanned for prefab assets
    #[serde(default = "default_assets")]
    pub assets: PathBuf,
    /// Registry file
    #[serde(default = "default_registry")]
    pub registry: PathBuf,
}

fn default_assets() -> PathBuf {
    PathBuf::from("Assets")
}

fn default_registry() -> PathBuf {
    PathBuf::from(REGISTRY_FILENAME)
}

/// Populate settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulateConfig {
    /// Glob patterns (relative to `project.assets`) selecting prefab files
    #[serde(default = "default_patterns")]
    pub patterns: Vec<String>,
    /// How already-registered assets are recognised
    #[serde(default)]
    pub dedup: DedupKey,
    /// Reject new entries whose tag or id is already taken
    #[serde(default)]
    pub strict: bool,
}

impl Default for PopulateConfig {
    fn default() -> Self {
        Self { patterns: default_patterns(), dedup: DedupKey::default(), strict: false }
    }
}

fn default_patterns() -> Vec<String> {
    vec![DEFAULT_PATTERN.to_string()]
}

/// Error collection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Append command errors to `error_file`
    #[serde(default)]
    pub collect_errors: bool,
    #[serde(default = "default_error_file")]
    pub error_file: PathBuf,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self { collect_errors: false, error_file: default_error_file() }
    }
}

fn default_error_file() -> PathBuf {
    PathBuf::from(".prefab-errors.jsonl")
}

/// Complete `prefabs.toml` document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefabsConfig {
    /// Project metadata (required)
    pub project: ProjectConfig,
    #[serde(default)]
    pub populate: PopulateConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Configuration validation error
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "populate.patterns")
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: '{}' {}", CONFIG_FILENAME, self.field, self.message)
    }
}

impl PrefabsConfig {
    /// Minimal configuration for a project called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            project: ProjectConfig {
                name: name.into(),
                assets: default_assets(),
                registry: default_registry(),
            },
            populate: PopulateConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.project.name.is_empty() {
            errors.push(ConfigValidationError {
                field: "project.name".to_string(),
                message: "must be a non-empty string".to_string(),
            });
        }

        if self.project.registry.as_os_str().is_empty() {
            errors.push(ConfigValidationError {
                field: "project.registry".to_string(),
                message: "must be a file path".to_string(),
            });
        }

        if self.populate.patterns.is_empty() {
            errors.push(ConfigValidationError {
                field: "populate.patterns".to_string(),
                message: "must contain at least one glob pattern".to_string(),
            });
        }

        for (i, pattern) in self.populate.patterns.iter().enumerate() {
            if let Err(e) = glob::Pattern::new(pattern) {
                errors.push(ConfigValidationError {
                    field: format!("populate.patterns[{}]", i),
                    message: format!("is not a valid glob: {}", e),
                });
            }
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}
