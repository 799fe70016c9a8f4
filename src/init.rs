//! Project initialization for prefabsrc
//!
//! Creates `prefabs.toml`, the asset directory, and an empty registry file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::CONFIG_FILENAME;
use crate::registry::PrefabRegistry;
use crate::store::{self, StoreError, REGISTRY_FILENAME};

/// Error during project initialization
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum InitError {
    /// Config already present and `force` not set
    #[error("'{0}' already exists (use --force to overwrite)")]
    AlreadyExists(PathBuf),
    /// Failed to create directory
    #[error("Failed to create directory: {0}")]
    CreateDir(std::io::Error),
    /// Failed to write file
    #[error("Failed to write file: {0}")]
    WriteFile(std::io::Error),
    /// Failed to write the registry
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Files created by [`init_project`].
#[derive(Debug, Clone)]
pub struct InitResult {
    pub config: PathBuf,
    pub registry: PathBuf,
    pub assets: PathBuf,
}

/// Initialize a prefab project in `path`.
///
/// Existing prefab files are left alone. With `force`, an existing config and
/// registry are replaced; otherwise an existing config is an error.
///
/// # Example
/// ```ignore
/// init_project(Path::new("my-game"), "my-game", false)?;
/// ```
pub fn init_project(path: &Path, name: &str, force: bool) -> Result<InitResult, InitError> {
    let config_path = path.join(CONFIG_FILENAME);
    if config_path.exists() && !force {
        return Err(InitError::AlreadyExists(config_path));
    }

    let assets = path.join("Assets");
    create_dir(&assets)?;
    write_file(&config_path, &generate_config(name))?;

    let registry = path.join(REGISTRY_FILENAME);
    if force || !registry.exists() {
        store::save(&PrefabRegistry::new(), &registry)?;
    }

    tracing::info!(path = %path.display(), "initialized prefab project");
    Ok(InitResult { config: config_path, registry, assets })
}

fn create_dir(path: &Path) -> Result<(), InitError> {
    fs::create_dir_all(path).map_err(InitError::CreateDir)
}

fn write_file(path: &Path, content: &str) -> Result<(), InitError> {
    fs::write(path, content).map_err(InitError::WriteFile)
}

/// Generate the starter prefabs.toml.
fn generate_config(name: &str) -> String {
    format!(
        r#"[project]
name = {}
assets = "Assets"
registry = {}

[populate]
patterns = ["**/*.prefab"]
# "path" treats a moved file as a new prefab, "content" matches by file hash
dedup = "path"
strict = false

[telemetry]
collect_errors = false
"#,
        toml::Value::String(name.to_string()),
        toml::Value::String(REGISTRY_FILENAME.to_string())
    )
}
