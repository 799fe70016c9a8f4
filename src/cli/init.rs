//! Init command implementation

use std::path::Path;
use std::process::ExitCode;

use crate::init::init_project;

use super::{fail, EXIT_SUCCESS};

/// Execute the init command
pub fn run_init(dir: &Path, name: Option<&str>, force: bool) -> ExitCode {
    let name = match name {
        Some(n) => n.to_string(),
        None => dir
            .canonicalize()
            .unwrap_or_else(|_| dir.to_path_buf())
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string()),
    };

    match init_project(dir, &name, force) {
        Ok(result) => {
            println!("Created {}", result.config.display());
            println!("Created {}", result.registry.display());
            println!("Put prefabs under {} and run 'pfab populate'", result.assets.display());
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => fail("init", "init_error", &e, Some(dir)),
    }
}
