//! Registry editing commands (add, remove, rename, set-id)

use std::path::Path;
use std::process::ExitCode;

use crate::catalog::{hash_file, normalize_asset_path};
use crate::config::CliOverrides;
use crate::models::{AssetRef, Entry};

use super::{fail, try_session, Session, EXIT_SUCCESS};

/// Execute the add command
pub fn run_add(
    config: Option<&Path>,
    overrides: &CliOverrides,
    tag: &str,
    path: &str,
    id: Option<i64>,
    strict: bool,
) -> ExitCode {
    let mut session = try_session!(Session::open("add", config, overrides));

    let assets_dir = session.project.assets_dir();
    let normalized = match normalize_asset_path(&assets_dir, Path::new(&path.replace('\\', "/"))) {
        Ok(p) => p,
        Err(e) => return fail("add", "catalog_error", &e, None),
    };
    let file = assets_dir.join(&normalized);
    let reference = if file.is_file() {
        match hash_file(&file) {
            Ok(hash) => AssetRef::new(normalized, hash),
            Err(e) => return fail("add", "catalog_error", &e, Some(&file)),
        }
    } else {
        tracing::warn!("asset '{}' does not exist, registering by path only", file.display());
        AssetRef::from_path(normalized)
    };

    let id = id.unwrap_or(session.registry.len() as i64);
    let entry = Entry::new(tag, id, reference);
    if strict || session.project.config.populate.strict {
        if let Err(e) = session.registry.add_strict(entry) {
            return fail("add", "registry_error", &e, None);
        }
    } else {
        session.registry.add(entry);
    }
    try_session!(session.save("add"));

    println!("Added [{}] {} at index {}", id, tag, session.registry.len() - 1);
    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the remove command
pub fn run_remove(config: Option<&Path>, overrides: &CliOverrides, index: usize) -> ExitCode {
    let mut session = try_session!(Session::open("remove", config, overrides));

    let removed = match session.registry.remove(index) {
        Ok(entry) => entry,
        Err(e) => return fail("remove", "registry_error", &e, None),
    };
    try_session!(session.save("remove"));

    println!("Removed [{}] {} ({})", removed.id, removed.tag, removed.reference);
    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the rename command
pub fn run_rename(
    config: Option<&Path>,
    overrides: &CliOverrides,
    index: usize,
    tag: &str,
) -> ExitCode {
    let mut session = try_session!(Session::open("rename", config, overrides));

    let old = match session.registry.rename(index, tag) {
        Ok(old) => old,
        Err(e) => return fail("rename", "registry_error", &e, None),
    };
    try_session!(session.save("rename"));

    println!("Renamed '{}' to '{}'", old, tag);
    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the set-id command
pub fn run_set_id(config: Option<&Path>, overrides: &CliOverrides, index: usize, id: i64) -> ExitCode {
    let mut session = try_session!(Session::open("set-id", config, overrides));

    let old = match session.registry.set_id(index, id) {
        Ok(old) => old,
        Err(e) => return fail("set-id", "registry_error", &e, None),
    };
    try_session!(session.save("set-id"));

    println!("Changed id of entry {} from {} to {}", index, old, id);
    ExitCode::from(EXIT_SUCCESS)
}
