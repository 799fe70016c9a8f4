//! Read-only commands (list, get, check)

use std::path::Path;
use std::process::ExitCode;

use crate::catalog::hash_file;
use crate::config::CliOverrides;
use crate::models::Entry;
use crate::telemetry::{self, ErrorEntry};

use super::{try_session, Session, EXIT_ERROR, EXIT_SUCCESS};

/// Execute the list command
pub fn run_list(
    config: Option<&Path>,
    overrides: &CliOverrides,
    json: bool,
    detail: bool,
) -> ExitCode {
    let session = try_session!(Session::open("list", config, overrides));
    let assets_dir = session.project.assets_dir();

    if json {
        let rows: Vec<_> = session
            .registry
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let mut row = serde_json::json!({
                    "index": index,
                    "tag": entry.tag,
                    "id": entry.id,
                    "reference": entry.reference,
                });
                if detail {
                    row["status"] = serde_json::json!(asset_status(&assets_dir, entry));
                }
                row
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows).expect("JSON value serialization"));
        return ExitCode::from(EXIT_SUCCESS);
    }

    if session.registry.is_empty() {
        println!("Registry is empty");
        return ExitCode::from(EXIT_SUCCESS);
    }

    println!("{:>5}  {:>5}  {:<24} PATH", "INDEX", "ID", "TAG");
    for (index, entry) in session.registry.iter().enumerate() {
        print!("{:>5}  {:>5}  {:<24} {}", index, entry.id, entry.tag, entry.reference.path);
        if detail {
            print!("  [{}]", asset_status(&assets_dir, entry));
        }
        println!();
    }

    ExitCode::from(EXIT_SUCCESS)
}

/// State of an entry's asset file relative to what was registered.
fn asset_status(assets_dir: &Path, entry: &Entry) -> &'static str {
    let path = assets_dir.join(&entry.reference.path);
    if !path.is_file() {
        return "missing";
    }
    if entry.reference.content_hash.is_empty() {
        return "ok";
    }
    match hash_file(&path) {
        Ok(hash) if hash == entry.reference.content_hash => "ok",
        Ok(_) => "modified",
        Err(_) => "unreadable",
    }
}

/// Execute the get command
pub fn run_get(
    config: Option<&Path>,
    overrides: &CliOverrides,
    tag: Option<&str>,
    id: Option<i64>,
    json: bool,
) -> ExitCode {
    let session = try_session!(Session::open("get", config, overrides));

    let (found, key) = match (tag, id) {
        (Some(tag), _) => (session.registry.find_by_tag(tag), format!("Tag '{}'", tag)),
        (None, Some(id)) => (session.registry.find_by_id(id), format!("Id {}", id)),
        (None, None) => (None, "Prefab".to_string()),
    };

    match found {
        Some(entry) => {
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(entry).expect("JSON value serialization")
                );
            } else {
                println!("{}", entry.reference.path);
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        None => {
            let message = format!("{} not found", key);
            eprintln!("Error: {}", message);
            telemetry::log_error(&ErrorEntry::new("get", "lookup_miss", message));
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Execute the check command
pub fn run_check(config: Option<&Path>, overrides: &CliOverrides, json: bool) -> ExitCode {
    let session = try_session!(Session::open("check", config, overrides));
    let warnings = session.registry.check();

    if json {
        let messages: Vec<_> = warnings.iter().map(|w| w.message.as_str()).collect();
        let output = serde_json::json!({
            "entries": session.registry.len(),
            "warnings": messages,
        });
        println!("{}", serde_json::to_string_pretty(&output).expect("JSON value serialization"));
    } else if warnings.is_empty() {
        println!("{} entries, no duplicate tags or ids", session.registry.len());
    } else {
        for warning in &warnings {
            println!("Warning: {}", warning.message);
        }
    }

    if warnings.is_empty() {
        ExitCode::from(EXIT_SUCCESS)
    } else {
        ExitCode::from(EXIT_ERROR)
    }
}
