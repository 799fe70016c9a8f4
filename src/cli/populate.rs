//! Populate command implementation

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::catalog::DirectoryCatalog;
use crate::config::CliOverrides;
use crate::models::DedupKey;
use crate::populate::Populator;

use super::{fail, try_session, Session, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Execute the populate command
pub fn run_populate(
    config: Option<&Path>,
    mut overrides: CliOverrides,
    assets: Option<PathBuf>,
    dedup: Option<&str>,
    strict: bool,
    dry_run: bool,
    json: bool,
) -> ExitCode {
    if let Some(name) = dedup {
        match DedupKey::from_str(name) {
            Some(key) => overrides.dedup = Some(key),
            None => {
                eprintln!("Error: --dedup must be 'path' or 'content'");
                return ExitCode::from(EXIT_INVALID_ARGS);
            }
        }
    }
    overrides.assets = assets;
    if strict {
        overrides.strict = Some(true);
    }

    let mut session = try_session!(Session::open("populate", config, &overrides));
    let settings = session.project.config.populate.clone();
    let assets_dir = session.project.assets_dir();

    let catalog = DirectoryCatalog::new(&assets_dir).with_patterns(settings.patterns.iter());
    let populator = Populator::new(&catalog).with_dedup(settings.dedup).with_strict(settings.strict);

    let mut target = session.registry.clone();
    let report = match populator.run(&mut target) {
        Ok(r) => r,
        Err(e) => return fail("populate", "populate_error", &e, Some(&assets_dir)),
    };

    let saved = !dry_run && !report.is_unchanged();
    if saved {
        session.registry = target.clone();
        try_session!(session.save("populate"));
    }

    let added: Vec<_> = report.added.iter().filter_map(|&i| target.get(i)).collect();
    if json {
        let output = serde_json::json!({
            "added": added,
            "skipped": report.skipped,
            "saved": saved,
            "total": target.len(),
        });
        println!("{}", serde_json::to_string_pretty(&output).expect("JSON value serialization"));
    } else {
        for entry in &added {
            println!("  + [{}] {} ({})", entry.id, entry.tag, entry.reference);
        }
        println!(
            "Added {} prefab(s), skipped {} already registered ({} total)",
            report.added_count(),
            report.skipped,
            target.len()
        );
        if dry_run {
            println!("Dry run: registry not saved");
        }
    }

    ExitCode::from(EXIT_SUCCESS)
}
