//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod edit;
mod init;
mod populate;
mod query;

use clap::{Parser, Subcommand};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::{load_config, merge_cli_overrides, CliOverrides, LoadedConfig};
use crate::registry::PrefabRegistry;
use crate::store::{self, StoreError};
use crate::telemetry::{self, ErrorEntry};

pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Prefabsrc - Register prefabs by tag and id, and look them up
#[derive(Parser)]
#[command(name = "pfab")]
#[command(about = "Prefabsrc - Maintain a tag/id registry of prefab assets")]
#[command(version)]
pub struct Cli {
    /// Path to prefabs.toml (default: search upwards from the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Registry file (overrides project.registry)
    #[arg(long, global = true)]
    pub registry: Option<PathBuf>,

    /// Append errors to the project's error log (overrides telemetry.collect_errors)
    #[arg(long, global = true)]
    pub collect_errors: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create prefabs.toml, the Assets directory and an empty registry
    Init {
        /// Project directory (default: current directory)
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Project name (default: directory name)
        #[arg(long)]
        name: Option<String>,

        /// Overwrite an existing prefabs.toml and reset the registry
        #[arg(long)]
        force: bool,
    },
    /// Scan the asset directory and register every prefab not yet registered
    Populate {
        /// Asset directory to scan (overrides project.assets)
        #[arg(long)]
        assets: Option<PathBuf>,

        /// How registered prefabs are recognised: path or content
        #[arg(long)]
        dedup: Option<String>,

        /// Fail instead of adding an entry whose tag or id is taken
        #[arg(long)]
        strict: bool,

        /// Report what would be added without saving
        #[arg(long)]
        dry_run: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List registered prefabs in registry order
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Show content hashes and whether each asset file still exists
        #[arg(long)]
        detail: bool,
    },
    /// Look up a prefab by tag or id
    Get {
        /// Tag to look up (exact, case-sensitive)
        #[arg(long, conflicts_with = "id", required_unless_present = "id")]
        tag: Option<String>,

        /// Id to look up
        #[arg(long, allow_negative_numbers = true)]
        id: Option<i64>,

        /// Output the whole entry as JSON
        #[arg(long)]
        json: bool,
    },
    /// Register a prefab by hand
    Add {
        /// Tag for the new entry
        tag: String,

        /// Asset path, relative to the asset directory
        path: String,

        /// Id for the new entry (default: current registry length)
        #[arg(long, allow_negative_numbers = true)]
        id: Option<i64>,

        /// Fail if the tag or id is already registered
        #[arg(long)]
        strict: bool,
    },
    /// Remove the entry at INDEX
    Remove {
        index: usize,
    },
    /// Change the tag of the entry at INDEX
    Rename {
        index: usize,
        tag: String,
    },
    /// Change the id of the entry at INDEX
    SetId {
        index: usize,
        #[arg(allow_negative_numbers = true)]
        id: i64,
    },
    /// Report tags and ids used by more than one entry
    Check {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Parse arguments and run the CLI.
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let overrides = CliOverrides {
        registry: cli.registry.clone().map(absolutize),
        collect_errors: cli.collect_errors.then_some(true),
        ..Default::default()
    };
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Init { dir, name, force } => init::run_init(&dir, name.as_deref(), force),
        Commands::Populate { assets, dedup, strict, dry_run, json } => {
            populate::run_populate(
                config,
                overrides,
                assets.map(absolutize),
                dedup.as_deref(),
                strict,
                dry_run,
                json,
            )
        }
        Commands::List { json, detail } => query::run_list(config, &overrides, json, detail),
        Commands::Get { tag, id, json } => {
            query::run_get(config, &overrides, tag.as_deref(), id, json)
        }
        Commands::Add { tag, path, id, strict } => {
            edit::run_add(config, &overrides, &tag, &path, id, strict)
        }
        Commands::Remove { index } => edit::run_remove(config, &overrides, index),
        Commands::Rename { index, tag } => edit::run_rename(config, &overrides, index, &tag),
        Commands::SetId { index, id } => edit::run_set_id(config, &overrides, index, id),
        Commands::Check { json } => query::run_check(config, &overrides, json),
    }
}

/// Anchor a relative command-line path at the working directory, so it does
/// not get resolved against the project root later.
pub(crate) fn absolutize(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path,
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

/// Config and registry loaded for one command.
pub(crate) struct Session {
    pub project: LoadedConfig,
    pub registry: PrefabRegistry,
}

impl Session {
    /// Load config (applying overrides), start telemetry, and load the registry.
    pub fn open(
        command: &str,
        config: Option<&Path>,
        overrides: &CliOverrides,
    ) -> Result<Self, ExitCode> {
        let mut project = match load_config(config) {
            Ok(p) => p,
            Err(e) => return Err(fail(command, "config_error", &e, config)),
        };
        merge_cli_overrides(&mut project.config, overrides);
        telemetry::init_collector(project.error_file(), project.config.telemetry.collect_errors);

        let path = project.registry_path();
        let registry = match store::load(&path) {
            Ok(r) => r,
            Err(e @ StoreError::NotFound(_)) => {
                return Err(fail_with_suggestion(
                    command,
                    "store_error",
                    &e,
                    Some(&path),
                    "Run 'pfab init' to create a registry",
                ))
            }
            Err(e) => return Err(fail(command, "store_error", &e, Some(&path))),
        };

        Ok(Self { project, registry })
    }

    /// Write the registry back to its file.
    pub fn save(&self, command: &str) -> Result<(), ExitCode> {
        let path = self.project.registry_path();
        store::save(&self.registry, &path).map_err(|e| fail(command, "store_error", &e, Some(&path)))
    }
}

/// Report an error on stderr, record it, and return the error exit code.
pub(crate) fn fail(
    command: &str,
    error_type: &str,
    err: &dyn Display,
    file: Option<&Path>,
) -> ExitCode {
    report(error_entry(command, error_type, err, file))
}

/// Like [`fail`], with a hint printed after the error and kept in the log.
pub(crate) fn fail_with_suggestion(
    command: &str,
    error_type: &str,
    err: &dyn Display,
    file: Option<&Path>,
    suggestion: &str,
) -> ExitCode {
    let entry = error_entry(command, error_type, err, file).with_suggestion(suggestion);
    report(entry)
}

fn error_entry(command: &str, error_type: &str, err: &dyn Display, file: Option<&Path>) -> ErrorEntry {
    let entry = ErrorEntry::new(command, error_type, err.to_string());
    match file {
        Some(f) => entry.with_file(f.display().to_string()),
        None => entry,
    }
}

fn report(entry: ErrorEntry) -> ExitCode {
    eprintln!("Error: {}", entry.context);
    if let Some(hint) = &entry.suggestion {
        eprintln!("Hint: {}", hint);
    }
    telemetry::log_error(&entry);
    ExitCode::from(EXIT_ERROR)
}

/// Unwrap a `Session::open`/`save` result inside a command function.
macro_rules! try_session {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(code) => return code,
        }
    };
}
pub(crate) use try_session;

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_get_by_negative_id() {
        let cli = Cli::try_parse_from(["pfab", "get", "--id", "-1"]).unwrap();
        match cli.command {
            Commands::Get { tag, id, .. } => {
                assert!(tag.is_none());
                assert_eq!(id, Some(-1));
            }
            _ => panic!("expected get"),
        }
    }

    #[test]
    fn test_get_requires_tag_or_id() {
        assert!(Cli::try_parse_from(["pfab", "get"]).is_err());
        assert!(Cli::try_parse_from(["pfab", "get", "--tag", "a", "--id", "1"]).is_err());
    }

    #[test]
    fn test_global_registry_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["pfab", "list", "--registry", "r.json", "-vv"]).unwrap();
        assert_eq!(cli.registry, Some(PathBuf::from("r.json")));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_global_collect_errors_flag() {
        let cli = Cli::try_parse_from(["pfab", "check", "--collect-errors"]).unwrap();
        assert!(cli.collect_errors);
        let cli = Cli::try_parse_from(["pfab", "check"]).unwrap();
        assert!(!cli.collect_errors);
    }

    #[test]
    fn test_absolutize() {
        let abs = std::env::temp_dir().join("prefabs.json");
        assert_eq!(absolutize(abs.clone()), abs);

        let rel = absolutize(PathBuf::from("sub/prefabs.json"));
        assert!(rel.is_absolute());
        assert!(rel.starts_with(std::env::current_dir().unwrap()));
        assert!(rel.ends_with("sub/prefabs.json"));
    }
}
