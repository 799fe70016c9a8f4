//! Prefabsrc - Command-line tool for maintaining a prefab registry

use std::process::ExitCode;

use prefabsrc::cli;

fn main() -> ExitCode {
    cli::run()
}
