//! CLI command dispatch and handlers
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod import;
pub mod next;
pub mod plan;
pub mod state;
pub mod validate;
pub mod version;

use std::path::Path;

use crate::cli::args::{Cli, Commands, StateSubcommand};
use crate::config::{ConfigLoader, Manifest};
use crate::error::PhaserError;
use crate::observability::EventEmitter;

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub fn dispatch(cli: Cli) -> Result<(), PhaserError> {
    match cli.command {
        Commands::Plan(args) => plan::plan(&args),
        Commands::Apply(args) => plan::apply(&args),
        Commands::Import(args) => import::run(&args),
        Commands::State(cmd) => match cmd.subcommand {
            StateSubcommand::Show(args) => state::show(&args),
            StateSubcommand::Rm(args) => state::rm(&args),
        },
        Commands::Validate(args) => validate::run(&args),
        Commands::Next(args) => next::run(&args),
        Commands::Version(args) => {
            version::run(&args);
            Ok(())
        }
    }
}

/// Loads the manifest at `path`, logging any load warnings.
fn load_manifest(path: &Path) -> Result<Manifest, PhaserError> {
    let result = ConfigLoader::default().load(path)?;
    for warning in &result.warnings {
        tracing::warn!("{warning}");
    }
    Ok(result.manifest)
}

/// Opens the event sink requested on the command line.
fn open_events(path: Option<&Path>) -> Result<EventEmitter, PhaserError> {
    match path {
        Some(path) => Ok(EventEmitter::from_file(path)?),
        None => Ok(EventEmitter::noop()),
    }
}
