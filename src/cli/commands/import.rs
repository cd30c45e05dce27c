//! `import` command handler
//!
//! Binds an externally supplied phase to a declared resource that is not yet
//! in state. The phase is not checked against the declared list until the
//! next plan.

use crate::cli::args::ImportArgs;
use crate::config::ProviderConfig;
use crate::engine::Engine;
use crate::error::PhaserError;
use crate::state::StateStore;

use super::{load_manifest, open_events};

/// Import `args.id` as the current phase of `args.name`.
///
/// # Errors
///
/// Returns an error if the resource is undeclared, already managed, or if
/// loading or saving fails.
pub fn run(args: &ImportArgs) -> Result<(), PhaserError> {
    let manifest = load_manifest(&args.paths.config)?;
    let store = StateStore::new(&args.paths.state);
    let mut state = store.load()?;

    let engine =
        Engine::new(manifest.provider.clone()).with_events(open_events(args.events.as_deref())?);
    let imported = engine.import(&manifest, &mut state, &args.name, &args.id)?;
    store.save(&mut state, engine.provider())?;

    println!(
        "Imported {} with phase {:?}",
        ProviderConfig::resource_address(&args.name),
        imported.phase.as_str()
    );
    Ok(())
}
