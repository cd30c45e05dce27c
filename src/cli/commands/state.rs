//! `state` command handlers

use serde_json::json;

use crate::cli::args::{OutputFormat, StateRmArgs, StateShowArgs};
use crate::config::ProviderConfig;
use crate::engine::Engine;
use crate::error::{PhaserError, StateError};
use crate::lifecycle::ResourceState;
use crate::phase::Phase;
use crate::state::StateStore;

/// Print stored state, optionally for a single resource.
///
/// # Errors
///
/// Returns an error if the state file cannot be loaded or `args.name` is
/// not managed.
pub fn show(args: &StateShowArgs) -> Result<(), PhaserError> {
    let state = StateStore::new(&args.state).load()?;

    let selected: Vec<(&String, &ResourceState)> = match &args.name {
        Some(name) => {
            let (key, value) =
                state
                    .resources
                    .get_key_value(name)
                    .ok_or_else(|| StateError::NotManaged {
                        name: name.clone(),
                    })?;
            vec![(key, value)]
        }
        None => state.resources.iter().collect(),
    };

    match args.format {
        OutputFormat::Human => {
            if selected.is_empty() {
                println!("No resources are managed.");
            }
            for (name, resource) in selected {
                let phases = resource.phases.as_ref().map_or_else(
                    || "(unset)".to_string(),
                    |p| {
                        let names: Vec<&str> = p.iter().map(Phase::as_str).collect();
                        format!("[{}]", names.join(" "))
                    },
                );
                println!(
                    "{}\n  phase  = {:?}\n  phases = {phases}",
                    ProviderConfig::resource_address(name),
                    resource.phase.as_str()
                );
            }
        }
        OutputFormat::Json => {
            let resources: serde_json::Map<String, serde_json::Value> = selected
                .into_iter()
                .map(|(name, resource)| (name.clone(), json!(resource)))
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "serial": state.serial,
                    "provider_version": state.provider_version,
                    "resources": resources,
                }))?
            );
        }
    }
    Ok(())
}

/// Stop tracking a resource. No external teardown happens.
///
/// # Errors
///
/// Returns an error if `args.name` is not managed or state cannot be saved.
pub fn rm(args: &StateRmArgs) -> Result<(), PhaserError> {
    let store = StateStore::new(&args.state);
    let mut state = store.load()?;

    let engine = Engine::new(ProviderConfig::default());
    engine.forget(&mut state, &args.name)?;
    store.save(&mut state, engine.provider())?;

    println!(
        "Removed {} from state",
        ProviderConfig::resource_address(&args.name)
    );
    Ok(())
}
