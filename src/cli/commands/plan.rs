//! `plan` and `apply` command handlers
//!
//! Both compute the same plan. `apply` then commits every successfully
//! planned instance and saves state. Blocked instances turn the exit status
//! into a phase error only after the other instances are saved.

use serde_json::json;

use crate::cli::args::{OutputFormat, PlanArgs};
use crate::engine::{ApplySummary, Engine, PlanSet};
use crate::error::PhaserError;
use crate::lifecycle::PlannedChange;
use crate::state::StateStore;

use super::{load_manifest, open_events};

/// Print the plan without persisting anything.
///
/// # Errors
///
/// Returns an error if loading fails or any instance's plan is blocked.
pub fn plan(args: &PlanArgs) -> Result<(), PhaserError> {
    let manifest = load_manifest(&args.paths.config)?;
    let store = StateStore::new(&args.paths.state);
    let state = store.load()?;

    let engine =
        Engine::new(manifest.provider.clone()).with_events(open_events(args.events.as_deref())?);
    let plan = engine.plan(&manifest, &state);

    match args.format {
        OutputFormat::Human => print_plan_human(&plan),
        OutputFormat::Json => println!("{}", plan_json(&plan, None)),
    }

    fail_on_blocked(&plan)
}

/// Plan, apply, and save state.
///
/// # Errors
///
/// Returns an error if loading or saving fails, or if any instance's plan
/// is blocked.
pub fn apply(args: &PlanArgs) -> Result<(), PhaserError> {
    let manifest = load_manifest(&args.paths.config)?;
    let store = StateStore::new(&args.paths.state);
    let mut state = store.load()?;

    let engine =
        Engine::new(manifest.provider.clone()).with_events(open_events(args.events.as_deref())?);
    let plan = engine.plan(&manifest, &state);
    let summary = engine.apply(&plan, &mut state);

    if plan.has_changes() {
        store.save(&mut state, engine.provider())?;
    }

    match args.format {
        OutputFormat::Human => {
            print_plan_human(&plan);
            println!(
                "Apply complete! Resources: {} added, {} changed, {} destroyed.",
                summary.created, summary.updated, summary.deleted
            );
        }
        OutputFormat::Json => println!("{}", plan_json(&plan, Some(&summary))),
    }

    fail_on_blocked(&plan)
}

fn fail_on_blocked(plan: &PlanSet) -> Result<(), PhaserError> {
    let failed = plan.summary().failed;
    if failed > 0 {
        return Err(PhaserError::PlanFailed { failed });
    }
    Ok(())
}

fn print_plan_human(plan: &PlanSet) {
    for resource in &plan.resources {
        match &resource.outcome {
            Ok(PlannedChange::Create { planned }) => {
                println!("  + {}: phase {:?}", resource.address, planned.phase.as_str());
            }
            Ok(PlannedChange::Update { prior, planned }) => {
                println!(
                    "  ~ {}: phase {:?} -> {:?}",
                    resource.address,
                    prior.phase.as_str(),
                    planned.phase.as_str()
                );
            }
            Ok(PlannedChange::Delete { .. }) => println!("  - {}", resource.address),
            Ok(PlannedChange::NoOp { .. }) => {}
            Err(diagnostic) => eprintln!("{diagnostic}"),
        }
    }

    let summary = plan.summary();
    if plan.has_changes() {
        println!(
            "\nPlan: {} to add, {} to change, {} to destroy.",
            summary.create, summary.update, summary.delete
        );
    } else if summary.failed == 0 {
        println!("No changes. Phases are up to date.");
    }
}

fn plan_json(plan: &PlanSet, applied: Option<&ApplySummary>) -> serde_json::Value {
    let changes: Vec<serde_json::Value> = plan
        .resources
        .iter()
        .filter_map(|r| {
            r.outcome.as_ref().ok().map(|change| {
                json!({
                    "address": r.address,
                    "action": change.action(),
                    "from": change.prior_phase(),
                    "to": change.planned_phase(),
                })
            })
        })
        .collect();
    let diagnostics: Vec<_> = plan.diagnostics().collect();

    let mut out = json!({
        "changes": changes,
        "diagnostics": diagnostics,
        "summary": plan.summary(),
    });
    if let Some(applied) = applied {
        out["applied"] = json!(applied);
    }
    out
}
