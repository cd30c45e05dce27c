//! Host reconciliation engine
//!
//! Drives the `sequential` resource through one plan → apply cycle over
//! every declared and stored instance. Each instance is planned on its own:
//! a blocked plan for one instance never affects another.
//!
//! The engine is the only component that mutates [`StateFile`].

use std::collections::BTreeSet;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use crate::config::{Manifest, ProviderConfig};
use crate::error::StateError;
use crate::lifecycle::{Diagnostic, PlannedChange, ResourceState, SequentialResource};
use crate::observability::{Event, EventEmitter};
use crate::state::StateFile;

// ============================================================================
// Plan Types
// ============================================================================

/// Plan outcome for one resource instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePlan {
    /// Resource name as declared
    pub name: String,
    /// Fully qualified address, e.g. `phaser_sequential.rollout`
    pub address: String,
    /// Planned change, or the diagnostic that blocked planning
    pub outcome: Result<PlannedChange, Diagnostic>,
}

/// Plan for every instance in one run, ordered by resource name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanSet {
    /// Per-instance outcomes
    pub resources: Vec<ResourcePlan>,
}

/// Counts of planned actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    /// Instances to create
    pub create: usize,
    /// Instances to update
    pub update: usize,
    /// Instances to delete
    pub delete: usize,
    /// Instances with nothing to do
    pub no_op: usize,
    /// Instances whose plan was blocked
    pub failed: usize,
}

impl PlanSet {
    /// Returns `true` if applying would change stored state.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.resources
            .iter()
            .any(|r| matches!(&r.outcome, Ok(change) if change.is_change()))
    }

    /// Returns `true` if any instance failed to plan.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.resources.iter().any(|r| r.outcome.is_err())
    }

    /// Blocking diagnostics, in resource order.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.resources.iter().filter_map(|r| r.outcome.as_ref().err())
    }

    /// Looks up the plan for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ResourcePlan> {
        self.resources.iter().find(|r| r.name == name)
    }

    /// Tallies planned actions.
    #[must_use]
    pub fn summary(&self) -> PlanSummary {
        let mut summary = PlanSummary::default();
        for resource in &self.resources {
            match &resource.outcome {
                Ok(PlannedChange::Create { .. }) => summary.create += 1,
                Ok(PlannedChange::Update { .. }) => summary.update += 1,
                Ok(PlannedChange::Delete { .. }) => summary.delete += 1,
                Ok(PlannedChange::NoOp { .. }) => summary.no_op += 1,
                Err(_) => summary.failed += 1,
            }
        }
        summary
    }
}

/// Counts of what an apply actually did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplySummary {
    /// Instances created
    pub created: usize,
    /// Instances updated
    pub updated: usize,
    /// Instances deleted
    pub deleted: usize,
    /// Instances left as they were
    pub unchanged: usize,
    /// Instances skipped (blocked plan or stale prior state)
    pub skipped: usize,
}

// ============================================================================
// Engine
// ============================================================================

/// Plan/apply driver for `sequential` resources.
#[derive(Debug, Default)]
pub struct Engine {
    provider: ProviderConfig,
    resource: SequentialResource,
    events: EventEmitter,
}

impl Engine {
    /// Creates an engine for the given provider configuration.
    #[must_use]
    pub fn new(provider: ProviderConfig) -> Self {
        Self {
            provider,
            resource: SequentialResource::new(),
            events: EventEmitter::noop(),
        }
    }

    /// Routes structured events to `events`.
    #[must_use]
    pub fn with_events(mut self, events: EventEmitter) -> Self {
        self.events = events;
        self
    }

    /// Provider configuration this engine was built with.
    #[must_use]
    pub const fn provider(&self) -> &ProviderConfig {
        &self.provider
    }

    /// Plans every instance that is declared, stored, or both.
    #[must_use]
    pub fn plan(&self, manifest: &Manifest, state: &StateFile) -> PlanSet {
        let names: BTreeSet<&String> = manifest
            .resources
            .keys()
            .chain(state.resources.keys())
            .collect();

        let mut plan = PlanSet::default();
        for name in names {
            let address = ProviderConfig::resource_address(name);
            let _span = info_span!("plan", address = %address).entered();

            let outcome = match self.resource.plan(manifest.resource(name), state.get(name)) {
                Ok(Some(change)) => {
                    self.events.emit(Event::PlanComputed {
                        timestamp: Utc::now(),
                        address: address.clone(),
                        action: change.action().to_string(),
                        from: change.prior_phase().map(ToString::to_string),
                        to: change.planned_phase().map(ToString::to_string),
                    });
                    Ok(change)
                }
                Ok(None) => continue,
                Err(err) => {
                    let diagnostic = Diagnostic::from(&err).with_address(address.clone());
                    self.events.emit(Event::PlanBlocked {
                        timestamp: Utc::now(),
                        address: address.clone(),
                        detail: diagnostic.detail.clone(),
                    });
                    Err(diagnostic)
                }
            };

            plan.resources.push(ResourcePlan {
                name: name.clone(),
                address,
                outcome,
            });
        }

        let summary = plan.summary();
        info!(
            create = summary.create,
            update = summary.update,
            delete = summary.delete,
            no_op = summary.no_op,
            failed = summary.failed,
            "plan complete"
        );
        plan
    }

    /// Applies every successfully planned change to `state`.
    ///
    /// Instances with a blocked plan are skipped and left untouched. So is
    /// an instance whose stored state no longer matches the plan's prior.
    pub fn apply(&self, plan: &PlanSet, state: &mut StateFile) -> ApplySummary {
        let mut summary = ApplySummary::default();

        for resource in &plan.resources {
            let _span = info_span!("apply", address = %resource.address).entered();

            let Ok(change) = &resource.outcome else {
                debug!("skipping instance with blocked plan");
                summary.skipped += 1;
                continue;
            };

            if !prior_matches(change, state.get(&resource.name)) {
                warn!("stored state changed since plan; skipping");
                summary.skipped += 1;
                continue;
            }

            match change {
                PlannedChange::Create { planned } => {
                    let stored = self.resource.create(planned.clone());
                    self.events.emit(Event::ResourceCreated {
                        timestamp: Utc::now(),
                        address: resource.address.clone(),
                        phase: stored.phase.to_string(),
                    });
                    state.insert(resource.name.clone(), stored);
                    summary.created += 1;
                }
                PlannedChange::Update { prior, planned } => {
                    let stored = self.resource.update(planned.clone());
                    self.events.emit(Event::PhaseAdvanced {
                        timestamp: Utc::now(),
                        address: resource.address.clone(),
                        from: prior.phase.to_string(),
                        to: stored.phase.to_string(),
                    });
                    state.insert(resource.name.clone(), stored);
                    summary.updated += 1;
                }
                PlannedChange::NoOp { .. } => summary.unchanged += 1,
                PlannedChange::Delete { .. } => {
                    if let Some(removed) = state.remove(&resource.name) {
                        self.resource.delete(removed);
                        self.events.emit(Event::ResourceDeleted {
                            timestamp: Utc::now(),
                            address: resource.address.clone(),
                        });
                    }
                    summary.deleted += 1;
                }
            }
        }

        info!(
            created = summary.created,
            updated = summary.updated,
            deleted = summary.deleted,
            unchanged = summary.unchanged,
            skipped = summary.skipped,
            "apply complete"
        );
        summary
    }

    /// Imports an existing phase for a declared, unmanaged instance.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::NotDeclared`] if `name` is not in the manifest
    /// and [`StateError::AlreadyManaged`] if it is already in state.
    pub fn import(
        &self,
        manifest: &Manifest,
        state: &mut StateFile,
        name: &str,
        id: &str,
    ) -> Result<ResourceState, StateError> {
        if manifest.resource(name).is_none() {
            return Err(StateError::NotDeclared {
                name: name.to_string(),
                suggestion: manifest.suggest_resource(name),
            });
        }
        if state.contains(name) {
            return Err(StateError::AlreadyManaged {
                name: name.to_string(),
            });
        }

        let imported = self.resource.import(id);
        let stored = self.resource.read(&imported);
        state.insert(name, stored.clone());
        self.events.emit(Event::ResourceImported {
            timestamp: Utc::now(),
            address: ProviderConfig::resource_address(name),
            phase: stored.phase.to_string(),
        });
        Ok(stored)
    }

    /// Stops tracking an instance without consulting the manifest.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::NotManaged`] if `name` is not in state.
    pub fn forget(&self, state: &mut StateFile, name: &str) -> Result<(), StateError> {
        let removed = state.remove(name).ok_or_else(|| StateError::NotManaged {
            name: name.to_string(),
        })?;
        self.resource.delete(removed);
        self.events.emit(Event::ResourceDeleted {
            timestamp: Utc::now(),
            address: ProviderConfig::resource_address(name),
        });
        Ok(())
    }
}

/// Checks that the stored state is still what the plan was computed from.
fn prior_matches(change: &PlannedChange, stored: Option<&ResourceState>) -> bool {
    match change {
        PlannedChange::Create { .. } => stored.is_none(),
        PlannedChange::Update { prior, .. } | PlannedChange::Delete { prior } => {
            stored == Some(prior)
        }
        PlannedChange::NoOp { current } => stored == Some(current),
    }
}
