//! Sequential resource lifecycle
//!
//! [`SequentialResource`] takes part in the host engine's
//! plan → apply → persist cycle. Planning proposes the next phase through the
//! sequencer. Create and update persist exactly what was planned. Import
//! seeds a phase from outside without validation.
//!
//! The controller never writes state itself; every operation returns the
//! value the engine should persist.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::PhaseError;
use crate::phase::{Phase, PhaseList, SequenceMode, Sequencer};

// ============================================================================
// Values
// ============================================================================

/// Plan-time view of the computed `phase` attribute.
///
/// `NotYetKnown` marks an instance that has never been applied: planning
/// seeds it rather than advancing it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PhaseValue {
    /// No stored phase exists yet
    #[default]
    NotYetKnown,
    /// A stored phase exists
    Known(Phase),
}

impl PhaseValue {
    /// Returns the known phase, if any.
    #[must_use]
    pub const fn as_known(&self) -> Option<&Phase> {
        match self {
            Self::NotYetKnown => None,
            Self::Known(phase) => Some(phase),
        }
    }
}

impl From<Option<Phase>> for PhaseValue {
    fn from(phase: Option<Phase>) -> Self {
        phase.map_or(Self::NotYetKnown, Self::Known)
    }
}

/// Declared configuration of a single resource instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Ordered phases the instance progresses through
    pub phases: PhaseList,
}

impl ResourceConfig {
    /// Creates a config from an already-validated phase list.
    #[must_use]
    pub const fn new(phases: PhaseList) -> Self {
        Self { phases }
    }
}

/// Persisted state of a single resource instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceState {
    /// Current phase
    pub phase: Phase,
    /// Phase list last used to reach `phase`; `None` after import
    #[serde(default)]
    pub phases: Option<Vec<Phase>>,
}

impl ResourceState {
    /// Creates a state that records the list that produced it.
    #[must_use]
    pub fn new(phase: Phase, phases: &PhaseList) -> Self {
        Self {
            phase,
            phases: Some(phases.as_slice().to_vec()),
        }
    }
}

/// Planned action for one resource instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedChange {
    /// No stored state: create it seeded to the first phase
    Create {
        /// State that apply will persist
        planned: ResourceState,
    },
    /// Stored state will change
    Update {
        /// State before apply
        prior: ResourceState,
        /// State that apply will persist
        planned: ResourceState,
    },
    /// Proposed state equals stored state
    NoOp {
        /// The unchanged state
        current: ResourceState,
    },
    /// Instance is no longer declared
    Delete {
        /// State that apply will discard
        prior: ResourceState,
    },
}

impl PlannedChange {
    /// Returns `true` unless this is a [`PlannedChange::NoOp`].
    #[must_use]
    pub const fn is_change(&self) -> bool {
        !matches!(self, Self::NoOp { .. })
    }

    /// Short action name used in plan output.
    #[must_use]
    pub const fn action(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::NoOp { .. } => "no-op",
            Self::Delete { .. } => "delete",
        }
    }

    /// Phase before apply, if the instance exists.
    #[must_use]
    pub const fn prior_phase(&self) -> Option<&Phase> {
        match self {
            Self::Create { .. } => None,
            Self::Update { prior, .. } | Self::Delete { prior } => Some(&prior.phase),
            Self::NoOp { current } => Some(&current.phase),
        }
    }

    /// Phase after apply, if the instance survives.
    #[must_use]
    pub const fn planned_phase(&self) -> Option<&Phase> {
        match self {
            Self::Create { planned } | Self::Update { planned, .. } => Some(&planned.phase),
            Self::NoOp { current } => Some(&current.phase),
            Self::Delete { .. } => None,
        }
    }
}

// ============================================================================
// Controller
// ============================================================================

/// Lifecycle controller for the `sequential` resource type.
///
/// Holds no per-instance data; every call works only on the values passed
/// in, so one controller can serve any number of instances concurrently.
#[derive(Debug, Clone, Copy)]
pub struct SequentialResource {
    sequencer: Sequencer,
}

impl Default for SequentialResource {
    fn default() -> Self {
        Self::new()
    }
}

impl SequentialResource {
    /// Resource type name, without the provider prefix.
    pub const TYPE_NAME: &'static str = "sequential";

    /// Creates the controller. The terminal phase is always a fixed point.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sequencer: Sequencer::new(SequenceMode::Sequential),
        }
    }

    /// Seed-on-create: the state an instance starts in.
    #[must_use]
    pub fn seed(&self, config: &ResourceConfig) -> ResourceState {
        ResourceState::new(config.phases.first().clone(), &config.phases)
    }

    /// Plan-mutation hook: proposes the phase apply would persist.
    ///
    /// A `NotYetKnown` value is seeded to the first declared phase. A known
    /// value is advanced by one step through the *declared* list, so list
    /// edits never reset progress.
    ///
    /// # Errors
    ///
    /// Returns [`PhaseError::NotFound`] if the known phase is not in the
    /// declared list. Nothing is proposed in that case.
    pub fn modify_plan(
        &self,
        config: &ResourceConfig,
        current: &PhaseValue,
    ) -> Result<Phase, PhaseError> {
        match current {
            PhaseValue::NotYetKnown => Ok(config.phases.first().clone()),
            PhaseValue::Known(phase) => self.sequencer.next(&config.phases, phase),
        }
    }

    /// Orchestration entry point for host loops that only need the next
    /// state: `(stored, desired) -> new state`.
    ///
    /// # Errors
    ///
    /// Returns [`PhaseError::NotFound`] if the stored phase is not in the
    /// desired list.
    pub fn compute_next(
        &self,
        stored: Option<&ResourceState>,
        desired: &ResourceConfig,
    ) -> Result<ResourceState, PhaseError> {
        let current = PhaseValue::from(stored.map(|s| s.phase.clone()));
        let phase = self.modify_plan(desired, &current)?;
        Ok(ResourceState::new(phase, &desired.phases))
    }

    /// Plans one instance from its declared config and stored state.
    ///
    /// Returns `Ok(None)` when the instance is neither declared nor stored.
    ///
    /// # Errors
    ///
    /// Returns [`PhaseError::NotFound`] when the stored phase is not a
    /// member of the declared list. No fallback value is proposed.
    pub fn plan(
        &self,
        config: Option<&ResourceConfig>,
        prior: Option<&ResourceState>,
    ) -> Result<Option<PlannedChange>, PhaseError> {
        let change = match (config, prior) {
            (None, None) => return Ok(None),
            (None, Some(prior)) => PlannedChange::Delete {
                prior: prior.clone(),
            },
            (Some(config), None) => PlannedChange::Create {
                planned: self.compute_next(None, config)?,
            },
            (Some(config), Some(prior)) => {
                let planned = self.compute_next(Some(prior), config).inspect_err(|err| {
                    warn!(phase = %prior.phase, phases = %config.phases, error = %err, "plan blocked");
                })?;
                if planned == *prior {
                    PlannedChange::NoOp {
                        current: planned,
                    }
                } else {
                    PlannedChange::Update {
                        prior: prior.clone(),
                        planned,
                    }
                }
            }
        };

        debug!(
            action = change.action(),
            from = change.prior_phase().map(Phase::as_str),
            to = change.planned_phase().map(Phase::as_str),
            "planned"
        );
        Ok(Some(change))
    }

    /// Create: persists the planned state unchanged.
    #[must_use]
    pub fn create(&self, planned: ResourceState) -> ResourceState {
        info!(phase = %planned.phase, "created");
        planned
    }

    /// Update: persists the planned state unchanged.
    #[must_use]
    pub fn update(&self, planned: ResourceState) -> ResourceState {
        info!(phase = %planned.phase, "phase advanced");
        planned
    }

    /// Read: stored state is authoritative and is not re-validated.
    #[must_use]
    pub fn read(&self, state: &ResourceState) -> ResourceState {
        state.clone()
    }

    /// Import: binds an externally supplied phase, clearing the list.
    ///
    /// Any string is accepted; it is checked against a list only at the
    /// next plan.
    #[must_use]
    pub fn import(&self, id: &str) -> ResourceState {
        info!(phase = id, "imported");
        ResourceState {
            phase: Phase::from(id),
            phases: None,
        }
    }

    /// Delete: nothing backs the state, so dropping it is the whole job.
    pub fn delete(&self, state: ResourceState) {
        info!(phase = %state.phase, "deleted");
        drop(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(names: &[&str]) -> ResourceConfig {
        ResourceConfig::new(
            PhaseList::new(names.iter().map(|n| Phase::from(*n)).collect()).unwrap(),
        )
    }

    #[test]
    fn test_seed_uses_first_phase() {
        let resource = SequentialResource::new();
        let state = resource.seed(&config(&["prepare", "ready"]));
        assert_eq!(state.phase, "prepare");
        assert_eq!(state.phases.as_deref().map(<[Phase]>::len), Some(2));
    }

    #[test]
    fn test_modify_plan_not_yet_known_seeds() {
        let resource = SequentialResource::new();
        let phase = resource
            .modify_plan(&config(&["a", "b"]), &PhaseValue::NotYetKnown)
            .unwrap();
        assert_eq!(phase, "a");
    }

    #[test]
    fn test_modify_plan_known_advances() {
        let resource = SequentialResource::new();
        let phase = resource
            .modify_plan(&config(&["a", "b"]), &PhaseValue::Known(Phase::from("a")))
            .unwrap();
        assert_eq!(phase, "b");
    }

    #[test]
    fn test_plan_create() {
        let resource = SequentialResource::new();
        let change = resource
            .plan(Some(&config(&["prepare", "ready"])), None)
            .unwrap()
            .unwrap();
        assert_eq!(change.action(), "create");
        assert_eq!(change.planned_phase().unwrap(), &"prepare");
        assert!(change.is_change());
    }

    #[test]
    fn test_plan_terminal_is_noop() {
        let resource = SequentialResource::new();
        let cfg = config(&["prepare", "ready"]);
        let prior = ResourceState::new(Phase::from("ready"), &cfg.phases);
        let change = resource.plan(Some(&cfg), Some(&prior)).unwrap().unwrap();
        assert_eq!(change, PlannedChange::NoOp { current: prior });
        assert!(!change.is_change());
    }

    #[test]
    fn test_plan_after_import_is_update() {
        let resource = SequentialResource::new();
        let prior = resource.import("prepare");
        let cfg = config(&["prepare", "ready", "running"]);
        let change = resource.plan(Some(&cfg), Some(&prior)).unwrap().unwrap();
        assert_eq!(change.action(), "update");
        assert_eq!(change.planned_phase().unwrap(), &"ready");
    }

    #[test]
    fn test_terminal_after_import_still_records_list() {
        let resource = SequentialResource::new();
        let prior = resource.import("done");
        let cfg = config(&["start", "done"]);
        let change = resource.plan(Some(&cfg), Some(&prior)).unwrap().unwrap();
        // phase stays put but the list association changes
        assert_eq!(change.action(), "update");
        assert_eq!(change.planned_phase().unwrap(), &"done");
    }

    #[test]
    fn test_plan_delete_when_undeclared() {
        let resource = SequentialResource::new();
        let prior = resource.import("x");
        let change = resource.plan(None, Some(&prior)).unwrap().unwrap();
        assert_eq!(change, PlannedChange::Delete { prior });
        assert_eq!(change.planned_phase(), None);
    }

    #[test]
    fn test_plan_nothing() {
        let resource = SequentialResource::new();
        assert_eq!(resource.plan(None, None).unwrap(), None);
    }

    #[test]
    fn test_plan_missing_phase_blocks() {
        let resource = SequentialResource::new();
        let prior = ResourceState::new(Phase::from("ready"), &config(&["ready"]).phases);
        let err = resource
            .plan(Some(&config(&["prepare", "running"])), Some(&prior))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"phase "ready" not found in phases=[prepare running]"#
        );
    }

    #[test]
    fn test_create_and_update_echo_plan() {
        let resource = SequentialResource::new();
        let planned = resource.seed(&config(&["a", "b"]));
        assert_eq!(resource.create(planned.clone()), planned);
        assert_eq!(resource.update(planned.clone()), planned);
    }

    #[test]
    fn test_read_does_not_revalidate() {
        let resource = SequentialResource::new();
        let state = resource.import("anything at all");
        assert_eq!(resource.read(&state), state);
    }

    #[test]
    fn test_import_accepts_any_string() {
        let resource = SequentialResource::new();
        let state = resource.import("");
        assert_eq!(state.phase, "");
        assert_eq!(state.phases, None);
    }

    #[test]
    fn test_phase_value_from_option() {
        assert_eq!(PhaseValue::from(None), PhaseValue::NotYetKnown);
        let known = PhaseValue::from(Some(Phase::from("a")));
        assert_eq!(known.as_known(), Some(&Phase::from("a")));
    }

    #[test]
    fn test_state_serde_shape() {
        let state = ResourceState {
            phase: Phase::from("ready"),
            phases: None,
        };
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, r#"{"phase":"ready","phases":null}"#);
        let back: ResourceState = serde_json::from_str(r#"{"phase":"ready"}"#).unwrap();
        assert_eq!(back, state);
    }
}
