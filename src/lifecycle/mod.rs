//! Resource lifecycle
//!
//! Binds the phase sequencer to a host engine's create / plan / apply /
//! import / delete hooks.
//!
//! # Architecture
//!
//! - [`SequentialResource`] - Controller for the `sequential` resource type
//! - [`PhaseValue`] - `NotYetKnown` or `Known(phase)` at plan time
//! - [`PlannedChange`] - What apply will do to one instance
//! - [`Diagnostic`] - Operator-facing plan failure

pub mod controller;
pub mod diagnostics;

pub use controller::{PhaseValue, PlannedChange, ResourceConfig, ResourceState, SequentialResource};
pub use diagnostics::Diagnostic;
