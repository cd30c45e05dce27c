//! Phase sequencing
//!
//! The pure core of `phaser`: value types for phases and ordered phase
//! lists, and the transition function that advances one step through them.
//!
//! # Architecture
//!
//! - [`Phase`] - Opaque, case-sensitive phase name
//! - [`PhaseList`] - Non-empty, duplicate-free ordering of phases
//! - [`Sequencer`] - Transition function, sequential or cyclic

pub mod list;
pub mod sequencer;

pub use list::{Phase, PhaseList};
pub use sequencer::{SequenceMode, Sequencer, next_phase};
