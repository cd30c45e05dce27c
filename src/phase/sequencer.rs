//! Phase sequencing
//!
//! Pure transition function: given an ordered phase list and the current
//! phase, compute the phase that follows it. No state, no I/O.

use crate::error::PhaseError;

use super::list::Phase;

/// How the sequencer behaves at the end of the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequenceMode {
    /// The last phase is a fixed point; advancing from it returns it unchanged.
    #[default]
    Sequential,
    /// Advancing from the last phase wraps to the first.
    ///
    /// No resource uses this mode. It is kept addressable so a looping
    /// resource can be built on the same transition function.
    Cyclic,
}

/// Stateless phase sequencer parameterised by its end-of-list behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sequencer {
    mode: SequenceMode,
}

impl Sequencer {
    /// Creates a sequencer with the given mode.
    #[must_use]
    pub const fn new(mode: SequenceMode) -> Self {
        Self { mode }
    }

    /// Returns the configured mode.
    #[must_use]
    pub const fn mode(&self) -> SequenceMode {
        self.mode
    }

    /// Computes the phase following `current` in `phases`.
    ///
    /// The first occurrence of `current` is used. Neither input is modified
    /// and the result is always a member of `phases`.
    ///
    /// # Errors
    ///
    /// Returns [`PhaseError::NotFound`] if `current` is not in `phases`.
    pub fn next(&self, phases: &[Phase], current: &Phase) -> Result<Phase, PhaseError> {
        let index = phases
            .iter()
            .position(|p| p == current)
            .ok_or_else(|| PhaseError::not_found(current, phases))?;

        let next = index + 1;
        let next = match self.mode {
            SequenceMode::Cyclic => next % phases.len(),
            SequenceMode::Sequential if next >= phases.len() => return Ok(current.clone()),
            SequenceMode::Sequential => next,
        };

        Ok(phases[next].clone())
    }
}

/// Computes the next phase in [`SequenceMode::Sequential`] mode.
///
/// # Errors
///
/// Returns [`PhaseError::NotFound`] if `current` is not in `phases`.
pub fn next_phase(phases: &[Phase], current: &Phase) -> Result<Phase, PhaseError> {
    Sequencer::default().next(phases, current)
}
