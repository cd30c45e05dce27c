//! `next` command handler
//!
//! Runs the bare transition function. This is the only entry point that
//! can select the cyclic sequencing mode.

use crate::cli::args::NextArgs;
use crate::error::PhaserError;
use crate::phase::{Phase, PhaseList, SequenceMode, Sequencer};

/// Print the phase following `args.current` in `args.phases`.
///
/// # Errors
///
/// Returns a usage error for an invalid list and a phase error when the
/// current phase is not in it.
pub fn run(args: &NextArgs) -> Result<(), PhaserError> {
    let phases = PhaseList::try_from(args.phases.clone())
        .map_err(|e| PhaserError::Usage(format!("--phases: {e}")))?;

    let mode = if args.cyclic {
        SequenceMode::Cyclic
    } else {
        SequenceMode::Sequential
    };

    let next = Sequencer::new(mode).next(&phases, &Phase::from(args.current.as_str()))?;
    println!("{next}");
    Ok(())
}
