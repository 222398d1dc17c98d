#![deny(clippy::all, clippy::cargo, clippy::expect_used, clippy::unwrap_used)]
#![deny(clippy::pedantic, clippy::nursery, unsafe_code)]
#![warn(clippy::unimplemented, clippy::redundant_type_annotations)]

use anyhow::{ensure, Result};
use crate::core::{create_schedule, simulate_routes, Instance, Schedule, Sequencer};

pub mod algo;
pub mod core;
pub mod data;

#[cfg(test)]
mod testing;

/// Runs the given sequencer on the instance and builds the detailed schedule of its sequence.
/// Routed instances are simulated with their own machine visiting order.
///
/// # Errors
/// - If the sequencer fails.
/// - If the sequencer does not return a permutation of all jobs.
///
/// # Panics
///  - If the schedule is invalid in debug mode.
pub fn solve(sequencer: &mut dyn Sequencer, instance: &Instance) -> Result<(Vec<usize>, Schedule)> {
    let sequence = sequencer.sequence(instance)?;
    ensure!(
        sequence.len() == instance.count_jobs(),
        "{} returned {} of {} jobs",
        sequencer.name(),
        sequence.len(),
        instance.count_jobs()
    );

    let schedule = if instance.is_routed() {
        simulate_routes(instance, &sequence)?
    } else {
        create_schedule(instance, &sequence)?
    };

    debug_assert!(schedule.verify(instance), "Schedule is invalid: {schedule:?}");

    Ok((sequence, schedule))
}
