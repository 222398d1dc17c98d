use crate::core::{Instance, Result, Sequencer};
use std::cmp::Reverse;
use tracing::debug;

/// Returns Palmer's slope index of a job.
/// Jobs with processing time concentrated on the last machines get a higher index.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn slope_index(instance: &Instance, job: usize) -> i64 {
    let machines = instance.count_machines() as i64;
    let weighted: i64 = instance
        .job_times(job)
        .iter()
        .zip(1..)
        .map(|(&time, machine)| (machines - (2 * machine - 1)) * time as i64)
        .sum();
    -weighted
}

/// Sorts jobs by decreasing slope index, keeping index order on ties.
#[must_use]
pub fn palmer(instance: &Instance) -> Vec<usize> {
    let slopes: Vec<_> = (0..instance.count_jobs())
        .map(|job| slope_index(instance, job))
        .collect();
    debug!(?slopes, "Palmer slope indexes");

    let mut sequence: Vec<_> = (0..instance.count_jobs()).collect();
    sequence.sort_by_key(|&job| Reverse(slopes[job]));
    sequence
}

/// Palmer's slope index heuristic.
#[derive(Clone, Copy, Debug, Default)]
pub struct Palmer;

impl Sequencer for Palmer {
    fn sequence(&mut self, instance: &Instance) -> Result<Vec<usize>> {
        Ok(palmer(instance))
    }

    fn name(&self) -> &'static str {
        "Palmer"
    }
}

#[allow(unsafe_code)]
#[linkme::distributed_slice(super::SEQUENCERS)]
static INSTANCE: fn() -> Box<dyn Sequencer> = || Box::new(Palmer);
