use super::insert_jobs;
use crate::core::{compute_end_time, Evaluator, Instance, Result, Sequencer};
use tracing::{debug, trace};

/// Adjacent pairwise interchange search.
///
/// Scans adjacent pairs left to right and keeps a swap only if it strictly lowers the makespan.
/// Full passes are repeated until one makes no change. Returns the improved copy of the sequence
/// and whether anything changed.
///
/// # Errors
/// - If the sequence is empty, repeats a job or contains an unknown job.
pub fn pairwise_swap(instance: &Instance, sequence: &[usize]) -> Result<(Vec<usize>, bool)> {
    let mut current = compute_end_time(instance, sequence)?;
    let mut evaluator = Evaluator::new(instance);
    let mut sequence = sequence.to_vec();
    let mut changed = false;
    let mut improved = true;

    while improved {
        improved = false;
        for position in 1..sequence.len() {
            sequence.swap(position - 1, position);
            let end_time = evaluator.end_time(&sequence);

            if end_time < current {
                trace!(position, end_time, "Swap improved");
                current = end_time;
                improved = true;
                changed = true;
            } else {
                sequence.swap(position - 1, position);
            }
        }
    }

    Ok((sequence, changed))
}

/// Rebuilds the sequence by inserting its jobs, in their current order, at their best positions.
/// The rebuilt sequence is kept only if its makespan is strictly lower; otherwise the original
/// is returned unchanged.
///
/// # Errors
/// - If the sequence is empty, repeats a job or contains an unknown job.
pub fn reinsertion(instance: &Instance, sequence: &[usize]) -> Result<(Vec<usize>, bool)> {
    let current = compute_end_time(instance, sequence)?;
    let rebuilt = insert_jobs(instance, sequence);
    let end_time = Evaluator::new(instance).end_time(&rebuilt);

    if end_time < current {
        trace!(end_time, "Reinsertion improved");
        Ok((rebuilt, true))
    } else {
        Ok((sequence.to_vec(), false))
    }
}

/// Alternates reinsertion and pairwise swap until neither changes the sequence.
///
/// # Errors
/// - If the sequence is empty, repeats a job or contains an unknown job.
pub fn combined(instance: &Instance, sequence: &[usize]) -> Result<Vec<usize>> {
    let mut sequence = sequence.to_vec();
    let mut rounds = 0;

    loop {
        rounds += 1;
        let (next, reinserted) = reinsertion(instance, &sequence)?;
        let (next, swapped) = pairwise_swap(instance, &next)?;
        sequence = next;

        if !reinserted && !swapped {
            debug!(rounds, "Local search converged");
            return Ok(sequence);
        }
    }
}

/// Sequencer refining the output of another sequencer with the combined local search.
#[derive(Clone, Debug)]
pub struct Refined<S> {
    inner: S,
    name: String,
}

impl<S: Sequencer> Refined<S> {
    /// Wraps the given sequencer.
    pub fn new(inner: S) -> Self {
        let name = format!("{}+LS", inner.name());
        Self { inner, name }
    }
}

impl<S: Sequencer> Sequencer for Refined<S> {
    fn sequence(&mut self, instance: &Instance) -> Result<Vec<usize>> {
        let sequence = self.inner.sequence(instance)?;
        combined(instance, &sequence)
    }

    fn required_machines(&self) -> Option<usize> {
        self.inner.required_machines()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
