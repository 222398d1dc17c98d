use crate::core::{Error, Instance, Result, Sequencer};
use tracing::debug;

/// Optimal sequence for the two-machine flow shop (Johnson, 1954).
///
/// Jobs are sorted by their shorter operation. Jobs faster on the first machine go to the front
/// in that order; the rest, including ties, go to the back in reverse order.
///
/// # Errors
/// - If the instance does not have exactly two machines.
pub fn johnson(instance: &Instance) -> Result<Vec<usize>> {
    if instance.count_machines() != 2 {
        return Err(Error::InvalidMachineCount {
            expected: 2,
            found: instance.count_machines(),
        });
    }

    let mut order: Vec<_> = (0..instance.count_jobs()).collect();
    order.sort_by_key(|&job| instance.time(job, 0).min(instance.time(job, 1)));

    let (mut sequence, mut second): (Vec<_>, Vec<_>) = order
        .into_iter()
        .partition(|&job| instance.time(job, 0) < instance.time(job, 1));

    debug!(first = sequence.len(), second = second.len(), "Johnson partition");

    second.reverse();
    sequence.append(&mut second);
    Ok(sequence)
}

/// Johnson's algorithm for two-machine instances.
#[derive(Clone, Copy, Debug, Default)]
pub struct Johnson;

impl Sequencer for Johnson {
    fn sequence(&mut self, instance: &Instance) -> Result<Vec<usize>> {
        johnson(instance)
    }

    fn required_machines(&self) -> Option<usize> {
        Some(2)
    }

    fn name(&self) -> &'static str {
        "Johnson"
    }
}

#[allow(unsafe_code)]
#[linkme::distributed_slice(super::SEQUENCERS)]
static INSTANCE: fn() -> Box<dyn Sequencer> = || Box::new(Johnson);
