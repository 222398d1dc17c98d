use super::johnson;
use crate::core::{Evaluator, Instance, Result, Sequencer};
use tracing::{debug, trace};

/// Campbell-Dudek-Smith heuristic.
///
/// Solves `count_machines - 1` two-machine sub-problems with Johnson's algorithm. Sub-problem `k`
/// aggregates the first `k` machines into the first pseudo machine and the last `k` machines into
/// the second one. The sequence with the lowest makespan on the original instance wins; earlier
/// sub-problems win ties. A single machine instance keeps the index order.
///
/// # Errors
/// - Never for valid instances; errors of the auxiliary instance are propagated.
pub fn cds(instance: &Instance) -> Result<Vec<usize>> {
    let machines = instance.count_machines();
    let mut evaluator = Evaluator::new(instance);
    let mut best: Option<(Vec<usize>, u64)> = None;
    let mut scratch = Instance::new(vec![vec![0, 0]; instance.count_jobs()])?;

    for sub_problem in 1..machines {
        let times: Vec<Vec<u64>> = (0..instance.count_jobs())
            .map(|job| {
                let times = instance.job_times(job);
                let first: u64 = times[..sub_problem].iter().sum();
                let second: u64 = times[machines - sub_problem..].iter().sum();
                vec![first, second]
            })
            .collect();
        scratch.set_processing_times(times)?;

        let sequence = johnson(&scratch)?;
        let end_time = evaluator.end_time(&sequence);
        trace!(sub_problem, end_time, "CDS sub-problem");

        if best.as_ref().map_or(true, |(_, best)| end_time < *best) {
            best = Some((sequence, end_time));
        }
    }

    Ok(match best {
        Some((sequence, end_time)) => {
            debug!(end_time, "CDS best sub-problem");
            sequence
        }
        None => (0..instance.count_jobs()).collect(),
    })
}

/// Campbell-Dudek-Smith heuristic.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cds;

impl Sequencer for Cds {
    fn sequence(&mut self, instance: &Instance) -> Result<Vec<usize>> {
        cds(instance)
    }

    fn name(&self) -> &'static str {
        "CDS"
    }
}

#[allow(unsafe_code)]
#[linkme::distributed_slice(super::SEQUENCERS)]
static INSTANCE: fn() -> Box<dyn Sequencer> = || Box::new(Cds);

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::{compute_end_time, johnson_three_machines};
    use crate::data::samples;
    use crate::testing::{brute_force, five_jobs, is_permutation, six_jobs, ta001};

    #[test]
    fn test_cds() -> anyhow::Result<()> {
        let instance = five_jobs()?;
        let sequence = cds(&instance)?;
        assert_eq!(sequence, vec![2, 4, 3, 0, 1]);
        assert_eq!(compute_end_time(&instance, &sequence)?, 114);

        let instance = six_jobs()?;
        assert_eq!(cds(&instance)?, johnson(&instance)?);
        Ok(())
    }

    #[test]
    fn test_cds_benchmark() -> anyhow::Result<()> {
        let instance = ta001()?;
        let sequence = cds(&instance)?;
        assert_eq!(
            sequence,
            vec![14, 2, 8, 13, 16, 7, 0, 3, 10, 15, 11, 18, 1, 6, 4, 5, 19, 17, 9, 12]
        );
        assert_eq!(compute_end_time(&instance, &sequence)?, 1398);
        Ok(())
    }

    #[test]
    fn is_optimal_on_dominated_middle_machine() -> anyhow::Result<()> {
        for seed in 1..=10 {
            let instance = johnson_three_machines(7, seed)?;
            let sequence = cds(&instance)?;
            assert_eq!(compute_end_time(&instance, &sequence)?, brute_force(&instance));
        }
        Ok(())
    }

    #[test]
    fn handles_single_machine() -> anyhow::Result<()> {
        let instance = Instance::new(vec![vec![3], vec![1], vec![2]])?;
        let sequence = cds(&instance)?;
        assert!(is_permutation(&sequence, 3));
        Ok(())
    }

    #[test]
    fn test_cds_samples() {
        assert!(samples(&mut Cds).is_ok());
    }
}
