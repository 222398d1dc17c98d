use crate::core::{Evaluator, Instance, Result, Sequencer};
use std::cmp::Reverse;
use tracing::{debug, trace};

/// Builds a sequence by inserting jobs one by one in the given order.
/// Each job goes to the position minimizing the makespan of the partial sequence;
/// the lowest position wins ties.
#[must_use]
pub fn insert_jobs(instance: &Instance, order: &[usize]) -> Vec<usize> {
    let mut evaluator = Evaluator::new(instance);
    let mut sequence = Vec::with_capacity(order.len());
    let Some((&first, rest)) = order.split_first() else {
        return sequence;
    };
    sequence.push(first);

    for &job in rest {
        let mut best = (0, u64::MAX);

        for position in 0..=sequence.len() {
            sequence.insert(position, job);
            let end_time = evaluator.end_time(&sequence);
            sequence.remove(position);

            if end_time < best.1 {
                best = (position, end_time);
            }
        }

        trace!(job, position = best.0, end_time = best.1, "Inserted job");
        sequence.insert(best.0, job);
    }

    sequence
}

/// Nawaz-Enscore-Ham heuristic: jobs sorted by decreasing total processing time,
/// then inserted at their best position.
#[must_use]
pub fn neh(instance: &Instance) -> Vec<usize> {
    let mut order: Vec<_> = (0..instance.count_jobs()).collect();
    order.sort_by_key(|&job| Reverse(instance.total_time(job)));
    debug!(?order, "NEH insertion order");
    insert_jobs(instance, &order)
}

/// Nawaz-Enscore-Ham heuristic.
#[derive(Clone, Copy, Debug, Default)]
pub struct Neh;

impl Sequencer for Neh {
    fn sequence(&mut self, instance: &Instance) -> Result<Vec<usize>> {
        Ok(neh(instance))
    }

    fn name(&self) -> &'static str {
        "NEH"
    }
}

#[allow(unsafe_code)]
#[linkme::distributed_slice(super::SEQUENCERS)]
static INSTANCE: fn() -> Box<dyn Sequencer> = || Box::new(Neh);

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::compute_end_time;
    use crate::data::samples;
    use crate::testing::{five_jobs, is_permutation, random_instance, six_jobs, ta001};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_neh() -> anyhow::Result<()> {
        let instance = five_jobs()?;
        let sequence = neh(&instance);
        assert_eq!(sequence, vec![2, 3, 4, 0, 1]);
        assert_eq!(compute_end_time(&instance, &sequence)?, 113);

        assert_eq!(neh(&six_jobs()?), vec![0, 2, 4, 5, 3, 1]);
        Ok(())
    }

    #[test]
    fn test_neh_benchmark() -> anyhow::Result<()> {
        let instance = ta001()?;
        let sequence = neh(&instance);
        assert_eq!(
            sequence,
            vec![2, 16, 8, 7, 14, 13, 10, 15, 12, 18, 5, 3, 4, 17, 0, 1, 9, 6, 19, 11]
        );
        assert_eq!(compute_end_time(&instance, &sequence)?, 1286);
        Ok(())
    }

    #[test]
    fn returns_permutations() -> anyhow::Result<()> {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let jobs = rng.gen_range(1..15);
            let machines = rng.gen_range(1..6);
            let instance = random_instance(&mut rng, jobs, machines)?;
            assert!(is_permutation(&neh(&instance), jobs));
        }
        assert!(insert_jobs(&five_jobs()?, &[]).is_empty());
        Ok(())
    }

    #[test]
    fn test_neh_samples() {
        assert!(samples(&mut Neh).is_ok());
    }
}
