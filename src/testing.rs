//! Shared fixtures for unit tests.

use crate::core::{flow_job, Evaluator, Instance, Result};
use rand::Rng;

/// 5 jobs, 3 machines. `[2, 4, 3, 0, 1]` has makespan 114, `[4, 2, 3, 0, 1]` has 115.
pub fn five_jobs() -> Result<Instance> {
    Instance::new(vec![
        vec![17, 19, 13],
        vec![15, 11, 12],
        vec![14, 21, 16],
        vec![20, 16, 20],
        vec![16, 17, 17],
    ])
}

/// 6 jobs, 2 machines. Johnson's order is `[0, 2, 4, 5, 3, 1]` with makespan 41.
pub fn six_jobs() -> Result<Instance> {
    Instance::new(vec![
        vec![2, 3],
        vec![8, 3],
        vec![4, 6],
        vec![9, 5],
        vec![6, 8],
        vec![9, 7],
    ])
}

/// First Taillard benchmark instance (20 jobs, 5 machines).
pub fn ta001() -> Result<Instance> {
    Ok(flow_job(20, 5, 873_654_221)?.with_upper_bound(1278))
}

/// Random instance with processing times in `1..=99`.
pub fn random_instance(rng: &mut impl Rng, jobs: usize, machines: usize) -> Result<Instance> {
    let times = (0..jobs)
        .map(|_| (0..machines).map(|_| rng.gen_range(1..=99)).collect())
        .collect();
    Instance::new(times)
}

/// Returns whether the sequence is a permutation of `0..jobs`.
pub fn is_permutation(sequence: &[usize], jobs: usize) -> bool {
    let mut sorted = sequence.to_vec();
    sorted.sort_unstable();
    sorted.into_iter().eq(0..jobs)
}

/// Returns the optimal makespan by enumerating all permutations.
pub fn brute_force(instance: &Instance) -> u64 {
    fn visit(evaluator: &mut Evaluator, sequence: &mut Vec<usize>, used: &mut [bool], best: &mut u64) {
        if sequence.len() == used.len() {
            *best = (*best).min(evaluator.end_time(sequence));
            return;
        }
        for job in 0..used.len() {
            if !used[job] {
                used[job] = true;
                sequence.push(job);
                visit(evaluator, sequence, used, best);
                sequence.pop();
                used[job] = false;
            }
        }
    }

    let mut best = u64::MAX;
    let mut evaluator = Evaluator::new(instance);
    let mut used = vec![false; instance.count_jobs()];
    visit(&mut evaluator, &mut Vec::new(), &mut used, &mut best);
    best
}
