//! Liu-Reeves LR(x) constructive heuristic.
//!
//! Every unscheduled job gets a priority index after the current partial sequence:
//! `(n - k - 2) * IT + AT`, where `k` is the number of scheduled jobs.
//!
//! - `IT` is the weighted idle time the job induces on machines `1..M`. Idle time on machine `j`
//!   (1-based) is weighted by `M / (j + k * (M - j) / (n - 2))`.
//! - `AT` is the completion time of an artificial job appended after the candidate. Its time on
//!   every machine is the rounded average over the other unscheduled jobs.
//!
//! The `x` jobs with the lowest index after the empty sequence each start one candidate
//! sequence that is completed greedily. The candidate with the lowest makespan is returned.

use crate::core::{advance, Error, Evaluator, Instance, Result, Sequencer};
use tracing::{debug, trace};

/// Default number of candidate sequences.
pub const DEFAULT_SEQUENCES: usize = 5;

struct PriorityIndex<'a> {
    instance: &'a Instance,
    completion: Vec<u64>,
    artificial: Vec<u64>,
    totals: Vec<u64>,
}

impl<'a> PriorityIndex<'a> {
    fn new(instance: &'a Instance) -> Self {
        let machines = instance.count_machines();
        Self {
            instance,
            completion: vec![0; machines],
            artificial: vec![0; machines],
            totals: vec![0; machines],
        }
    }

    /// Caches the per-machine sums of the unscheduled jobs.
    fn prepare(&mut self, unscheduled: &[usize]) {
        self.totals.fill(0);
        for &job in unscheduled {
            for (total, time) in self.totals.iter_mut().zip(self.instance.job_times(job)) {
                *total += time;
            }
        }
    }

    /// Returns the index of appending `job` after a partial sequence of `scheduled` jobs
    /// whose machine release times are `front`. `prepare` must have been called with the
    /// unscheduled jobs, `job` included.
    #[allow(clippy::cast_precision_loss)]
    fn compute(&mut self, front: &[u64], scheduled: usize, remaining: usize, job: usize) -> f64 {
        let jobs = self.instance.count_jobs();
        let machines = self.instance.count_machines();

        self.completion.copy_from_slice(front);
        advance(self.instance, &mut self.completion, job);

        let mut idle = 0.0;
        for machine in 1..machines {
            let position = machine + 1;
            let gap = self.completion[machine - 1].saturating_sub(front[machine]);
            let weight = if jobs > 2 {
                (scheduled * (machines - position)) as f64 / (jobs - 2) as f64
            } else {
                0.0
            };
            idle += (machines as u64 * gap) as f64 / (position as f64 + weight);
        }

        let others = remaining - 1;
        for (machine, artificial) in self.artificial.iter_mut().enumerate() {
            let sum = self.totals[machine] - self.instance.time(job, machine);
            *artificial = if others == 0 {
                0
            } else {
                let others = others as u64;
                (2 * sum + others) / (2 * others)
            };
        }

        let mut previous = 0;
        for (free, &time) in self.completion.iter().zip(&self.artificial) {
            previous = (*free).max(previous) + time;
        }

        (jobs as f64 - scheduled as f64 - 2.0) * idle + previous as f64
    }
}

/// Returns the `count_sequences` candidate sequences of LR(x), in order of their starting job.
/// Requests beyond the number of jobs are clamped.
///
/// # Errors
/// - If `count_sequences` is zero.
pub fn liu_reeves_candidates(instance: &Instance, count_sequences: usize) -> Result<Vec<Vec<usize>>> {
    let jobs = instance.count_jobs();
    let machines = instance.count_machines();
    if count_sequences == 0 {
        return Err(Error::OutOfRange {
            what: "count_sequences",
            value: count_sequences,
            max: jobs,
        });
    }

    let mut index = PriorityIndex::new(instance);
    let all: Vec<_> = (0..jobs).collect();
    let empty = vec![0; machines];
    index.prepare(&all);
    let initial: Vec<_> = all
        .iter()
        .map(|&job| index.compute(&empty, 0, jobs, job))
        .collect();

    let mut starts = all.clone();
    starts.sort_by(|&a, &b| initial[a].total_cmp(&initial[b]));
    starts.truncate(count_sequences);
    debug!(?starts, "Liu-Reeves starting jobs");

    let mut candidates = Vec::with_capacity(starts.len());
    for start in starts {
        let mut sequence = Vec::with_capacity(jobs);
        let mut unscheduled: Vec<_> = all.iter().copied().filter(|&job| job != start).collect();
        let mut front = vec![0; machines];
        sequence.push(start);
        advance(instance, &mut front, start);

        while !unscheduled.is_empty() {
            index.prepare(&unscheduled);

            let mut best = (0, f64::INFINITY);
            for (position, &job) in unscheduled.iter().enumerate() {
                let value = index.compute(&front, sequence.len(), unscheduled.len(), job);
                if value < best.1 {
                    best = (position, value);
                }
            }

            let job = unscheduled.remove(best.0);
            sequence.push(job);
            advance(instance, &mut front, job);
        }

        trace!(start, ?sequence, "Liu-Reeves candidate");
        candidates.push(sequence);
    }

    Ok(candidates)
}

/// Returns the best LR(x) candidate by makespan; the first candidate wins ties.
///
/// # Errors
/// - If `count_sequences` is zero.
pub fn liu_reeves(instance: &Instance, count_sequences: usize) -> Result<Vec<usize>> {
    let mut evaluator = Evaluator::new(instance);
    let mut best: Option<(Vec<usize>, u64)> = None;

    for candidate in liu_reeves_candidates(instance, count_sequences)? {
        let end_time = evaluator.end_time(&candidate);
        if best.as_ref().map_or(true, |(_, best)| end_time < *best) {
            best = Some((candidate, end_time));
        }
    }

    best.map(|(sequence, _)| sequence).ok_or(Error::EmptyInstance)
}

/// Liu-Reeves heuristic with a configurable number of candidate sequences.
#[derive(Clone, Copy, Debug)]
pub struct LiuReeves {
    count_sequences: usize,
}

impl LiuReeves {
    /// Creates a new heuristic building `count_sequences` candidates.
    #[must_use]
    pub const fn new(count_sequences: usize) -> Self {
        Self { count_sequences }
    }
}

impl Default for LiuReeves {
    fn default() -> Self {
        Self::new(DEFAULT_SEQUENCES)
    }
}

impl Sequencer for LiuReeves {
    fn sequence(&mut self, instance: &Instance) -> Result<Vec<usize>> {
        liu_reeves(instance, self.count_sequences)
    }

    fn name(&self) -> &'static str {
        "LR"
    }
}

#[allow(unsafe_code)]
#[linkme::distributed_slice(super::SEQUENCERS)]
static INSTANCE: fn() -> Box<dyn Sequencer> = || Box::new(LiuReeves::default());
