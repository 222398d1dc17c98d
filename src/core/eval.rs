use super::{Error, Instance, Result};

/// Appends a job to a partial schedule described by its machine release times.
/// `front[k]` is the time machine `k` becomes free; only `front.len()` machines are simulated.
pub fn advance(instance: &Instance, front: &mut [u64], job: usize) {
    let mut previous = 0;
    for (free, &time) in front.iter_mut().zip(instance.job_times(job)) {
        *free = (*free).max(previous) + time;
        previous = *free;
    }
}

/// Makespan evaluator reusing one buffer of machine release times between calls.
/// Sequences are not validated; callers inside search loops own that invariant.
#[derive(Clone, Debug)]
pub struct Evaluator<'a> {
    instance: &'a Instance,
    front: Vec<u64>,
}

impl<'a> Evaluator<'a> {
    /// Creates a new evaluator for the instance.
    #[must_use]
    pub fn new(instance: &'a Instance) -> Self {
        let front = vec![0; instance.count_machines()];
        Self { instance, front }
    }

    /// Returns the evaluated instance.
    #[must_use]
    pub const fn instance(&self) -> &'a Instance {
        self.instance
    }

    /// Returns the makespan of the sequence on all machines.
    pub fn end_time(&mut self, sequence: &[usize]) -> u64 {
        self.end_time_truncated(sequence, self.instance.count_machines())
    }

    /// Returns the completion time of the last job of the sequence on machine `machines - 1`.
    pub fn end_time_truncated(&mut self, sequence: &[usize], machines: usize) -> u64 {
        debug_assert!(machines >= 1 && machines <= self.instance.count_machines());
        debug_assert!(self.instance.validate_sequence(sequence).is_ok());

        let front = &mut self.front[..machines];
        front.fill(0);
        for &job in sequence {
            advance(self.instance, front, job);
        }
        front[machines - 1]
    }
}

/// Computes the makespan of the whole sequence.
///
/// # Errors
/// - If the sequence is empty.
/// - If the sequence repeats a job or contains an unknown job.
pub fn compute_end_time(instance: &Instance, sequence: &[usize]) -> Result<u64> {
    compute_end_time_truncated(
        instance,
        sequence,
        sequence.len(),
        instance.count_machines(),
    )
}

/// Computes the partial makespan of the first `count_job` jobs of the sequence
/// on the first `count_machine` machines.
///
/// # Errors
/// - If `count_job` is not in `1..=sequence.len()`.
/// - If `count_machine` is not in `1..=instance.count_machines()`.
/// - If the sequence repeats a job or contains an unknown job.
pub fn compute_end_time_truncated(
    instance: &Instance,
    sequence: &[usize],
    count_job: usize,
    count_machine: usize,
) -> Result<u64> {
    check_counts(instance, sequence, count_job, count_machine)?;
    let sequence = &sequence[..count_job];
    instance.validate_sequence(sequence)?;
    Ok(Evaluator::new(instance).end_time_truncated(sequence, count_machine))
}

pub(super) fn check_counts(
    instance: &Instance,
    sequence: &[usize],
    count_job: usize,
    count_machine: usize,
) -> Result<()> {
    let max = sequence.len().min(instance.count_jobs());
    if count_job == 0 || count_job > max {
        let (what, value) = ("count_job", count_job);
        return Err(Error::OutOfRange { what, value, max });
    }

    let max = instance.count_machines();
    if count_machine == 0 || count_machine > max {
        let (what, value) = ("count_machine", count_machine);
        return Err(Error::OutOfRange { what, value, max });
    }

    Ok(())
}
