use super::eval::check_counts;
use super::{Instance, JobTimeline, Operation, Result, Schedule};

/// A builder for creating a permutation flow-shop schedule.
/// Jobs are appended one by one; every appended job visits the machines in index order
/// and starts on each machine when both the machine and the job itself are free.
#[derive(Clone, Debug)]
pub struct ScheduleBuilder<'a> {
    instance: &'a Instance,
    front: Vec<u64>,
    timelines: Vec<JobTimeline>,
}

impl<'a> ScheduleBuilder<'a> {
    /// Creates a new schedule builder simulating all machines.
    #[must_use]
    pub fn new(instance: &'a Instance) -> Self {
        Self::with_machines(instance, instance.count_machines())
    }

    /// Creates a new schedule builder simulating only the first `machines` machines.
    #[must_use]
    pub fn with_machines(instance: &'a Instance, machines: usize) -> Self {
        debug_assert!(machines >= 1 && machines <= instance.count_machines());
        Self {
            instance,
            front: vec![0; machines],
            timelines: Vec::with_capacity(instance.count_jobs()),
        }
    }

    /// Appends a job at the end of the schedule.
    pub fn push(&mut self, job: usize) {
        let mut operations = Vec::with_capacity(self.front.len());
        let mut previous = 0;

        for (machine, free) in self.front.iter_mut().enumerate() {
            let begin = (*free).max(previous);
            let end = begin + self.instance.time(job, machine);
            operations.push(Operation::new(machine, begin, end));
            *free = end;
            previous = end;
        }

        self.timelines.push(JobTimeline { job, operations });
    }

    /// Returns the time the given machine becomes free.
    #[must_use]
    pub fn machine_free_time(&self, machine: usize) -> u64 {
        self.front[machine]
    }
}

impl<'a> From<ScheduleBuilder<'a>> for Schedule {
    fn from(builder: ScheduleBuilder<'a>) -> Self {
        Self::new(builder.timelines)
    }
}

/// Builds the detailed schedule of a sequence on all machines.
///
/// # Errors
/// - If the sequence is empty, repeats a job or contains an unknown job.
pub fn create_schedule(instance: &Instance, sequence: &[usize]) -> Result<Schedule> {
    create_schedule_truncated(
        instance,
        sequence,
        sequence.len(),
        instance.count_machines(),
    )
}

/// Builds the detailed schedule of the first `count_job` jobs of a sequence
/// on the first `count_machine` machines.
///
/// # Errors
/// - If `count_job` or `count_machine` are out of range.
/// - If the sequence repeats a job or contains an unknown job.
pub fn create_schedule_truncated(
    instance: &Instance,
    sequence: &[usize],
    count_job: usize,
    count_machine: usize,
) -> Result<Schedule> {
    check_counts(instance, sequence, count_job, count_machine)?;
    let sequence = &sequence[..count_job];
    instance.validate_sequence(sequence)?;

    let mut builder = ScheduleBuilder::with_machines(instance, count_machine);
    for &job in sequence {
        builder.push(job);
    }
    Ok(builder.into())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::{compute_end_time_truncated, Error};
    use crate::testing::{five_jobs, random_instance};
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    #[test]
    fn builds_reference_schedule() -> anyhow::Result<()> {
        let instance = five_jobs()?;
        let schedule = create_schedule(&instance, &[2, 4, 3, 0, 1])?;

        assert_eq!(schedule.end_time(), 114);
        assert_eq!(schedule.jobs().collect::<Vec<_>>(), vec![2, 4, 3, 0, 1]);
        assert_eq!(
            schedule.process_times(2),
            Some(
                [
                    Operation::new(0, 0, 14),
                    Operation::new(1, 14, 35),
                    Operation::new(2, 35, 51)
                ]
                .as_slice()
            )
        );
        assert!(schedule.verify(&instance));

        let other = create_schedule(&instance, &[4, 2, 3, 0, 1])?;
        assert_eq!(other.end_time(), 115);
        Ok(())
    }

    #[test]
    fn truncation_matches_evaluator() -> anyhow::Result<()> {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..20 {
            let instance = random_instance(&mut rng, 8, 4)?;
            let mut sequence: Vec<_> = (0..instance.count_jobs()).collect();
            sequence.shuffle(&mut rng);

            for count_job in 1..=instance.count_jobs() {
                for count_machine in 1..=instance.count_machines() {
                    let schedule =
                        create_schedule_truncated(&instance, &sequence, count_job, count_machine)?;
                    let end_time =
                        compute_end_time_truncated(&instance, &sequence, count_job, count_machine)?;
                    assert_eq!(schedule.end_time(), end_time);
                    assert!(schedule.verify(&instance));
                }
            }
        }
        Ok(())
    }

    #[test]
    fn machine_intervals_never_overlap() -> anyhow::Result<()> {
        let mut rng = StdRng::seed_from_u64(11);
        let instance = random_instance(&mut rng, 12, 5)?;
        let mut sequence: Vec<_> = (0..instance.count_jobs()).collect();
        sequence.shuffle(&mut rng);

        let schedule = create_schedule(&instance, &sequence)?;
        for machine in 0..instance.count_machines() {
            let mut released = 0;
            for job in schedule.jobs() {
                let operations = schedule.process_times(job).unwrap_or_default();
                let operation = operations[machine];
                assert!(operation.begin >= released);
                if machine > 0 {
                    assert!(operation.begin >= operations[machine - 1].end);
                }
                released = operation.end;
            }
        }
        Ok(())
    }

    #[test]
    fn builder_tracks_machine_release() -> anyhow::Result<()> {
        let instance = five_jobs()?;
        let mut builder = ScheduleBuilder::new(&instance);
        builder.push(2);
        builder.push(4);
        assert_eq!(builder.machine_free_time(0), 30);
        assert_eq!(builder.machine_free_time(1), 52);
        assert_eq!(builder.machine_free_time(2), 69);
        Ok(())
    }

    #[test]
    fn rejects_invalid_sequences() -> anyhow::Result<()> {
        let instance = five_jobs()?;
        assert_eq!(
            create_schedule(&instance, &[0, 0]),
            Err(Error::NotAPermutation { job: 0 })
        );
        assert!(create_schedule_truncated(&instance, &[0, 1], 3, 1).is_err());
        Ok(())
    }
}
