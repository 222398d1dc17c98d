use super::Instance;
use serde::{Deserialize, Serialize};

/// One operation of a job: the interval during which it occupies a machine.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Serialize, PartialEq)]
pub struct Operation {
    pub machine: usize,
    pub begin: u64,
    pub end: u64,
}

impl Operation {
    /// Creates a new operation.
    #[must_use]
    pub const fn new(machine: usize, begin: u64, end: u64) -> Self {
        Self {
            machine,
            begin,
            end,
        }
    }
}

/// Operations of a single job in visiting order.
#[derive(Clone, Debug, Deserialize, Eq, Serialize, PartialEq)]
pub struct JobTimeline {
    pub job: usize,
    pub operations: Vec<Operation>,
}

/// A detailed schedule: per-job operations and the resulting makespan.
/// Jobs are kept in the order they were scheduled.
#[derive(Clone, Debug, Deserialize, Eq, Serialize, PartialEq)]
pub struct Schedule {
    timelines: Vec<JobTimeline>,
    end_time: u64,
}

impl Schedule {
    /// Creates a schedule from job timelines, computing the makespan.
    #[must_use]
    pub fn new(timelines: Vec<JobTimeline>) -> Self {
        let end_time = timelines
            .iter()
            .flat_map(|timeline| timeline.operations.iter())
            .map(|operation| operation.end)
            .max()
            .unwrap_or_default();
        Self {
            timelines,
            end_time,
        }
    }

    /// Returns the scheduled jobs in scheduling order.
    pub fn jobs(&self) -> impl Iterator<Item = usize> + '_ {
        self.timelines.iter().map(|timeline| timeline.job)
    }

    /// Returns the operations of a job, or `None` if the job is not scheduled.
    #[must_use]
    pub fn process_times(&self, job: usize) -> Option<&[Operation]> {
        self.timelines
            .iter()
            .find(|timeline| timeline.job == job)
            .map(|timeline| timeline.operations.as_slice())
    }

    /// Returns all job timelines.
    #[must_use]
    pub fn timelines(&self) -> &[JobTimeline] {
        &self.timelines
    }

    /// Returns the makespan.
    #[must_use]
    pub const fn end_time(&self) -> u64 {
        self.end_time
    }

    /// Verifies that the schedule is feasible for the instance:
    /// - every operation lasts exactly its processing time,
    /// - operations of a job do not overlap and follow (a prefix of) its visiting order,
    /// - operations on the same machine do not overlap.
    #[must_use]
    pub fn verify(&self, instance: &Instance) -> bool {
        let mut machines = vec![Vec::new(); instance.count_machines()];

        for timeline in &self.timelines {
            if timeline.job >= instance.count_jobs() {
                return false;
            }

            let mut route = instance.route(timeline.job);
            let mut released = 0;
            for operation in &timeline.operations {
                let Some(machine) = route.next() else {
                    return false;
                };
                let duration = instance.time(timeline.job, machine);
                if operation.machine != machine
                    || operation.begin < released
                    || operation.end != operation.begin + duration
                {
                    return false;
                }
                released = operation.end;
                machines[machine].push((operation.begin, operation.end));
            }
        }

        machines.iter_mut().all(|intervals| {
            intervals.sort_unstable();
            intervals.windows(2).all(|pair| pair[0].1 <= pair[1].0)
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn two_jobs() -> anyhow::Result<Instance> {
        Ok(Instance::new(vec![vec![2, 3], vec![4, 1]])?)
    }

    fn timeline(job: usize, operations: &[(usize, u64, u64)]) -> JobTimeline {
        let operations = operations
            .iter()
            .map(|&(machine, begin, end)| Operation::new(machine, begin, end))
            .collect();
        JobTimeline { job, operations }
    }

    #[test]
    fn reports_jobs_and_end_time() {
        let schedule = Schedule::new(vec![
            timeline(1, &[(0, 0, 4), (1, 4, 5)]),
            timeline(0, &[(0, 4, 6), (1, 6, 9)]),
        ]);
        assert_eq!(schedule.jobs().collect::<Vec<_>>(), vec![1, 0]);
        assert_eq!(schedule.end_time(), 9);
        assert_eq!(
            schedule.process_times(0),
            Some([Operation::new(0, 4, 6), Operation::new(1, 6, 9)].as_slice())
        );
        assert_eq!(schedule.process_times(2), None);
    }

    #[test]
    fn verifies_feasible_schedule() -> anyhow::Result<()> {
        let schedule = Schedule::new(vec![
            timeline(1, &[(0, 0, 4), (1, 4, 5)]),
            timeline(0, &[(0, 4, 6), (1, 6, 9)]),
        ]);
        assert!(schedule.verify(&two_jobs()?));
        Ok(())
    }

    #[test]
    fn detects_machine_overlap() -> anyhow::Result<()> {
        let schedule = Schedule::new(vec![
            timeline(1, &[(0, 0, 4), (1, 4, 5)]),
            timeline(0, &[(0, 3, 5), (1, 5, 8)]),
        ]);
        assert!(!schedule.verify(&two_jobs()?));
        Ok(())
    }

    #[test]
    fn detects_wrong_durations_and_order() -> anyhow::Result<()> {
        let instance = two_jobs()?;

        let too_short = Schedule::new(vec![timeline(0, &[(0, 0, 1), (1, 1, 4)])]);
        assert!(!too_short.verify(&instance));

        let overtaking = Schedule::new(vec![timeline(0, &[(0, 1, 3), (1, 0, 3)])]);
        assert!(!overtaking.verify(&instance));

        let extra = Schedule::new(vec![timeline(0, &[(0, 0, 2), (1, 2, 5), (1, 5, 8)])]);
        assert!(!extra.verify(&instance));

        let prefix = Schedule::new(vec![timeline(0, &[(0, 0, 2)])]);
        assert!(prefix.verify(&instance));
        Ok(())
    }
}
