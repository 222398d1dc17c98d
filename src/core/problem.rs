use super::{Error, Result};
use serde::{Deserialize, Serialize};

/// Serialized form of an [`Instance`]. Rows are jobs, columns are machines.
#[derive(Clone, Debug, Deserialize, Serialize)]
struct InstanceData {
    processing_times: Vec<Vec<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    upper_bound: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lower_bound: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    initial_seed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    processing_order: Option<Vec<Vec<usize>>>,
}

/// An instance of the flow-shop problem.
/// Processing times are stored job-major in a flat matrix.
#[derive(Clone, Debug, Deserialize, Eq, Serialize, PartialEq)]
#[serde(try_from = "InstanceData", into = "InstanceData")]
pub struct Instance {
    jobs: usize,
    machines: usize,
    times: Vec<u64>,
    upper_bound: Option<u64>,
    lower_bound: Option<u64>,
    initial_seed: Option<i64>,
    routes: Option<Vec<Vec<usize>>>,
}

impl Instance {
    /// Creates a new instance from a matrix of processing times (rows are jobs).
    ///
    /// # Errors
    /// - If the matrix has no rows or the first row is empty.
    /// - If rows have different lengths.
    pub fn new(processing_times: Vec<Vec<u64>>) -> Result<Self> {
        let (jobs, machines, times) = flatten(processing_times)?;
        Ok(Self {
            jobs,
            machines,
            times,
            upper_bound: None,
            lower_bound: None,
            initial_seed: None,
            routes: None,
        })
    }

    /// Sets the known reference makespan of the instance.
    #[must_use]
    pub fn with_upper_bound(mut self, upper_bound: u64) -> Self {
        self.upper_bound = Some(upper_bound);
        self
    }

    /// Sets the known lower bound of the optimal makespan.
    #[must_use]
    pub fn with_lower_bound(mut self, lower_bound: u64) -> Self {
        self.lower_bound = Some(lower_bound);
        self
    }

    /// Sets the seed the instance was generated from.
    #[must_use]
    pub fn with_initial_seed(mut self, initial_seed: i64) -> Self {
        self.initial_seed = Some(initial_seed);
        self
    }

    /// Sets a custom machine visiting order for every job.
    /// Machines are numbered from 1, as in the input files.
    ///
    /// # Errors
    /// - If the number of routes differs from the number of jobs.
    /// - If a route refers to a machine outside `1..=count_machines`.
    pub fn with_processing_order(mut self, processing_order: Vec<Vec<usize>>) -> Result<Self> {
        if processing_order.len() != self.jobs {
            return Err(Error::OutOfRange {
                what: "processing order length",
                value: processing_order.len(),
                max: self.jobs,
            });
        }

        let mut routes = processing_order;
        for (job, route) in routes.iter_mut().enumerate() {
            for machine in route.iter_mut() {
                if *machine == 0 || *machine > self.machines {
                    return Err(Error::InvalidRoute {
                        job,
                        machine: *machine,
                    });
                }
                *machine -= 1;
            }
        }

        self.routes = Some(routes);
        Ok(self)
    }

    /// Replaces the whole processing-time matrix.
    /// The bounds and the processing order describe the old matrix and are cleared.
    ///
    /// # Errors
    /// - Same as [`Instance::new`].
    pub fn set_processing_times(&mut self, processing_times: Vec<Vec<u64>>) -> Result<()> {
        let (jobs, machines, times) = flatten(processing_times)?;
        self.jobs = jobs;
        self.machines = machines;
        self.times = times;
        self.upper_bound = None;
        self.lower_bound = None;
        self.routes = None;
        Ok(())
    }

    /// Returns the number of jobs.
    #[must_use]
    pub const fn count_jobs(&self) -> usize {
        self.jobs
    }

    /// Returns the number of machines.
    #[must_use]
    pub const fn count_machines(&self) -> usize {
        self.machines
    }

    /// Returns the processing time of a job on a machine.
    #[must_use]
    pub fn time(&self, job: usize, machine: usize) -> u64 {
        self.times[job * self.machines + machine]
    }

    /// Returns the processing times of a job on all machines.
    #[must_use]
    pub fn job_times(&self, job: usize) -> &[u64] {
        &self.times[job * self.machines..(job + 1) * self.machines]
    }

    /// Returns the sum of processing times of a job over all machines.
    #[must_use]
    pub fn total_time(&self, job: usize) -> u64 {
        self.job_times(job).iter().sum()
    }

    /// Returns the known reference makespan, if any.
    #[must_use]
    pub const fn upper_bound(&self) -> Option<u64> {
        self.upper_bound
    }

    /// Returns the known lower bound of the optimal makespan, if any.
    #[must_use]
    pub const fn lower_bound(&self) -> Option<u64> {
        self.lower_bound
    }

    /// Returns the generator seed, if any.
    #[must_use]
    pub const fn initial_seed(&self) -> Option<i64> {
        self.initial_seed
    }

    /// Returns whether the instance has a custom machine visiting order.
    #[must_use]
    pub const fn is_routed(&self) -> bool {
        self.routes.is_some()
    }

    /// Returns the 0-based machines visited by a job, in visiting order.
    pub fn route(&self, job: usize) -> Box<dyn Iterator<Item = usize> + '_> {
        match &self.routes {
            Some(routes) => Box::new(routes[job].iter().copied()),
            None => Box::new(0..self.machines),
        }
    }

    /// Checks that the sequence contains valid job indices, each at most once.
    /// A prefix of a permutation is accepted.
    ///
    /// # Errors
    /// - If an index is out of range or repeated.
    pub fn validate_sequence(&self, sequence: &[usize]) -> Result<()> {
        let mut seen = vec![false; self.jobs];
        for &job in sequence {
            match seen.get_mut(job) {
                Some(flag) if !*flag => *flag = true,
                _ => return Err(Error::NotAPermutation { job }),
            }
        }
        Ok(())
    }
}

fn flatten(processing_times: Vec<Vec<u64>>) -> Result<(usize, usize, Vec<u64>)> {
    let jobs = processing_times.len();
    let machines = processing_times.first().map_or(0, Vec::len);

    if jobs == 0 || machines == 0 {
        return Err(Error::EmptyInstance);
    }

    let mut times = Vec::with_capacity(jobs * machines);
    for (job, row) in processing_times.into_iter().enumerate() {
        if row.len() != machines {
            return Err(Error::RaggedRow {
                job,
                expected: machines,
                found: row.len(),
            });
        }
        times.extend(row);
    }

    Ok((jobs, machines, times))
}

impl TryFrom<InstanceData> for Instance {
    type Error = Error;

    fn try_from(data: InstanceData) -> Result<Self> {
        let mut instance = Self::new(data.processing_times)?;
        instance.upper_bound = data.upper_bound;
        instance.lower_bound = data.lower_bound;
        instance.initial_seed = data.initial_seed;
        match data.processing_order {
            Some(order) => instance.with_processing_order(order),
            None => Ok(instance),
        }
    }
}

impl From<Instance> for InstanceData {
    fn from(instance: Instance) -> Self {
        let processing_times = instance
            .times
            .chunks(instance.machines)
            .map(<[u64]>::to_vec)
            .collect();
        let processing_order = instance.routes.map(|routes| {
            let one_based = |route: Vec<usize>| route.into_iter().map(|m| m + 1).collect();
            routes.into_iter().map(one_based).collect()
        });

        Self {
            processing_times,
            upper_bound: instance.upper_bound,
            lower_bound: instance.lower_bound,
            initial_seed: instance.initial_seed,
            processing_order,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn five_jobs() -> Vec<Vec<u64>> {
        vec![
            vec![17, 19, 13],
            vec![15, 11, 12],
            vec![14, 21, 16],
            vec![20, 16, 20],
            vec![16, 17, 17],
        ]
    }

    #[test]
    fn counts_jobs_and_machines() -> anyhow::Result<()> {
        let instance = Instance::new(five_jobs())?;
        assert_eq!(instance.count_jobs(), 5);
        assert_eq!(instance.count_machines(), 3);
        assert_eq!(instance.time(3, 2), 20);
        assert_eq!(instance.job_times(1), &[15, 11, 12]);
        assert_eq!(instance.total_time(0), 49);
        assert_eq!(instance.upper_bound(), None);
        assert_eq!(instance.initial_seed(), None);
        Ok(())
    }

    #[test]
    fn rejects_bad_shapes() {
        assert_eq!(Instance::new(vec![]), Err(Error::EmptyInstance));
        assert_eq!(Instance::new(vec![vec![]]), Err(Error::EmptyInstance));
        assert_eq!(
            Instance::new(vec![vec![1, 2], vec![1, 2, 3]]),
            Err(Error::RaggedRow {
                job: 1,
                expected: 2,
                found: 3
            })
        );
    }

    #[test]
    fn keeps_metadata() -> anyhow::Result<()> {
        let instance = Instance::new(vec![vec![5, 5]])?
            .with_upper_bound(10)
            .with_lower_bound(9)
            .with_initial_seed(12345);
        assert_eq!(instance.upper_bound(), Some(10));
        assert_eq!(instance.lower_bound(), Some(9));
        assert_eq!(instance.initial_seed(), Some(12345));
        Ok(())
    }

    #[test]
    fn bulk_replace_changes_shape() -> anyhow::Result<()> {
        let mut instance = Instance::new(five_jobs())?
            .with_upper_bound(114)
            .with_lower_bound(100);
        instance.set_processing_times(vec![vec![1, 2], vec![3, 4]])?;
        assert_eq!(instance.count_jobs(), 2);
        assert_eq!(instance.count_machines(), 2);
        assert_eq!(instance.time(1, 0), 3);
        assert_eq!(instance.upper_bound(), None);
        assert_eq!(instance.lower_bound(), None);
        assert!(instance.set_processing_times(vec![]).is_err());
        Ok(())
    }

    #[test]
    fn routes_are_validated() -> anyhow::Result<()> {
        let base = Instance::new(vec![vec![1, 2], vec![3, 4]])?;
        assert!(!base.is_routed());
        assert_eq!(base.route(0).collect::<Vec<_>>(), vec![0, 1]);

        let routed = base.clone().with_processing_order(vec![vec![2, 1], vec![1, 2]])?;
        assert!(routed.is_routed());
        assert_eq!(routed.route(0).collect::<Vec<_>>(), vec![1, 0]);

        assert_eq!(
            base.clone().with_processing_order(vec![vec![0, 1], vec![1, 2]]),
            Err(Error::InvalidRoute { job: 0, machine: 0 })
        );
        assert!(base.with_processing_order(vec![vec![1, 2]]).is_err());
        Ok(())
    }

    #[test]
    fn validates_sequences() -> anyhow::Result<()> {
        let instance = Instance::new(five_jobs())?;
        assert!(instance.validate_sequence(&[2, 4, 3, 0, 1]).is_ok());
        assert!(instance.validate_sequence(&[2, 4]).is_ok());
        assert_eq!(
            instance.validate_sequence(&[2, 4, 2]),
            Err(Error::NotAPermutation { job: 2 })
        );
        assert_eq!(
            instance.validate_sequence(&[5]),
            Err(Error::NotAPermutation { job: 5 })
        );
        Ok(())
    }

    #[test]
    fn instance_should_serialize() -> anyhow::Result<()> {
        let instance = Instance::new(vec![vec![1, 2], vec![3, 4]])?
            .with_upper_bound(7)
            .with_processing_order(vec![vec![2, 1], vec![1, 2]])?;

        let serialized = serde_json::to_string(&instance)?;
        let deserialized: Instance = serde_json::from_str(&serialized)?;
        assert_eq!(instance, deserialized);

        let ragged = r#"{"processing_times": [[1, 2], [3]]}"#;
        assert!(serde_json::from_str::<Instance>(ragged).is_err());
        Ok(())
    }
}
