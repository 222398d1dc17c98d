use super::{Instance, Result};

/// Portable linear congruential generator used for the Taillard benchmark instances.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TaillardRng {
    seed: i64,
}

impl TaillardRng {
    const A: i64 = 16_807;
    const B: i64 = 127_773;
    const C: i64 = 2_836;
    const M: i64 = (1 << 31) - 1;

    /// Creates a new generator with the given seed.
    #[must_use]
    pub const fn new(seed: i64) -> Self {
        Self { seed }
    }

    /// Returns the current seed.
    #[must_use]
    pub const fn seed(&self) -> i64 {
        self.seed
    }

    /// Returns a value uniformly distributed in `low..=high`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::cast_sign_loss)]
    pub fn unif(&mut self, low: u64, high: u64) -> u64 {
        let k = self.seed / Self::B;
        self.seed = Self::A * (self.seed % Self::B) - k * Self::C;
        if self.seed < 0 {
            self.seed += Self::M;
        }

        let fraction = self.seed as f64 / Self::M as f64;
        low + (fraction * (high - low + 1) as f64) as u64
    }
}

/// Generates a flow-shop instance the way the Taillard benchmark does:
/// times are drawn machine by machine from `1..=99`.
///
/// # Errors
/// - If `count_jobs` or `count_machines` is zero.
pub fn flow_job(count_jobs: usize, count_machines: usize, seed: i64) -> Result<Instance> {
    generate(count_jobs, count_machines, seed, |_| (1, 99))
}

/// Generates a 3-machine instance whose middle machine is dominated by the first one.
/// On such instances the second sub-problem of CDS is optimal.
///
/// # Errors
/// - If `count_jobs` is zero.
pub fn johnson_three_machines(count_jobs: usize, seed: i64) -> Result<Instance> {
    generate(count_jobs, 3, seed, |machine| match machine {
        0 => (50, 99),
        1 => (1, 49),
        _ => (1, 99),
    })
}

fn generate(
    count_jobs: usize,
    count_machines: usize,
    seed: i64,
    bounds: impl Fn(usize) -> (u64, u64),
) -> Result<Instance> {
    let mut rng = TaillardRng::new(seed);
    let mut times = vec![vec![0; count_machines]; count_jobs];

    for machine in 0..count_machines {
        let (low, high) = bounds(machine);
        for row in &mut times {
            row[machine] = rng.unif(low, high);
        }
    }

    Ok(Instance::new(times)?.with_initial_seed(seed))
}
