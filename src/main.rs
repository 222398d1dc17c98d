use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use flow_shop_scheduling::core::{flow_job, johnson_three_machines, Instance, Sequencer};
use flow_shop_scheduling::{algo, data, solve};
use rand::prelude::*;
use std::fs::File;
use std::io::{BufReader, Write};
use std::num::NonZero;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, Debug)]
struct Algorithm(usize, &'static str);

impl From<Algorithm> for Box<dyn Sequencer> {
    fn from(value: Algorithm) -> Box<dyn Sequencer> {
        algo::SEQUENCERS[value.0]()
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.1)
    }
}

impl ValueEnum for Algorithm {
    fn value_variants<'a>() -> &'a [Self] {
        static ALGORITHMS: std::sync::LazyLock<Vec<Algorithm>> = std::sync::LazyLock::new(|| {
            let iter = algo::SEQUENCERS.iter().enumerate();
            iter.map(|(i, init)| {
                let name: &'static str = init().name().to_owned().leak();
                Algorithm(i, name)
            })
            .collect()
        });

        ALGORITHMS.as_slice()
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.1))
    }
}

/// Heuristics for the permutation flow-shop problem minimizing makespan.
#[derive(Debug, Parser)]
enum Application {
    /// Run one of the implemented heuristics.
    Run {
        algorithm: Algorithm,
        /// Taillard file, or a JSON instance if the extension is `.json`.
        input: PathBuf,
        /// Solve only the instance with this 1-based index.
        #[clap(short, long)]
        index: Option<NonZero<usize>>,
        /// Refine the sequence with the combined local search.
        #[clap(short, long)]
        local_search: bool,
        /// Print the detailed schedule as JSON.
        #[clap(short, long)]
        json: bool,
    },
    /// Run benchmarks on a Taillard file or a directory of them.
    Bench {
        /// The input file or directory.
        input: String,
        /// Exclude heuristics.
        #[clap(short, long, value_delimiter = ',')]
        exclude: Vec<Algorithm>,
    },
    /// Generate instances with the Taillard generator.
    Gen {
        /// The number of jobs.
        jobs: NonZero<usize>,
        /// The number of machines.
        machines: NonZero<usize>,
        /// Seed of the first instance; the following ones use consecutive seeds.
        #[clap(short, long)]
        seed: Option<i64>,
        /// Number of instances to generate.
        #[clap(short, long, default_value = "1")]
        amount: NonZero<usize>,
        /// Generate 3-machine instances on which CDS is optimal.
        #[clap(short, long)]
        three_machine_johnson: bool,
        /// Path to output the generated instances. If the directory does not exist, it will be created.
        #[clap(short, long, default_value = "output")]
        output: String,
    },
}

fn sequencers(exclude: &[Algorithm]) -> impl Iterator<Item = Box<dyn Sequencer>> + '_ {
    let iter = algo::SEQUENCERS.iter().map(|init| init());
    iter.filter(|sequencer| !exclude.iter().any(|name| name.1 == sequencer.name()))
}

fn read_instances(input: &Path) -> anyhow::Result<Vec<Instance>> {
    let mut reader = BufReader::new(File::open(input).with_context(|| input.display().to_string())?);
    if input.extension().is_some_and(|ext| ext == "json") {
        Ok(vec![serde_json::from_reader(reader)?])
    } else {
        data::read_taillard(&mut reader)
    }
}

fn run(
    sequencer: &mut dyn Sequencer,
    instances: &[Instance],
    index: Option<NonZero<usize>>,
    json: bool,
) -> anyhow::Result<()> {
    let selected: Vec<_> = match index {
        Some(index) => match instances.get(index.get() - 1) {
            Some(instance) => vec![(index.get(), instance)],
            None => bail!("Instance {index} not found, file has {}", instances.len()),
        },
        None => (1..).zip(instances).collect(),
    };

    for (number, instance) in selected {
        if !data::supports(sequencer, instance) {
            warn!(number, sequencer = sequencer.name(), "Skipping unsupported instance");
            continue;
        }

        let (sequence, schedule) = solve(sequencer, instance)?;
        info!(number, end_time = schedule.end_time(), "Instance solved");

        if json {
            println!("{}", serde_json::to_string(&schedule)?);
            continue;
        }

        let sequence: Vec<_> = sequence.iter().map(ToString::to_string).collect();
        print!("#{number}: [{}] {}", sequence.join(", "), schedule.end_time());
        if let Some(upper_bound) = instance.upper_bound() {
            let deviation = data::deviation(schedule.end_time(), upper_bound);
            print!(" (upper bound {upper_bound}, {deviation:+.2}%)");
        }
        println!();
    }

    Ok(())
}

fn generate(
    jobs: usize,
    machines: usize,
    seeds: impl Iterator<Item = i64>,
    three_machine_johnson: bool,
) -> anyhow::Result<Vec<Instance>> {
    seeds
        .map(|seed| -> anyhow::Result<Instance> {
            let instance = if three_machine_johnson {
                johnson_three_machines(jobs, seed)
            } else {
                flow_job(jobs, machines, seed)
            };
            Ok(instance?)
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match Application::parse() {
        Application::Run {
            algorithm,
            input,
            index,
            local_search,
            json,
        } => {
            let instances = read_instances(&input)?;
            let mut sequencer = Box::<dyn Sequencer>::from(algorithm);
            if local_search {
                sequencer = Box::new(algo::Refined::new(sequencer));
            }
            run(sequencer.as_mut(), &instances, index, json)
        }
        Application::Bench { input, exclude } => {
            for mut sequencer in sequencers(&exclude) {
                println!("{}", data::run(&input, sequencer.as_mut())?);
            }
            Ok(())
        }
        Application::Gen {
            jobs,
            machines,
            seed,
            amount,
            three_machine_johnson,
            output,
        } => {
            let jobs = jobs.get();
            let mut machines = machines.get();
            if three_machine_johnson && machines != 3 {
                warn!(machines, "Ignoring the machine count, generating 3-machine instances");
                machines = 3;
            }

            let first = seed.unwrap_or_else(|| thread_rng().gen_range(1..i64::from(i32::MAX)));
            let seeds = (0..).map(|i| first + i).take(amount.get());
            let instances = generate(jobs, machines, seeds, three_machine_johnson)?;

            let output = std::path::Path::new(&output);
            if !output.try_exists()? {
                std::fs::create_dir_all(output)?;
            }

            let filename = format!("{jobs}jobs_{machines}machines.txt");
            File::create(output.join(filename))?
                .write_all(data::to_taillard(&instances)?.as_bytes())?;
            Ok(())
        }
    }
}
