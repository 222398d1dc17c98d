use super::read_taillard;
use crate::core::{Instance, Sequencer};
use crate::solve;
use anyhow::{anyhow, ensure};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Returns the relative distance of a makespan from a reference value, in percent.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn deviation(end_time: u64, upper_bound: u64) -> f64 {
    (end_time as f64 - upper_bound as f64) / upper_bound as f64 * 100.0
}

/// Report of running a sequencer over a set of instances.
#[derive(Debug, Deserialize, Serialize)]
pub struct Report {
    sequencer: String,
    entries: Vec<ReportEntry>,
}

impl Report {
    /// Create a new report.
    fn new(sequencer: String) -> Self {
        let entries = Vec::new();
        Self { sequencer, entries }
    }

    /// Get the sequencer name.
    #[must_use]
    pub fn sequencer_name(&self) -> &str {
        &self.sequencer
    }

    /// Get the entries.
    #[must_use]
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Average deviation over the entries with a known upper bound.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_deviation(&self) -> Option<f64> {
        let deviations: Vec<_> = self.entries.iter().filter_map(|e| e.deviation).collect();
        if deviations.is_empty() {
            None
        } else {
            Some(deviations.iter().sum::<f64>() / deviations.len() as f64)
        }
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "Sequencer: {}", self.sequencer)?;
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        if let Some(average) = self.average_deviation() {
            writeln!(f, "Average deviation: {average:.2}%")?;
        }
        writeln!(f, "-------------------")
    }
}

/// Report of running a single instance.
#[non_exhaustive]
#[derive(Debug, Deserialize, Serialize)]
pub struct ReportEntry {
    pub name: String,
    pub end_time: u64,
    pub upper_bound: Option<u64>,
    pub deviation: Option<f64>,
    pub time: f64,
}

impl Display for ReportEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}: {}", self.name, self.end_time)?;
        if let (Some(upper_bound), Some(deviation)) = (self.upper_bound, self.deviation) {
            write!(f, " (upper bound {upper_bound}, {deviation:+.2}%)")?;
        }
        write!(f, " in {:.2} sec", self.time)
    }
}

/// Run the sequencer on all instances in the `samples` directory.
/// Print the report to stdout.
///
/// # Errors
/// - If a file cannot be read.
/// - If no samples are found.
/// - If the sequencer fails or produces an invalid sequence.
pub fn samples(sequencer: &mut dyn Sequencer) -> anyhow::Result<()> {
    run("samples", sequencer).and_then(|report| {
        if report.entries.is_empty() {
            Err(anyhow!("No samples found"))
        } else {
            println!("{report}");
            Ok(())
        }
    })
}

/// Run the sequencer on all instances of a Taillard file, or of every file in a directory.
/// Instances with a machine count the sequencer does not support are skipped.
///
/// # Errors
/// - If a file cannot be read or parsed.
/// - If the sequencer fails or produces an invalid sequence.
pub fn run(path: impl AsRef<Path>, sequencer: &mut dyn Sequencer) -> anyhow::Result<Report> {
    let mut report = Report::new(sequencer.name().into());

    for file in files(path.as_ref())? {
        let instances = read_taillard(&mut BufReader::new(File::open(&file)?))?;
        let stem = file.file_stem().and_then(|s| s.to_str()).unwrap_or("instance");

        for (index, instance) in instances.iter().enumerate() {
            let name = format!("{stem}#{}", index + 1);
            if !supports(sequencer, instance) {
                warn!(%name, sequencer = sequencer.name(), "Skipping unsupported instance");
                continue;
            }

            let entry = run_instance(name, instance, sequencer)?;
            info!(name = %entry.name, end_time = entry.end_time, "Instance solved");
            report.entries.push(entry);
        }
    }

    Ok(report)
}

/// Returns whether the sequencer can handle the machine count of the instance.
#[must_use]
pub fn supports(sequencer: &dyn Sequencer, instance: &Instance) -> bool {
    sequencer
        .required_machines()
        .map_or(true, |machines| machines == instance.count_machines())
}

fn run_instance(
    name: String,
    instance: &Instance,
    sequencer: &mut dyn Sequencer,
) -> anyhow::Result<ReportEntry> {
    let time = std::time::Instant::now();
    let (_, schedule) = solve(sequencer, instance)?;
    let time = time.elapsed().as_secs_f64();

    ensure!(schedule.verify(instance), "Invalid schedule created for {name}");

    let end_time = schedule.end_time();
    let upper_bound = instance.upper_bound();
    let deviation = upper_bound.map(|upper_bound| deviation(end_time, upper_bound));

    Ok(ReportEntry {
        name,
        end_time,
        upper_bound,
        deviation,
        time,
    })
}

fn files(path: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}
