//! Reading and writing instances in the Taillard benchmark format.
//!
//! A file is a list of blocks:
//!
//! ```text
//! number of jobs, number of machines, initial seed, upper bound and lower bound :
//!           20           5   873654221        1278        1232
//! processing times :
//! 54 83 15 71 77 36 53 38 27 87 76 91 14 29 12 77 32 87 68 94
//! ...
//! ```
//!
//! Processing times are given machine by machine, one row per machine.
//! A seed or a bound of zero means the value is unknown.

mod run;

pub use run::*;

use crate::core::{Error, Instance, Result};
use std::fmt::Write;
use std::io::BufRead;

const HEADER: &str = "number of jobs, number of machines, initial seed, upper bound and lower bound :";
const TIMES: &str = "processing times :";

struct Lines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
    last: usize,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        let inner = text.lines().enumerate();
        Self { inner, last: 0 }
    }

    /// Returns the next non-empty line with its 1-based number.
    fn next_line(&mut self) -> Option<(usize, &'a str)> {
        let (index, line) = self.inner.find(|(_, line)| !line.trim().is_empty())?;
        self.last = index + 1;
        Some((self.last, line.trim()))
    }

    fn require(&mut self, what: &str) -> Result<(usize, &'a str)> {
        self.next_line().ok_or_else(|| Error::Format {
            line: self.last + 1,
            message: format!("unexpected end of input, expected {what}"),
        })
    }

    fn require_label(&mut self, label: &str) -> Result<()> {
        let (line, text) = self.require(label)?;
        if text.starts_with(&label[..label.len() - 2]) {
            Ok(())
        } else {
            let message = format!("expected \"{label}\", found \"{text}\"");
            Err(Error::Format { line, message })
        }
    }
}

fn numbers<T: std::str::FromStr>(line: usize, text: &str) -> Result<Vec<T>> {
    text.split_whitespace()
        .map(|token| {
            token.parse().map_err(|_| Error::Format {
                line,
                message: format!("invalid number \"{token}\""),
            })
        })
        .collect()
}

fn parse_block(lines: &mut Lines<'_>) -> Result<Instance> {
    let (line, header) = lines.require("instance parameters")?;
    let header: Vec<u64> = numbers(line, header)?;
    let &[jobs, machines, seed, upper_bound, lower_bound] = header.as_slice() else {
        let message = format!("expected 5 instance parameters, found {}", header.len());
        return Err(Error::Format { line, message });
    };

    let invalid = |what: &str| Error::Format {
        line,
        message: format!("{what} out of range"),
    };
    let jobs = usize::try_from(jobs).map_err(|_| invalid("number of jobs"))?;
    let machines = usize::try_from(machines).map_err(|_| invalid("number of machines"))?;
    let seed = i64::try_from(seed).map_err(|_| invalid("initial seed"))?;

    lines.require_label(TIMES)?;

    let mut times = vec![Vec::with_capacity(machines); jobs];
    for _ in 0..machines {
        let (line, text) = lines.require("processing times")?;
        let row: Vec<u64> = numbers(line, text)?;
        if row.len() != jobs {
            let message = format!("expected {jobs} processing times, found {}", row.len());
            return Err(Error::Format { line, message });
        }
        for (job, time) in row.into_iter().enumerate() {
            times[job].push(time);
        }
    }

    let mut instance = Instance::new(times).map_err(|error| Error::Format {
        line,
        message: error.to_string(),
    })?;
    if seed != 0 {
        instance = instance.with_initial_seed(seed);
    }
    if upper_bound != 0 {
        instance = instance.with_upper_bound(upper_bound);
    }
    if lower_bound != 0 {
        instance = instance.with_lower_bound(lower_bound);
    }
    Ok(instance)
}

/// Parses all instances of a Taillard file.
///
/// # Errors
/// - If the text contains no instance.
/// - If a block is malformed; the error carries the 1-based line number.
pub fn parse_taillard(text: &str) -> Result<Vec<Instance>> {
    let mut lines = Lines::new(text);
    let mut instances = Vec::new();

    while let Some((line, header)) = lines.next_line() {
        if !header.starts_with(&HEADER[..HEADER.len() - 2]) {
            let message = format!("expected instance header, found \"{header}\"");
            return Err(Error::Format { line, message });
        }
        instances.push(parse_block(&mut lines)?);
    }

    if instances.is_empty() {
        let (line, message) = (lines.last.max(1), "no instance found".into());
        return Err(Error::Format { line, message });
    }

    Ok(instances)
}

/// Reads all instances of a Taillard file from a reader.
///
/// # Errors
/// - If the reader fails.
/// - If the content is not a valid Taillard file.
pub fn read_taillard(reader: &mut impl BufRead) -> anyhow::Result<Vec<Instance>> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(parse_taillard(&text)?)
}

/// Writes instances in the Taillard format. Unknown seeds and bounds are written as zero.
///
/// # Errors
/// - If formatting fails.
pub fn to_taillard(instances: &[Instance]) -> anyhow::Result<String> {
    let mut text = String::new();

    for instance in instances {
        writeln!(text, "{HEADER}")?;
        writeln!(
            text,
            "{:12}{:12}{:12}{:12}{:12}",
            instance.count_jobs(),
            instance.count_machines(),
            instance.initial_seed().unwrap_or_default(),
            instance.upper_bound().unwrap_or_default(),
            instance.lower_bound().unwrap_or_default(),
        )?;
        writeln!(text, "{TIMES}")?;

        for machine in 0..instance.count_machines() {
            let row: Vec<_> = (0..instance.count_jobs())
                .map(|job| format!("{:2}", instance.time(job, machine)))
                .collect();
            writeln!(text, "{}", row.join(" "))?;
        }
    }

    Ok(text)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::flow_job;
    use std::io::BufReader;

    #[test]
    fn reads_samples() -> anyhow::Result<()> {
        let file = std::fs::File::open("samples/20jobs_5machines.txt")?;
        let instances = read_taillard(&mut BufReader::new(file))?;

        assert_eq!(instances.len(), 10);
        let first = &instances[0];
        assert_eq!(first.count_jobs(), 20);
        assert_eq!(first.count_machines(), 5);
        assert_eq!(first.initial_seed(), Some(873_654_221));
        assert_eq!(first.upper_bound(), Some(1278));
        assert_eq!(first.lower_bound(), Some(1232));
        assert_eq!(first.job_times(0), &[54, 79, 16, 66, 58]);
        assert_eq!(first.job_times(1), &[83, 3, 89, 58, 56]);

        for instance in &instances {
            let seed = instance.initial_seed().unwrap_or_default();
            let generated = flow_job(20, 5, seed)?;
            for job in 0..20 {
                assert_eq!(instance.job_times(job), generated.job_times(job));
            }
        }
        Ok(())
    }

    #[test]
    fn writes_what_it_reads() -> anyhow::Result<()> {
        let text = std::fs::read_to_string("samples/20jobs_5machines.txt")?;
        let instances = parse_taillard(&text)?;
        assert_eq!(to_taillard(&instances)?, text);
        Ok(())
    }

    #[test]
    fn unknown_values_are_zero() -> anyhow::Result<()> {
        let instance = Instance::new(vec![vec![1, 2], vec![3, 4], vec![5, 6]])?;
        let text = to_taillard(&[instance.clone()])?;
        assert!(text.contains("           3           2           0           0           0"));
        assert_eq!(parse_taillard(&text)?, vec![instance]);
        Ok(())
    }

    #[test]
    fn reports_line_numbers() {
        let missing_row = format!("{HEADER}\n2 2 0 0 0\n{TIMES}\n1 2\n");
        assert_eq!(
            parse_taillard(&missing_row),
            Err(Error::Format {
                line: 5,
                message: "unexpected end of input, expected processing times".into()
            })
        );

        let bad_number = format!("{HEADER}\n2 2 0 0 0\n{TIMES}\n1 2\n3 x\n");
        assert!(matches!(
            parse_taillard(&bad_number),
            Err(Error::Format { line: 5, .. })
        ));

        let short_row = format!("\n{HEADER}\n2 2 0 0 0\n{TIMES}\n1 2 3\n3 4\n");
        assert!(matches!(
            parse_taillard(&short_row),
            Err(Error::Format { line: 5, .. })
        ));

        let bad_header = format!("{HEADER}\n2 2 0 0\n");
        assert!(matches!(
            parse_taillard(&bad_header),
            Err(Error::Format { line: 2, .. })
        ));

        assert!(matches!(
            parse_taillard("garbage"),
            Err(Error::Format { line: 1, .. })
        ));
        assert!(matches!(
            parse_taillard(""),
            Err(Error::Format { line: 1, .. })
        ));
    }
}
