use thiserror::Error;

/// Errors reported by the scheduling core.
#[non_exhaustive]
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum Error {
    /// The processing-time matrix has no jobs or no machines.
    #[error("processing times must contain at least one job and one machine")]
    EmptyInstance,

    /// A row of the processing-time matrix has a different length than the first one.
    #[error("job {job} has {found} processing times, expected {expected}")]
    RaggedRow {
        job: usize,
        expected: usize,
        found: usize,
    },

    /// An algorithm was given an instance with an unsupported number of machines.
    #[error("instance has {found} machines, expected {expected}")]
    InvalidMachineCount { expected: usize, found: usize },

    /// A count argument is zero or exceeds the instance bounds.
    #[error("{what} must be in 1..={max}, got {value}")]
    OutOfRange {
        what: &'static str,
        value: usize,
        max: usize,
    },

    /// A sequence contains a duplicated or unknown job index.
    #[error("job {job} is duplicated or out of range in the sequence")]
    NotAPermutation { job: usize },

    /// A processing order refers to a machine outside `1..=count_machines`.
    #[error("processing order of job {job} refers to unknown machine {machine}")]
    InvalidRoute { job: usize, machine: usize },

    /// A Taillard file could not be parsed.
    #[error("line {line}: {message}")]
    Format { line: usize, message: String },
}

/// Result type of the scheduling core.
pub type Result<T> = std::result::Result<T, Error>;
