mod error;
mod eval;
mod generator;
mod problem;
mod routing;
mod solution;
mod util;

pub use error::*;
pub use eval::*;
pub use generator::*;
pub use problem::*;
pub use routing::*;
pub use solution::*;
pub use util::*;

/// Builds a job sequence for an instance.
pub trait Sequencer {
    /// Returns a permutation of all jobs of the given instance.
    ///
    /// # Errors
    /// - If the instance does not meet the requirements of the sequencer.
    fn sequence(&mut self, instance: &Instance) -> Result<Vec<usize>>;

    /// Returns the number of machines the sequencer is restricted to, if any.
    fn required_machines(&self) -> Option<usize> {
        None
    }

    /// Returns the name of the sequencer.
    fn name(&self) -> &str;
}

impl<S: Sequencer + ?Sized> Sequencer for Box<S> {
    fn sequence(&mut self, instance: &Instance) -> Result<Vec<usize>> {
        (**self).sequence(instance)
    }

    fn required_machines(&self) -> Option<usize> {
        (**self).required_machines()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
