mod cds;
mod genetic;
mod johnson;
mod liu_reeves;
mod local_search;
mod neh;
mod palmer;

pub use cds::{cds, Cds};
pub use genetic::{Crossover, Genetic, Mutation};
pub use johnson::{johnson, Johnson};
pub use liu_reeves::{liu_reeves, liu_reeves_candidates, LiuReeves, DEFAULT_SEQUENCES};
pub use local_search::{combined, pairwise_swap, reinsertion, Refined};
pub use neh::{insert_jobs, neh, Neh};
pub use palmer::{palmer, slope_index, Palmer};

use crate::core::Sequencer;

/// Constructors of every registered sequencer.
#[allow(unsafe_code)]
#[linkme::distributed_slice]
pub static SEQUENCERS: [fn() -> Box<dyn Sequencer>];

/// Returns a new instance of the registered sequencer with the given name.
#[must_use]
pub fn find(name: &str) -> Option<Box<dyn Sequencer>> {
    SEQUENCERS
        .iter()
        .map(|init| init())
        .find(|sequencer| sequencer.name() == name)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn registers_all_sequencers() {
        let mut names: Vec<_> = SEQUENCERS
            .iter()
            .map(|init| init().name().to_owned())
            .collect();
        names.sort_unstable();
        assert_eq!(names, ["CDS", "Genetic", "Johnson", "LR", "NEH", "Palmer"]);
    }

    #[test]
    fn finds_by_name() {
        assert_eq!(find("NEH").map(|s| s.name().to_owned()), Some("NEH".into()));
        assert!(find("Tabu").is_none());
    }
}
