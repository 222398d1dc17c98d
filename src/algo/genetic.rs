use crate::core::{Error, Evaluator, Instance, Result, Sequencer};
use ahash::{HashMap, HashMapExt};
use rand::prelude::*;
use std::cmp::Ordering;
use tracing::{debug, trace};

const MUTATION_PERCENT: u32 = 5;
const TOURNAMENT_SIZE: usize = 4;
const STAGNATION_FACTOR: usize = 6;

/// Crossover operator producing a child from two parents.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Crossover {
    /// Order crossover: keeps a section of the first parent, fills the rest in the order of the second.
    #[default]
    Order,
    /// Cycle crossover: copies whole position cycles from a randomly chosen parent.
    Cycle,
}

/// Mutation operator.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Mutation {
    /// Swaps two adjacent jobs.
    #[default]
    Point,
    /// Swaps two arbitrary jobs.
    Saltation,
}

/// Genetic algorithm over job permutations.
///
/// The population is seeded with a given sequence and its adjacent swaps, or with random
/// permutations. Parents are drawn uniformly, children are mutated with a 5% chance and the next
/// generation is chosen by 4-way tournaments. The best parent always survives. Evolution stops
/// after `6 * count_jobs` generations without improvement or after the generation limit.
#[derive(Clone, Debug)]
pub struct Genetic {
    population: usize,
    generations: usize,
    crossover: Crossover,
    mutation: Mutation,
    initial: Option<Vec<usize>>,
    rng: StdRng,
}

impl Genetic {
    /// Creates a new genetic algorithm with a fixed seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            population: 10,
            generations: 800,
            crossover: Crossover::default(),
            mutation: Mutation::default(),
            initial: None,
            rng,
        }
    }

    /// Sets the population size.
    #[must_use]
    pub fn with_population(mut self, population: usize) -> Self {
        self.population = population.max(1);
        self
    }

    /// Sets the maximum number of generations.
    #[must_use]
    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    /// Sets the crossover operator.
    #[must_use]
    pub fn with_crossover(mut self, crossover: Crossover) -> Self {
        self.crossover = crossover;
        self
    }

    /// Sets the mutation operator.
    #[must_use]
    pub fn with_mutation(mut self, mutation: Mutation) -> Self {
        self.mutation = mutation;
        self
    }

    /// Seeds the initial population with the given sequence and its adjacent swaps.
    #[must_use]
    pub fn with_initial(mut self, sequence: Vec<usize>) -> Self {
        self.initial = Some(sequence);
        self
    }

    /// Runs the evolution and returns the best sequence found.
    ///
    /// # Errors
    /// - If the initial sequence is not a permutation of all jobs.
    pub fn evolve(&mut self, instance: &Instance) -> Result<Vec<usize>> {
        let jobs = instance.count_jobs();
        if let Some(initial) = &self.initial {
            instance.validate_sequence(initial)?;
            if initial.len() != jobs {
                let (what, value) = ("initial sequence length", initial.len());
                return Err(Error::OutOfRange { what, value, max: jobs });
            }
        }

        if jobs == 1 {
            return Ok(vec![0]);
        }

        let mut fitness = Fitness::new(instance);
        let mut parents = self.initial_population(jobs, &mut fitness);
        let mut best = parents.iter().min().cloned().unwrap_or_default();
        let mut stagnant = 0;
        let mut generation = 0;

        while stagnant < STAGNATION_FACTOR * jobs && generation < self.generations {
            generation += 1;

            let mut pool = self.reproduce(&parents, &mut fitness);
            let elite = parents.iter().min().cloned().unwrap_or_default();
            parents = self.tournament(&mut pool);
            parents.push(elite);

            match parents.iter().min() {
                Some(candidate) if candidate.end_time < best.end_time => {
                    trace!(generation, end_time = candidate.end_time, "New best individual");
                    best = candidate.clone();
                    stagnant = 0;
                }
                _ => stagnant += 1,
            }
        }

        debug!(generation, end_time = best.end_time, "Genetic algorithm finished");
        Ok(best.permutation)
    }

    fn initial_population(&mut self, jobs: usize, fitness: &mut Fitness) -> Vec<Individual> {
        match &self.initial {
            Some(initial) => {
                let mut population = vec![fitness.individual(initial.clone())];
                for position in 1..jobs {
                    let mut permutation = initial.clone();
                    permutation.swap(position - 1, position);
                    population.push(fitness.individual(permutation));
                }
                population
            }
            None => (0..self.population)
                .map(|_| {
                    let mut permutation: Vec<_> = (0..jobs).collect();
                    permutation.shuffle(&mut self.rng);
                    fitness.individual(permutation)
                })
                .collect(),
        }
    }

    /// Returns children of random parent pairs together with their mutants.
    fn reproduce(&mut self, parents: &[Individual], fitness: &mut Fitness) -> Vec<Individual> {
        let mut pool = Vec::with_capacity(self.population * 5);

        for _ in 0..self.population * 2 {
            let (Some(first), Some(second)) =
                (parents.choose(&mut self.rng), parents.choose(&mut self.rng))
            else {
                break;
            };

            let children = match self.crossover {
                Crossover::Order => {
                    let size = first.permutation.len();
                    let mut points = [self.rng.gen_range(0..size), self.rng.gen_range(0..size)];
                    points.sort_unstable();
                    let [begin, end] = points;
                    [
                        order_crossover(&first.permutation, &second.permutation, begin, end),
                        order_crossover(&second.permutation, &first.permutation, begin, end),
                    ]
                }
                Crossover::Cycle => [
                    cycle_crossover(&first.permutation, &second.permutation, &mut self.rng),
                    cycle_crossover(&second.permutation, &first.permutation, &mut self.rng),
                ],
            };

            pool.extend(children.map(|child| fitness.individual(child)));
        }

        for index in 0..pool.len() {
            if self.rng.gen_ratio(MUTATION_PERCENT, 100) {
                let mutant = mutate(&pool[index].permutation, self.mutation, &mut self.rng);
                pool.push(fitness.individual(mutant));
            }
        }
        pool
    }

    /// Picks `population - 1` individuals from the pool, each the best of a random tournament.
    fn tournament(&mut self, pool: &mut Vec<Individual>) -> Vec<Individual> {
        let mut next = Vec::with_capacity(self.population);

        for _ in 1..self.population {
            if pool.is_empty() {
                break;
            }

            let mut winner = self.rng.gen_range(0..pool.len());
            for _ in 1..TOURNAMENT_SIZE {
                let challenger = self.rng.gen_range(0..pool.len());
                if pool[challenger] < pool[winner] {
                    winner = challenger;
                }
            }
            next.push(pool.remove(winner));
        }

        next
    }
}

impl Default for Genetic {
    fn default() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl Sequencer for Genetic {
    fn sequence(&mut self, instance: &Instance) -> Result<Vec<usize>> {
        self.evolve(instance)
    }

    fn name(&self) -> &'static str {
        "Genetic"
    }
}

#[allow(unsafe_code)]
#[linkme::distributed_slice(super::SEQUENCERS)]
static INSTANCE: fn() -> Box<dyn Sequencer> = || Box::new(Genetic::default());

/// Order crossover: the child keeps `first[begin..=end]` in place; remaining positions, starting
/// after `end` and wrapping around, receive the missing jobs in the order they appear in `second`
/// starting after `end`.
fn order_crossover(first: &[usize], second: &[usize], begin: usize, end: usize) -> Vec<usize> {
    let size = first.len();
    let mut kept = vec![false; size];
    for &job in &first[begin..=end] {
        kept[job] = true;
    }

    let mut missing = second[end + 1..]
        .iter()
        .chain(&second[..=end])
        .copied()
        .filter(|&job| !kept[job]);

    let mut child = first.to_vec();
    for position in (end + 1..size).chain(0..begin) {
        if let Some(job) = missing.next() {
            child[position] = job;
        }
    }
    child
}

/// Cycle crossover: every position cycle is copied as a whole from a randomly chosen parent.
fn cycle_crossover(first: &[usize], second: &[usize], rng: &mut impl Rng) -> Vec<usize> {
    let size = first.len();
    let mut position_in_first = vec![0; size];
    for (position, &job) in first.iter().enumerate() {
        position_in_first[job] = position;
    }

    let mut child = first.to_vec();
    let mut visited = vec![false; size];
    for start in 0..size {
        if visited[start] {
            continue;
        }

        let parent = if rng.gen_bool(0.5) { first } else { second };
        let mut position = start;
        while !visited[position] {
            visited[position] = true;
            child[position] = parent[position];
            position = position_in_first[second[position]];
        }
    }
    child
}

fn mutate(permutation: &[usize], mutation: Mutation, rng: &mut impl Rng) -> Vec<usize> {
    let mut mutant = permutation.to_vec();
    let size = mutant.len();

    match mutation {
        Mutation::Point => {
            let position = rng.gen_range(0..size - 1);
            mutant.swap(position, position + 1);
        }
        Mutation::Saltation => {
            let first = rng.gen_range(0..size);
            let mut second = rng.gen_range(0..size);
            if first == second {
                second = if second == 0 { 1 } else { second - 1 };
            }
            mutant.swap(first, second);
        }
    }
    mutant
}

/// Makespan evaluation with a cache of already seen permutations.
struct Fitness<'a> {
    evaluator: Evaluator<'a>,
    cache: HashMap<Vec<usize>, u64>,
}

impl<'a> Fitness<'a> {
    fn new(instance: &'a Instance) -> Self {
        let evaluator = Evaluator::new(instance);
        let cache = HashMap::new();
        Self { evaluator, cache }
    }

    fn individual(&mut self, permutation: Vec<usize>) -> Individual {
        let end_time = match self.cache.get(&permutation) {
            Some(&end_time) => end_time,
            None => {
                let end_time = self.evaluator.end_time(&permutation);
                self.cache.insert(permutation.clone(), end_time);
                end_time
            }
        };
        Individual {
            permutation,
            end_time,
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct Individual {
    permutation: Vec<usize>,
    end_time: u64,
}

impl PartialOrd for Individual {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Individual {
    fn cmp(&self, other: &Self) -> Ordering {
        let ord = self.end_time.cmp(&other.end_time);
        if ord == Ordering::Equal {
            self.permutation.cmp(&other.permutation)
        } else {
            ord
        }
    }
}
