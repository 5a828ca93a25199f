//! A set of candidate programs (spec §3 "Population", implicit in the
//! steady-state evolution model of spec §4.10).
//!
//! Grounded directly on the teacher's `population::Population` /
//! `PopulationBuilder`: same thin `Vec`-wrapper shape, same
//! divide-and-conquer parallel build recursing through `rayon::join` once
//! the remaining slice is large enough to be worth splitting, forking an
//! independent `Prng` stream per half exactly as `PopulationBuilder::
//! build_population` forks via `rng.jump()`, generalized here into the
//! explicit [`crate::random::Prng::fork`] method.

use crate::error::Error;
use crate::generators::ProgramGenerator;
use crate::program::Program;
use crate::random::Prng;
use crate::registers::RegisterSet;

/// The minimum slice size below which building a sub-population
/// sequentially is cheaper than paying for a `rayon::join`.
const PARALLEL_THRESHOLD: usize = 50;

/// A set of programs under evolution.
#[derive(Clone, Debug, PartialEq)]
pub struct Population {
    individuals: Vec<Program>,
}

impl Population {
    pub fn with_individuals(individuals: Vec<Program>) -> Self {
        Population { individuals }
    }

    pub fn individuals(&self) -> &[Program] {
        &self.individuals
    }

    pub fn individuals_mut(&mut self) -> &mut Vec<Program> {
        &mut self.individuals
    }

    pub fn into_individuals(self) -> Vec<Program> {
        self.individuals
    }

    pub fn size(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// The individual with the lowest (best) fitness, if the population is
    /// non-empty.
    pub fn fittest(&self) -> Option<&Program> {
        self.individuals
            .iter()
            .min_by(|a, b| a.fitness().partial_cmp(&b.fitness()).unwrap())
    }

    /// Builds a population of `size` freshly generated programs, one fresh
    /// register set per individual, splitting the work across a
    /// `rayon::join` divide-and-conquer recursion once the remaining count
    /// exceeds [`PARALLEL_THRESHOLD`], exactly as the teacher's
    /// `PopulationBuilder::build_population` does for its genomes.
    pub fn generate<G>(
        generator: &G,
        size: usize,
        make_registers: &(dyn Fn() -> RegisterSet + Sync),
        rng: Prng,
    ) -> Result<Self, Error>
    where
        G: ProgramGenerator + Sync,
    {
        let individuals = build_individuals(generator, size, make_registers, rng)?;
        Ok(Population { individuals })
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn build_individuals<G>(
    generator: &G,
    size: usize,
    make_registers: &(dyn Fn() -> RegisterSet + Sync),
    mut rng: Prng,
) -> Result<Vec<Program>, Error>
where
    G: ProgramGenerator + Sync,
{
    if size < PARALLEL_THRESHOLD {
        (0..size)
            .map(|_| generator.generate(&mut rng, make_registers()))
            .collect()
    } else {
        let rng_left = rng.fork();
        let rng_right = rng.fork();
        let left_size = size / 2;
        let right_size = size - left_size;
        let (left, right) = rayon::join(
            || build_individuals(generator, left_size, make_registers, rng_left),
            || build_individuals(generator, right_size, make_registers, rng_right),
        );
        let mut individuals = left?;
        individuals.extend(right?);
        Ok(individuals)
    }
}

#[cfg(target_arch = "wasm32")]
fn build_individuals<G>(
    generator: &G,
    size: usize,
    make_registers: &(dyn Fn() -> RegisterSet + Sync),
    mut rng: Prng,
) -> Result<Vec<Program>, Error>
where
    G: ProgramGenerator + Sync,
{
    (0..size)
        .map(|_| generator.generate(&mut rng, make_registers()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{GeneratorConfig, RandomProgramGenerator};
    use crate::operation::{Arity, Operation};

    #[test]
    fn generate_builds_requested_population_size() {
        let config = GeneratorConfig {
            operations: vec![Operation::new("add", Arity::Binary, |a| a[0] + a[1])],
            constants_rate: 0.0,
            branch_initialisation_rate: 0.0,
            initial_minimum_program_length: 3,
            initial_maximum_program_length: 6,
            output_register_indices: vec![1],
        };
        let generator = RandomProgramGenerator::new(config);
        let population = Population::generate(
            &generator,
            120,
            &|| RegisterSet::with_zero_default(1, 2, &[]),
            Prng::from_seed(42),
        )
        .unwrap();
        assert_eq!(population.size(), 120);
    }

    #[test]
    fn fittest_returns_minimum_fitness_individual() {
        let registers = || RegisterSet::with_zero_default(1, 1, &[]);
        let add = Operation::new("add", Arity::Binary, |a| a[0] + a[1]);
        let mut p1 = Program::new(
            vec![crate::instruction::Instruction::new(add.clone(), 1, vec![0, 0])],
            vec![1],
            registers(),
        )
        .unwrap();
        let mut p2 = Program::new(
            vec![crate::instruction::Instruction::new(add, 1, vec![0, 0])],
            vec![1],
            registers(),
        )
        .unwrap();
        p1.set_fitness(5.0);
        p2.set_fitness(1.0);
        let population = Population::with_individuals(vec![p1, p2]);
        assert_eq!(population.fittest().unwrap().fitness(), 1.0);
    }
}
