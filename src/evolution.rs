//! The steady-state evolution loop (spec §4.10).
//!
//! Grounded on the teacher's `ga::GeneticAlgorithm::next` stage pipeline
//! (evaluate -> select -> breed/mutate -> reinsert -> stats) and
//! `statistic::{timed, ProcessingTime}`; the fixed generation order here
//! (selection -> recombination -> mutation -> evaluation -> population merge
//! -> statistics, spec §5 "Ordering guarantees") mirrors the teacher's
//! `Stage 2/3/4` comments in `ga::mod::GeneticAlgorithm::next` almost
//! verbatim, generalized from the teacher's configurable
//! selector/breeder/mutator/reinserter quartet to this domain's fixed
//! tournament -> linear-crossover -> macro/micro-mutation pipeline (spec
//! §4.10's pseudocode leaves no room for swapping operators per spec §1).

use std::fmt::{self, Debug, Formatter};

use tracing::{debug, info};

use crate::config::Config;
use crate::dataset::{Dataset, Target};
use crate::error::Error;
use crate::fitness::{self, FitnessFunction, Output};
use crate::generators::ProgramGenerator;
use crate::mutation::{MacroMutation, MicroMutation};
use crate::operation::Operation;
use crate::population::Population;
use crate::program::Program;
use crate::random::{random_probability, Prng};
use crate::recombination::LinearCrossover;
use crate::registers::RegisterSet;
use crate::selection;
use crate::statistic::{timed, ProcessingTime};

/// Per-generation aggregate statistics (spec §4.10 "Per-generation
/// statistics").
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationStatistics {
    pub generation: usize,
    pub best_fitness: f64,
    pub mean_fitness: f64,
    pub fitness_standard_deviation: f64,
    pub mean_program_length: f64,
    pub mean_effective_program_length: f64,
    /// Wall-clock time spent selecting, breeding, mutating, and evaluating
    /// this generation (spec §1 "the evaluation loop is performance-critical").
    pub processing_time: ProcessingTime,
}

fn statistics_for(
    generation: usize,
    population: &Population,
    processing_time: ProcessingTime,
) -> GenerationStatistics {
    let individuals = population.individuals();
    let n = individuals.len() as f64;

    let fitnesses: Vec<f64> = individuals.iter().map(Program::fitness).collect();
    let mean_fitness = fitnesses.iter().sum::<f64>() / n;
    let variance = fitnesses.iter().map(|f| (f - mean_fitness).powi(2)).sum::<f64>() / n;

    let mean_program_length =
        individuals.iter().map(|p| p.len() as f64).sum::<f64>() / n;
    let mean_effective_program_length =
        individuals.iter().map(|p| p.effective_len() as f64).sum::<f64>() / n;

    let best_fitness = individuals
        .iter()
        .map(Program::fitness)
        .fold(f64::INFINITY, f64::min);

    GenerationStatistics {
        generation,
        best_fitness,
        mean_fitness,
        fitness_standard_deviation: variance.sqrt(),
        mean_program_length,
        mean_effective_program_length,
        processing_time,
    }
}

/// `(best_program, final_population, per_generation_statistics)` (spec §3
/// "Evolution result").
#[derive(Clone, Debug)]
pub struct EvolutionResult {
    pub best_program: Program,
    pub final_population: Population,
    pub statistics: Vec<GenerationStatistics>,
}

/// The operators and parameters one steady-state run needs, resolved from
/// [`Config`] plus the concrete [`Operation`] pool and
/// [`FitnessFunction`](crate::fitness::FitnessFunction) (which, per spec §1,
/// the core treats as external collaborators passed in rather than resolved
/// internally).
pub struct EvolutionModel<'a, G: ProgramGenerator> {
    config: Config,
    operations: Vec<Operation>,
    generator: G,
    fitness_fn: &'a dyn FitnessFunction,
    make_registers: Box<dyn Fn() -> RegisterSet + Sync + 'a>,
    tournament_size: usize,
    macro_mutation: MacroMutation,
    micro_mutation: MicroMutation,
    crossover: LinearCrossover,
    constant_mutation_function: Box<dyn Fn(f64) -> f64 + Sync + 'a>,
}

impl<G: ProgramGenerator> Debug for EvolutionModel<'_, G> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvolutionModel")
            .field("config", &self.config)
            .field("tournament_size", &self.tournament_size)
            .field("macro_mutation", &self.macro_mutation)
            .field("micro_mutation", &self.micro_mutation)
            .field("crossover", &self.crossover)
            .finish_non_exhaustive()
    }
}

impl<'a, G: ProgramGenerator + Sync> EvolutionModel<'a, G> {
    /// Assembles a run from a validated `config`, the resolved operation
    /// pool, a program generator, a fitness function, a register-set
    /// factory, the binary tournament size, and the additive constant
    /// mutation function (spec §4.9 step 6 "e.g. additive Gaussian noise").
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Config,
        operations: Vec<Operation>,
        generator: G,
        fitness_fn: &'a dyn FitnessFunction,
        make_registers: impl Fn() -> RegisterSet + Sync + 'a,
        tournament_size: usize,
        constant_mutation_function: impl Fn(f64) -> f64 + Sync + 'a,
    ) -> Self {
        let crossover = LinearCrossover::new(
            config.maximum_program_length / 4,
            config.maximum_program_length / 2,
            config.maximum_program_length / 8,
            config.minimum_program_length,
            config.maximum_program_length,
        );
        let macro_mutation = MacroMutation::new(
            0.5,
            config.minimum_program_length,
            config.maximum_program_length,
            config.constants_rate,
        );
        let micro_mutation = MicroMutation::new(
            config.micro_mutation_rate,
            (1.0 - config.micro_mutation_rate) / 2.0,
            config.constants_rate,
        );
        EvolutionModel {
            config,
            operations,
            generator,
            fitness_fn,
            make_registers: Box::new(make_registers),
            tournament_size,
            macro_mutation,
            micro_mutation,
            crossover,
            constant_mutation_function: Box::new(constant_mutation_function),
        }
    }

    /// Runs the steady-state loop for `config.generations` generations, or
    /// until `best.fitness <= config.stopping_criterion`, whichever comes
    /// first (spec §4.10).
    pub fn run(&self, rng: &mut Prng, dataset: &Dataset) -> Result<EvolutionResult, Error> {
        info!(population_size = self.config.population_size, "starting evolution run");

        let mut population = Population::generate(
            &self.generator,
            self.config.population_size,
            self.make_registers.as_ref(),
            rng.fork(),
        )?;
        for individual in population.individuals_mut() {
            fitness::evaluate(individual, dataset, self.fitness_fn)?;
        }

        let mut best = population
            .fittest()
            .cloned()
            .expect("population_size > 0 guaranteed by Config::validate");
        let mut statistics = Vec::with_capacity(self.config.generations);

        for generation in 0..self.config.generations {
            if best.fitness() <= self.config.stopping_criterion {
                break;
            }

            let timed_generation = timed(|| -> Result<(), Error> {
                // Stage: selection (removes parents from the population).
                let (mut mother, mut father) =
                    selection::binary_tournament(rng, &mut population, self.tournament_size)?;

                // Stage: recombination.
                if random_probability(rng) < self.config.crossover_rate {
                    self.crossover.crossover(
                        rng,
                        mother.instructions_mut(),
                        father.instructions_mut(),
                    );
                }

                // Stage: mutation (independent draws per child, spec §4.10).
                self.mutate_child(rng, &mut mother);
                self.mutate_child(rng, &mut father);

                // Stage: evaluation.
                fitness::evaluate(&mut mother, dataset, self.fitness_fn)?;
                fitness::evaluate(&mut father, dataset, self.fitness_fn)?;

                if mother.fitness() < best.fitness() {
                    best = mother.clone();
                }
                if father.fitness() < best.fitness() {
                    best = father.clone();
                }

                // Stage: population merge (restores population size).
                population.individuals_mut().push(mother);
                population.individuals_mut().push(father);
                Ok(())
            });
            timed_generation.result?;

            // Stage: statistics.
            let stats = statistics_for(generation, &population, timed_generation.time);
            debug!(
                generation = stats.generation,
                best_fitness = stats.best_fitness,
                mean_fitness = stats.mean_fitness,
                "generation complete"
            );
            statistics.push(stats);
        }

        info!(best_fitness = best.fitness(), generations_run = statistics.len(), "evolution run finished");

        Ok(EvolutionResult {
            best_program: best,
            final_population: population,
            statistics,
        })
    }

    fn mutate_child(&self, rng: &mut Prng, child: &mut Program) {
        if random_probability(rng) < self.config.micro_mutation_rate {
            self.micro_mutation.mutate(
                rng,
                &self.operations,
                self.constant_mutation_function.as_ref(),
                child,
            );
        } else if random_probability(rng) < self.config.macro_mutation_rate {
            self.macro_mutation.mutate(rng, &self.operations, child);
        }
    }

    /// Test phase (spec §4.10 "Test phase"): resets `program`'s registers,
    /// loads each sample's features, executes, and collects
    /// `(predicted, expected)` pairs for the caller to score.
    pub fn test(&self, program: &mut Program, dataset: &Dataset) -> Result<Vec<(Output, Target)>, Error> {
        fitness::test_phase(program, dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::dataset::Sample;
    use crate::fitness::MeanSquaredError;
    use crate::generators::{EffectiveProgramGenerator, GeneratorConfig};
    use crate::ops::builtin::standard_registry;

    fn identity_dataset() -> Dataset {
        Dataset::new(
            (0..5)
                .map(|i| (Sample::new(vec![i as f64]), Target::Single(i as f64)))
                .collect(),
        )
        .unwrap()
    }

    fn model() -> EvolutionModel<'static, EffectiveProgramGenerator> {
        let registry = standard_registry();
        let operations = registry.resolve(&["add".to_string(), "sub".to_string()]).unwrap();
        let config = Config {
            operations: vec!["add".to_string(), "sub".to_string()],
            num_features: 1,
            population_size: 30,
            generations: 50,
            minimum_program_length: 4,
            maximum_program_length: 16,
            initial_minimum_program_length: 4,
            initial_maximum_program_length: 8,
            stopping_criterion: 0.0,
            constants_rate: 0.0,
            ..Config::default()
        };
        let generator_config = GeneratorConfig {
            operations: operations.clone(),
            constants_rate: config.constants_rate,
            branch_initialisation_rate: config.branch_initialisation_rate,
            initial_minimum_program_length: config.initial_minimum_program_length,
            initial_maximum_program_length: config.initial_maximum_program_length,
            output_register_indices: vec![1],
        };
        let generator = EffectiveProgramGenerator::new(generator_config);
        let fitness_fn: &'static MeanSquaredError = Box::leak(Box::new(MeanSquaredError));
        EvolutionModel::new(
            config,
            operations,
            generator,
            fitness_fn,
            || RegisterSet::with_zero_default(1, 3, &[]),
            4,
            |v| v,
        )
    }

    /// Scenario S1 (spec §8): identity regression converges to zero MSE
    /// within 50 generations from a seeded run.
    #[test]
    fn scenario_s1_identity_regression_converges() {
        let model = model();
        let mut rng = Prng::from_seed(1234);
        let result = model.run(&mut rng, &identity_dataset()).unwrap();
        assert!(result.best_program.fitness() < 1e-6, "best fitness was {}", result.best_program.fitness());
    }

    /// Scenario S12 (spec §8 "Stopping criterion"): once the stopping
    /// criterion is met, statistics has exactly `g+1` entries and the best
    /// program satisfies the criterion.
    #[test]
    fn stopping_criterion_truncates_statistics() {
        let model = model();
        let mut rng = Prng::from_seed(1234);
        let result = model.run(&mut rng, &identity_dataset()).unwrap();
        if let Some(stopping_generation) = result
            .statistics
            .iter()
            .position(|s| s.best_fitness <= 0.0)
        {
            assert_eq!(result.statistics.len(), stopping_generation + 1);
        }
        assert!(result.best_program.fitness() <= 1e-6);
    }

    #[test]
    fn population_size_is_restored_every_generation() {
        let model = model();
        let mut rng = Prng::from_seed(99);
        let result = model.run(&mut rng, &identity_dataset()).unwrap();
        assert_eq!(result.final_population.size(), 30);
    }
}
