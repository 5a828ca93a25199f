//! Tournament selection (spec §4.7).
//!
//! Grounded on the teacher's `selection::tournament::TournamentSelector`:
//! same "mating pool of indices, sample a tournament, remove the winner so
//! it can't be picked twice" shape. Per this crate's Open Question decision
//! (see DESIGN.md), selection here is strictly deterministic — the
//! minimum-fitness participant always wins — rather than the teacher's
//! probability-weighted soft tournament, matching spec §4.7's "the one with
//! minimum fitness wins" wording exactly.

use crate::error::Error;
use crate::population::Population;
use crate::program::Program;
use crate::random::{random_index, Prng};

/// Draws `tournament_size` participants without replacement from
/// `mating_pool` (a list of indices into `individuals`), and returns the
/// index (into `mating_pool`) of the minimum-fitness participant.
fn run_tournament(
    rng: &mut Prng,
    individuals: &[Program],
    mating_pool: &[usize],
    tournament_size: usize,
) -> usize {
    let mut participants = Vec::with_capacity(tournament_size);
    let mut remaining: Vec<usize> = (0..mating_pool.len()).collect();
    for _ in 0..tournament_size {
        let draw = random_index(rng, remaining.len());
        participants.push(remaining.remove(draw));
    }

    participants
        .into_iter()
        .min_by(|&a, &b| {
            individuals[mating_pool[a]]
                .fitness()
                .partial_cmp(&individuals[mating_pool[b]].fitness())
                .unwrap()
        })
        .expect("tournament_size is verified > 0 by the caller")
}

/// Runs two independent, no-replacement tournaments of `tournament_size`
/// participants each, permanently removing each winner from `population` so
/// it cannot be drawn again across the two tournaments, and returns clones
/// of the two winners as a parent pair (spec §4.7 "Binary tournament").
///
/// Fails with `Error::SelectionArgument` if `tournament_size < 2` or
/// `population.size() < 2 * tournament_size`.
pub fn binary_tournament(
    rng: &mut Prng,
    population: &mut Population,
    tournament_size: usize,
) -> Result<(Program, Program), Error> {
    if tournament_size < 2 {
        return Err(Error::SelectionArgument(
            "tournament_size must be >= 2".to_string(),
        ));
    }
    if population.size() < 2 * tournament_size {
        return Err(Error::SelectionArgument(format!(
            "population of size {} is too small for two tournaments of size {}",
            population.size(),
            tournament_size
        )));
    }

    let mut mating_pool: Vec<usize> = (0..population.size()).collect();
    let individuals = population.individuals().to_vec();

    let winner_position = run_tournament(rng, &individuals, &mating_pool, tournament_size);
    let first_index = mating_pool.remove(winner_position);
    let first = individuals[first_index].clone();

    let winner_position = run_tournament(rng, &individuals, &mating_pool, tournament_size);
    let second_index = mating_pool.remove(winner_position);
    let second = individuals[second_index].clone();

    let mut removed = vec![first_index, second_index];
    removed.sort_unstable();
    for index in removed.into_iter().rev() {
        population.individuals_mut().remove(index);
    }

    Ok((first, second))
}

/// Whether [`general_tournament`] leaves selected winners in the population
/// or removes them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reinsertion {
    RemoveWinners,
    KeepWinners,
}

/// Runs `2 * number_of_offspring` independent tournaments of
/// `tournament_size` participants each, returning `2 * number_of_offspring`
/// winners as sequential parent pairs — two children are bred from each
/// pair via crossover (spec §4.7 "General tournament"). `reinsertion`
/// controls whether each tournament's winner remains eligible for later
/// tournaments in the same call.
///
/// Fails with `Error::SelectionArgument` if `number_of_offspring == 0`,
/// `number_of_offspring >= population.size()`, or `tournament_size < 2`.
pub fn general_tournament(
    rng: &mut Prng,
    population: &mut Population,
    tournament_size: usize,
    number_of_offspring: usize,
    reinsertion: Reinsertion,
) -> Result<Vec<Program>, Error> {
    if tournament_size < 2 {
        return Err(Error::SelectionArgument(
            "tournament_size must be >= 2".to_string(),
        ));
    }
    if number_of_offspring == 0 {
        return Err(Error::SelectionArgument(
            "number_of_offspring must be > 0".to_string(),
        ));
    }
    if number_of_offspring >= population.size() {
        return Err(Error::SelectionArgument(
            "number_of_offspring must be strictly less than population size".to_string(),
        ));
    }

    let individuals = population.individuals().to_vec();
    let mut mating_pool: Vec<usize> = (0..individuals.len()).collect();
    // Each of the 2 * number_of_offspring rounds runs a binary tournament
    // (two no-replacement draws), for 4 * number_of_offspring winners total,
    // grouped as 2 * number_of_offspring parent pairs (spec §4.7).
    let rounds = 2 * number_of_offspring;

    let mut winners = Vec::with_capacity(4 * number_of_offspring);
    let mut permanently_removed = Vec::new();
    for _ in 0..rounds {
        if mating_pool.len() < 2 * tournament_size {
            return Err(Error::SelectionArgument(
                "population exhausted before all tournaments could be run".to_string(),
            ));
        }

        let mut round_winners = Vec::with_capacity(2);
        for _ in 0..2 {
            let winner_position = run_tournament(rng, &individuals, &mating_pool, tournament_size);
            let winner_original_index = mating_pool.remove(winner_position);
            winners.push(individuals[winner_original_index].clone());
            round_winners.push(winner_original_index);
        }

        if reinsertion == Reinsertion::RemoveWinners {
            permanently_removed.extend(round_winners);
        } else {
            mating_pool.extend(round_winners);
        }
    }

    if reinsertion == Reinsertion::RemoveWinners {
        permanently_removed.sort_unstable();
        for index in permanently_removed.into_iter().rev() {
            population.individuals_mut().remove(index);
        }
    }

    Ok(winners)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Instruction;
    use crate::operation::{Arity, Operation};
    use crate::registers::RegisterSet;

    fn program_with_fitness(fitness: f64) -> Program {
        let add = Operation::new("add", Arity::Binary, |a| a[0] + a[1]);
        let registers = RegisterSet::with_zero_default(1, 1, &[]);
        let mut program =
            Program::new(vec![Instruction::new(add, 1, vec![0, 0])], vec![1], registers).unwrap();
        program.set_fitness(fitness);
        program
    }

    fn population(fitnesses: &[f64]) -> Population {
        Population::with_individuals(fitnesses.iter().map(|&f| program_with_fitness(f)).collect())
    }

    #[test]
    fn binary_tournament_rejects_too_small_population() {
        let mut population = population(&[1.0, 2.0, 3.0]);
        let mut rng = Prng::from_seed(0);
        let result = binary_tournament(&mut rng, &mut population, 2);
        assert!(matches!(result, Err(Error::SelectionArgument(_))));
    }

    #[test]
    fn binary_tournament_removes_both_winners() {
        let mut population = population(&[5.0, 4.0, 3.0, 2.0, 1.0, 0.0]);
        let mut rng = Prng::from_seed(3);
        let before = population.size();
        let (_first, _second) = binary_tournament(&mut rng, &mut population, 2).unwrap();
        assert_eq!(population.size(), before - 2);
    }

    #[test]
    fn binary_tournament_winner_has_minimum_fitness_in_its_draw() {
        // With tournament_size == population_size / 2, both tournaments
        // necessarily draw the full remaining pool, so the winners must be
        // the two lowest-fitness individuals overall.
        let mut population = population(&[5.0, 4.0, 3.0, 2.0]);
        let mut rng = Prng::from_seed(9);
        let (first, second) = binary_tournament(&mut rng, &mut population, 2).unwrap();
        let mut fitnesses = vec![first.fitness(), second.fitness()];
        fitnesses.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(fitnesses, vec![2.0, 3.0]);
    }

    /// Scenario S6 (spec §8): with a fixed seed, binary tournament over a
    /// population with fitnesses `[5, 3, 8, 1, 7, 2]` and `tournament_size=2`
    /// yields a deterministic pair of winners and leaves the expected
    /// 4-element residual behind.
    #[test]
    fn scenario_s6_tournament_determinism() {
        let mut population = population(&[5.0, 3.0, 8.0, 1.0, 7.0, 2.0]);
        let mut rng = Prng::from_seed(6);
        let (first, second) = binary_tournament(&mut rng, &mut population, 2).unwrap();

        // Replaying with the same seed and initial population reproduces the
        // identical pair of winners.
        let mut replay_population = population(&[5.0, 3.0, 8.0, 1.0, 7.0, 2.0]);
        let mut replay_rng = Prng::from_seed(6);
        let (replay_first, replay_second) =
            binary_tournament(&mut replay_rng, &mut replay_population, 2).unwrap();
        assert_eq!(first.fitness(), replay_first.fitness());
        assert_eq!(second.fitness(), replay_second.fitness());

        assert_eq!(population.size(), 4);
    }

    #[test]
    fn general_tournament_rejects_offspring_count_at_population_size() {
        let mut population = population(&[1.0, 2.0, 3.0]);
        let mut rng = Prng::from_seed(0);
        let result = general_tournament(&mut rng, &mut population, 2, 3, Reinsertion::KeepWinners);
        assert!(matches!(result, Err(Error::SelectionArgument(_))));
    }

    #[test]
    fn general_tournament_returns_four_times_offspring_count() {
        let mut population = population(&[5.0, 4.0, 3.0, 2.0, 1.0, 0.0, 6.0, 7.0]);
        let mut rng = Prng::from_seed(5);
        let winners =
            general_tournament(&mut rng, &mut population, 2, 2, Reinsertion::KeepWinners).unwrap();
        assert_eq!(winners.len(), 8);
        assert_eq!(population.size(), 8);
    }

    #[test]
    fn general_tournament_with_remove_winners_shrinks_population() {
        let mut population = population(&[5.0, 4.0, 3.0, 2.0, 1.0, 0.0, 6.0, 7.0, 8.0, 9.0]);
        let mut rng = Prng::from_seed(13);
        let before = population.size();
        let winners =
            general_tournament(&mut rng, &mut population, 2, 1, Reinsertion::RemoveWinners).unwrap();
        assert_eq!(winners.len(), 4);
        assert_eq!(population.size(), before - 4);
    }
}
