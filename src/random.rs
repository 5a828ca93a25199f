//! Per-environment random number generation.
//!
//! The engine never reaches for a process-wide RNG (spec §9, "Global RNG").
//! Every [`Program`](crate::program::Program) generator, genetic operator,
//! and evolution run is handed its own [`Prng`], seeded deterministically so
//! that a fixed seed reproduces a fixed sequence of decisions (spec §5
//! "Ordering guarantees", spec §8.11 "Deterministic replay").
//!
//! Grounded on the teacher's `random` module (`random_index`,
//! `random_index_from_range`, `random_probability`) and on the jump-and-clone
//! idiom `population::PopulationBuilder::build_population` uses to split an
//! RNG stream across a `rayon::join` — generalized here into an explicit
//! [`Prng::fork`] used by the trainer to hand each run its own stream. `Prng`
//! wraps `rand::rngs::StdRng`, not the teacher's `SmallRng`/`rand_xoshiro`:
//! see DESIGN.md's dependency-stack note.

use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng};

/// A 64-bit seed. Two `Prng`s constructed `from_seed` with the same value
/// produce bit-identical sequences of draws.
pub type Seed = u64;

/// Returns a seed derived from the OS entropy source, for non-reproducible
/// runs (e.g. top-level CLI invocations that were not given an explicit
/// seed).
pub fn random_seed() -> Seed {
    rand::thread_rng().gen()
}

/// A cloneable, seedable RNG handle, owned exclusively by the environment
/// (evolution model, generator, or operator) that uses it.
#[derive(Clone, Debug)]
pub struct Prng {
    rng: StdRng,
}

impl Prng {
    /// Constructs a new `Prng` seeded deterministically from `seed`.
    pub fn from_seed(seed: Seed) -> Self {
        Prng {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Derives an independent `Prng` stream from this one. Used to hand each
    /// independent training run (spec §4.11) or each parallel worker its own
    /// RNG without sharing mutable state, while keeping the derivation a
    /// pure function of this `Prng`'s own state so that replay is
    /// deterministic for a fixed parent seed.
    pub fn fork(&mut self) -> Prng {
        let derived_seed: u64 = self.rng.gen();
        Prng::from_seed(derived_seed)
    }
}

impl rand::RngCore for Prng {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

/// Draws a uniformly random index in `[0, length)`.
///
/// # Panics
/// Panics if `length == 0`.
pub fn random_index<R: rand::Rng + ?Sized>(rng: &mut R, length: usize) -> usize {
    rng.gen_range(0..length)
}

/// Draws a uniformly random index in `[min, max)`.
///
/// # Panics
/// Panics if `min >= max`.
pub fn random_index_from_range<R: rand::Rng + ?Sized>(rng: &mut R, min: usize, max: usize) -> usize {
    rng.gen_range(min..max)
}

/// Draws a probability, uniform in `[0.0, 1.0)`.
pub fn random_probability<R: rand::Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen::<f64>()
}
