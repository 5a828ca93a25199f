//! `linnaeus-gp` is a linear genetic programming (LGP) engine: it evolves
//! populations of imperative register-machine programs that minimise a
//! numeric fitness function over a supervised dataset.
//!
//! Programs are linear sequences of three-address instructions
//! `r[d] = op(r[a], r[b], ...)` executed against a shared bank of typed
//! registers, rather than tree-structured expressions. Evolution is a
//! steady-state genetic algorithm: tournament selection, linear two-point
//! segment crossover, and macro (insert/delete instruction) and micro
//! (perturb a register/operator/constant) mutation, all constrained by
//! *effective code analysis* — the backward, branch-aware data-flow pass
//! that identifies which instructions actually influence the program's
//! output registers.
//!
//! ## Installation
//!
//! ```toml
//! [dependencies]
//! linnaeus-gp = "0.1"
//! ```
//!
//! ## Overview
//!
//! * [`registers`] — the fixed-layout input/calculation/constant register bank.
//! * [`operation`] — the pure-function operation contract.
//! * [`instruction`] — a single `(operation, destination, operands)` triple.
//! * [`program`] — an instruction sequence plus effective-code analysis.
//! * [`generators`] — random instruction/program construction.
//! * [`dataset`] — feature/target samples and the CSV loader.
//! * [`fitness`] — the fitness pipeline and built-in fitness functions.
//! * [`population`] — the population of evolving programs.
//! * [`selection`], [`recombination`], [`mutation`] — the genetic operators.
//! * [`evolution`] — the steady-state evolution loop.
//! * [`statistic`] — wall-clock timing of the evolution loop.
//! * [`trainer`] — multi-run training, sequential or parallel.
//! * [`config`] — the configuration record and its loaders.
//! * [`export`] — translating a trained program to C source.

#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_import_braces,
    unused_qualifications
)]

pub mod config;
pub mod dataset;
pub mod error;
pub mod evolution;
pub mod export;
pub mod fitness;
pub mod generators;
pub mod instruction;
pub mod mutation;
pub mod operation;
pub mod ops;
pub mod population;
pub mod program;
pub mod random;
pub mod recombination;
pub mod registers;
pub mod selection;
pub mod statistic;
pub mod trainer;

pub mod prelude {
    //! Re-exports of the types most commonly needed to set up a run.

    pub use crate::config::{Config, Validation};
    pub use crate::dataset::{Dataset, Sample, Target};
    pub use crate::error::Error;
    pub use crate::evolution::{EvolutionModel, EvolutionResult, GenerationStatistics};
    pub use crate::fitness::{Output, UNDEFINED_FITNESS};
    pub use crate::generators::{EffectiveProgramGenerator, ProgramGenerator, RandomProgramGenerator};
    pub use crate::instruction::Instruction;
    pub use crate::operation::{Arity, Operation};
    pub use crate::ops::builtin::standard_registry;
    pub use crate::population::Population;
    pub use crate::program::Program;
    pub use crate::random::Prng;
    pub use crate::trainer::Trainer;
}
