//! The run configuration record (spec §6 "Configuration") and its loaders.
//!
//! The teacher has no single analogue to this type — `genevo`'s builder
//! (`ga::builder`) wires operator instances together instead of validating a
//! flat data record — so `Config` follows spec §6's field list directly: a
//! plain `struct` with documented defaults and a `validate` method returning
//! a discriminated [`Validation`] result.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The evolutionary run configuration. Every field has a default (`Default`
/// impl below); `num_features` has no sensible default and must always be
/// supplied explicitly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub initial_minimum_program_length: usize,
    pub initial_maximum_program_length: usize,
    pub minimum_program_length: usize,
    pub maximum_program_length: usize,
    pub operations: Vec<String>,
    pub constants_rate: f64,
    pub constants: Vec<String>,
    pub num_calculation_registers: usize,
    pub population_size: usize,
    pub num_features: usize,
    pub crossover_rate: f64,
    pub micro_mutation_rate: f64,
    pub macro_mutation_rate: f64,
    pub generations: usize,
    pub branch_initialisation_rate: f64,
    pub stopping_criterion: f64,
    pub number_of_runs: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            initial_minimum_program_length: 10,
            initial_maximum_program_length: 30,
            minimum_program_length: 10,
            maximum_program_length: 200,
            operations: Vec::new(),
            constants_rate: 0.5,
            constants: Vec::new(),
            num_calculation_registers: 10,
            population_size: 100,
            num_features: 0,
            crossover_rate: 0.5,
            micro_mutation_rate: 0.5,
            macro_mutation_rate: 0.5,
            generations: 50,
            branch_initialisation_rate: 0.0,
            stopping_criterion: 0.0,
            number_of_runs: 1,
        }
    }
}

/// The outcome of [`Config::validate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Validation {
    Valid,
    Invalid(String),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid)
    }
}

impl Config {
    /// Validates every rule in spec §6, in field order, returning the first
    /// violated rule as `Invalid(reason)`.
    pub fn validate(&self) -> Validation {
        macro_rules! require {
            ($cond:expr, $reason:expr) => {
                if !($cond) {
                    return Validation::Invalid($reason.to_string());
                }
            };
        }

        require!(
            self.initial_minimum_program_length > 0,
            "initialMinimumProgramLength must be > 0"
        );
        require!(
            self.initial_maximum_program_length > 0,
            "initialMaximumProgramLength must be > 0"
        );
        require!(
            self.initial_minimum_program_length <= self.initial_maximum_program_length,
            "initialMinimumProgramLength must be <= initialMaximumProgramLength"
        );
        require!(
            self.minimum_program_length > 0,
            "minimumProgramLength must be > 0"
        );
        require!(
            self.maximum_program_length > 0,
            "maximumProgramLength must be > 0"
        );
        require!(
            self.minimum_program_length <= self.maximum_program_length,
            "minimumProgramLength must be <= maximumProgramLength"
        );
        require!(!self.operations.is_empty(), "operations must have >= 1 entry");
        require!(
            self.constants_rate >= 0.0,
            "constantsRate must be >= 0"
        );
        require!(
            !(self.constants.is_empty() && self.constants_rate != 0.0),
            "constantsRate must be 0 when constants is empty"
        );
        require!(
            self.population_size > 0,
            "populationSize must be > 0"
        );
        require!(self.num_features > 0, "numFeatures is required and must be > 0");
        require!(
            (0.0..=1.0).contains(&self.crossover_rate),
            "crossoverRate must be in [0,1]"
        );
        require!(
            (0.0..=1.0).contains(&self.micro_mutation_rate),
            "microMutationRate must be in [0,1]"
        );
        require!(
            (0.0..=1.0).contains(&self.macro_mutation_rate),
            "macroMutationRate must be in [0,1]"
        );
        require!(self.generations > 0, "generations must be > 0");
        require!(
            (0.0..=1.0).contains(&self.branch_initialisation_rate),
            "branchInitialisationRate must be in [0,1]"
        );
        require!(
            self.stopping_criterion >= 0.0,
            "stoppingCriterion must be >= 0"
        );
        require!(self.number_of_runs >= 1, "numberOfRuns must be >= 1");

        Validation::Valid
    }
}

/// Parses a `Config` from a JSON document (spec §6 "Configuration file
/// format"). Parse failures are wrapped as `Error::ComponentLoad`; the
/// result is not validated — call [`Config::validate`] before using it.
pub fn load_json(source: &str) -> Result<Config, Error> {
    serde_json::from_str(source).map_err(|e| Error::ComponentLoad(e.to_string()))
}

/// Parses a `Config` from a YAML document (spec §6 "Configuration file
/// format"). Parse failures are wrapped as `Error::ComponentLoad`; the
/// result is not validated — call [`Config::validate`] before using it.
pub fn load_yaml(source: &str) -> Result<Config, Error> {
    serde_yaml::from_str(source).map_err(|e| Error::ComponentLoad(e.to_string()))
}
