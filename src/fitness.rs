//! Scoring a program against a dataset (spec §3 "Fitness pipeline", spec
//! §4.6).
//!
//! The teacher scores genotypes with a user-supplied `FitnessFunction`
//! closure over the genotype alone; here the pipeline additionally owns
//! resetting and driving the program's register set over each case, since
//! (unlike the teacher's opaque genotypes) a `Program` carries its own
//! mutable execution state. The built-in functions are grounded on the
//! regression/classification metric naming in spec §4.6 directly — the
//! teacher has no analogue, having no notion of a dataset at all.

use crate::dataset::{Dataset, Target};
use crate::error::Error;
use crate::program::Program;

/// A large, finite stand-in for "undefined" fitness, so that
/// non-finite results (a divide-by-zero, `sin` of an overflowed
/// accumulator, ...) never break total ordering of a population by
/// fitness.
pub const UNDEFINED_FITNESS: f64 = 1_000_000_000.0;

/// A program's output for a single case, extracted from its output
/// registers after execution.
#[derive(Clone, Debug, PartialEq)]
pub enum Output {
    Single(f64),
    Multiple(Vec<f64>),
}

impl Output {
    pub fn from_values(values: Vec<f64>) -> Self {
        if values.len() == 1 {
            Output::Single(values[0])
        } else {
            Output::Multiple(values)
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        match self {
            Output::Single(value) => std::slice::from_ref(value),
            Output::Multiple(values) => values,
        }
    }
}

/// Aggregates a program's per-case `(Output, Target)` pairs into a single
/// scalar fitness, lower being better (spec §4.6, §9 "direction of
/// optimisation").
pub trait FitnessFunction: Send + Sync {
    fn evaluate(&self, cases: &[(Output, Target)]) -> Result<f64, Error>;
}

/// Extracts the single predicted/expected scalar pair from one case.
/// Fails if either side is not a single scalar, since every built-in
/// regression/classification function here is `Output=Single` (spec §4.6).
fn single_pair(pair: &(Output, Target)) -> Result<(f64, f64), Error> {
    let predicted = match &pair.0 {
        Output::Single(value) => *value,
        Output::Multiple(_) => {
            return Err(Error::ComponentLoad(
                "this fitness function requires a single-valued output".to_string(),
            ))
        }
    };
    let expected = match &pair.1 {
        Target::Single(value) => *value,
        Target::Multiple(_) => {
            return Err(Error::ComponentLoad(
                "this fitness function requires a single-valued target".to_string(),
            ))
        }
    };
    Ok((predicted, expected))
}

fn per_case_errors(cases: &[(Output, Target)]) -> Result<Vec<f64>, Error> {
    cases
        .iter()
        .map(|pair| single_pair(pair).map(|(predicted, expected)| predicted - expected))
        .collect()
}

/// Mean absolute error.
#[derive(Clone, Copy, Debug, Default)]
pub struct MeanAbsoluteError;

impl FitnessFunction for MeanAbsoluteError {
    fn evaluate(&self, cases: &[(Output, Target)]) -> Result<f64, Error> {
        let errors = per_case_errors(cases)?;
        let sum: f64 = errors.iter().map(|e| e.abs()).sum();
        Ok(sum / errors.len() as f64)
    }
}

/// Sum of squared errors.
#[derive(Clone, Copy, Debug, Default)]
pub struct SumSquaredError;

impl FitnessFunction for SumSquaredError {
    fn evaluate(&self, cases: &[(Output, Target)]) -> Result<f64, Error> {
        let errors = per_case_errors(cases)?;
        Ok(errors.iter().map(|e| e * e).sum())
    }
}

/// Mean squared error.
#[derive(Clone, Copy, Debug, Default)]
pub struct MeanSquaredError;

impl FitnessFunction for MeanSquaredError {
    fn evaluate(&self, cases: &[(Output, Target)]) -> Result<f64, Error> {
        let errors = per_case_errors(cases)?;
        let sum: f64 = errors.iter().map(|e| e * e).sum();
        Ok(sum / errors.len() as f64)
    }
}

/// Root mean squared error.
#[derive(Clone, Copy, Debug, Default)]
pub struct RootMeanSquaredError;

impl FitnessFunction for RootMeanSquaredError {
    fn evaluate(&self, cases: &[(Output, Target)]) -> Result<f64, Error> {
        Ok(MeanSquaredError.evaluate(cases)?.sqrt())
    }
}

/// Classification error: maps each raw scalar output to a discrete class
/// label via `classify` and counts the proportion of cases where the
/// predicted class disagrees with the target (spec §4.6).
pub struct ClassificationError<F>
where
    F: Fn(f64) -> i64 + Send + Sync,
{
    classify: F,
}

impl<F> ClassificationError<F>
where
    F: Fn(f64) -> i64 + Send + Sync,
{
    pub fn new(classify: F) -> Self {
        ClassificationError { classify }
    }
}

impl<F> FitnessFunction for ClassificationError<F>
where
    F: Fn(f64) -> i64 + Send + Sync,
{
    fn evaluate(&self, cases: &[(Output, Target)]) -> Result<f64, Error> {
        let mut mismatches = 0usize;
        for pair in cases {
            let (predicted, expected) = single_pair(pair)?;
            if (self.classify)(predicted) != (self.classify)(expected) {
                mismatches += 1;
            }
        }
        Ok(mismatches as f64 / cases.len() as f64)
    }
}

/// Threshold classification error: a predicted output at or above
/// `threshold` is class `1`, otherwise class `0`; targets are assumed
/// already coded the same way. Counts the proportion of disagreements.
#[derive(Clone, Copy, Debug)]
pub struct ThresholdClassificationError {
    pub threshold: f64,
}

impl ThresholdClassificationError {
    pub fn new(threshold: f64) -> Self {
        ThresholdClassificationError { threshold }
    }

    fn class(&self, value: f64) -> bool {
        value >= self.threshold
    }
}

impl FitnessFunction for ThresholdClassificationError {
    fn evaluate(&self, cases: &[(Output, Target)]) -> Result<f64, Error> {
        let mut mismatches = 0usize;
        for pair in cases {
            let (predicted, expected) = single_pair(pair)?;
            if self.class(predicted) != self.class(expected) {
                mismatches += 1;
            }
        }
        Ok(mismatches as f64 / cases.len() as f64)
    }
}

/// Runs `program` over every case in `dataset`, aggregates the results with
/// `fitness_fn`, caches the (sentinel-clamped) scalar on `program.fitness`,
/// and returns it (spec §4.6).
pub fn evaluate(
    program: &mut Program,
    dataset: &Dataset,
    fitness_fn: &dyn FitnessFunction,
) -> Result<f64, Error> {
    let mut cases = Vec::with_capacity(dataset.len());
    for (sample, target) in dataset.iter() {
        program.registers_mut().reset();
        program.registers_mut().write_sample(&sample.features)?;
        program.execute()?;
        let output = Output::from_values(program.read_outputs()?);
        cases.push((output, target.clone()));
    }

    let scalar = fitness_fn.evaluate(&cases)?;
    program.set_fitness(scalar);
    Ok(program.fitness())
}

/// Runs a trained program's test phase (spec §4 "Test phase"): for each
/// dataset sample, reset, load features, execute, and collect
/// `(predicted, expected)` for the caller to score.
pub fn test_phase(program: &mut Program, dataset: &Dataset) -> Result<Vec<(Output, Target)>, Error> {
    let mut results = Vec::with_capacity(dataset.len());
    for (sample, target) in dataset.iter() {
        program.registers_mut().reset();
        program.registers_mut().write_sample(&sample.features)?;
        program.execute()?;
        let output = Output::from_values(program.read_outputs()?);
        results.push((output, target.clone()));
    }
    Ok(results)
}
