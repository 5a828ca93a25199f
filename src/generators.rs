//! Random instruction and program construction (spec §4.5).
//!
//! There is no teacher analogue to a genotype *generator* as a distinct
//! type — `genevo`'s `build_population()` hands a closure straight to
//! `GenomeBuilder` — but the two-strategy split here (uniformly random vs.
//! effective-by-construction) mirrors how the teacher's
//! `PopulationBuilder` accepts a pluggable `GenomeBuilder` rather than
//! hardcoding one generation strategy.

use rand::Rng;

use crate::error::Error;
use crate::instruction::Instruction;
use crate::operation::Operation;
use crate::program::Program;
use crate::random::{random_index, random_index_from_range, random_probability, Prng};
use crate::registers::RegisterSet;

/// Produces a single random instruction: an operation drawn uniformly from
/// `operations`, operands drawn register-by-register with probability
/// `constants_rate` of landing on a constant register (otherwise split
/// evenly between input and calculation registers), and a destination drawn
/// from the register set's writable range.
pub fn random_instruction(
    rng: &mut Prng,
    operations: &[Operation],
    registers: &RegisterSet,
    constants_rate: f64,
) -> Result<Instruction, Error> {
    if operations.is_empty() {
        return Err(Error::ComponentLoad("no operations available to draw from".to_string()));
    }
    let operation = operations[random_index(rng, operations.len())].clone();
    let arg_count = operation.arity().arg_count();

    let mut operands = Vec::with_capacity(arg_count);
    for _ in 0..arg_count {
        operands.push(random_operand_register(rng, registers, constants_rate)?);
    }

    let writable = registers.writable_range();
    let destination = random_index_from_range(rng, writable.start, writable.end);

    Ok(Instruction::new(operation, destination, operands))
}

/// Draws one operand register index: with probability `constants_rate` a
/// constant register, otherwise an input or calculation register chosen by
/// an even coin flip between the two pools.
fn random_operand_register(
    rng: &mut Prng,
    registers: &RegisterSet,
    constants_rate: f64,
) -> Result<usize, Error> {
    let constant_range = registers.constant_range();
    if !constant_range.is_empty() && random_probability(rng) < constants_rate {
        return Ok(random_index_from_range(rng, constant_range.start, constant_range.end));
    }

    let use_calculation = registers.num_calculation() > 0 && rng.gen::<bool>();
    if use_calculation {
        let range = registers.calculation_range();
        Ok(random_index_from_range(rng, range.start, range.end))
    } else {
        Ok(random_index(rng, registers.num_inputs()))
    }
}

/// A strategy for constructing a brand-new `Program` against a freshly
/// allocated register set. Population initialisation (spec §4.5) picks
/// between [`RandomProgramGenerator`] and [`EffectiveProgramGenerator`]
/// through this common interface rather than hardcoding one strategy.
pub trait ProgramGenerator {
    fn generate(&self, rng: &mut Prng, registers: RegisterSet) -> Result<Program, Error>;
}

/// Constructs a program whose instructions are drawn independently and
/// uniformly at random, with no regard for whether they end up effective
/// (spec §4.5 "Program generator (random)").
#[derive(Clone, Debug)]
pub struct RandomProgramGenerator {
    operations: Vec<Operation>,
    constants_rate: f64,
    branch_initialisation_rate: f64,
    initial_minimum_program_length: usize,
    initial_maximum_program_length: usize,
    output_register_indices: Vec<usize>,
}

/// Constructs a program by building *backward* from its output registers so
/// every instruction is effective at birth (spec §4.5 "Program generator
/// (effective)").
#[derive(Clone, Debug)]
pub struct EffectiveProgramGenerator {
    operations: Vec<Operation>,
    constants_rate: f64,
    branch_initialisation_rate: f64,
    initial_minimum_program_length: usize,
    initial_maximum_program_length: usize,
    output_register_indices: Vec<usize>,
}

/// Shared construction parameters for either generator.
pub struct GeneratorConfig {
    pub operations: Vec<Operation>,
    pub constants_rate: f64,
    pub branch_initialisation_rate: f64,
    pub initial_minimum_program_length: usize,
    pub initial_maximum_program_length: usize,
    pub output_register_indices: Vec<usize>,
}

macro_rules! impl_generator_ctor {
    ($ty:ident) => {
        impl $ty {
            pub fn new(config: GeneratorConfig) -> Self {
                $ty {
                    operations: config.operations,
                    constants_rate: config.constants_rate,
                    branch_initialisation_rate: config.branch_initialisation_rate,
                    initial_minimum_program_length: config.initial_minimum_program_length,
                    initial_maximum_program_length: config.initial_maximum_program_length,
                    output_register_indices: config.output_register_indices,
                }
            }
        }
    };
}

impl_generator_ctor!(RandomProgramGenerator);
impl_generator_ctor!(EffectiveProgramGenerator);

fn random_length(rng: &mut Prng, min: usize, max: usize) -> usize {
    if min == max {
        min
    } else {
        random_index_from_range(rng, min, max + 1)
    }
}

fn branch_operations(operations: &[Operation]) -> Vec<Operation> {
    operations.iter().filter(|op| op.is_branch()).cloned().collect()
}

fn non_branch_operations(operations: &[Operation]) -> Vec<Operation> {
    operations.iter().filter(|op| !op.is_branch()).cloned().collect()
}

impl ProgramGenerator for RandomProgramGenerator {
    /// Samples a length uniformly in `[initial_minimum_program_length,
    /// initial_maximum_program_length]`, emits that many random
    /// instructions, and attaches a fresh register set. When branch
    /// operations are present in the pool, each instruction position is
    /// independently sampled as a branch with probability
    /// `branch_initialisation_rate`.
    fn generate(&self, rng: &mut Prng, registers: RegisterSet) -> Result<Program, Error> {
        let length = random_length(
            rng,
            self.initial_minimum_program_length,
            self.initial_maximum_program_length,
        );

        let branches = branch_operations(&self.operations);
        let non_branches = non_branch_operations(&self.operations);

        let mut instructions = Vec::with_capacity(length);
        for _ in 0..length {
            let pool = if !branches.is_empty() && random_probability(rng) < self.branch_initialisation_rate
            {
                &branches
            } else if !non_branches.is_empty() {
                &non_branches
            } else {
                &self.operations
            };
            instructions.push(random_instruction(rng, pool, &registers, self.constants_rate)?);
        }

        Program::new(instructions, self.output_register_indices.clone(), registers)
    }
}

impl ProgramGenerator for EffectiveProgramGenerator {
    /// Builds a program backward from its output registers: at each step an
    /// instruction is generated whose destination is drawn from the current
    /// effective-register set, then the effective set is updated (the
    /// destination is removed unless the instruction is a branch, and its
    /// non-constant operands are added), so the result is entirely effective
    /// at birth.
    fn generate(&self, rng: &mut Prng, registers: RegisterSet) -> Result<Program, Error> {
        let length = random_length(
            rng,
            self.initial_minimum_program_length,
            self.initial_maximum_program_length,
        );

        let branches = branch_operations(&self.operations);
        let non_branches = non_branch_operations(&self.operations);

        let mut effective: Vec<usize> = self.output_register_indices.clone();
        let mut instructions = Vec::with_capacity(length);

        for _ in 0..length {
            if effective.is_empty() {
                break;
            }
            let destination = effective[random_index(rng, effective.len())];

            let use_branch =
                !branches.is_empty() && random_probability(rng) < self.branch_initialisation_rate;
            let pool = if use_branch {
                &branches
            } else if !non_branches.is_empty() {
                &non_branches
            } else {
                &self.operations
            };
            let operation = pool[random_index(rng, pool.len())].clone();
            let arg_count = operation.arity().arg_count();
            let mut operands = Vec::with_capacity(arg_count);
            for _ in 0..arg_count {
                operands.push(random_operand_register(rng, &registers, self.constants_rate)?);
            }

            let is_branch = operation.is_branch();
            instructions.push(Instruction::new(operation, destination, operands.clone()));

            if !is_branch {
                effective.retain(|&r| r != destination);
            }
            for operand in operands {
                if !registers.is_constant(operand) && !effective.contains(&operand) {
                    effective.push(operand);
                }
            }
        }

        instructions.reverse();
        Program::new(instructions, self.output_register_indices.clone(), registers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::Arity;
    use crate::random::Prng;

    fn operations() -> Vec<Operation> {
        vec![
            Operation::new("add", Arity::Binary, |a| a[0] + a[1]),
            Operation::new("sin", Arity::Unary, |a| a[0].sin()),
        ]
    }

    #[test]
    fn random_instruction_matches_operation_arity() {
        let mut rng = Prng::from_seed(1);
        let registers = RegisterSet::with_zero_default(2, 3, &[1.0, 2.0]);
        for _ in 0..50 {
            let instruction = random_instruction(&mut rng, &operations(), &registers, 0.3).unwrap();
            assert_eq!(instruction.operands.len(), instruction.operation.arity().arg_count());
            assert!(registers.writable_range().contains(&instruction.destination));
        }
    }

    #[test]
    fn random_program_generator_respects_length_bounds() {
        let config = GeneratorConfig {
            operations: operations(),
            constants_rate: 0.2,
            branch_initialisation_rate: 0.0,
            initial_minimum_program_length: 5,
            initial_maximum_program_length: 5,
            output_register_indices: vec![2],
        };
        let generator = RandomProgramGenerator::new(config);
        let mut rng = Prng::from_seed(7);
        let registers = RegisterSet::with_zero_default(2, 3, &[]);
        let program = generator.generate(&mut rng, registers).unwrap();
        assert_eq!(program.len(), 5);
    }

    #[test]
    fn effective_program_generator_produces_fully_effective_program() {
        let config = GeneratorConfig {
            operations: operations(),
            constants_rate: 0.0,
            branch_initialisation_rate: 0.0,
            initial_minimum_program_length: 6,
            initial_maximum_program_length: 6,
            output_register_indices: vec![2],
        };
        let generator = EffectiveProgramGenerator::new(config);
        let mut rng = Prng::from_seed(11);
        let registers = RegisterSet::with_zero_default(2, 3, &[]);
        let mut program = generator.generate(&mut rng, registers).unwrap();
        let full_len = program.len();
        program.find_effective_program();
        assert_eq!(program.effective_len(), full_len);
    }
}
