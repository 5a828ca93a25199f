//! Macro (insert/delete) and micro (register/operator/constant) mutation
//! (spec §4.9).
//!
//! Grounded on the teacher's `mutation::order::{InsertOrderMutator,
//! SwapOrderMutator}` shape: a struct carrying its own rate parameter(s), one
//! `mutate` entry point taking the genome and an `Rng`. Both teacher
//! mutators draw a single `num_mutations` count up front and loop; this
//! domain's macro/micro mutators instead draw one mutation-type decision per
//! call (spec §4.9 steps), per the RNG-consumption-order pinned in spec §9
//! "Possible bug / open question".

use crate::generators::random_instruction;
use crate::operation::Operation;
use crate::program::Program;
use crate::random::{random_index, random_index_from_range, random_probability, Prng};

/// Insert-vs-delete macro mutation (spec §4.9 "Macro mutation").
#[derive(Clone, Debug, PartialEq)]
pub struct MacroMutation {
    pub insertion_rate: f64,
    pub min_program_length: usize,
    pub max_program_length: usize,
    pub constants_rate: f64,
}

enum MacroMutationType {
    Insert,
    Delete,
}

impl MacroMutation {
    pub fn new(
        insertion_rate: f64,
        min_program_length: usize,
        max_program_length: usize,
        constants_rate: f64,
    ) -> Self {
        MacroMutation {
            insertion_rate,
            min_program_length,
            max_program_length,
            constants_rate,
        }
    }

    /// Applies one macro mutation to `program` in place (spec §4.9 steps
    /// 1-5). Refreshes `program`'s effective-instruction cache first, and
    /// again after a structural change. The mutation-type draw and the
    /// mutation-point draw always happen, in that order, before any
    /// effective-set check; the effective-set check and any resulting skip
    /// never consume further RNG state (spec §9 open-question pin).
    pub fn mutate(&self, rng: &mut Prng, operations: &[Operation], program: &mut Program) {
        program.find_effective_program();

        let mutation_type = if random_probability(rng) < self.insertion_rate {
            MacroMutationType::Insert
        } else {
            MacroMutationType::Delete
        };
        let p = if program.is_empty() {
            0
        } else {
            random_index(rng, program.len())
        };

        let len = program.len();
        let take_insert = len < self.max_program_length
            && (matches!(mutation_type, MacroMutationType::Insert) || len == self.min_program_length);
        let take_delete = len > self.min_program_length
            && (matches!(mutation_type, MacroMutationType::Delete) || len == self.max_program_length);

        if take_insert {
            self.insert_at(rng, operations, program, p);
        } else if take_delete {
            self.delete_one(rng, program);
        }

        program.find_effective_program();
    }

    fn insert_at(&self, rng: &mut Prng, operations: &[Operation], program: &mut Program, p: usize) {
        let effective_registers = program.effective_registers_before(p);
        if effective_registers.is_empty() {
            return;
        }
        let registers = program.registers().clone();
        let mut instruction = match random_instruction(rng, operations, &registers, self.constants_rate) {
            Ok(instruction) => instruction,
            Err(_) => return,
        };
        let destinations: Vec<usize> = effective_registers.into_iter().collect();
        instruction.destination = destinations[random_index(rng, destinations.len())];
        program.instructions_mut().insert(p, instruction);
    }

    fn delete_one(&self, rng: &mut Prng, program: &mut Program) {
        let effective_indices = program.effective_indices().to_vec();
        if effective_indices.is_empty() {
            return;
        }
        let pick = effective_indices[random_index(rng, effective_indices.len())];
        program.instructions_mut().remove(pick);
    }
}

/// Register/operator/constant point mutation (spec §4.9 "Micro mutation").
#[derive(Clone, Debug, PartialEq)]
pub struct MicroMutation {
    pub register_mutation_rate: f64,
    pub operator_mutation_rate: f64,
    pub constants_rate: f64,
}

enum MicroMutationType {
    Register,
    Operator,
    Constant,
}

/// Bounded linear-search budget for the constant variant's search for an
/// effective instruction referencing a constant register (spec §4.9 step 6
/// "bounded linear search").
const CONSTANT_SEARCH_BUDGET: usize = 64;

impl MicroMutation {
    pub fn new(register_mutation_rate: f64, operator_mutation_rate: f64, constants_rate: f64) -> Self {
        MicroMutation {
            register_mutation_rate,
            operator_mutation_rate,
            constants_rate,
        }
    }

    /// Applies one micro mutation to `program` in place (spec §4.9 steps
    /// 1-6). No-ops if the program has no effective instructions.
    pub fn mutate<F>(
        &self,
        rng: &mut Prng,
        operations: &[Operation],
        constant_mutation_function: &F,
        program: &mut Program,
    ) where
        F: Fn(f64) -> f64,
    {
        program.find_effective_program();
        let effective_indices = program.effective_indices().to_vec();
        if effective_indices.is_empty() {
            return;
        }
        let target = effective_indices[random_index(rng, effective_indices.len())];

        let draw = random_probability(rng);
        let mutation_type = if draw < self.register_mutation_rate {
            MicroMutationType::Register
        } else if draw < self.register_mutation_rate + self.operator_mutation_rate {
            MicroMutationType::Operator
        } else {
            MicroMutationType::Constant
        };

        match mutation_type {
            MicroMutationType::Register => self.mutate_register(rng, program, target),
            MicroMutationType::Operator => self.mutate_operator(rng, operations, program, target),
            MicroMutationType::Constant => {
                self.mutate_constant(rng, constant_mutation_function, program, &effective_indices)
            }
        }

        program.find_effective_program();
    }

    fn mutate_register(&self, rng: &mut Prng, program: &mut Program, target: usize) {
        // Position 0 mutates the destination; positions 1.. mutate operand
        // (position - 1) of the targeted instruction (spec §4.9 step 4).
        let operand_count = program.instructions()[target].operands.len();
        let position = random_index(rng, operand_count + 1);

        if position == 0 {
            let effective_calculation = program
                .effective_registers_before(target)
                .into_iter()
                .filter(|r| program.registers().calculation_range().contains(r))
                .collect::<Vec<_>>();
            if effective_calculation.is_empty() {
                return;
            }
            let new_destination = effective_calculation[random_index(rng, effective_calculation.len())];
            program.instructions_mut()[target].destination = new_destination;
        } else {
            let registers = program.registers().clone();
            let replacement = pick_operand_register(rng, &registers, self.constants_rate);
            program.instructions_mut()[target].operands[position - 1] = replacement;
        }
    }

    fn mutate_operator(&self, rng: &mut Prng, operations: &[Operation], program: &mut Program, target: usize) {
        if operations.len() < 2 {
            return;
        }
        let current = program.instructions()[target].operation.clone();
        let mut candidates: Vec<&Operation> = operations.iter().filter(|op| **op != current).collect();
        if candidates.is_empty() {
            return;
        }
        let new_operation = candidates.remove(random_index(rng, candidates.len())).clone();
        let new_arity = new_operation.arity().arg_count();

        let registers = program.registers().clone();
        let instruction = &mut program.instructions_mut()[target];
        instruction.operation = new_operation;
        instruction.operands.truncate(new_arity);
        while instruction.operands.len() < new_arity {
            instruction
                .operands
                .push(pick_operand_register(rng, &registers, self.constants_rate));
        }
    }

    fn mutate_constant<F>(
        &self,
        rng: &mut Prng,
        constant_mutation_function: &F,
        program: &mut Program,
        effective_indices: &[usize],
    ) where
        F: Fn(f64) -> f64,
    {
        let constant_range = program.registers().constant_range();
        if constant_range.is_empty() {
            return;
        }

        let mut order = effective_indices.to_vec();
        // Start the bounded search from a random effective instruction so
        // repeated calls don't always favor the earliest one.
        let start = random_index(rng, order.len());
        order.rotate_left(start);

        for &index in order.iter().take(CONSTANT_SEARCH_BUDGET) {
            let instruction = &program.instructions()[index];
            if let Some(&constant_operand) = instruction.operands.iter().find(|&&r| constant_range.contains(&r)) {
                let current = program.registers().get(constant_operand).expect("bounds checked above");
                let mutated = constant_mutation_function(current);
                program
                    .registers_mut()
                    .overwrite(constant_operand, mutated)
                    .expect("bounds checked above");
                return;
            }
        }
    }
}

fn pick_operand_register(rng: &mut Prng, registers: &crate::registers::RegisterSet, constants_rate: f64) -> usize {
    let constant_range = registers.constant_range();
    if !constant_range.is_empty() && random_probability(rng) < constants_rate {
        return random_index_from_range(rng, constant_range.start, constant_range.end);
    }
    let writable = registers.writable_range();
    random_index_from_range(rng, writable.start, writable.end)
}
