//! An ordered instruction sequence plus effective-code analysis and
//! branch-aware execution (spec §3 "Program", spec §4.4).
//!
//! There is no teacher analogue for `Program` itself — it is this crate's
//! genotype, where the teacher's genotypes are opaque `Vec<T>`/
//! `FixedBitSet` values — but the register-set-ownership-on-clone
//! discipline (clone before handing to a reproductive operator so the
//! population's copy is untouched) mirrors the clone-before-breeding
//! discipline in the teacher's `ga::par_breed_offspring`.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::Error;
use crate::fitness::UNDEFINED_FITNESS;
use crate::instruction::Instruction;
use crate::registers::RegisterSet;

/// The sentinel value a branch operation's result is compared against to
/// decide whether the following instruction is taken (spec §4.2, §4.4).
pub const DEFAULT_SENTINEL_TRUE_VALUE: f64 = 1.0;

/// A linear register-machine program: an ordered sequence of
/// [`Instruction`]s executed against an owned [`RegisterSet`], plus the
/// output registers whose final values are the program's result.
#[derive(Clone, Debug)]
pub struct Program {
    registers: RegisterSet,
    instructions: Vec<Instruction>,
    output_register_indices: Arc<Vec<usize>>,
    /// Indices into `instructions` of the instructions currently known to be
    /// effective, in original order. Stale until `find_effective_program` is
    /// called after any structural change to `instructions` — callers that
    /// mutate a program (the macro/micro mutation operators, crossover) are
    /// responsible for refreshing this before reading it again.
    effective_indices: Vec<usize>,
    sentinel_true_value: f64,
    fitness: f64,
}

impl Program {
    /// Constructs a new program. Fails with `Error::RegisterRead` if any
    /// instruction's destination or operand indices, or any output register
    /// index, falls outside `registers`.
    pub fn new(
        instructions: Vec<Instruction>,
        output_register_indices: Vec<usize>,
        registers: RegisterSet,
    ) -> Result<Self, Error> {
        debug_assert!(
            !output_register_indices.is_empty(),
            "a program must have at least one output register"
        );
        let len = registers.len();
        for instruction in &instructions {
            if instruction.destination >= len {
                return Err(Error::RegisterRead(format!(
                    "instruction destination {} out of bounds (len {})",
                    instruction.destination, len
                )));
            }
            for &operand in &instruction.operands {
                if operand >= len {
                    return Err(Error::RegisterRead(format!(
                        "instruction operand {} out of bounds (len {})",
                        operand, len
                    )));
                }
            }
        }
        for &output in &output_register_indices {
            if output >= len {
                return Err(Error::RegisterRead(format!(
                    "output register {} out of bounds (len {})",
                    output, len
                )));
            }
        }
        let mut program = Program {
            registers,
            instructions,
            output_register_indices: Arc::new(output_register_indices),
            effective_indices: Vec::new(),
            sentinel_true_value: DEFAULT_SENTINEL_TRUE_VALUE,
            fitness: UNDEFINED_FITNESS,
        };
        program.find_effective_program();
        Ok(program)
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn instructions_mut(&mut self) -> &mut Vec<Instruction> {
        &mut self.instructions
    }

    pub fn registers(&self) -> &RegisterSet {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut RegisterSet {
        &mut self.registers
    }

    pub fn output_register_indices(&self) -> &[usize] {
        &self.output_register_indices
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = if fitness.is_finite() {
            fitness
        } else {
            UNDEFINED_FITNESS
        };
    }

    pub fn sentinel_true_value(&self) -> f64 {
        self.sentinel_true_value
    }

    pub fn set_sentinel_true_value(&mut self, value: f64) {
        self.sentinel_true_value = value;
    }

    /// The indices into `instructions()` currently known to be effective, in
    /// original order. Call `find_effective_program` first if `instructions`
    /// may have changed since the last call.
    pub fn effective_indices(&self) -> &[usize] {
        &self.effective_indices
    }

    /// The effective instructions themselves, as an order-preserving
    /// subsequence of `instructions()` (spec §3 invariant iii).
    pub fn effective_instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.effective_indices.iter().map(move |&i| &self.instructions[i])
    }

    pub fn effective_len(&self) -> usize {
        self.effective_indices.len()
    }

    /// Recomputes `effective_indices` via one backward pass over
    /// `instructions` (spec §4.4).
    ///
    /// A non-branch instruction is effective iff its destination is in the
    /// live-register set at its position. Marking it effective also marks
    /// any contiguous run of branch instructions immediately preceding it,
    /// since those branches gate whether it runs; the live set only loses
    /// the instruction's destination if no such branch run was found (a
    /// gated destination may still be written on another, untaken, path).
    /// A branch instruction reached directly by the backward scan (i.e. not
    /// already consumed by a later instruction's look-behind) has nothing
    /// downstream depending on it and is therefore never effective.
    pub fn find_effective_program(&mut self) {
        let n = self.instructions.len();
        let mut marked = vec![false; n];
        let mut live: HashSet<usize> = self.output_register_indices.iter().copied().collect();

        let mut i = n;
        while i > 0 {
            i -= 1;
            if self.instructions[i].is_branch() {
                // Only reachable here if no later effective instruction's
                // look-behind already consumed it; such a branch has no
                // effective instruction depending on it.
                continue;
            }
            let destination = self.instructions[i].destination;
            if !live.contains(&destination) {
                continue;
            }
            marked[i] = true;

            let mut branches_marked = false;
            let mut j = i;
            while j > 0 && self.instructions[j - 1].is_branch() {
                j -= 1;
                marked[j] = true;
                branches_marked = true;
                for &operand in &self.instructions[j].operands {
                    if !self.registers.is_constant(operand) {
                        live.insert(operand);
                    }
                }
            }
            if !branches_marked {
                live.remove(&destination);
            }
            for &operand in &self.instructions[i].operands {
                if !self.registers.is_constant(operand) {
                    live.insert(operand);
                }
            }
            i = j;
        }

        self.effective_indices = (0..n).filter(|&k| marked[k]).collect();
    }

    /// Computes the live (effective) calculation registers at position `p`
    /// — the backward flow of `find_effective_program` restricted to the
    /// instructions before `p` (spec §4.9, used by macro mutation to pick a
    /// valid insertion destination and by micro mutation's register
    /// variant).
    pub fn effective_registers_before(&self, p: usize) -> HashSet<usize> {
        let mut live: HashSet<usize> = self.output_register_indices.iter().copied().collect();
        let mut i = self.instructions.len();
        while i > p {
            i -= 1;
            let instruction = &self.instructions[i];
            if instruction.is_branch() {
                continue;
            }
            if live.contains(&instruction.destination) {
                live.remove(&instruction.destination);
                for &operand in &instruction.operands {
                    if !self.registers.is_constant(operand) {
                        live.insert(operand);
                    }
                }
            }
        }
        live.into_iter()
            .filter(|&r| self.registers.calculation_range().contains(&r))
            .collect()
    }

    /// Runs the effective instructions in order with branch-aware semantics
    /// (spec §4.4): a branch's result, compared against the sentinel true
    /// value, decides whether the next effective instruction runs; a
    /// skipped branch stays not-taken, and the first non-branch instruction
    /// ends a skipped chord.
    pub fn execute(&mut self) -> Result<(), Error> {
        let mut taken = true;
        for idx in 0..self.effective_indices.len() {
            let instruction_index = self.effective_indices[idx];
            let instruction = self.instructions[instruction_index].clone();
            if taken {
                let result = instruction.execute(&mut self.registers)?;
                taken = if instruction.is_branch() {
                    result == self.sentinel_true_value
                } else {
                    true
                };
            } else {
                taken = !instruction.is_branch();
            }
        }
        Ok(())
    }

    /// Reads the current values of the output registers, in
    /// `output_register_indices` order.
    pub fn read_outputs(&self) -> Result<Vec<f64>, Error> {
        self.output_register_indices
            .iter()
            .map(|&index| self.registers.get(index))
            .collect()
    }
}

impl PartialEq for Program {
    fn eq(&self, other: &Self) -> bool {
        self.instructions == other.instructions
            && *self.output_register_indices == *other.output_register_indices
            && self.registers == other.registers
            && self.fitness == other.fitness
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{Arity, Operation};

    fn op(name: &str, arity: Arity, f: fn(&[f64]) -> f64) -> Operation {
        Operation::new(name, arity, f)
    }

    fn branch_op(name: &str, f: fn(&[f64]) -> f64) -> Operation {
        Operation::branch(name, Arity::Binary, f)
    }

    /// Scenario S3 (spec §8): branch-aware effective analysis.
    ///
    /// I0: r[3] = r[0] + r[1]
    /// I1: r[5] = (r[2] > r[3])     (branch; r[5] is scratch, never read)
    /// I2: r[0] = r[3] * r[3]       (dest is an output)
    /// I3: r[4] = sin(r[0])         (r[4] not in outputs)
    /// outputs = [0]; expect effective = [I0, I1, I2], I3 excluded.
    #[test]
    fn scenario_s3_branch_aware_effective_analysis() {
        let registers = RegisterSet::with_zero_default(3, 3, &[]);
        let add = op("add", Arity::Binary, |a| a[0] + a[1]);
        let gt = branch_op("gt", |a| if a[0] > a[1] { 1.0 } else { 0.0 });
        let mul = op("mul", Arity::Binary, |a| a[0] * a[1]);
        let sin = op("sin", Arity::Unary, |a| a[0].sin());

        let i0 = Instruction::new(add, 3, vec![0, 1]);
        let i1 = Instruction::new(gt, 5, vec![2, 3]);
        let i2 = Instruction::new(mul, 0, vec![3, 3]);
        let i3 = Instruction::new(sin, 4, vec![0]);

        let mut program =
            Program::new(vec![i0, i1, i2, i3], vec![0], registers).unwrap();
        program.find_effective_program();

        assert_eq!(program.effective_indices(), &[0, 1, 2]);
    }

    #[test]
    fn effective_program_is_order_preserving_subsequence() {
        let registers = RegisterSet::with_zero_default(2, 3, &[]);
        let add = op("add", Arity::Binary, |a| a[0] + a[1]);
        let i0 = Instruction::new(add.clone(), 2, vec![0, 1]);
        let i1 = Instruction::new(add.clone(), 3, vec![0, 1]); // dead: r3 never read
        let i2 = Instruction::new(add, 4, vec![2, 1]);
        let mut program = Program::new(vec![i0, i1, i2], vec![4], registers).unwrap();
        program.find_effective_program();
        assert_eq!(program.effective_indices(), &[0, 2]);
    }

    #[test]
    fn execute_computes_identity_regression_program() {
        // r[1] = r[0] + r[const=0]; output r[1] should equal the input.
        let registers = RegisterSet::with_zero_default(1, 1, &[0.0]);
        let add = op("add", Arity::Binary, |a| a[0] + a[1]);
        let instructions = vec![Instruction::new(add, 1, vec![0, 2])];
        let mut program = Program::new(instructions, vec![1], registers).unwrap();
        program.registers_mut().write_sample(&[5.0]).unwrap();
        program.execute().unwrap();
        assert_eq!(program.read_outputs().unwrap(), vec![5.0]);
    }

    #[test]
    fn clone_preserves_fitness_and_output() {
        let registers = RegisterSet::with_zero_default(1, 1, &[0.0]);
        let add = op("add", Arity::Binary, |a| a[0] + a[1]);
        let instructions = vec![Instruction::new(add, 1, vec![0, 2])];
        let mut program = Program::new(instructions, vec![1], registers).unwrap();
        program.set_fitness(3.5);
        let mut clone = program.clone();
        assert_eq!(clone.fitness(), 3.5);

        program.registers_mut().write_sample(&[2.0]).unwrap();
        clone.registers_mut().write_sample(&[2.0]).unwrap();
        program.execute().unwrap();
        clone.execute().unwrap();
        assert_eq!(program.read_outputs().unwrap(), clone.read_outputs().unwrap());
    }

    #[test]
    fn non_finite_fitness_is_clamped_to_sentinel() {
        let registers = RegisterSet::with_zero_default(1, 1, &[0.0]);
        let add = op("add", Arity::Binary, |a| a[0] + a[1]);
        let instructions = vec![Instruction::new(add, 1, vec![0, 2])];
        let mut program = Program::new(instructions, vec![1], registers).unwrap();
        program.set_fitness(f64::NAN);
        assert_eq!(program.fitness(), UNDEFINED_FITNESS);
        program.set_fitness(f64::INFINITY);
        assert_eq!(program.fitness(), UNDEFINED_FITNESS);
    }

    #[test]
    fn construction_rejects_out_of_bounds_destination() {
        let registers = RegisterSet::with_zero_default(1, 1, &[0.0]);
        let add = op("add", Arity::Binary, |a| a[0] + a[1]);
        let instructions = vec![Instruction::new(add, 99, vec![0, 0])];
        let result = Program::new(instructions, vec![0], registers);
        assert!(matches!(result, Err(Error::RegisterRead(_))));
    }
}
