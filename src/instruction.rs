//! A single three-address instruction (spec §3 "Instruction", spec §4.3).

use crate::error::Error;
use crate::operation::Operation;
use crate::registers::RegisterSet;

/// `r[destination] = operation(r[operands[0]], r[operands[1]], ...)`.
///
/// `operands.len()` must equal `operation.arity().arg_count()`; this
/// invariant is established by whoever constructs the instruction (the
/// generators in [`crate::generators`] and the mutation operators in
/// [`crate::mutation`]) and is re-checked by `Operation::execute` on every
/// call.
#[derive(Clone, Debug, PartialEq)]
pub struct Instruction {
    pub operation: Operation,
    pub destination: usize,
    pub operands: Vec<usize>,
}

impl Instruction {
    pub fn new(operation: Operation, destination: usize, operands: Vec<usize>) -> Self {
        Instruction {
            operation,
            destination,
            operands,
        }
    }

    /// Whether this instruction's operation is a branch operation (spec
    /// §4.2, §4.4).
    pub fn is_branch(&self) -> bool {
        self.operation.is_branch()
    }

    /// Reads the operand registers, applies the operation, and writes the
    /// result to the destination register. Returns the raw result value so
    /// that branch-aware execution (`Program::execute`) can compare it
    /// against the sentinel true value without a second register read.
    pub fn execute(&self, registers: &mut RegisterSet) -> Result<f64, Error> {
        let mut args = Vec::with_capacity(self.operands.len());
        for &operand in &self.operands {
            args.push(registers.get(operand)?);
        }
        let result = self.operation.execute(&args)?;
        registers.set(self.destination, result)?;
        Ok(result)
    }
}
