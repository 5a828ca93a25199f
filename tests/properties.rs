//! Property-based tests for the invariants in spec §8, using `proptest` the
//! way the teacher's own crate would reach for it had it carried dataset-
//! shaped genotypes (see DESIGN.md's dev-dependency ledger).

use proptest::prelude::*;

use linnaeus_gp::instruction::Instruction;
use linnaeus_gp::operation::{Arity, Operation};
use linnaeus_gp::program::Program;
use linnaeus_gp::registers::RegisterSet;

fn arithmetic_operations() -> Vec<Operation> {
    vec![
        Operation::new("add", Arity::Binary, |a| a[0] + a[1]),
        Operation::new("sub", Arity::Binary, |a| a[0] - a[1]),
        Operation::new("sin", Arity::Unary, |a| a[0].sin()),
    ]
}

/// Builds an arbitrary instruction sequence over a fixed 3-input/4-calculation/
/// 1-constant register set, with destinations restricted to the writable
/// range as every generator in this crate guarantees (spec §4.1 "destination
/// register from the writable registers").
fn arbitrary_program(num_instructions: usize) -> impl Strategy<Value = Program> {
    let operations = arithmetic_operations();
    let registers = RegisterSet::with_zero_default(3, 4, &[1.0]);
    let writable_end = registers.writable_range().end;
    let total = registers.len();

    let instruction_strategy = (0..operations.len()).prop_flat_map(move |op_index| {
        let operation = operations[op_index].clone();
        let arity = operation.arity().arg_count();
        (
            Just(operation),
            0..writable_end,
            proptest::collection::vec(0..total, arity),
        )
            .prop_map(|(operation, destination, operands)| {
                Instruction::new(operation, destination, operands)
            })
    });

    proptest::collection::vec(instruction_strategy, num_instructions).prop_map(move |instructions| {
        let registers = RegisterSet::with_zero_default(3, 4, &[1.0]);
        Program::new(instructions, vec![writable_end - 1], registers)
            .expect("destinations/operands/outputs constructed within register bounds")
    })
}

proptest! {
    /// Invariant 5 (spec §8): `effectiveInstructions` is always an
    /// order-preserving subsequence of `instructions`, for any instruction
    /// sequence within this crate's own construction invariants.
    #[test]
    fn effective_program_is_always_an_order_preserving_subsequence(
        mut program in arbitrary_program(12)
    ) {
        program.find_effective_program();
        let effective = program.effective_indices();
        prop_assert!(effective.windows(2).all(|w| w[0] < w[1]));
        for &index in effective {
            prop_assert!(index < program.len());
        }
    }

    /// Invariant 6 (spec §8): every effective instruction's destination is
    /// reachable from the output registers through the live-register backward
    /// flow — here checked as "every effective non-branch destination is
    /// either an output register or read as an operand by a later effective
    /// instruction", which is exactly what `find_effective_program` enforces
    /// by construction.
    #[test]
    fn every_effective_destination_feeds_a_later_effective_instruction_or_an_output(
        mut program in arbitrary_program(12)
    ) {
        program.find_effective_program();
        let outputs = program.output_register_indices().to_vec();
        let effective = program.effective_indices().to_vec();
        for (position, &index) in effective.iter().enumerate() {
            let instruction = &program.instructions()[index];
            if instruction.is_branch() {
                continue;
            }
            let destination = instruction.destination;
            let feeds_output = outputs.contains(&destination);
            let feeds_later_effective = effective[position + 1..].iter().any(|&later| {
                program.instructions()[later].operands.contains(&destination)
            });
            prop_assert!(feeds_output || feeds_later_effective);
        }
    }

    /// Invariant 3 (spec §8): calling an operation with the wrong argument
    /// count always fails with `Error::Arity`, regardless of the arguments
    /// supplied.
    #[test]
    fn arity_mismatch_always_fails(wrong_len in 0usize..6) {
        let add = Operation::new("add", Arity::Binary, |a| a[0] + a[1]);
        prop_assume!(wrong_len != 2);
        let args = vec![0.0; wrong_len];
        prop_assert!(add.execute(&args).is_err());
    }

    /// Invariant 4 (spec §8): mutating a cloned instruction's operand list
    /// never perturbs the original, for any operand list.
    #[test]
    fn instruction_clone_operand_list_is_independent(
        operands in proptest::collection::vec(0usize..20, 0..6),
        extra in 0usize..20
    ) {
        let operation = Operation::new("add", Arity::Nary(operands.len()), |a| a.iter().sum());
        let original = Instruction::new(operation, 0, operands.clone());
        let mut cloned = original.clone();
        cloned.operands.push(extra);
        prop_assert_eq!(original.operands, operands);
        prop_assert_ne!(original.operands.len(), cloned.operands.len());
    }
}
