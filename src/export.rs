//! Translating a trained [`Program`] to a standalone C function (spec §6
//! "Program export format (C)").
//!
//! There is no teacher analogue — `genevo` has no notion of exporting a
//! genotype to a foreign-language artifact — so the renderer follows spec
//! §6's grammar directly: effective instructions as statements, non-effective
//! instructions as `//`-commented-out statements, with input/calculation/
//! constant registers pre-initialised per spec §6, and an optional `main`
//! wrapper reading `argc`/`argv` as inputs and printing the output registers.

use std::fmt::Write as _;

use crate::program::Program;

/// Renders a single instruction as the C statement
/// `r[destination] = <operator expression>;`. Operator printable forms come
/// from `Operation::name` (spec §4.2 "printable form"); this renderer treats
/// every operation as a call-style expression `name(r[a], r[b], ...)` since
/// the core has no further notion of infix/prefix rendering per operation.
fn render_statement(instruction: &crate::instruction::Instruction) -> String {
    let args: Vec<String> = instruction.operands.iter().map(|r| format!("r[{}]", r)).collect();
    format!(
        "r[{}] = {}({});",
        instruction.destination,
        instruction.operation.name(),
        args.join(", ")
    )
}

/// Renders `program` as a C function `void gp(double r[N])`. Effective
/// instructions (spec §3/§4.4) appear as live statements; every other
/// instruction in the *full* instruction list appears commented out, in its
/// original position, so a reader can see exactly what evolution discarded.
///
/// When `with_main` is set, a `main(int argc, char *argv[])` wrapper is
/// appended that parses `argc - 1` command-line arguments into the input
/// registers and prints the output registers. In that case `gp` itself does
/// not placeholder-initialise the input registers — `main` loads the parsed
/// `argv` values into them before calling `gp`, and a premature
/// `r[i] = 0.0` inside `gp` would clobber those values right back out. The
/// placeholder-initialisation of inputs to `0.0` (spec §6 "Program export
/// format") only applies when `gp` is emitted standalone, as the contract
/// for a caller who writes its own inputs before invoking it.
pub fn to_c(program: &Program, function_name: &str, with_main: bool) -> String {
    let mut out = String::new();
    let registers = program.registers();
    let total = registers.len();

    let _ = writeln!(out, "void {}(double r[{}]) {{", function_name, total);

    if !with_main {
        for index in 0..registers.num_inputs() {
            let _ = writeln!(out, "    r[{}] = 0.0; /* input */", index);
        }
    }
    for index in registers.calculation_range() {
        let default_value = registers.get(index).unwrap_or(0.0);
        let _ = writeln!(out, "    r[{}] = {:.17}; /* calculation default */", index, default_value);
    }
    for index in registers.constant_range() {
        let value = registers.get(index).expect("constant index in range");
        let _ = writeln!(out, "    r[{}] = {:.17}; /* constant */", index, value);
    }

    let effective: std::collections::HashSet<usize> = program.effective_indices().iter().copied().collect();
    for (index, instruction) in program.instructions().iter().enumerate() {
        let statement = render_statement(instruction);
        if effective.contains(&index) {
            let _ = writeln!(out, "    {}", statement);
        } else {
            let _ = writeln!(out, "    // {}", statement);
        }
    }

    out.push_str("}\n");

    if with_main {
        let num_inputs = registers.num_inputs();
        let _ = writeln!(out);
        let _ = writeln!(out, "#include <stdio.h>");
        let _ = writeln!(out, "#include <stdlib.h>");
        let _ = writeln!(out);
        let _ = writeln!(out, "int main(int argc, char *argv[]) {{");
        let _ = writeln!(out, "    double r[{}];", total);
        let _ = writeln!(out, "    if (argc - 1 != {}) {{", num_inputs);
        let _ = writeln!(
            out,
            "        fprintf(stderr, \"expected {} input argument(s)\\n\");",
            num_inputs
        );
        let _ = writeln!(out, "        return 1;");
        let _ = writeln!(out, "    }}");
        for index in 0..num_inputs {
            let _ = writeln!(out, "    r[{}] = atof(argv[{}]);", index, index + 1);
        }
        let _ = writeln!(out, "    {}(r);", function_name);
        for &output in program.output_register_indices() {
            let _ = writeln!(out, "    printf(\"%f\\n\", r[{}]);", output);
        }
        let _ = writeln!(out, "    return 0;");
        out.push_str("}\n");
    }

    out
}
