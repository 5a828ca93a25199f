//! A small registry of concrete operations, grounded on the instruction/
//! operation split in `urmzd-linear-gp` (a linear genetic programming crate
//! in the retrieval pack's `other_examples`) and sufficient to run the
//! end-to-end scenarios of spec §8.

use crate::operation::{Arity, Operation};
use crate::ops::Registry;

/// Division guarded against a near-zero divisor, a common LGP convention
/// that avoids `Inf`/`NaN` propagating through effective code.
fn protected_div(args: &[f64]) -> f64 {
    let divisor = args[1];
    if divisor.abs() < 1e-9 {
        0.0
    } else {
        args[0] / divisor
    }
}

/// Builds a registry pre-seeded with `add`, `sub`, `mul`, `div`, `sin`,
/// `cos`, `identity`, and `gt` (a branch operation).
pub fn standard_registry() -> Registry {
    let mut registry = Registry::new();
    registry.register("add", Operation::new("add", Arity::Binary, |a| a[0] + a[1]));
    registry.register("sub", Operation::new("sub", Arity::Binary, |a| a[0] - a[1]));
    registry.register("mul", Operation::new("mul", Arity::Binary, |a| a[0] * a[1]));
    registry.register("div", Operation::new("div", Arity::Binary, protected_div));
    registry.register("sin", Operation::new("sin", Arity::Unary, |a| a[0].sin()));
    registry.register("cos", Operation::new("cos", Arity::Unary, |a| a[0].cos()));
    registry.register("identity", Operation::new("identity", Arity::Unary, |a| a[0]));
    registry.register(
        "gt",
        Operation::branch("gt", Arity::Binary, |a| if a[0] > a[1] { 1.0 } else { 0.0 }),
    );
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protected_div_avoids_divide_by_zero() {
        assert_eq!(protected_div(&[1.0, 0.0]), 0.0);
        assert_eq!(protected_div(&[6.0, 3.0]), 2.0);
    }

    #[test]
    fn standard_registry_resolves_known_identifiers() {
        let registry = standard_registry();
        let resolved = registry
            .resolve(&["add".to_string(), "sin".to_string()])
            .unwrap();
        assert_eq!(resolved.len(), 2);
    }

    #[test]
    fn standard_registry_rejects_unknown_identifier() {
        let registry = standard_registry();
        let result = registry.resolve(&["nonexistent".to_string()]);
        assert!(result.is_err());
    }

    #[test]
    fn gt_is_a_branch_operation() {
        let registry = standard_registry();
        assert!(registry.get("gt").unwrap().is_branch());
        assert!(!registry.get("add").unwrap().is_branch());
    }
}
