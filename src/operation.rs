//! The operation contract (spec §3 "Operation", spec §4.2).
//!
//! Per spec §9's redesign guidance, this crate represents operations as a
//! closed tagged value — an [`Arity`] enum plus a boxed `Fn` and an explicit
//! `is_branch` flag — rather than as a class hierarchy of unary/binary
//! operation subtypes with a marker-trait-tagged branch subtype. This keeps
//! dispatch flat: every `Operation`, branch or not, is called the same way.

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use crate::error::Error;

/// The number of arguments an [`Operation`] expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    Unary,
    Binary,
    Nary(usize),
}

impl Arity {
    /// The concrete argument count this arity requires.
    pub fn arg_count(self) -> usize {
        match self {
            Arity::Unary => 1,
            Arity::Binary => 2,
            Arity::Nary(n) => n,
        }
    }
}

/// An immutable, pure function over a fixed-arity argument vector, plus its
/// printable form. Operations are shared (cloning an `Operation` is cheap —
/// it is a reference-counted handle to the same function) so that many
/// [`Instruction`](crate::instruction::Instruction)s can reference the same
/// operation without duplicating it.
#[derive(Clone)]
pub struct Operation {
    name: String,
    arity: Arity,
    is_branch: bool,
    function: Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>,
}

impl Operation {
    /// Constructs a new non-branch operation.
    pub fn new<F>(name: impl Into<String>, arity: Arity, function: F) -> Self
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        Operation {
            name: name.into(),
            arity,
            is_branch: false,
            function: Arc::new(function),
        }
    }

    /// Constructs a new branch operation: its result is interpreted as a
    /// predicate governing whether the instruction following it executes
    /// (spec §4.2, §4.4).
    pub fn branch<F>(name: impl Into<String>, arity: Arity, function: F) -> Self
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        Operation {
            name: name.into(),
            arity,
            is_branch: true,
            function: Arc::new(function),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn is_branch(&self) -> bool {
        self.is_branch
    }

    /// Applies this operation's function to `args`. Fails with
    /// `Error::Arity` unless `args.len()` matches the declared arity.
    pub fn execute(&self, args: &[f64]) -> Result<f64, Error> {
        let expected = self.arity.arg_count();
        if args.len() != expected {
            return Err(Error::Arity(format!(
                "operation '{}' expects {} argument(s), got {}",
                self.name,
                expected,
                args.len()
            )));
        }
        Ok((self.function)(args))
    }
}

impl Debug for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("is_branch", &self.is_branch)
            .finish()
    }
}

impl PartialEq for Operation {
    /// Two operations are equal iff they are the same shared function
    /// (Rust has no general way to compare closures by value), i.e. iff
    /// cloned from one another.
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.arity == other.arity
            && self.is_branch == other.is_branch
            && Arc::ptr_eq(&self.function, &other.function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_mismatch_fails() {
        let add = Operation::new("add", Arity::Binary, |args| args[0] + args[1]);
        let result = add.execute(&[1.0]);
        assert!(matches!(result, Err(Error::Arity(_))));
    }

    #[test]
    fn matching_arity_executes() {
        let add = Operation::new("add", Arity::Binary, |args| args[0] + args[1]);
        assert_eq!(add.execute(&[1.0, 2.0]).unwrap(), 3.0);
    }

    #[test]
    fn branch_operation_is_tagged() {
        let gt = Operation::branch("gt", Arity::Binary, |args| {
            if args[0] > args[1] { 1.0 } else { 0.0 }
        });
        assert!(gt.is_branch());
    }

    #[test]
    fn cloned_operation_shares_function() {
        let add = Operation::new("add", Arity::Binary, |args| args[0] + args[1]);
        let cloned = add.clone();
        assert_eq!(add, cloned);
    }
}
