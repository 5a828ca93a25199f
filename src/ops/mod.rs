//! Operation loading: resolving the string identifiers in
//! [`Config::operations`](crate::config::Config::operations) to concrete
//! [`Operation`]s (spec §6 "Operation loading").
//!
//! The core only requires the operation *contract*
//! ([`operation::Operation`](crate::operation::Operation)); concrete
//! operation bodies (addition, sine, ...) are named in spec §1 as out of
//! scope for the hard part of the engine. [`builtin`] still provides a small
//! registry of them so the engine is runnable end-to-end and so the
//! registration-table pattern spec §9 calls for ("replace dynamic
//! reflection with an explicit registration table populated at startup") has
//! something concrete to demonstrate.

pub mod builtin;

use std::collections::HashMap;

use crate::error::Error;
use crate::operation::Operation;

/// A registry mapping operation identifiers to concrete operations,
/// populated at startup rather than resolved through runtime reflection.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    operations: HashMap<String, Operation>,
}

impl Registry {
    pub fn new() -> Self {
        Registry {
            operations: HashMap::new(),
        }
    }

    /// Registers `operation` under `identifier`, replacing any previous
    /// registration for the same identifier.
    pub fn register(&mut self, identifier: impl Into<String>, operation: Operation) {
        self.operations.insert(identifier.into(), operation);
    }

    /// Looks up a single identifier.
    pub fn get(&self, identifier: &str) -> Option<&Operation> {
        self.operations.get(identifier)
    }

    /// Resolves a list of identifiers (as they appear in
    /// `Config::operations`) into the matching operations, in order.
    /// Fails with `Error::ComponentLoad` on the first unknown identifier.
    pub fn resolve(&self, identifiers: &[String]) -> Result<Vec<Operation>, Error> {
        identifiers
            .iter()
            .map(|identifier| {
                self.get(identifier).cloned().ok_or_else(|| {
                    Error::ComponentLoad(format!("unknown operation identifier '{}'", identifier))
                })
            })
            .collect()
    }
}
