//! The error taxonomy raised by every other module.
//!
//! Following the teacher's own `simulation::SimError` / `ga::GeneticAlgorithmError`
//! shape, this crate collects its error conditions into one flat enum with a
//! manual `Display` and `std::error::Error` implementation rather than
//! generating per-module error types.

use std::fmt::{self, Display, Formatter};

/// The single error type returned by fallible operations across the crate.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// A configuration, dataset, operation, or constant loader failed to
    /// parse its input. Wraps the underlying parse failure's message.
    ComponentLoad(String),
    /// `config::Config::validate` rejected the configuration.
    ConfigurationInvalid(String),
    /// An attempt was made to write a constant register through the checked
    /// write path. This is a programming error in an operator implementation.
    RegisterAccess(String),
    /// A register index used for a read was out of bounds.
    RegisterRead(String),
    /// A register write targeted an index out of bounds, or a sample's
    /// feature count did not match the number of input registers.
    RegisterWriteRange(String),
    /// An operation was invoked with a number of arguments that did not
    /// match its declared arity.
    Arity(String),
    /// A selection operator was constructed or invoked with parameters that
    /// are inconsistent with the population size (tournament size, number
    /// of offspring).
    SelectionArgument(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::ComponentLoad(details) => write!(f, "component load error: {}", details),
            Error::ConfigurationInvalid(details) => {
                write!(f, "invalid configuration: {}", details)
            }
            Error::RegisterAccess(details) => write!(f, "register access error: {}", details),
            Error::RegisterRead(details) => write!(f, "register read error: {}", details),
            Error::RegisterWriteRange(details) => {
                write!(f, "register write-range error: {}", details)
            }
            Error::Arity(details) => write!(f, "arity error: {}", details),
            Error::SelectionArgument(details) => {
                write!(f, "selection argument error: {}", details)
            }
        }
    }
}

impl std::error::Error for Error {}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
