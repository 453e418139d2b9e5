//! Object Heap Errors

use alloc::string::String;
use core::fmt;

use super::value::ObjectHandle;
use crate::contract::{Arity, ContractError};
use crate::security::SecurityError;

/// Errors raised by ordinary heap access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectError {
    /// The handle's object has been released.
    StaleHandle(ObjectHandle),
    /// The object has no such field.
    NoSuchField {
        /// Field name.
        name: String,
    },
    /// No method of that name resolves on the object's type.
    NoSuchMethod {
        /// Method name.
        name: String,
    },
    /// A method was called with an unacceptable number of arguments.
    WrongArgumentCount {
        /// Method name.
        name: String,
        /// Arguments supplied.
        given: usize,
        /// Arity of the resolved method.
        expected: Arity,
    },
}

impl fmt::Display for ObjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleHandle(handle) => write!(f, "stale object handle {:?}", handle),
            Self::NoSuchField { name } => write!(f, "no field `{}`", name),
            Self::NoSuchMethod { name } => write!(f, "undefined method `{}`", name),
            Self::WrongArgumentCount {
                name,
                given,
                expected,
            } => write!(
                f,
                "wrong number of arguments for `{}` ({} for {})",
                name, given, expected
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ObjectError {}

/// Errors raised by identity exchange. No state changes on any of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    /// An argument is an immediate value without heap identity.
    NotBoxed {
        /// Representation of the offending value.
        kind: &'static str,
    },
    /// A handle's object has been released.
    StaleHandle(ObjectHandle),
    /// An object's type does not support identity exchange.
    NotExchangeable {
        /// Name of the offending type.
        type_name: String,
    },
    /// The safety policy refused the exchange.
    Security(SecurityError),
    /// A record's type could not be looked up in the registry.
    Contract(ContractError),
}

impl fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotBoxed { kind } => write!(f, "{} is not boxed", kind),
            Self::StaleHandle(handle) => write!(f, "stale object handle {:?}", handle),
            Self::NotExchangeable { type_name } => {
                write!(f, "{} does not support identity exchange", type_name)
            }
            Self::Security(err) => write!(f, "{}", err),
            Self::Contract(err) => write!(f, "{}", err),
        }
    }
}

impl From<SecurityError> for ExchangeError {
    fn from(err: SecurityError) -> Self {
        Self::Security(err)
    }
}

impl From<ContractError> for ExchangeError {
    fn from(err: ContractError) -> Self {
        Self::Contract(err)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ExchangeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Security(err) => Some(err),
            Self::Contract(err) => Some(err),
            _ => None,
        }
    }
}
