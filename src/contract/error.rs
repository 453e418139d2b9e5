//! Contract Errors

use alloc::string::String;
use core::fmt;

use super::types::TypeRef;

/// Errors raised while declaring or verifying abstract contracts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// Abstract operations were declared on a concrete type.
    NotAbstractDeclaring {
        /// Name of the offending type.
        type_name: String,
    },
    /// An abstract operation was invoked or left without an override.
    VirtualMethodError {
        /// Operation name.
        name: String,
    },
    /// An override accepts fewer arguments than the contract requires.
    InsufficientArity {
        /// Operation name.
        name: String,
        /// Minimum arity declared by the contract.
        required: usize,
        /// Normalized arity of the override.
        actual: usize,
    },
    /// A dynamic arity declaration was not a single `name, arity` pair.
    ArityMismatchArgs {
        /// Number of arguments supplied.
        given: usize,
    },
    /// The type reference does not belong to this registry.
    UnknownType(TypeRef),
}

impl fmt::Display for ContractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAbstractDeclaring { type_name } => write!(
                f,
                "cannot declare abstract operations for concrete type {}",
                type_name
            ),
            Self::VirtualMethodError { name } => {
                write!(f, "unimplemented virtual operation `{}`", name)
            }
            Self::InsufficientArity {
                name,
                required,
                actual,
            } => write!(
                f,
                "insufficient arity for overridden operation `{}` ({} for {})",
                name, actual, required
            ),
            Self::ArityMismatchArgs { given } => write!(
                f,
                "wrong arguments for arity declaration ({} given, expected name and arity)",
                given
            ),
            Self::UnknownType(ty) => write!(f, "unknown type {:?}", ty),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ContractError {}
