//! Crate-wide error type.
//!
//! Each component reports its own error enum; `Error` wraps them so callers
//! crossing component boundaries can use `?` throughout.

use core::fmt;

use crate::contract::ContractError;
use crate::object::{ExchangeError, ObjectError};
use crate::security::SecurityError;

/// Any error raised by the object core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Privilege or taint violation.
    Security(SecurityError),
    /// Abstract contract misuse or violation.
    Contract(ContractError),
    /// Identity exchange precondition failure.
    Exchange(ExchangeError),
    /// Ordinary heap access failure.
    Object(ObjectError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Security(err) => write!(f, "security error: {}", err),
            Self::Contract(err) => write!(f, "contract error: {}", err),
            Self::Exchange(err) => write!(f, "exchange error: {}", err),
            Self::Object(err) => write!(f, "object error: {}", err),
        }
    }
}

impl From<SecurityError> for Error {
    fn from(err: SecurityError) -> Self {
        Self::Security(err)
    }
}

impl From<ContractError> for Error {
    fn from(err: ContractError) -> Self {
        Self::Contract(err)
    }
}

impl From<ExchangeError> for Error {
    fn from(err: ExchangeError) -> Self {
        Self::Exchange(err)
    }
}

impl From<ObjectError> for Error {
    fn from(err: ObjectError) -> Self {
        Self::Object(err)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Security(err) => Some(err),
            Self::Contract(err) => Some(err),
            Self::Exchange(err) => Some(err),
            Self::Object(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::PrivilegeLevel;

    #[test]
    fn test_display_names_component() {
        let err = Error::from(ContractError::VirtualMethodError {
            name: "render".into(),
        });
        assert_eq!(
            err.to_string(),
            "contract error: unimplemented virtual operation `render`"
        );

        let err = Error::from(ExchangeError::from(SecurityError::CrossTaintExchange {
            level: PrivilegeLevel::JUSTIFY,
        }));
        assert!(err.to_string().starts_with("exchange error: insecure operation"));
    }
}
