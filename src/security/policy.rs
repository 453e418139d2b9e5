//! Privilege Levels and Safety Checks
//!
//! Every mutating operation in the object core asks this module first.
//!
//! # Levels
//! ```text
//! 0  unrestricted
//! 1  cross-taint identity exchange needs justification (refused)
//! 2  (no additional restriction in the core)
//! 3  capability masks become read-only
//! 4  tainted objects can no longer take part in identity exchange
//! ```
//!
//! # Design
//! - The level is carried by an explicit `SecurityContext` value
//! - A context can only be raised, never lowered
//! - Checks are pure predicates with no side effects

use core::fmt;

/// Level from which operations require justification.
pub const JUSTIFICATION_LEVEL: u8 = 1;

/// Level from which capability masks can no longer be written.
pub const CAPABILITY_WRITE_LEVEL: u8 = 3;

/// Level from which tainted objects are fully locked out.
pub const FORBIDDEN_LEVEL: u8 = 4;

/// Highest valid privilege level.
pub const MAX_LEVEL: u8 = FORBIDDEN_LEVEL;

/// Errors raised by the safety policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityError {
    /// Exactly one of the two exchanged objects is tainted.
    CrossTaintExchange {
        /// Level at the call site.
        level: PrivilegeLevel,
    },
    /// A tainted object was offered for exchange at a forbidden level.
    TaintedExchangeForbidden {
        /// Level at the call site.
        level: PrivilegeLevel,
    },
    /// The caller's level is too restricted for the operation.
    InsufficientPrivilege {
        /// Level at the call site.
        level: PrivilegeLevel,
        /// The operation needs a level strictly below this one.
        required: PrivilegeLevel,
    },
    /// A level outside `0..=MAX_LEVEL` was requested.
    InvalidLevel(u8),
}

impl fmt::Display for SecurityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CrossTaintExchange { level } => write!(
                f,
                "insecure operation: exchange between tainted and untainted objects at level {}",
                level
            ),
            Self::TaintedExchangeForbidden { level } => write!(
                f,
                "insecure operation: exchange of tainted objects at level {}",
                level
            ),
            Self::InsufficientPrivilege { level, required } => write!(
                f,
                "insecure operation at level {} (requires level below {})",
                level, required
            ),
            Self::InvalidLevel(raw) => write!(f, "invalid privilege level {}", raw),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SecurityError {}

/// An ordered privilege level. Higher means more restricted.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[repr(transparent)]
pub struct PrivilegeLevel(u8);

impl PrivilegeLevel {
    /// No restrictions.
    pub const UNRESTRICTED: Self = Self(0);

    /// Cross-taint exchange refused.
    pub const JUSTIFY: Self = Self(JUSTIFICATION_LEVEL);

    /// Capability writes refused.
    pub const READ_ONLY_CAPABILITIES: Self = Self(CAPABILITY_WRITE_LEVEL);

    /// Tainted exchange refused.
    pub const FORBIDDEN: Self = Self(FORBIDDEN_LEVEL);

    /// Create a level, rejecting values above `MAX_LEVEL`.
    pub const fn new(raw: u8) -> Result<Self, SecurityError> {
        if raw > MAX_LEVEL {
            Err(SecurityError::InvalidLevel(raw))
        } else {
            Ok(Self(raw))
        }
    }

    /// Get the raw level.
    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Whether sensitive operations at this level need justification.
    #[inline]
    pub const fn requires_justification(self) -> bool {
        self.0 >= JUSTIFICATION_LEVEL
    }

    /// Whether operations on tainted data are forbidden outright.
    #[inline]
    pub const fn forbidden(self) -> bool {
        self.0 >= FORBIDDEN_LEVEL
    }
}

impl fmt::Display for PrivilegeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The ambient privilege of a call chain, passed explicitly.
///
/// Contexts are `Copy`. A callee handed a context can derive a more
/// restricted one with [`SecurityContext::raise`] but has no way to obtain a
/// less restricted one from it.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct SecurityContext {
    level: PrivilegeLevel,
}

impl SecurityContext {
    /// The level-0 root context.
    pub const fn unrestricted() -> Self {
        Self {
            level: PrivilegeLevel::UNRESTRICTED,
        }
    }

    /// A context at `level`.
    ///
    /// Only the embedding runtime should mint contexts this way; code running
    /// inside a call chain should use `raise`.
    pub const fn at(level: PrivilegeLevel) -> Self {
        Self { level }
    }

    /// Derive a context at least as restricted as `self` and `level`.
    #[inline]
    pub fn raise(self, level: PrivilegeLevel) -> Self {
        Self {
            level: self.level.max(level),
        }
    }

    /// Get the level carried by this context.
    #[inline]
    pub const fn level(&self) -> PrivilegeLevel {
        self.level
    }
}

/// Read the ambient level of the current call chain.
#[inline]
pub fn current_privilege_level(ctx: &SecurityContext) -> PrivilegeLevel {
    ctx.level()
}

/// Check whether two objects with the given taint flags may exchange identity.
pub fn check_exchange_allowed(
    ctx: &SecurityContext,
    a_tainted: bool,
    b_tainted: bool,
) -> Result<(), SecurityError> {
    let level = current_privilege_level(ctx);

    if level.forbidden() && (a_tainted || b_tainted) {
        log::warn!("refusing exchange of tainted object at level {}", level);
        return Err(SecurityError::TaintedExchangeForbidden { level });
    }

    if level.requires_justification() && a_tainted != b_tainted {
        log::warn!("refusing cross-taint exchange at level {}", level);
        return Err(SecurityError::CrossTaintExchange { level });
    }

    Ok(())
}

/// Check whether the caller may write a capability mask.
pub fn check_capability_write(ctx: &SecurityContext) -> Result<(), SecurityError> {
    let level = current_privilege_level(ctx);
    if level.get() < CAPABILITY_WRITE_LEVEL {
        Ok(())
    } else {
        log::warn!("refusing capability write at level {}", level);
        Err(SecurityError::InsufficientPrivilege {
            level,
            required: PrivilegeLevel::READ_ONLY_CAPABILITIES,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(level: u8) -> SecurityContext {
        SecurityContext::at(PrivilegeLevel::new(level).unwrap())
    }

    #[test]
    fn test_level_bounds() {
        assert!(PrivilegeLevel::new(4).is_ok());
        assert_eq!(PrivilegeLevel::new(5), Err(SecurityError::InvalidLevel(5)));
    }

    #[test]
    fn test_raise_never_lowers() {
        let high = ctx(3);
        assert_eq!(high.raise(PrivilegeLevel::UNRESTRICTED).level().get(), 3);
        assert_eq!(high.raise(PrivilegeLevel::FORBIDDEN).level().get(), 4);
        assert_eq!(SecurityContext::default().level(), PrivilegeLevel::UNRESTRICTED);
        assert_eq!(PrivilegeLevel::default(), PrivilegeLevel::UNRESTRICTED);
    }

    #[test]
    fn test_exchange_unrestricted() {
        let ctx = ctx(0);
        assert!(check_exchange_allowed(&ctx, true, false).is_ok());
        assert!(check_exchange_allowed(&ctx, true, true).is_ok());
    }

    #[test]
    fn test_exchange_cross_taint() {
        for level in 1..4 {
            let ctx = ctx(level);
            assert!(matches!(
                check_exchange_allowed(&ctx, false, true),
                Err(SecurityError::CrossTaintExchange { .. })
            ));
            assert!(check_exchange_allowed(&ctx, true, true).is_ok());
            assert!(check_exchange_allowed(&ctx, false, false).is_ok());
        }
    }

    #[test]
    fn test_exchange_forbidden() {
        let ctx = ctx(4);
        assert!(matches!(
            check_exchange_allowed(&ctx, true, true),
            Err(SecurityError::TaintedExchangeForbidden { .. })
        ));
        assert!(matches!(
            check_exchange_allowed(&ctx, false, true),
            Err(SecurityError::TaintedExchangeForbidden { .. })
        ));
        assert!(check_exchange_allowed(&ctx, false, false).is_ok());
    }

    #[test]
    fn test_capability_write_threshold() {
        assert!(check_capability_write(&ctx(0)).is_ok());
        assert!(check_capability_write(&ctx(2)).is_ok());
        assert_eq!(
            check_capability_write(&ctx(3)),
            Err(SecurityError::InsufficientPrivilege {
                level: PrivilegeLevel::READ_ONLY_CAPABILITIES,
                required: PrivilegeLevel::READ_ONLY_CAPABILITIES,
            })
        );
    }
}
