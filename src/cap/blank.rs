//! Restricted Capability Objects
//!
//! A `CapabilityObject` lives outside the object hierarchy and carries the
//! barest minimum of behaviour: a capability mask that anyone can read and
//! only a sufficiently privileged caller can write.
//!
//! # Structure
//! ```text
//! ┌───────────────────────────────────────────┐
//! │             CapabilityObject              │
//! ├───────────────────────────────────────────┤
//! │  mask: Mutex<CapabilityMask>  - starts 0  │
//! └───────────────────────────────────────────┘
//! ```
//!
//! # Security Properties
//! - No `Clone`, `PartialEq`, `Debug`, `Display` or `Default`: untrusted code
//!   holding one gets nothing beyond `capability` and `set_capability`
//! - The mask is only ever written by `set_capability`
//! - Writes are refused from level 3 upwards

use spin::Mutex;

use super::mask::CapabilityMask;
use crate::security::{self, SecurityContext, SecurityError};

/// A restricted object holding a single capability mask.
pub struct CapabilityObject {
    mask: Mutex<CapabilityMask>,
}

impl CapabilityObject {
    /// Create a new object with an empty mask.
    pub const fn new() -> Self {
        Self {
            mask: Mutex::new(CapabilityMask::NONE),
        }
    }

    /// Get the current capability mask.
    #[inline]
    pub fn capability(&self) -> CapabilityMask {
        *self.mask.lock()
    }

    /// Set the capability mask.
    ///
    /// Returns the stored mask. On refusal the mask is left untouched.
    pub fn set_capability(
        &self,
        ctx: &SecurityContext,
        value: impl Into<CapabilityMask>,
    ) -> Result<CapabilityMask, SecurityError> {
        let mut mask = self.mask.lock();
        security::check_capability_write(ctx)?;

        *mask = value.into();
        log::debug!("capability mask set to {}", *mask);
        Ok(*mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::PrivilegeLevel;

    #[test]
    fn test_new_is_empty() {
        assert_eq!(CapabilityObject::new().capability().get(), 0);
    }

    #[test]
    fn test_set_unrestricted() {
        let obj = CapabilityObject::new();
        let stored = obj
            .set_capability(&SecurityContext::unrestricted(), 5)
            .unwrap();
        assert_eq!(stored.get(), 5);
        assert_eq!(obj.capability().get(), 5);
    }

    #[test]
    fn test_set_below_threshold() {
        let obj = CapabilityObject::new();
        let ctx = SecurityContext::at(PrivilegeLevel::new(2).unwrap());
        assert!(obj.set_capability(&ctx, 9).is_ok());
        assert_eq!(obj.capability().get(), 9);
    }

    #[test]
    fn test_set_refused_at_level_3() {
        let obj = CapabilityObject::new();
        let ctx = SecurityContext::at(PrivilegeLevel::READ_ONLY_CAPABILITIES);
        let err = obj.set_capability(&ctx, 5).unwrap_err();
        assert!(matches!(err, SecurityError::InsufficientPrivilege { .. }));
        assert_eq!(obj.capability().get(), 0);
    }

    #[test]
    fn test_refusal_keeps_previous_value() {
        let obj = CapabilityObject::new();
        let root = SecurityContext::unrestricted();
        obj.set_capability(&root, 7).unwrap();

        let sandboxed = root.raise(PrivilegeLevel::FORBIDDEN);
        assert!(obj.set_capability(&sandboxed, 1).is_err());
        assert_eq!(obj.capability().get(), 7);
    }
}
