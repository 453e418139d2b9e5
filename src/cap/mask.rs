//! Capability Masks
//!
//! The numeric privilege mask carried by a restricted object.
//!
//! The core attaches no meaning to individual bits; sandbox policy code
//! outside the core decides what each bit grants. The mask is signed so that
//! any integer a script hands over can be stored unchanged.

use core::fmt;

/// A capability mask.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[repr(transparent)]
pub struct CapabilityMask(i64);

impl CapabilityMask {
    /// No capabilities.
    pub const NONE: Self = Self(0);

    /// Create a mask from a raw value.
    #[inline]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Get the raw value.
    #[inline]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Get the raw bits.
    #[inline]
    pub const fn bits(self) -> u64 {
        self.0 as u64
    }

    /// Check if this mask includes all bits of `other`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Check if empty.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl From<i64> for CapabilityMask {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for CapabilityMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains() {
        let mask = CapabilityMask::new(0b1011);
        assert!(mask.contains(CapabilityMask::new(0b0011)));
        assert!(!mask.contains(CapabilityMask::new(0b0100)));
        assert!(mask.contains(CapabilityMask::NONE));
    }

    #[test]
    fn test_negative_mask_bits() {
        let mask = CapabilityMask::new(-1);
        assert_eq!(mask.bits(), u64::MAX);
        assert!(!mask.is_empty());
        assert!(CapabilityMask::default().is_empty());
    }
}
