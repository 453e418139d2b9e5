//! Method Arity
//!
//! Arity uses the signed encoding of the scripting layer:
//!
//! ```text
//!  n >= 0     exactly n arguments
//!  -(k + 1)   at least k arguments, more accepted
//! ```
//!
//! So `-1` is fully variadic, `-2` needs one argument, and so on.

use core::fmt;

/// The number of arguments a method accepts.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Arity(i32);

impl Arity {
    /// Accepts any number of arguments.
    pub const VARIADIC: Self = Self(-1);

    /// Exactly `n` arguments.
    #[inline]
    pub const fn exactly(n: u16) -> Self {
        Self(n as i32)
    }

    /// At least `k` arguments, more accepted.
    #[inline]
    pub const fn at_least(k: u16) -> Self {
        Self(-(k as i32) - 1)
    }

    /// Any number of arguments.
    #[inline]
    pub const fn variadic() -> Self {
        Self::VARIADIC
    }

    /// Build from the raw signed encoding.
    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Get the raw signed encoding.
    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Whether trailing arguments beyond `required` are accepted.
    #[inline]
    pub const fn is_variadic(self) -> bool {
        self.0 < 0
    }

    /// Number of required arguments, with the variadic encoding normalized.
    #[inline]
    pub const fn required(self) -> usize {
        if self.0 < 0 {
            (self.0 + 1).unsigned_abs() as usize
        } else {
            self.0 as usize
        }
    }

    /// Whether a call with `argc` arguments is acceptable.
    #[inline]
    pub const fn accepts(self, argc: usize) -> bool {
        if self.is_variadic() {
            argc >= self.required()
        } else {
            argc == self.required()
        }
    }
}

impl fmt::Debug for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Arity({})", self.0)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_variadic() {
            write!(f, "{}+", self.required())
        } else {
            write!(f, "{}", self.required())
        }
    }
}
