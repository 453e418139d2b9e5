//! Handles and Values
//!
//! References never point at records directly. A reference holds an
//! `ObjectHandle`, a stable `{index, generation}` pair naming a slot in the
//! object heap; whatever record currently sits in that slot is what the
//! reference observes.
//!
//! Immediate values (`Nil`, `Bool`, `Int`, `Sym`) are stored inline and have
//! no heap identity of their own.

use alloc::string::String;
use core::fmt;

/// Stable identity of a heap object.
///
/// Handles are compared and ordered by slot index first, which gives the
/// global lock order used when two slots must be held at once.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectHandle {
    index: u32,
    generation: u32,
}

impl ObjectHandle {
    #[inline]
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index in the heap.
    #[inline]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// Generation of the slot when this handle was issued.
    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectHandle({}#{})", self.index, self.generation)
    }
}

/// A value held by a reference or a field.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Value {
    /// Absence of a value.
    #[default]
    Nil,
    /// Boolean.
    Bool(bool),
    /// Small integer.
    Int(i64),
    /// Interned name.
    Sym(String),
    /// Reference to a heap object.
    Ref(ObjectHandle),
}

impl Value {
    /// Build a symbol.
    pub fn sym(name: &str) -> Self {
        Self::Sym(String::from(name))
    }

    /// Whether this value has no heap identity.
    #[inline]
    pub const fn is_immediate(&self) -> bool {
        !matches!(self, Self::Ref(_))
    }

    /// Get the handle of a boxed value.
    #[inline]
    pub const fn as_handle(&self) -> Option<ObjectHandle> {
        match self {
            Self::Ref(handle) => Some(*handle),
            _ => None,
        }
    }

    /// Short name of the value's representation, for diagnostics.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::Sym(_) => "symbol",
            Self::Ref(_) => "object",
        }
    }
}

impl From<ObjectHandle> for Value {
    fn from(handle: ObjectHandle) -> Self {
        Self::Ref(handle)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(n.into())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_immediates() {
        assert!(Value::Nil.is_immediate());
        assert!(Value::Int(3).is_immediate());
        assert!(Value::sym("x").is_immediate());
        let boxed = Value::from(ObjectHandle::new(1, 0));
        assert!(!boxed.is_immediate());
        assert_eq!(boxed.as_handle(), Some(ObjectHandle::new(1, 0)));
        assert_eq!(Value::Int(3).as_handle(), None);
    }

    #[test]
    fn test_handle_order_follows_index() {
        assert!(ObjectHandle::new(1, 9) < ObjectHandle::new(2, 0));
    }
}
