//! Type Definitions
//!
//! The minimal slice of the class hierarchy the contract checks need:
//! a parent link, marker flags, a method table and a contract table.

use alloc::collections::BTreeMap;
use alloc::string::String;
use core::fmt;

use super::arity::Arity;
use crate::error::Error;
use crate::object::{RecordView, Value};

/// Stable reference to a type in a `TypeRegistry`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct TypeRef(u32);

impl TypeRef {
    /// The common root type every registry starts with.
    pub const ROOT: Self = Self(0);

    #[inline]
    pub(crate) const fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    /// Get the index into the registry.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeRef({})", self.0)
    }
}

bitflags::bitflags! {
    /// Marker capabilities of a type. Inherited by every subtype.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
    pub struct TypeFlags: u32 {
        /// The type may declare abstract operations.
        const ABSTRACT_DECLARING = 1 << 0;
        /// Instances may take part in identity exchange.
        const EXCHANGEABLE = 1 << 1;
    }
}

/// Native method implementation. Runs against a view of the receiver.
pub type NativeFn = fn(&mut RecordView<'_>, &[Value]) -> Result<Value, Error>;

/// The body of a method table entry.
#[derive(Clone, Copy)]
pub enum MethodBody {
    /// Stub installed by an abstract declaration.
    Abstract,
    /// A real implementation.
    Native(NativeFn),
}

impl fmt::Debug for MethodBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Abstract => write!(f, "Abstract"),
            Self::Native(_) => write!(f, "Native"),
        }
    }
}

/// A method table entry.
#[derive(Clone, Copy, Debug)]
pub struct Method {
    /// Accepted arguments.
    pub arity: Arity,
    /// Implementation.
    pub body: MethodBody,
}

impl Method {
    /// The stub for an abstract operation. Accepts any arguments.
    pub const fn stub() -> Self {
        Self {
            arity: Arity::VARIADIC,
            body: MethodBody::Abstract,
        }
    }

    /// Whether this entry is still the abstract stub.
    #[inline]
    pub const fn is_abstract(&self) -> bool {
        matches!(self.body, MethodBody::Abstract)
    }
}

/// A declared abstract operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AbstractRequirement {
    /// Operation name.
    pub name: String,
    /// Minimum normalized arity of the override, if constrained.
    pub min_arity: Option<usize>,
}

/// Abstract requirements declared directly on one type.
#[derive(Clone, Debug, Default)]
pub struct ContractTable {
    entries: BTreeMap<String, Option<usize>>,
}

impl ContractTable {
    /// Record a requirement, replacing any earlier arity for the same name.
    ///
    /// A plain declaration never erases an arity recorded earlier.
    pub fn insert(&mut self, name: &str, min_arity: Option<usize>) {
        if let Some(slot) = self.entries.get_mut(name) {
            if min_arity.is_some() {
                *slot = min_arity;
            }
        } else {
            self.entries.insert(String::from(name), min_arity);
        }
    }

    /// Check if nothing is required.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over requirements.
    pub fn iter(&self) -> impl Iterator<Item = AbstractRequirement> + '_ {
        self.entries
            .iter()
            .map(|(name, min_arity)| AbstractRequirement {
                name: name.clone(),
                min_arity: *min_arity,
            })
    }
}

/// A registered type.
#[derive(Debug)]
pub(crate) struct TypeDef {
    pub(crate) name: String,
    pub(crate) parent: Option<TypeRef>,
    pub(crate) flags: TypeFlags,
    pub(crate) methods: BTreeMap<String, Method>,
    pub(crate) contract: ContractTable,
}

impl TypeDef {
    pub(crate) fn new(name: &str, parent: Option<TypeRef>, flags: TypeFlags) -> Self {
        Self {
            name: String::from(name),
            parent,
            flags,
            methods: BTreeMap::new(),
            contract: ContractTable::default(),
        }
    }
}
