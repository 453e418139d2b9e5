//! objcap - Object Identity, Contracts and Capabilities
//!
//! The object-model core of a sandboxed, multi-user scripting runtime.
//!
//! # Capabilities
//! - Identity exchange: two live objects swap identity, observed through
//!   every existing reference
//! - Abstract contracts: base types declare operations (optionally with a
//!   minimum arity) that concrete subtypes must override, checked when an
//!   object is constructed
//! - Capability objects: minimal restricted objects holding a privilege mask
//!   that only privileged callers may change
//!
//! # Security Features
//! - Privilege levels travel in an explicit, raise-only `SecurityContext`
//! - Taint is explicit per record and gates identity exchange
//! - Every check happens before any state is written
//!
//! # Architecture
//! ```text
//!   security::policy  <──  cap::CapabilityObject
//!          ^
//!          │
//!   object::ObjectHeap ──verify──> contract::TypeRegistry
//!     (exchange, construct)
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

extern crate alloc;

#[cfg(all(feature = "std", not(test)))]
extern crate std;

pub mod cap;
pub mod contract;
pub mod error;
pub mod object;
pub mod security;

pub use cap::{CapabilityMask, CapabilityObject};
pub use contract::{Arity, ContractError, TypeFlags, TypeRef, TypeRegistry};
pub use error::Error;
pub use object::{ExchangeError, ObjectError, ObjectHandle, ObjectHeap, ObjectRecord, RecordView, Value};
pub use security::{PrivilegeLevel, SecurityContext, SecurityError};
