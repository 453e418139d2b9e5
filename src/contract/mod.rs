//! Abstract Contract Enforcement
//!
//! Lets an abstract-declaring type name operations its concrete subtypes
//! must override, optionally with a minimum arity, and checks instance
//! types against those requirements before construction completes.
//!
//! # Design
//! - Requirements are registered explicitly, no reflection
//! - Each declaration installs a stub that fails when called
//! - Arity is checked at runtime against the normalized override arity

pub mod arity;
pub mod error;
pub mod registry;
pub mod types;

pub use arity::Arity;
pub use error::ContractError;
pub use registry::TypeRegistry;
pub use types::{AbstractRequirement, Method, MethodBody, NativeFn, TypeFlags, TypeRef};
