//! Safety Policy
//!
//! Privilege levels and the predicates gating identity exchange and
//! capability writes.
//!
//! # Security Properties
//! - The level travels in an explicit `SecurityContext`, never in globals
//! - A context can be raised but never lowered
//! - Every check is validated before the caller mutates anything

pub mod policy;

pub use policy::{
    check_capability_write, check_exchange_allowed, current_privilege_level, PrivilegeLevel,
    SecurityContext, SecurityError,
};
