//! Capability-Gated Restricted Objects
//!
//! # Design
//! - `CapabilityObject` shares no behaviour with heap objects
//! - Its only state is a `CapabilityMask`
//! - Every write goes through the safety policy first

pub mod blank;
pub mod mask;

pub use blank::CapabilityObject;
pub use mask::CapabilityMask;
