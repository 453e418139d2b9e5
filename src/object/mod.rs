//! Object Heap and Identity Exchange
//!
//! # Design
//! - Every reference is an `ObjectHandle` into an arena of slots
//! - A slot holds the object's `ObjectRecord`
//! - Identity exchange swaps two slots' records, never the handles
//!
//! # Security Properties
//! - Objects are only published after contract verification
//! - Exchange validates every precondition before it writes
//! - Exchange consults the safety policy for tainted records
//! - Method bodies see a `RecordView`, never the record itself

pub mod error;
mod exchange;
pub mod heap;
pub mod record;
pub mod value;

pub use error::{ExchangeError, ObjectError};
pub use heap::ObjectHeap;
pub use record::{ObjectRecord, RecordFlags, RecordView};
pub use value::{ObjectHandle, Value};
