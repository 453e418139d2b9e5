//! Object Records
//!
//! The mutable state behind a handle. Identity exchange swaps whole
//! records, so everything that makes up an object's identity lives here.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                ObjectRecord                 │
//! ├─────────────────────────────────────────────┤
//! │  type_tag: TypeRef       - concrete type    │
//! │  fields: name -> Value   - instance state   │
//! │  flags: RecordFlags      - taint            │
//! │  serial: u64             - birth order      │
//! └─────────────────────────────────────────────┘
//! ```

use alloc::collections::BTreeMap;
use alloc::string::String;
use core::fmt;

use super::value::Value;
use crate::contract::TypeRef;

bitflags::bitflags! {
    /// Per-record flags.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
    pub struct RecordFlags: u8 {
        /// Data came from an untrusted source.
        const TAINTED = 1 << 0;
    }
}

/// Backing storage of one object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectRecord {
    type_tag: TypeRef,
    fields: BTreeMap<String, Value>,
    flags: RecordFlags,
    serial: u64,
}

impl ObjectRecord {
    /// Create an empty, untainted record of type `ty`.
    pub fn new(ty: TypeRef) -> Self {
        Self {
            type_tag: ty,
            fields: BTreeMap::new(),
            flags: RecordFlags::empty(),
            serial: 0,
        }
    }

    /// Builder: set a field.
    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set_field(name, value.into());
        self
    }

    /// Builder: mark as tainted.
    pub fn tainted(mut self) -> Self {
        self.taint();
        self
    }

    /// Get the concrete type of the object.
    #[inline]
    pub fn type_tag(&self) -> TypeRef {
        self.type_tag
    }

    /// Get the record flags.
    #[inline]
    pub fn flags(&self) -> RecordFlags {
        self.flags
    }

    /// Construction serial assigned by the heap.
    #[inline]
    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub(crate) fn set_serial(&mut self, serial: u64) {
        self.serial = serial;
    }

    /// Check if the record carries the taint flag.
    #[inline]
    pub fn is_tainted(&self) -> bool {
        self.flags.contains(RecordFlags::TAINTED)
    }

    /// Mark the record as tainted. Taint is never cleared.
    #[inline]
    pub fn taint(&mut self) {
        self.flags.insert(RecordFlags::TAINTED);
    }

    /// Get a field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Set a field, returning the previous value.
    pub fn set_field(&mut self, name: &str, value: Value) -> Option<Value> {
        self.fields.insert(String::from(name), value)
    }

    /// Iterate over fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// What a method body may touch of the record it runs on.
///
/// Fields are open for reading and writing and taint can be added. The
/// type tag, serial and flags stay under the heap's control, and the record
/// itself can never be replaced through a view.
pub struct RecordView<'a> {
    record: &'a mut ObjectRecord,
}

impl<'a> RecordView<'a> {
    pub(crate) fn new(record: &'a mut ObjectRecord) -> Self {
        Self { record }
    }

    /// Get the concrete type of the object.
    #[inline]
    pub fn type_tag(&self) -> TypeRef {
        self.record.type_tag()
    }

    /// Construction serial of the object.
    #[inline]
    pub fn serial(&self) -> u64 {
        self.record.serial()
    }

    /// Check if the object is tainted.
    #[inline]
    pub fn is_tainted(&self) -> bool {
        self.record.is_tainted()
    }

    /// Mark the object as tainted.
    #[inline]
    pub fn taint(&mut self) {
        self.record.taint();
    }

    /// Get a field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.record.field(name)
    }

    /// Set a field, returning the previous value.
    pub fn set_field(&mut self, name: &str, value: Value) -> Option<Value> {
        self.record.set_field(name, value)
    }

    /// Iterate over fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.record.fields()
    }
}

impl fmt::Debug for RecordView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RecordView").field(&*self.record).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let record = ObjectRecord::new(TypeRef::ROOT)
            .with_field("hp", 10)
            .with_field("alive", true)
            .tainted();
        assert!(record.is_tainted());
        assert_eq!(record.field("hp"), Some(&Value::Int(10)));
        assert_eq!(record.fields().count(), 2);
        assert_eq!(record.serial(), 0);
    }

    #[test]
    fn test_set_field_returns_previous() {
        let mut record = ObjectRecord::new(TypeRef::ROOT);
        assert_eq!(record.set_field("x", Value::Int(1)), None);
        assert_eq!(record.set_field("x", Value::Int(2)), Some(Value::Int(1)));
    }

    #[test]
    fn test_view_keeps_identity() {
        let mut record = ObjectRecord::new(TypeRef::ROOT).tainted();
        record.set_serial(7);
        let mut view = RecordView::new(&mut record);
        view.set_field("x", Value::Int(1));
        view.taint();
        assert_eq!(view.field("x"), Some(&Value::Int(1)));
        assert_eq!(view.serial(), 7);

        assert!(record.is_tainted());
        assert_eq!(record.type_tag(), TypeRef::ROOT);
        assert_eq!(record.serial(), 7);
    }
}
