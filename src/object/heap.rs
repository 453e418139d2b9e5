//! Object Heap
//!
//! An arena of slots, each holding at most one `ObjectRecord`. Handles name
//! slots, not records, so a record can change slot (identity exchange) while
//! every reference keeps its handle.
//!
//! # Design
//! - Slot table behind a `RwLock`; it is only write-locked to grow
//! - Each slot behind its own `Mutex`
//! - Released slots bump their generation and go on a free list, so stale
//!   handles are detected rather than silently aliasing a new object
//!
//! # Security Properties
//! - Contract verification runs before a record is placed in a slot; no
//!   unverified object is ever reachable through a handle
//! - Records are never handed out by reference outside a slot lock

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};
use spin::{Mutex, RwLock};

use super::error::ObjectError;
use super::record::{ObjectRecord, RecordView};
use super::value::{ObjectHandle, Value};
use crate::contract::{ContractError, MethodBody, TypeRef, TypeRegistry};
use crate::error::Error;

/// Slots reserved up front.
pub const INITIAL_CAPACITY: usize = 64;

/// One arena slot.
#[derive(Debug, Default)]
pub(crate) struct Slot {
    pub(crate) generation: u32,
    pub(crate) record: Option<ObjectRecord>,
}

impl Slot {
    /// Get the live record addressed by `handle`.
    pub(crate) fn live(&self, handle: ObjectHandle) -> Option<&ObjectRecord> {
        if self.generation == handle.generation() {
            self.record.as_ref()
        } else {
            None
        }
    }

    pub(crate) fn live_mut(&mut self, handle: ObjectHandle) -> Option<&mut ObjectRecord> {
        if self.generation == handle.generation() {
            self.record.as_mut()
        } else {
            None
        }
    }
}

/// The object heap.
#[derive(Debug)]
pub struct ObjectHeap {
    pub(crate) registry: Arc<TypeRegistry>,
    pub(crate) slots: RwLock<Vec<Mutex<Slot>>>,
    free: Mutex<Vec<u32>>,
    next_serial: AtomicU64,
}

impl ObjectHeap {
    /// Create an empty heap over `registry`.
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self {
            registry,
            slots: RwLock::new(Vec::with_capacity(INITIAL_CAPACITY)),
            free: Mutex::new(Vec::new()),
            next_serial: AtomicU64::new(1),
        }
    }

    /// Get the type registry backing this heap.
    #[inline]
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Construct an object from `record`.
    ///
    /// The record's type is verified against its abstract contracts first;
    /// on rejection nothing is allocated.
    pub fn construct(&self, mut record: ObjectRecord) -> Result<ObjectHandle, ContractError> {
        self.registry.verify(record.type_tag())?;

        record.set_serial(self.next_serial.fetch_add(1, Ordering::Relaxed));
        let recycled = self.free.lock().pop();

        let handle = match recycled {
            Some(index) => {
                let slots = self.slots.read();
                let mut slot = slots[index as usize].lock();
                slot.record = Some(record);
                ObjectHandle::new(index, slot.generation)
            }
            None => {
                let mut slots = self.slots.write();
                let index = slots.len() as u32;
                slots.push(Mutex::new(Slot {
                    generation: 0,
                    record: Some(record),
                }));
                ObjectHandle::new(index, 0)
            }
        };

        log::trace!("constructed {:?}", handle);
        Ok(handle)
    }

    /// Release an object. The handle, and every copy of it, becomes stale.
    pub fn release(&self, handle: ObjectHandle) -> Result<ObjectRecord, ObjectError> {
        let record = {
            let slots = self.slots.read();
            let mut slot = slot_of(&slots, handle)?.lock();
            if slot.live(handle).is_none() {
                return Err(ObjectError::StaleHandle(handle));
            }
            slot.generation = slot.generation.wrapping_add(1);
            slot.record.take()
        };

        self.free.lock().push(handle.index() as u32);
        log::trace!("released {:?}", handle);
        record.ok_or(ObjectError::StaleHandle(handle))
    }

    /// Run `f` on the live record behind `handle`.
    pub fn with_record<R>(
        &self,
        handle: ObjectHandle,
        f: impl FnOnce(&ObjectRecord) -> R,
    ) -> Result<R, ObjectError> {
        let slots = self.slots.read();
        let slot = slot_of(&slots, handle)?.lock();
        let record = slot.live(handle).ok_or(ObjectError::StaleHandle(handle))?;
        Ok(f(record))
    }

    /// Run `f` on the live record behind `handle`, mutably.
    pub(crate) fn with_record_mut<R>(
        &self,
        handle: ObjectHandle,
        f: impl FnOnce(&mut ObjectRecord) -> R,
    ) -> Result<R, ObjectError> {
        let slots = self.slots.read();
        let mut slot = slot_of(&slots, handle)?.lock();
        let record = slot
            .live_mut(handle)
            .ok_or(ObjectError::StaleHandle(handle))?;
        Ok(f(record))
    }

    /// Copy of the record currently behind `handle`.
    pub fn snapshot(&self, handle: ObjectHandle) -> Result<ObjectRecord, ObjectError> {
        self.with_record(handle, ObjectRecord::clone)
    }

    pub fn type_of(&self, handle: ObjectHandle) -> Result<TypeRef, ObjectError> {
        self.with_record(handle, ObjectRecord::type_tag)
    }

    pub fn is_tainted(&self, handle: ObjectHandle) -> Result<bool, ObjectError> {
        self.with_record(handle, ObjectRecord::is_tainted)
    }

    /// Mark an object as tainted.
    pub fn taint(&self, handle: ObjectHandle) -> Result<(), ObjectError> {
        self.with_record_mut(handle, ObjectRecord::taint)
    }

    /// Read a field.
    pub fn field(&self, handle: ObjectHandle, name: &str) -> Result<Value, ObjectError> {
        self.with_record(handle, |record| record.field(name).cloned())?
            .ok_or_else(|| ObjectError::NoSuchField { name: name.into() })
    }

    /// Write a field, returning the previous value.
    pub fn set_field(
        &self,
        handle: ObjectHandle,
        name: &str,
        value: Value,
    ) -> Result<Option<Value>, ObjectError> {
        self.with_record_mut(handle, |record| record.set_field(name, value))
    }

    /// Re-run contract verification for the object's current type.
    pub fn verify_object(&self, handle: ObjectHandle) -> Result<(), Error> {
        let ty = self.type_of(handle)?;
        self.registry.verify(ty)?;
        Ok(())
    }

    /// Call method `name` on the object with `args`.
    ///
    /// The method is resolved and run while the object's slot is locked, so
    /// its body must not reach back into this heap.
    pub fn invoke(&self, handle: ObjectHandle, name: &str, args: &[Value]) -> Result<Value, Error> {
        let slots = self.slots.read();
        let mut slot = slot_of(&slots, handle)?.lock();
        let record = slot
            .live_mut(handle)
            .ok_or(ObjectError::StaleHandle(handle))?;

        let method = self
            .registry
            .resolve(record.type_tag(), name)?
            .ok_or_else(|| ObjectError::NoSuchMethod { name: name.into() })?;

        if !method.arity.accepts(args.len()) {
            return Err(ObjectError::WrongArgumentCount {
                name: name.into(),
                given: args.len(),
                expected: method.arity,
            }
            .into());
        }

        match method.body {
            MethodBody::Abstract => {
                Err(ContractError::VirtualMethodError { name: name.into() }.into())
            }
            MethodBody::Native(body) => body(&mut RecordView::new(record), args),
        }
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        let slots = self.slots.read();
        slots
            .iter()
            .filter(|slot| slot.lock().record.is_some())
            .count()
    }

    /// Check if no objects are live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Find the slot a handle names. Out-of-range handles are stale.
pub(crate) fn slot_of(
    slots: &[Mutex<Slot>],
    handle: ObjectHandle,
) -> Result<&Mutex<Slot>, ObjectError> {
    slots
        .get(handle.index())
        .ok_or(ObjectError::StaleHandle(handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{Arity, TypeFlags};

    fn greet(record: &mut RecordView<'_>, args: &[Value]) -> Result<Value, Error> {
        record.set_field("greeted", args[0].clone());
        Ok(Value::Bool(true))
    }

    fn scrub(record: &mut RecordView<'_>, _: &[Value]) -> Result<Value, Error> {
        let names: Vec<_> = record.fields().map(|(name, _)| name.to_owned()).collect();
        for name in names {
            record.set_field(&name, Value::Nil);
        }
        Ok(Value::Bool(record.is_tainted()))
    }

    fn setup() -> (ObjectHeap, TypeRef) {
        let registry = Arc::new(TypeRegistry::new());
        let greeter = registry
            .define_type("Greeter", registry.root(), TypeFlags::ABSTRACT_DECLARING)
            .unwrap();
        (ObjectHeap::new(registry), greeter)
    }

    #[test]
    fn test_construct_and_read() {
        let (heap, ty) = setup();
        let handle = heap
            .construct(ObjectRecord::new(ty).with_field("name", Value::sym("ada")))
            .unwrap();
        assert_eq!(heap.field(handle, "name").unwrap(), Value::sym("ada"));
        assert_eq!(heap.type_of(handle).unwrap(), ty);
        assert!(!heap.is_tainted(handle).unwrap());
        assert_eq!(heap.len(), 1);
        assert!(matches!(
            heap.field(handle, "age"),
            Err(ObjectError::NoSuchField { .. })
        ));
    }

    #[test]
    fn test_serials_increase() {
        let (heap, ty) = setup();
        let a = heap.construct(ObjectRecord::new(ty)).unwrap();
        let b = heap.construct(ObjectRecord::new(ty)).unwrap();
        assert!(heap.snapshot(a).unwrap().serial() < heap.snapshot(b).unwrap().serial());
    }

    #[test]
    fn test_rejected_construction_allocates_nothing() {
        let (heap, ty) = setup();
        heap.registry().declare_abstract(ty, &["greet"]).unwrap();
        let err = heap.construct(ObjectRecord::new(ty)).unwrap_err();
        assert!(matches!(err, ContractError::VirtualMethodError { .. }));
        assert!(heap.is_empty());
    }

    #[test]
    fn test_release_makes_handle_stale() {
        let (heap, ty) = setup();
        let old = heap.construct(ObjectRecord::new(ty)).unwrap();
        heap.release(old).unwrap();
        assert_eq!(heap.type_of(old), Err(ObjectError::StaleHandle(old)));
        assert_eq!(heap.release(old), Err(ObjectError::StaleHandle(old)));

        let new = heap.construct(ObjectRecord::new(ty)).unwrap();
        assert_eq!(new.index(), old.index());
        assert_ne!(new, old);
        assert_eq!(heap.type_of(old), Err(ObjectError::StaleHandle(old)));
        assert_eq!(heap.len(), 1);
    }

    #[test]
    fn test_taint_is_explicit() {
        let (heap, ty) = setup();
        let handle = heap.construct(ObjectRecord::new(ty)).unwrap();
        heap.taint(handle).unwrap();
        assert!(heap.is_tainted(handle).unwrap());
    }

    #[test]
    fn test_invoke_stub_before_override() {
        let (heap, ty) = setup();
        heap.registry().declare_abstract(ty, &["greet"]).unwrap();
        let concrete = heap
            .registry()
            .define_type("Plain", heap.registry().root(), TypeFlags::empty())
            .unwrap();
        let handle = heap.construct(ObjectRecord::new(concrete)).unwrap();
        assert!(matches!(
            heap.invoke(handle, "greet", &[]),
            Err(Error::Object(ObjectError::NoSuchMethod { .. }))
        ));

        // An abstract-declaring type is still a type: objects whose record
        // was exchanged into it can hit the stub directly.
        heap.with_record_mut(handle, |record| *record = ObjectRecord::new(ty))
            .unwrap();
        assert_eq!(
            heap.invoke(handle, "greet", &[Value::Int(1)]),
            Err(Error::Contract(ContractError::VirtualMethodError {
                name: "greet".into()
            }))
        );
        assert!(heap.verify_object(handle).is_err());
    }

    #[test]
    fn test_invoke_native() {
        let (heap, ty) = setup();
        heap.registry().declare_abstract_with_arity(ty, "greet", 1).unwrap();
        let polite = heap
            .registry()
            .define_type("Polite", ty, TypeFlags::empty())
            .unwrap();
        heap.registry()
            .define_method(polite, "greet", Arity::exactly(1), greet)
            .unwrap();

        let handle = heap.construct(ObjectRecord::new(polite)).unwrap();
        assert_eq!(
            heap.invoke(handle, "greet", &[Value::sym("bob")]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(heap.field(handle, "greeted").unwrap(), Value::sym("bob"));

        assert!(matches!(
            heap.invoke(handle, "greet", &[]),
            Err(Error::Object(ObjectError::WrongArgumentCount { given: 0, .. }))
        ));
        assert!(heap.verify_object(handle).is_ok());
    }

    #[test]
    fn test_invoke_keeps_taint() {
        let (heap, ty) = setup();
        heap.registry()
            .define_method(ty, "scrub", Arity::exactly(0), scrub)
            .unwrap();
        let handle = heap
            .construct(ObjectRecord::new(ty).with_field("payload", 1).tainted())
            .unwrap();
        let serial = heap.snapshot(handle).unwrap().serial();

        assert_eq!(heap.invoke(handle, "scrub", &[]).unwrap(), Value::Bool(true));
        assert_eq!(heap.field(handle, "payload").unwrap(), Value::Nil);
        assert!(heap.is_tainted(handle).unwrap());
        assert_eq!(heap.type_of(handle).unwrap(), ty);
        assert_eq!(heap.snapshot(handle).unwrap().serial(), serial);
    }

    #[test]
    fn test_len_counts_live_slots() {
        let (heap, ty) = setup();
        let a = heap.construct(ObjectRecord::new(ty)).unwrap();
        let _b = heap.construct(ObjectRecord::new(ty)).unwrap();
        heap.release(a).unwrap();
        assert_eq!(heap.len(), 1);
        heap.construct(ObjectRecord::new(ty)).unwrap();
        assert_eq!(heap.len(), 2);
    }
}
