//! Identity Exchange
//!
//! Swaps the records behind two handles in place. Neither handle changes,
//! so every reference holding `a` observes what `b` used to be and vice
//! versa, however many aliases exist.
//!
//! # Protocol
//! ```text
//! 1. both arguments boxed?              ── no ──> NotBoxed
//! 2. lock both slots, lower index first
//! 3. both handles live?                 ── no ──> StaleHandle
//! 4. both types EXCHANGEABLE? (b, a)    ── no ──> NotExchangeable
//! 5. safety policy allows the taints?   ── no ──> Security(..)
//! 6. swap records, unlock
//! ```
//!
//! Every check completes before the swap, and both slots stay locked from
//! the first check to the swap, so a refused exchange changes nothing and no
//! observer can see half of one.

use core::mem;

use super::error::ExchangeError;
use super::heap::{slot_of, ObjectHeap};
use super::record::ObjectRecord;
use super::value::{ObjectHandle, Value};
use crate::contract::TypeFlags;
use crate::security::{self, SecurityContext};

impl ObjectHeap {
    /// Exchange the identities of `a` and `b`.
    pub fn exchange(
        &self,
        ctx: &SecurityContext,
        a: &Value,
        b: &Value,
    ) -> Result<(), ExchangeError> {
        let a = boxed(a)?;
        let b = boxed(b)?;

        let slots = self.slots.read();
        let slot_a = slot_of(&slots, a).map_err(|_| ExchangeError::StaleHandle(a))?;
        let slot_b = slot_of(&slots, b).map_err(|_| ExchangeError::StaleHandle(b))?;

        if a.index() == b.index() {
            let slot = slot_a.lock();
            let record_a = slot.live(a).ok_or(ExchangeError::StaleHandle(a))?;
            let record_b = slot.live(b).ok_or(ExchangeError::StaleHandle(b))?;
            self.check_exchangeable(record_b)?;
            security::check_exchange_allowed(ctx, record_a.is_tainted(), record_b.is_tainted())?;
            log::trace!("exchange of {:?} with itself", a);
            return Ok(());
        }

        let (mut guard_a, mut guard_b) = if a.index() < b.index() {
            let first = slot_a.lock();
            (first, slot_b.lock())
        } else {
            let first = slot_b.lock();
            (slot_a.lock(), first)
        };

        let (a_tainted, b_tainted) = {
            let record_a = guard_a.live(a).ok_or(ExchangeError::StaleHandle(a))?;
            let record_b = guard_b.live(b).ok_or(ExchangeError::StaleHandle(b))?;
            self.check_exchangeable(record_b)?;
            self.check_exchangeable(record_a)?;
            (record_a.is_tainted(), record_b.is_tainted())
        };
        security::check_exchange_allowed(ctx, a_tainted, b_tainted)?;

        mem::swap(&mut guard_a.record, &mut guard_b.record);
        log::debug!("exchanged identities of {:?} and {:?}", a, b);
        Ok(())
    }

    fn check_exchangeable(&self, record: &ObjectRecord) -> Result<(), ExchangeError> {
        let ty = record.type_tag();
        if self.registry.flags(ty)?.contains(TypeFlags::EXCHANGEABLE) {
            return Ok(());
        }

        let type_name = self.registry.name(ty)?;
        log::debug!("{} does not support identity exchange", type_name);
        Err(ExchangeError::NotExchangeable { type_name })
    }
}

fn boxed(value: &Value) -> Result<ObjectHandle, ExchangeError> {
    value.as_handle().ok_or(ExchangeError::NotBoxed {
        kind: value.kind(),
    })
}
