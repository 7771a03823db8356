// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Upvalues: open (pointing into the value stack) or closed (owning a
//! value once the stack slot that backed them goes out of scope).

use super::Obj;
use crate::value::Value;
use core::cell::Cell;
use core::ptr::NonNull;

/// Where an upvalue's value currently lives.
pub enum UpvalueLocation {
    /// Still points at a live slot on the VM's value stack.
    Open(usize),
    /// Has been lifted off the stack into its own storage.
    Closed(Value),
}

pub struct UpvalueObj {
    pub location: Cell<UpvalueLocation>,
    /// Next node in the VM's open-upvalue list, ordered by strictly
    /// descending stack slot (nearest-to-top first). Unused once closed.
    pub list_next: Cell<Option<NonNull<Obj>>>,
}

impl UpvalueObj {
    #[must_use]
    pub fn new(stack_slot: usize) -> Self {
        Self {
            location: Cell::new(UpvalueLocation::Open(stack_slot)),
            list_next: Cell::new(None),
        }
    }

    #[must_use]
    pub fn is_open_at(&self, slot: usize) -> bool {
        matches!(self.location_ref(), UpvalueLocation::Open(s) if *s == slot)
    }

    /// The stored value, if this upvalue has been closed.
    #[must_use]
    pub fn closed_value(&self) -> Option<Value> {
        match self.location_ref() {
            UpvalueLocation::Closed(v) => Some(*v),
            UpvalueLocation::Open(_) => None,
        }
    }

    /// The stack slot this upvalue still points at, if still open.
    #[must_use]
    pub fn open_slot(&self) -> Option<usize> {
        match self.location_ref() {
            UpvalueLocation::Open(slot) => Some(*slot),
            UpvalueLocation::Closed(_) => None,
        }
    }

    fn location_ref(&self) -> &UpvalueLocation {
        // SAFETY: `Cell<UpvalueLocation>` is only ever accessed from the
        // single-threaded VM loop; we never hand out an aliasing `&mut`
        // while this shared reference is alive.
        unsafe { &*self.location.as_ptr() }
    }
}
