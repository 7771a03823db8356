// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Open/closed upvalue management.
//!
//! The open-upvalue list is threaded through `UpvalueObj::list_next`,
//! kept sorted strictly descending by stack slot so capture and close
//! operations only ever need to walk the prefix nearest the stack top.

use super::Vm;
use crate::object::{Obj, ObjKind, UpvalueLocation, UpvalueObj};
use crate::value::Value;
use core::ptr::NonNull;

impl Vm {
    /// Finds or creates the open upvalue pointing at `slot`.
    pub(crate) fn capture_upvalue(&mut self, slot: usize) -> NonNull<Obj> {
        let mut previous: Option<NonNull<Obj>> = None;
        let mut current = self.open_upvalues;

        while let Some(ptr) = current {
            // SAFETY: every node on the open-upvalue list is live until
            // closed or swept, and the list is only ever walked here.
            let ObjKind::Upvalue(u) = &unsafe { ptr.as_ref() }.kind else {
                unreachable!("open-upvalue list only holds ObjKind::Upvalue")
            };
            match u.open_slot() {
                Some(s) if s == slot => return ptr,
                Some(s) if s < slot => break,
                _ => {}
            }
            previous = current;
            current = u.list_next.get();
        }

        let created = self.alloc(ObjKind::Upvalue(UpvalueObj::new(slot)));
        let ObjKind::Upvalue(created_upvalue) = &unsafe { created.as_ref() }.kind else {
            unreachable!("just allocated as ObjKind::Upvalue")
        };
        created_upvalue.list_next.set(current);

        match previous {
            Some(prev) => {
                let ObjKind::Upvalue(p) = &unsafe { prev.as_ref() }.kind else {
                    unreachable!("open-upvalue list only holds ObjKind::Upvalue")
                };
                p.list_next.set(Some(created));
            }
            None => self.open_upvalues = Some(created),
        }

        created
    }

    /// Closes every open upvalue at or above `from`, copying the stack
    /// value into the upvalue's own storage.
    pub(crate) fn close_upvalues(&mut self, from: usize) {
        while let Some(ptr) = self.open_upvalues {
            let ObjKind::Upvalue(u) = &unsafe { ptr.as_ref() }.kind else {
                unreachable!("open-upvalue list only holds ObjKind::Upvalue")
            };
            let Some(slot) = u.open_slot() else {
                break;
            };
            if slot < from {
                break;
            }
            let value = self.stack[slot];
            u.location.set(UpvalueLocation::Closed(value));
            self.open_upvalues = u.list_next.get();
        }
    }

    pub(crate) fn current_upvalue_value(&self, index: usize) -> Value {
        let ObjKind::Closure(c) = &unsafe { self.current_frame().closure.as_ref() }.kind else {
            unreachable!("current frame always holds a closure")
        };
        let upvalue = c.upvalues[index].get();
        let ObjKind::Upvalue(u) = &unsafe { upvalue.as_ref() }.kind else {
            unreachable!("closure upvalue slots always hold ObjKind::Upvalue")
        };
        match u.closed_value() {
            Some(value) => value,
            None => self.stack[u.open_slot().expect("upvalue is either open or closed")],
        }
    }

    pub(crate) fn set_current_upvalue_value(&mut self, index: usize, value: Value) {
        let ObjKind::Closure(c) = &unsafe { self.current_frame().closure.as_ref() }.kind else {
            unreachable!("current frame always holds a closure")
        };
        let upvalue = c.upvalues[index].get();
        let ObjKind::Upvalue(u) = &unsafe { upvalue.as_ref() }.kind else {
            unreachable!("closure upvalue slots always hold ObjKind::Upvalue")
        };
        match u.open_slot() {
            Some(slot) => self.stack[slot] = value,
            None => u.location.set(UpvalueLocation::Closed(value)),
        }
    }
}
