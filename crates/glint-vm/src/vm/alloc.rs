// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Allocation and string-interning helpers, plus the root-marking glue
//! that lets [`crate::gc::Gc`] run a collection without knowing anything
//! about frames, globals, or the value stack itself.

use super::Vm;
use crate::object::{Obj, ObjKind, StringObj, fnv1a_hash};
use core::ptr::NonNull;
use tracing::trace;

impl Vm {
    /// Allocates a new heap object, running a collection first if the
    /// byte-allocation threshold (or `GC_STRESS_MODE`) calls for one.
    pub(crate) fn alloc(&mut self, kind: ObjKind) -> NonNull<Obj> {
        if self.gc.should_collect() {
            self.collect_garbage();
        }
        self.gc.link(kind)
    }

    /// Interns a string by content, allocating only on first sight.
    pub(crate) fn intern(&mut self, s: &str) -> NonNull<Obj> {
        let hash = fnv1a_hash(s.as_bytes());
        if let Some(existing) = self.strings.find_string(s.as_bytes(), hash) {
            return existing;
        }
        let obj = self.alloc(ObjKind::String(StringObj::new(s.into())));
        self.strings.set(obj, crate::value::Value::Bool(true));
        obj
    }

    /// Concatenates two interned strings into a new, itself interned,
    /// string. Used by `OP_ADD` on string operands.
    pub(crate) fn concatenate_strings(&mut self, a: crate::value::Value, b: crate::value::Value) -> NonNull<Obj> {
        let a_obj = a.as_obj().expect("caller verified `a` is a string");
        let b_obj = b.as_obj().expect("caller verified `b` is a string");
        // SAFETY: both operands were verified to be `ObjKind::String`.
        let ObjKind::String(a_str) = &unsafe { a_obj.as_ref() }.kind else {
            unreachable!("caller verified `a` is a string")
        };
        let ObjKind::String(b_str) = &unsafe { b_obj.as_ref() }.kind else {
            unreachable!("caller verified `b` is a string")
        };
        let mut combined = String::with_capacity(a_str.as_str().len() + b_str.as_str().len());
        combined.push_str(a_str.as_str());
        combined.push_str(b_str.as_str());
        self.intern(&combined)
    }

    pub(crate) fn collect_garbage(&mut self) {
        let Self {
            gc,
            stack,
            frames,
            open_upvalues,
            globals,
            strings,
            init_string,
            compiler_roots,
            ..
        } = self;

        let stats = gc.collect(
            |gc| {
                for value in stack.iter() {
                    gc.mark_value(value);
                }
                for frame in frames.iter() {
                    gc.mark_object(frame.closure);
                }
                let mut upvalue = *open_upvalues;
                while let Some(ptr) = upvalue {
                    gc.mark_object(ptr);
                    let ObjKind::Upvalue(u) = &unsafe { ptr.as_ref() }.kind else {
                        unreachable!("open-upvalue list only holds ObjKind::Upvalue")
                    };
                    upvalue = u.list_next.get();
                }
                globals.mark(gc);
                gc.mark_object(*init_string);
                for function in compiler_roots.iter() {
                    gc.mark_object(*function);
                }
            },
            |_gc| strings.remove_white(),
        );
        trace!(
            freed_bytes = stats.freed_bytes,
            freed_objects = stats.freed_objects,
            "garbage collected"
        );
    }
}
