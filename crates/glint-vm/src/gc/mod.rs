// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Precise, non-moving, tri-color mark-and-sweep collector.
//!
//! The collector owns the "all objects" list and the allocation-byte
//! counter; it knows nothing about the VM's stack, frames, or globals.
//! Callers drive a collection cycle by supplying a `mark_roots` closure
//! that calls back into [`Gc::mark_object`] / [`Gc::mark_value`] for every
//! root; this keeps `Gc` testable on its own with synthetic roots.


use crate::object::{Obj, ObjKind};
use crate::value::Value;
use core::ptr::NonNull;
use tracing::trace;

const INITIAL_NEXT_GC: usize = 1024 * 1024;
const GC_HEAP_GROWTH_FACTOR: usize = 2;

/// Tri-color mark-and-sweep collector over the heap's "all objects" list.
pub struct Gc {
    objects: Option<NonNull<Obj>>,
    bytes_allocated: usize,
    next_gc: usize,
    gray_stack: Vec<NonNull<Obj>>,
    stress_mode: bool,
}

/// Outcome of a single collection cycle, surfaced for logging.
pub struct CollectionStats {
    pub freed_bytes: usize,
    pub freed_objects: usize,
}

impl Gc {
    #[must_use]
    pub fn new() -> Self {
        Self {
            objects: None,
            bytes_allocated: 0,
            next_gc: INITIAL_NEXT_GC,
            gray_stack: Vec::new(),
            stress_mode: stress_mode_from_env(),
        }
    }

    #[must_use]
    pub fn bytes_allocated(&self) -> usize {
        self.bytes_allocated
    }

    #[must_use]
    pub fn next_gc(&self) -> usize {
        self.next_gc
    }

    /// `true` once the allocation-byte counter has crossed the threshold,
    /// or unconditionally when `GC_STRESS_MODE` forces a collection on
    /// every growing allocation.
    #[must_use]
    pub fn should_collect(&self) -> bool {
        self.stress_mode || self.bytes_allocated > self.next_gc
    }

    /// Links a freshly built object onto the all-objects list and folds
    /// its size into the allocation counter. Callers must check
    /// [`Gc::should_collect`] and run a collection cycle *before* calling
    /// this, mirroring `reallocate`'s "collect before the allocation is
    /// used" ordering in the reference implementation: the new object
    /// does not exist yet at the point the threshold is checked, so it
    /// cannot be a root and cannot be prematurely swept.
    pub fn link(&mut self, kind: ObjKind) -> NonNull<Obj> {
        let obj = Box::new(Obj {
            marked: core::cell::Cell::new(false),
            next: core::cell::Cell::new(self.objects),
            kind,
        });
        let ptr = NonNull::from(Box::leak(obj));
        self.bytes_allocated += unsafe { ptr.as_ref() }.byte_size();
        self.objects = Some(ptr);
        ptr
    }

    /// Marks an object reachable: sets its mark bit and pushes it onto
    /// the gray worklist. A no-op if already marked, which is what makes
    /// cyclic object graphs terminate.
    pub fn mark_object(&mut self, obj: NonNull<Obj>) {
        let marked = unsafe { obj.as_ref() }.marked.get();
        if marked {
            return;
        }
        unsafe { obj.as_ref() }.marked.set(true);
        self.gray_stack.push(obj);
    }

    /// Marks a value's referent, if it has one. Non-heap values carry no
    /// outgoing references.
    pub fn mark_value(&mut self, value: &Value) {
        if let Some(obj) = value.as_obj() {
            self.mark_object(obj);
        }
    }

    /// Runs one full collection cycle: mark roots, trace the gray stack
    /// to completion ("blackening" each object), weakly clear the intern
    /// set, sweep unreached objects, and grow the next threshold.
    ///
    /// `mark_roots` and `weak_clear` are supplied by the VM, which alone
    /// knows where the roots live (value stack, frames, globals, intern
    /// set).
    pub fn collect(
        &mut self,
        mark_roots: impl FnOnce(&mut Gc),
        weak_clear: impl FnOnce(&mut Gc),
    ) -> CollectionStats {
        let before = self.bytes_allocated;
        trace!(bytes_allocated = before, "gc begin");

        mark_roots(self);
        self.trace_references();
        weak_clear(self);
        let freed_objects = self.sweep();

        self.next_gc = self.bytes_allocated * GC_HEAP_GROWTH_FACTOR;
        let freed_bytes = before.saturating_sub(self.bytes_allocated);
        trace!(
            freed_bytes,
            freed_objects,
            next_gc = self.next_gc,
            "gc end"
        );
        CollectionStats {
            freed_bytes,
            freed_objects,
        }
    }

    fn trace_references(&mut self) {
        while let Some(obj) = self.gray_stack.pop() {
            self.blacken(obj);
        }
    }

    /// Kind-specific traversal of a gray object's outgoing references.
    fn blacken(&mut self, ptr: NonNull<Obj>) {
        // SAFETY: every object reachable from the gray stack is still
        // linked into the all-objects list; nothing has been freed yet
        // because sweep only runs after tracing completes.
        let obj = unsafe { ptr.as_ref() };
        match &obj.kind {
            ObjKind::String(_) | ObjKind::Native(_) => {}
            ObjKind::Upvalue(u) => {
                if let Some(value) = u.closed_value() {
                    self.mark_value(&value);
                }
            }
            ObjKind::Function(f) => {
                if let Some(name) = f.name {
                    self.mark_object(name);
                }
                for constant in &f.chunk.constants {
                    self.mark_value(constant);
                }
            }
            ObjKind::Closure(c) => {
                self.mark_object(c.function);
                for upvalue in c.upvalues.iter() {
                    self.mark_object(upvalue.get());
                }
            }
            ObjKind::Class(c) => {
                self.mark_object(c.name);
                c.methods.mark(self);
            }
            ObjKind::Instance(i) => {
                self.mark_object(i.class);
                i.fields.mark(self);
            }
            ObjKind::BoundMethod(b) => {
                self.mark_value(&b.receiver);
                self.mark_object(b.method);
            }
        }
    }

    /// Walks the all-objects list, freeing every unmarked object and
    /// clearing the mark bit on survivors. Returns the number of objects
    /// freed.
    fn sweep(&mut self) -> usize {
        let mut previous: Option<NonNull<Obj>> = None;
        let mut current = self.objects;
        let mut freed = 0usize;

        while let Some(ptr) = current {
            // SAFETY: `ptr` is still linked, so it has not been freed.
            let obj = unsafe { ptr.as_ref() };
            let next = obj.next.get();

            if obj.marked.get() {
                obj.marked.set(false);
                previous = Some(ptr);
                current = next;
                continue;
            }

            match previous {
                Some(prev) => unsafe { prev.as_ref() }.next.set(next),
                None => self.objects = next,
            }
            self.bytes_allocated = self.bytes_allocated.saturating_sub(obj.byte_size());
            // SAFETY: `ptr` was produced by `Box::leak` in `link` and is
            // unreachable (unmarked, just unlinked), so no other
            // reference to it can exist.
            drop(unsafe { Box::from_raw(ptr.as_ptr()) });
            freed += 1;
            current = next;
        }

        freed
    }
}

impl Default for Gc {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Gc {
    fn drop(&mut self) {
        let mut current = self.objects.take();
        while let Some(ptr) = current {
            // SAFETY: the collector owns every object on this list and
            // is being torn down, so no outstanding references remain.
            let obj = unsafe { Box::from_raw(ptr.as_ptr()) };
            current = obj.next.get();
        }
    }
}

fn stress_mode_from_env() -> bool {
    std::env::var_os("GC_STRESS_MODE").is_some_and(|v| v != "0")
}
