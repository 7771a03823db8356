// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Open-addressed hash table, keyed by interned strings.
//!
//! Used for globals, instance fields, class method tables, and the
//! string-intern set. Linear probing with tombstones; capacity is always
//! a power of two and grows at a 0.75 load-factor threshold.


use crate::gc::Gc;
use crate::object::{Obj, ObjKind};
use crate::value::Value;
use core::ptr::NonNull;

const MAX_LOAD_FACTOR: f64 = 0.75;
const INITIAL_CAPACITY: usize = 8;

#[derive(Clone, Copy)]
struct Entry {
    key: Option<NonNull<Obj>>,
    value: Value,
}

impl Entry {
    const fn empty() -> Self {
        Self {
            key: None,
            value: Value::Nil,
        }
    }

    fn is_tombstone(&self) -> bool {
        self.key.is_none() && !matches!(self.value, Value::Nil)
    }
}

/// An open-addressed hash table from interned-string keys to values.
#[derive(Default)]
pub struct Table {
    /// Number of occupied entries *and* tombstones (tombstones count
    /// toward the load factor).
    count: usize,
    entries: Vec<Entry>,
}

impl Table {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[must_use]
    pub fn get(&self, key: NonNull<Obj>) -> Option<Value> {
        if self.entries.is_empty() {
            return None;
        }
        let index = self.find_entry_index(&self.entries, key);
        self.entries[index].key.map(|_| self.entries[index].value)
    }

    /// Returns `true` if `key` was not already present.
    pub fn set(&mut self, key: NonNull<Obj>, value: Value) -> bool {
        if needs_growth(self.count + 1, self.entries.len()) {
            self.grow();
        }

        let index = self.find_entry_index(&self.entries, key);
        let entry = &mut self.entries[index];
        let is_new_key = entry.key.is_none();
        if is_new_key && matches!(entry.value, Value::Nil) {
            // A genuinely empty slot, not a reused tombstone.
            self.count += 1;
        }
        entry.key = Some(key);
        entry.value = value;
        is_new_key
    }

    pub fn delete(&mut self, key: NonNull<Obj>) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        let index = self.find_entry_index(&self.entries, key);
        let entry = &mut self.entries[index];
        if entry.key.is_none() {
            return false;
        }
        entry.key = None;
        entry.value = Value::Bool(true); // tombstone
        true
    }

    pub fn add_all(&mut self, from: &Table) {
        for entry in &from.entries {
            if let Some(key) = entry.key {
                self.set(key, entry.value);
            }
        }
    }

    /// Content-wise lookup used only by the string-intern set, where we
    /// do not yet have an interned pointer to compare against.
    #[must_use]
    pub fn find_string(&self, bytes: &[u8], hash: u32) -> Option<NonNull<Obj>> {
        if self.entries.is_empty() {
            return None;
        }
        let capacity = self.entries.len();
        let mut index = (hash as usize) & (capacity - 1);
        loop {
            let entry = &self.entries[index];
            match entry.key {
                None if !entry.is_tombstone() => return None,
                Some(key) => {
                    let obj = unsafe { key.as_ref() };
                    let ObjKind::String(s) = &obj.kind else {
                        unreachable!("table keys are always strings")
                    };
                    if s.hash == hash && s.chars.as_bytes() == bytes {
                        return Some(key);
                    }
                }
                None => {}
            }
            index = (index + 1) & (capacity - 1);
        }
    }

    /// Deletes entries whose key object is unmarked. Used to weakly
    /// clear the intern set after GC marking, before sweep.
    pub fn remove_white(&mut self) {
        let dead: Vec<NonNull<Obj>> = self
            .entries
            .iter()
            .filter_map(|e| e.key)
            .filter(|k| !unsafe { k.as_ref() }.marked.get())
            .collect();
        for key in dead {
            self.delete(key);
        }
    }

    /// Marks every key object and every value; used to mark roots.
    pub fn mark(&self, gc: &mut Gc) {
        for entry in &self.entries {
            if let Some(key) = entry.key {
                gc.mark_object(key);
            }
            gc.mark_value(&entry.value);
        }
    }

    fn find_entry_index(&self, entries: &[Entry], key: NonNull<Obj>) -> usize {
        let capacity = entries.len();
        let hash = key_hash(key);
        let mut index = (hash as usize) & (capacity - 1);
        let mut tombstone: Option<usize> = None;
        loop {
            let entry = &entries[index];
            match entry.key {
                None if entry.is_tombstone() => {
                    if tombstone.is_none() {
                        tombstone = Some(index);
                    }
                }
                None => return tombstone.unwrap_or(index),
                Some(k) if k == key => return index,
                Some(_) => {}
            }
            index = (index + 1) & (capacity - 1);
        }
    }

    fn grow(&mut self) {
        let new_capacity = (self.entries.len() * 2).max(INITIAL_CAPACITY);
        let old_entries = core::mem::replace(&mut self.entries, vec![Entry::empty(); new_capacity]);

        self.count = 0;
        for entry in old_entries {
            if let Some(key) = entry.key {
                let index = self.find_entry_index(&self.entries, key);
                self.entries[index] = Entry {
                    key: Some(key),
                    value: entry.value,
                };
                self.count += 1;
            }
        }
    }
}

fn needs_growth(count_after_insert: usize, capacity: usize) -> bool {
    (count_after_insert as f64) > (capacity as f64) * MAX_LOAD_FACTOR
}

fn key_hash(key: NonNull<Obj>) -> u32 {
    let obj = unsafe { key.as_ref() };
    let ObjKind::String(s) = &obj.kind else {
        unreachable!("table keys are always strings")
    };
    s.hash
}
