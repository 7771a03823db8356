// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Compiled function objects.

use super::Obj;
use crate::bytecode::Chunk;
use core::ptr::NonNull;

/// A compiled function: arity, the number of upvalues it captures, its
/// own chunk of bytecode, and an optional name (`None` for the top-level
/// script).
pub struct FunctionObj {
    pub arity: u8,
    pub upvalue_count: u8,
    pub chunk: Chunk,
    pub name: Option<NonNull<Obj>>,
}

impl FunctionObj {
    #[must_use]
    pub fn new(name: Option<NonNull<Obj>>) -> Self {
        Self {
            arity: 0,
            upvalue_count: 0,
            chunk: Chunk::new(),
            name,
        }
    }
}
