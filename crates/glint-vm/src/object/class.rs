// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Classes: a name and a method table.

use super::Obj;
use crate::table::Table;
use core::ptr::NonNull;

pub struct ClassObj {
    pub name: NonNull<Obj>,
    pub methods: Table,
}

impl ClassObj {
    #[must_use]
    pub fn new(name: NonNull<Obj>) -> Self {
        Self {
            name,
            methods: Table::new(),
        }
    }
}
