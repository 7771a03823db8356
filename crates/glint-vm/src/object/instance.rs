// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Instances: a class reference and a field table.

use super::Obj;
use crate::table::Table;
use core::ptr::NonNull;

pub struct InstanceObj {
    pub class: NonNull<Obj>,
    pub fields: Table,
}

impl InstanceObj {
    #[must_use]
    pub fn new(class: NonNull<Obj>) -> Self {
        Self {
            class,
            fields: Table::new(),
        }
    }
}
