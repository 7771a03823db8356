// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Bound methods: a receiver paired with a method closure.

use super::Obj;
use crate::value::Value;
use core::ptr::NonNull;

pub struct BoundMethodObj {
    pub receiver: Value,
    pub method: NonNull<Obj>,
}

impl BoundMethodObj {
    #[must_use]
    pub fn new(receiver: Value, method: NonNull<Obj>) -> Self {
        Self { receiver, method }
    }
}
