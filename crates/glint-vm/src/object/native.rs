// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Native (host-provided) functions.

use crate::value::Value;

/// A native function: `(argCount, args) -> Value`. Natives cannot signal
/// errors except by returning a sentinel value (spec section 7).
pub type NativeFn = fn(args: &[Value]) -> Value;

pub struct NativeObj {
    pub function: NativeFn,
}

impl NativeObj {
    #[must_use]
    pub fn new(function: NativeFn) -> Self {
        Self { function }
    }
}
