// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Printing rules for Glint values (spec section 6, "Standard output").

use super::Value;
use crate::object::{Obj, ObjKind};
use core::ptr::NonNull;
use std::io::{self, Write};

/// Write `value`'s printed representation to `out`, with no trailing
/// newline (callers such as `OP_PRINT` add that themselves).
pub fn print_value(value: &Value, out: &mut dyn Write) -> io::Result<()> {
    match value {
        Value::Nil => write!(out, "nil"),
        Value::Bool(b) => write!(out, "{b}"),
        Value::Number(n) => write!(out, "{}", format_number(*n)),
        Value::Obj(ptr) => print_obj(*ptr, out),
    }
}

fn print_obj(ptr: NonNull<Obj>, out: &mut dyn Write) -> io::Result<()> {
    let obj = unsafe { ptr.as_ref() };
    match &obj.kind {
        ObjKind::String(s) => write!(out, "{}", s.as_str()),
        ObjKind::Function(f) => print_fn_name(f.name, out),
        ObjKind::Native(_) => write!(out, "<native fn>"),
        ObjKind::Closure(c) => {
            let function = unsafe { c.function.as_ref() };
            let ObjKind::Function(f) = &function.kind else {
                unreachable!("closure always wraps a function")
            };
            print_fn_name(f.name, out)
        }
        ObjKind::Class(c) => print_obj(c.name, out),
        ObjKind::Instance(i) => {
            let class = unsafe { i.class.as_ref() };
            let ObjKind::Class(c) = &class.kind else {
                unreachable!("instance always points at a class")
            };
            print_obj(c.name, out)?;
            write!(out, " instance")
        }
        ObjKind::BoundMethod(b) => {
            let method = unsafe { b.method.as_ref() };
            let ObjKind::Closure(c) = &method.kind else {
                unreachable!("bound method always wraps a closure")
            };
            let function = unsafe { c.function.as_ref() };
            let ObjKind::Function(f) = &function.kind else {
                unreachable!("closure always wraps a function")
            };
            print_fn_name(f.name, out)
        }
        ObjKind::Upvalue(_) => write!(out, "upvalue"),
    }
}

fn print_fn_name(name: Option<NonNull<Obj>>, out: &mut dyn Write) -> io::Result<()> {
    match name {
        Some(name) => {
            write!(out, "<fn ")?;
            print_obj(name, out)?;
            write!(out, ">")
        }
        None => write!(out, "<script>"),
    }
}

/// Shortest general representation; Rust's own float `Display` already
/// drops the trailing `.0` for whole numbers, matching the book's `%g`.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "inf".to_string() } else { "-inf".to_string() }
    } else {
        format!("{n}")
    }
}
