// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! # Glint VM
//!
//! Compiler and virtual machine for Glint, a small dynamically-typed,
//! class-based scripting language.
//!
//! This crate provides:
//! - Scanner (lexer) for Glint source code
//! - A single-pass Pratt compiler emitting stack-based bytecode
//! - Value representation and heap object kinds
//! - An open-addressed hash table used for globals, fields and interning
//! - A tri-color mark-and-sweep garbage collector
//! - The bytecode interpreter (call frames, upvalues, method dispatch)
//! - A REPL and file-runner used by the `glint` binary

pub mod bytecode;
pub mod compiler;
pub mod gc;
pub mod object;
pub mod repl;
pub mod scanner;
pub mod table;
pub mod value;
pub mod vm;

pub use value::Value;
pub use vm::{InterpretResult, RuntimeError, Vm};

/// Crate version, injected at build time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
