// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Integration test harness for Glint: run a script against a fresh VM
//! with stdout/stderr captured into memory, and assert on the result.
//!
//! No dependencies beyond `glint-vm` itself — this crate provides
//! primitives only.

use glint_vm::{InterpretResult, Vm};
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Process exit code the CLI would have produced for a given
/// [`InterpretResult`] (see `glint_vm::repl::exit_code`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl From<InterpretResult> for ExitCode {
    fn from(result: InterpretResult) -> Self {
        match result {
            InterpretResult::Ok => Self(0),
            InterpretResult::CompileError => Self(65),
            InterpretResult::RuntimeError => Self(70),
        }
    }
}

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("test output buffer not poisoned").write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn into_string(self) -> String {
        String::from_utf8(Arc::try_unwrap(self.0).expect("sole owner after run").into_inner().expect("not poisoned"))
            .expect("test programs only ever produce valid UTF-8")
    }
}

/// Compiles and runs `source` against a fresh [`Vm`], capturing its
/// stdout and stderr into strings. Returns `(stdout, stderr, exit_code)`.
#[must_use]
pub fn run_source(source: &str) -> (String, String, ExitCode) {
    let stdout = SharedBuffer::default();
    let stderr = SharedBuffer::default();
    let mut vm = Vm::with_streams(Box::new(stdout.clone()), Box::new(stderr.clone()));
    let result = vm.interpret(source);
    drop(vm);
    (stdout.into_string(), stderr.into_string(), result.into())
}

/// Asserts that running `source` succeeds and produces exactly
/// `expected` on stdout.
#[track_caller]
pub fn assert_stdout(source: &str, expected: &str) {
    let (stdout, stderr, code) = run_source(source);
    assert_eq!(code, ExitCode(0), "expected success, got exit {code:?}; stderr: {stderr}");
    assert_eq!(stdout, expected, "stdout mismatch for source: {source}");
}

/// Asserts that running `source` fails with a non-empty stderr and the
/// given exit code (typically 65 for compile errors, 70 for runtime).
#[track_caller]
pub fn assert_error(source: &str, expected_code: i32) {
    let (_stdout, stderr, code) = run_source(source);
    assert_eq!(code, ExitCode(expected_code), "exit code mismatch for source: {source}");
    assert!(!stderr.is_empty(), "expected non-empty stderr for source: {source}");
}

#[cfg(test)]
mod lib_test;
