// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! REPL and file-runner surface used by the `glint` binary.
//!
//! This module only turns a [`Vm`]'s [`InterpretResult`] into a process
//! exit code; it does not itself touch `std::process::exit` so it stays
//! testable without forking.

#[cfg(test)]
mod repl_test;

use crate::vm::{InterpretResult, Vm};
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::debug;

/// Process exit codes, matching the host's `sysexits.h`-style contract.
pub mod exit_code {
    pub const OK: i32 = 0;
    pub const USAGE: i32 = 64;
    pub const COMPILE_ERROR: i32 = 65;
    pub const RUNTIME_ERROR: i32 = 70;
    pub const IO_ERROR: i32 = 74;
}

fn result_to_exit_code(result: InterpretResult) -> i32 {
    match result {
        InterpretResult::Ok => exit_code::OK,
        InterpretResult::CompileError => exit_code::COMPILE_ERROR,
        InterpretResult::RuntimeError => exit_code::RUNTIME_ERROR,
    }
}

/// Reads lines from `input` one at a time, printing `> ` to `prompt_out`
/// before each, and feeding each line to `vm`. Terminates at EOF.
///
/// The REPL never exits non-zero on a bad line; compile and runtime
/// errors are reported (by the VM, to its own error stream) and the loop
/// just moves on to the next line, matching the reference implementation.
pub fn run_repl(vm: &mut Vm, input: &mut impl BufRead, prompt_out: &mut impl Write) -> io::Result<i32> {
    let mut line = String::new();
    loop {
        write!(prompt_out, "> ")?;
        prompt_out.flush()?;

        line.clear();
        let bytes_read = input.read_line(&mut line)?;
        if bytes_read == 0 {
            writeln!(prompt_out)?;
            return Ok(exit_code::OK);
        }

        vm.interpret(&line);
    }
}

/// Reads `path` fully, interprets it, and returns the exit code the CLI
/// should produce. I/O failures (missing file, permission denied, non-UTF8
/// contents) are reported as [`exit_code::IO_ERROR`].
pub fn run_file(vm: &mut Vm, path: &Path) -> i32 {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Could not read file \"{}\": {err}", path.display());
            return exit_code::IO_ERROR;
        }
    };

    debug!(path = %path.display(), bytes = source.len(), "interpreting source file");
    result_to_exit_code(vm.interpret(&source))
}
