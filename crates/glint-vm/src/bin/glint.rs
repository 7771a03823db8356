// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! `glint` — REPL and file-runner entry point.
//!
//! Zero arguments: read-eval-print loop over stdin. One argument: run it
//! as a source file. More than one argument: print usage and exit 64.

use glint_vm::repl::{exit_code, run_file, run_repl};
use glint_vm::Vm;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_env("GLINT_LOG").unwrap_or_else(|_| "warn".into()))
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let code = match args.as_slice() {
        [] => run_repl_on_stdio(),
        [path] => run_file(&mut Vm::new(), &PathBuf::from(path)),
        _ => {
            eprintln!("Usage: glint [path]");
            exit_code::USAGE
        }
    };

    ExitCode::from(code.clamp(0, 255) as u8)
}

fn run_repl_on_stdio() -> i32 {
    let mut vm = Vm::new();
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stdout = io::stdout();
    match run_repl(&mut vm, &mut input, &mut stdout) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("I/O error: {err}");
            exit_code::IO_ERROR
        }
    }
}
