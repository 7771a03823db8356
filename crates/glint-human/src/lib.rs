// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Human-readable diagnostic rendering for Glint compile errors and
//! runtime stack traces.
//!
//! This crate depends on `glint-vm` only for the plain data it renders
//! ([`glint_vm::compiler::CompileDiagnostic`], [`glint_vm::RuntimeError`])
//! — it never reaches into VM internals. `glint-vm` itself already
//! writes this exact text to its configured error stream by default;
//! this crate exists for embedders that want the diagnostics as
//! formatted `Display` values instead of scraping that stream.

use glint_vm::compiler::{CompileDiagnostic, Locus};
use glint_vm::RuntimeError;
use std::fmt;
use thiserror::Error;

/// A rendered compile-time diagnostic, one per [`CompileDiagnostic`].
#[derive(Debug, Error)]
#[error("{0}")]
pub struct CompileErrorReport(String);

impl CompileErrorReport {
    #[must_use]
    pub fn new(diagnostic: &CompileDiagnostic) -> Self {
        Self(format!("[line {}] Error{}: {}", diagnostic.line, render_locus(&diagnostic.locus), diagnostic.message))
    }
}

fn render_locus(locus: &Locus) -> String {
    match locus {
        Locus::AtEnd => " at end".to_string(),
        Locus::None => String::new(),
        Locus::AtLexeme(lexeme) => format!(" at '{lexeme}'"),
    }
}

/// Renders every diagnostic from a failed compile, one line each, in the
/// order they were reported.
#[must_use]
pub fn render_compile_errors(diagnostics: &[CompileDiagnostic]) -> String {
    diagnostics.iter().map(|d| CompileErrorReport::new(d).to_string()).collect::<Vec<_>>().join("\n")
}

/// A rendered runtime error: the failure message plus the per-frame
/// stack trace, formatted exactly as the VM's own default stderr output.
#[derive(Debug)]
pub struct RuntimeErrorReport {
    message: String,
    trace: Vec<String>,
}

impl RuntimeErrorReport {
    #[must_use]
    pub fn new(error: &RuntimeError) -> Self {
        Self {
            message: error.message.clone(),
            trace: error.trace().to_vec(),
        }
    }

    #[must_use]
    pub fn trace(&self) -> &[String] {
        &self.trace
    }
}

impl fmt::Display for RuntimeErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.message)?;
        for (i, line) in self.trace.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{line}")?;
        }
        Ok(())
    }
}

impl std::error::Error for RuntimeErrorReport {}

#[cfg(test)]
mod lib_test;
