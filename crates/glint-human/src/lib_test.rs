// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use super::*;
use glint_vm::{InterpretResult, Vm};

#[test]
fn renders_compile_error_with_lexeme_locus() {
    let mut vm = Vm::with_streams(Box::new(Vec::new()), Box::new(Vec::new()));
    let (result, _) = vm.interpret_with_diagnostics("1 +;");
    assert_eq!(result, InterpretResult::CompileError);
    let rendered = render_compile_errors(vm.compile_diagnostics());
    assert!(rendered.contains("Error"));
    assert!(rendered.starts_with("[line 1] Error"));
}

#[test]
fn renders_compile_error_at_end() {
    let mut vm = Vm::with_streams(Box::new(Vec::new()), Box::new(Vec::new()));
    let (result, _) = vm.interpret_with_diagnostics("print 1");
    assert_eq!(result, InterpretResult::CompileError);
    let rendered = render_compile_errors(vm.compile_diagnostics());
    assert!(rendered.contains("Error at end"));
}

#[test]
fn renders_runtime_error_message_and_trace() {
    let mut vm = Vm::with_streams(Box::new(Vec::new()), Box::new(Vec::new()));
    let (result, err) = vm.interpret_with_diagnostics("fun f() { return 1 + nil; } f();");
    assert_eq!(result, InterpretResult::RuntimeError);
    let report = RuntimeErrorReport::new(&err.expect("runtime error"));
    let rendered = report.to_string();
    assert!(rendered.contains("Operands must be two numbers or two strings."));
    assert!(rendered.contains("[line 1] in f"));
    assert!(rendered.contains("[line 1] in script"));
}
