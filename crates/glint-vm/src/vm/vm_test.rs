// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use super::{InterpretResult, Vm};
use std::io::Write;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("test buffer not poisoned").write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().expect("test buffer not poisoned").clone())
            .expect("test programs only ever print valid UTF-8")
    }
}

fn run(source: &str) -> (InterpretResult, String, String) {
    let stdout = SharedBuffer::default();
    let stderr = SharedBuffer::default();
    let mut vm = Vm::with_streams(Box::new(stdout.clone()), Box::new(stderr.clone()));
    let result = vm.interpret(source);
    (result, stdout.text(), stderr.text())
}

#[test]
fn prints_arithmetic_result() {
    let (result, out, _err) = run("print 1 + 2 * 3;");
    assert_eq!(result, InterpretResult::Ok);
    assert_eq!(out, "7\n");
}

#[test]
fn string_concatenation() {
    let (result, out, _err) = run(r#"print "foo" + "bar";"#);
    assert_eq!(result, InterpretResult::Ok);
    assert_eq!(out, "foobar\n");
}

#[test]
fn global_variable_roundtrip() {
    let (result, out, _err) = run("var a = 10; a = a + 5; print a;");
    assert_eq!(result, InterpretResult::Ok);
    assert_eq!(out, "15\n");
}

#[test]
fn closures_capture_by_reference() {
    let source = r#"
        fun makeCounter() {
            var i = 0;
            fun count() {
                i = i + 1;
                print i;
            }
            return count;
        }
        var counter = makeCounter();
        counter();
        counter();
    "#;
    let (result, out, _err) = run(source);
    assert_eq!(result, InterpretResult::Ok);
    assert_eq!(out, "1\n2\n");
}

#[test]
fn class_instance_field_and_method() {
    let source = r#"
        class Counter {
            init() { this.value = 0; }
            bump() { this.value = this.value + 1; return this.value; }
        }
        var c = Counter();
        c.bump();
        print c.bump();
    "#;
    let (result, out, _err) = run(source);
    assert_eq!(result, InterpretResult::Ok);
    assert_eq!(out, "2\n");
}

#[test]
fn inheritance_and_super_dispatch() {
    let source = r#"
        class Animal {
            speak() { print "..."; }
        }
        class Dog < Animal {
            speak() {
                super.speak();
                print "Woof";
            }
        }
        Dog().speak();
    "#;
    let (result, out, _err) = run(source);
    assert_eq!(result, InterpretResult::Ok);
    assert_eq!(out, "...\nWoof\n");
}

#[test]
fn calling_a_number_is_a_runtime_error() {
    let (result, _out, err) = run("var x = 1; x();");
    assert_eq!(result, InterpretResult::RuntimeError);
    assert!(err.contains("Can only call functions and classes."), "{err}");
}

#[test]
fn undefined_global_is_a_runtime_error() {
    let (result, _out, err) = run("print notDefined;");
    assert_eq!(result, InterpretResult::RuntimeError);
    assert!(err.contains("Undefined variable 'notDefined'."), "{err}");
}

#[test]
fn dividing_non_numbers_is_a_runtime_error() {
    let (result, _out, err) = run(r#"print "a" - 1;"#);
    assert_eq!(result, InterpretResult::RuntimeError);
    assert!(err.contains("Operands must be numbers."), "{err}");
}

#[test]
fn deep_recursion_overflows_the_stack() {
    let source = r#"
        fun recurse(n) {
            return recurse(n + 1);
        }
        recurse(0);
    "#;
    let (result, _out, err) = run(source);
    assert_eq!(result, InterpretResult::RuntimeError);
    assert!(err.contains("Stack overflow."), "{err}");
}

#[test]
fn compile_error_does_not_run_anything() {
    let (result, out, err) = run("print;");
    assert_eq!(result, InterpretResult::CompileError);
    assert!(out.is_empty());
    assert!(!err.is_empty());
}

#[test]
fn for_loop_accumulates() {
    let source = r#"
        var total = 0;
        for (var i = 0; i < 5; i = i + 1) {
            total = total + i;
        }
        print total;
    "#;
    let (result, out, _err) = run(source);
    assert_eq!(result, InterpretResult::Ok);
    assert_eq!(out, "10\n");
}

#[test]
fn logical_operators_short_circuit() {
    let source = r#"
        fun sideEffect() { print "called"; return true; }
        print false and sideEffect();
        print true or sideEffect();
    "#;
    let (result, out, _err) = run(source);
    assert_eq!(result, InterpretResult::Ok);
    assert_eq!(out, "false\ntrue\n");
}

#[test]
fn property_interning_is_content_addressed() {
    use proptest::prelude::*;

    proptest!(|(a in "[a-zA-Z0-9_]{0,32}", b in "[a-zA-Z0-9_]{0,32}")| {
        let mut vm = Vm::new();
        let first = vm.intern(&a);
        let second = vm.intern(&a);
        prop_assert_eq!(first, second);

        let other = vm.intern(&b);
        if a == b {
            prop_assert_eq!(first, other);
        } else {
            prop_assert_ne!(first, other);
        }
    });
}
