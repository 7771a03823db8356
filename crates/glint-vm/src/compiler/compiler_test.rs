// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use super::compile;
use crate::object::ObjKind;
use crate::vm::Vm;

fn compiles(source: &str) -> bool {
    let mut vm = Vm::with_streams(Box::new(Vec::new()), Box::new(Vec::new()));
    compile(&mut vm, source).is_some()
}

fn constant_count(source: &str) -> usize {
    let mut vm = Vm::with_streams(Box::new(Vec::new()), Box::new(Vec::new()));
    let function = compile(&mut vm, source).expect("source compiles");
    // SAFETY: the function is still rooted via the returned pointer; the
    // VM has not run a collection since.
    let ObjKind::Function(f) = &unsafe { function.as_ref() }.kind else {
        unreachable!()
    };
    f.chunk.constants.len()
}

#[test]
fn compiles_arithmetic_expression_statement() {
    assert!(compiles("1 + 2 * 3;"));
}

#[test]
fn rejects_unterminated_string() {
    assert!(!compiles("\"unterminated;"));
}

#[test]
fn rejects_return_from_top_level() {
    assert!(!compiles("return 1;"));
}

#[test]
fn accepts_return_inside_function() {
    assert!(compiles("fun f() { return 1; }"));
}

#[test]
fn rejects_this_outside_class() {
    assert!(!compiles("print this;"));
}

#[test]
fn rejects_super_without_superclass() {
    assert!(!compiles("class A { f() { super.f(); } }"));
}

#[test]
fn accepts_super_with_superclass() {
    assert!(compiles("class A { f() {} } class B < A { f() { super.f(); } }"));
}

#[test]
fn rejects_inheriting_from_self() {
    assert!(!compiles("class A < A {}"));
}

#[test]
fn rejects_duplicate_local_in_same_scope() {
    assert!(!compiles("{ var a = 1; var a = 2; }"));
}

#[test]
fn allows_shadowing_in_nested_scope() {
    assert!(compiles("{ var a = 1; { var a = 2; print a; } }"));
}

#[test]
fn rejects_reading_local_in_its_own_initializer() {
    assert!(!compiles("{ var a = a; }"));
}

#[test]
fn accepts_closure_capturing_enclosing_local() {
    assert!(compiles("fun outer() { var x = 1; fun inner() { return x; } return inner; }"));
}

#[test]
fn accepts_255_parameters() {
    let params: Vec<String> = (0..255).map(|i| format!("p{i}")).collect();
    let source = format!("fun f({}) {{}}", params.join(", "));
    assert!(compiles(&source));
}

#[test]
fn rejects_256_parameters() {
    let params: Vec<String> = (0..256).map(|i| format!("p{i}")).collect();
    let source = format!("fun f({}) {{}}", params.join(", "));
    assert!(!compiles(&source));
}

#[test]
fn accepts_256_constants() {
    let mut source = String::new();
    for i in 0..256 {
        source.push_str(&format!("print {i};\n"));
    }
    assert!(compiles(&source));
}

#[test]
fn rejects_257th_constant() {
    let mut source = String::new();
    for i in 0..257 {
        source.push_str(&format!("print {i};\n"));
    }
    assert!(!compiles(&source));
}

#[test]
fn accepts_255_constants() {
    let mut source = String::new();
    for i in 0..255 {
        source.push_str(&format!("print {i};\n"));
    }
    assert!(compiles(&source));
}

#[test]
fn top_level_script_has_no_name() {
    let mut vm = Vm::with_streams(Box::new(Vec::new()), Box::new(Vec::new()));
    let function = compile(&mut vm, "1;").expect("compiles");
    let ObjKind::Function(f) = &(unsafe { function.as_ref() }).kind else {
        unreachable!()
    };
    assert!(f.name.is_none());
}

#[test]
fn counts_distinct_constants_only_by_emission_not_dedup() {
    // Each literal emits its own constant slot; the compiler does not
    // deduplicate numeric constants the way string interning does.
    assert_eq!(constant_count("print 1; print 1;"), 2);
}
