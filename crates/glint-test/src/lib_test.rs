// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use super::*;

#[test]
fn run_source_captures_stdout_on_success() {
    let (stdout, stderr, code) = run_source("print 1 + 1;");
    assert_eq!(stdout, "2\n");
    assert!(stderr.is_empty());
    assert_eq!(code, ExitCode(0));
}

#[test]
fn run_source_captures_stderr_on_compile_error() {
    let (stdout, stderr, code) = run_source("print;");
    assert!(stdout.is_empty());
    assert!(!stderr.is_empty());
    assert_eq!(code, ExitCode(65));
}

#[test]
fn run_source_captures_stderr_on_runtime_error() {
    let (_stdout, stderr, code) = run_source("undefinedVariable;");
    assert!(!stderr.is_empty());
    assert_eq!(code, ExitCode(70));
}

#[test]
fn assert_stdout_passes_for_matching_output() {
    assert_stdout("print 6 * 7;", "42\n");
}

#[test]
fn assert_error_passes_for_a_failing_runtime_script() {
    assert_error(r#"print "a" - 1;"#, 70);
}
