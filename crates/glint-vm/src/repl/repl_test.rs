// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use super::*;
use std::io::Cursor;

fn new_vm() -> (Vm, std::sync::Arc<std::sync::Mutex<Vec<u8>>>) {
    let stdout = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = SinkWriter(stdout.clone());
    (Vm::with_streams(Box::new(sink), Box::new(Vec::new())), stdout)
}

#[derive(Clone)]
struct SinkWriter(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl Write for SinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("not poisoned").write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn repl_echoes_prompt_and_runs_each_line() {
    let (mut vm, stdout) = new_vm();
    let mut input = Cursor::new(b"print 1 + 1;\nprint 2 + 2;\n".to_vec());
    let mut prompt_out = Vec::new();

    let code = run_repl(&mut vm, &mut input, &mut prompt_out).expect("no io error");

    assert_eq!(code, exit_code::OK);
    assert_eq!(prompt_out, b"> > > \n");
    let out = String::from_utf8(stdout.lock().expect("not poisoned").clone()).unwrap();
    assert_eq!(out, "2\n4\n");
}

#[test]
fn repl_stops_cleanly_on_eof() {
    let (mut vm, _stdout) = new_vm();
    let mut input = Cursor::new(Vec::new());
    let mut prompt_out = Vec::new();

    let code = run_repl(&mut vm, &mut input, &mut prompt_out).expect("no io error");
    assert_eq!(code, exit_code::OK);
}

#[test]
fn run_file_reports_io_error_for_missing_path() {
    let (mut vm, _stdout) = new_vm();
    let code = run_file(&mut vm, Path::new("/nonexistent/does/not/exist.glint"));
    assert_eq!(code, exit_code::IO_ERROR);
}

#[test]
fn run_file_runs_a_real_script() {
    let (mut vm, stdout) = new_vm();
    let dir = std::env::temp_dir();
    let path = dir.join(format!("glint_repl_test_{}.glint", std::process::id()));
    std::fs::write(&path, "print 6 * 7;\n").expect("write temp script");

    let code = run_file(&mut vm, &path);
    let _ = std::fs::remove_file(&path);

    assert_eq!(code, exit_code::OK);
    let out = String::from_utf8(stdout.lock().expect("not poisoned").clone()).unwrap();
    assert_eq!(out, "42\n");
}

#[test]
fn run_file_reports_compile_error_exit_code() {
    let (mut vm, _stdout) = new_vm();
    let dir = std::env::temp_dir();
    let path = dir.join(format!("glint_repl_test_bad_{}.glint", std::process::id()));
    std::fs::write(&path, "print;\n").expect("write temp script");

    let code = run_file(&mut vm, &path);
    let _ = std::fs::remove_file(&path);

    assert_eq!(code, exit_code::COMPILE_ERROR);
}
