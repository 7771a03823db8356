// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use super::*;

#[test]
fn write_appends_byte_and_line() {
    let mut chunk = Chunk::new();
    chunk.write(op::RETURN, 3);
    assert_eq!(chunk.code, vec![op::RETURN]);
    assert_eq!(chunk.line_at(0), 3);
}

#[test]
fn patch_overwrites_an_emitted_byte() {
    let mut chunk = Chunk::new();
    chunk.write(op::JUMP, 1);
    chunk.write(0xff, 1);
    chunk.write(0xff, 1);
    chunk.patch(1, 0x00);
    chunk.patch(2, 0x05);
    assert_eq!(chunk.code, vec![op::JUMP, 0x00, 0x05]);
}

#[test]
fn add_constant_returns_its_index() {
    let mut chunk = Chunk::new();
    assert_eq!(chunk.add_constant(Value::Number(1.0)), Some(0));
    assert_eq!(chunk.add_constant(Value::Number(2.0)), Some(1));
}

#[test]
fn add_constant_rejects_past_the_cap() {
    let mut chunk = Chunk::new();
    for i in 0..MAX_CONSTANTS {
        assert!(chunk.add_constant(Value::Number(i as f64)).is_some());
    }
    assert_eq!(chunk.add_constant(Value::Number(0.0)), None);
}

#[test]
fn line_at_out_of_range_defaults_to_zero() {
    let chunk = Chunk::new();
    assert_eq!(chunk.line_at(42), 0);
}

#[test]
fn empty_chunk_reports_len_zero() {
    let chunk = Chunk::new();
    assert!(chunk.is_empty());
    assert_eq!(chunk.len(), 0);
}
