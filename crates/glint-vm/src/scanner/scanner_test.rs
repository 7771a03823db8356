// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use super::*;

fn kinds(source: &str) -> Vec<TokenKind> {
    let mut scanner = Scanner::new(source);
    let mut out = Vec::new();
    loop {
        let token = scanner.scan_token();
        let done = token.kind == TokenKind::Eof;
        out.push(token.kind);
        if done {
            break;
        }
    }
    out
}

#[test]
fn scans_single_character_punctuation() {
    assert_eq!(
        kinds("(){},.-+;/*"),
        vec![
            TokenKind::LeftParen,
            TokenKind::RightParen,
            TokenKind::LeftBrace,
            TokenKind::RightBrace,
            TokenKind::Comma,
            TokenKind::Dot,
            TokenKind::Minus,
            TokenKind::Plus,
            TokenKind::Semicolon,
            TokenKind::Slash,
            TokenKind::Star,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn scans_two_character_operators_greedily() {
    assert_eq!(
        kinds("!= == <= >= ! = < >"),
        vec![
            TokenKind::BangEqual,
            TokenKind::EqualEqual,
            TokenKind::LessEqual,
            TokenKind::GreaterEqual,
            TokenKind::Bang,
            TokenKind::Equal,
            TokenKind::Less,
            TokenKind::Greater,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn scans_all_keywords() {
    let source = "and class else false for fun if nil or print return super this true var while";
    assert_eq!(
        kinds(source),
        vec![
            TokenKind::And,
            TokenKind::Class,
            TokenKind::Else,
            TokenKind::False,
            TokenKind::For,
            TokenKind::Fun,
            TokenKind::If,
            TokenKind::Nil,
            TokenKind::Or,
            TokenKind::Print,
            TokenKind::Return,
            TokenKind::Super,
            TokenKind::This,
            TokenKind::True,
            TokenKind::Var,
            TokenKind::While,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn identifier_is_not_confused_with_keyword_prefix() {
    let mut scanner = Scanner::new("andrew");
    let token = scanner.scan_token();
    assert_eq!(token.kind, TokenKind::Identifier);
    assert_eq!(token.lexeme, "andrew");
}

#[test]
fn scans_integer_and_float_numbers() {
    let mut scanner = Scanner::new("123 4.5");
    let a = scanner.scan_token();
    assert_eq!(a.kind, TokenKind::Number);
    assert_eq!(a.lexeme, "123");
    let b = scanner.scan_token();
    assert_eq!(b.kind, TokenKind::Number);
    assert_eq!(b.lexeme, "4.5");
}

#[test]
fn trailing_dot_with_no_digit_is_not_part_of_the_number() {
    let mut scanner = Scanner::new("123.");
    let a = scanner.scan_token();
    assert_eq!(a.kind, TokenKind::Number);
    assert_eq!(a.lexeme, "123");
    let b = scanner.scan_token();
    assert_eq!(b.kind, TokenKind::Dot);
}

#[test]
fn scans_string_literal() {
    let mut scanner = Scanner::new(r#""hello world""#);
    let token = scanner.scan_token();
    assert_eq!(token.kind, TokenKind::String);
    assert_eq!(token.lexeme, r#""hello world""#);
}

#[test]
fn unterminated_string_is_an_error_token() {
    let mut scanner = Scanner::new("\"oops");
    let token = scanner.scan_token();
    assert_eq!(token.kind, TokenKind::Error);
    assert_eq!(token.lexeme, "Unterminated string.");
}

#[test]
fn skips_line_comments_and_whitespace() {
    let mut scanner = Scanner::new("// a comment\n  1");
    let token = scanner.scan_token();
    assert_eq!(token.kind, TokenKind::Number);
    assert_eq!(token.line, 2);
}

#[test]
fn unexpected_character_is_an_error_token() {
    let mut scanner = Scanner::new("@");
    let token = scanner.scan_token();
    assert_eq!(token.kind, TokenKind::Error);
    assert_eq!(token.lexeme, "Unexpected character.");
}

#[test]
fn tracks_line_numbers_across_newlines() {
    let mut scanner = Scanner::new("1\n2\n3");
    assert_eq!(scanner.scan_token().line, 1);
    assert_eq!(scanner.scan_token().line, 2);
    assert_eq!(scanner.scan_token().line, 3);
}
