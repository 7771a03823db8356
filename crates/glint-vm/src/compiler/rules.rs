// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The Pratt parse-rule table and every prefix/infix expression handler.

use super::Compiler;
use crate::bytecode::op;
use crate::scanner::TokenKind;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(super) enum Precedence {
    None,
    Assignment, // =
    Or,         // or
    And,        // and
    Equality,   // == !=
    Comparison, // < > <= >=
    Term,       // + -
    Factor,     // * /
    Unary,      // ! -
    Call,       // . ()
    Primary,
}

impl Precedence {
    fn next(self) -> Self {
        match self {
            Self::None => Self::Assignment,
            Self::Assignment => Self::Or,
            Self::Or => Self::And,
            Self::And => Self::Equality,
            Self::Equality => Self::Comparison,
            Self::Comparison => Self::Term,
            Self::Term => Self::Factor,
            Self::Factor => Self::Unary,
            Self::Unary => Self::Call,
            Self::Call | Self::Primary => Self::Primary,
        }
    }
}

type ParseFn<'src, 'vm> = fn(&mut Compiler<'src, 'vm>, bool);

struct ParseRule<'src, 'vm> {
    prefix: Option<ParseFn<'src, 'vm>>,
    infix: Option<ParseFn<'src, 'vm>>,
    precedence: Precedence,
}

fn get_rule<'src, 'vm>(kind: TokenKind) -> ParseRule<'src, 'vm> {
    use TokenKind as T;
    match kind {
        T::LeftParen => ParseRule {
            prefix: Some(grouping),
            infix: Some(call),
            precedence: Precedence::Call,
        },
        T::Dot => ParseRule {
            prefix: None,
            infix: Some(dot),
            precedence: Precedence::Call,
        },
        T::Minus => ParseRule {
            prefix: Some(unary),
            infix: Some(binary),
            precedence: Precedence::Term,
        },
        T::Plus => ParseRule {
            prefix: None,
            infix: Some(binary),
            precedence: Precedence::Term,
        },
        T::Slash | T::Star => ParseRule {
            prefix: None,
            infix: Some(binary),
            precedence: Precedence::Factor,
        },
        T::Bang => ParseRule {
            prefix: Some(unary),
            infix: None,
            precedence: Precedence::None,
        },
        T::BangEqual | T::EqualEqual => ParseRule {
            prefix: None,
            infix: Some(binary),
            precedence: Precedence::Equality,
        },
        T::Greater | T::GreaterEqual | T::Less | T::LessEqual => ParseRule {
            prefix: None,
            infix: Some(binary),
            precedence: Precedence::Comparison,
        },
        T::Identifier => ParseRule {
            prefix: Some(variable),
            infix: None,
            precedence: Precedence::None,
        },
        T::String => ParseRule {
            prefix: Some(string_literal),
            infix: None,
            precedence: Precedence::None,
        },
        T::Number => ParseRule {
            prefix: Some(number),
            infix: None,
            precedence: Precedence::None,
        },
        T::And => ParseRule {
            prefix: None,
            infix: Some(and_),
            precedence: Precedence::And,
        },
        T::Or => ParseRule {
            prefix: None,
            infix: Some(or_),
            precedence: Precedence::Or,
        },
        T::False | T::Nil | T::True => ParseRule {
            prefix: Some(literal),
            infix: None,
            precedence: Precedence::None,
        },
        T::This => ParseRule {
            prefix: Some(this),
            infix: None,
            precedence: Precedence::None,
        },
        T::Super => ParseRule {
            prefix: Some(super_),
            infix: None,
            precedence: Precedence::None,
        },
        _ => ParseRule {
            prefix: None,
            infix: None,
            precedence: Precedence::None,
        },
    }
}

impl<'src, 'vm> Compiler<'src, 'vm> {
    pub(super) fn expression(&mut self) {
        self.parse_precedence(Precedence::Assignment);
    }

    fn parse_precedence(&mut self, precedence: Precedence) {
        self.advance();
        let Some(prefix) = get_rule(self.previous.kind).prefix else {
            self.error("Expect expression.");
            return;
        };
        let can_assign = precedence <= Precedence::Assignment;
        prefix(self, can_assign);

        while precedence <= get_rule(self.current.kind).precedence {
            self.advance();
            let infix = get_rule(self.previous.kind)
                .infix
                .expect("operator just matched the loop's own precedence check");
            infix(self, can_assign);
        }

        if can_assign && self.match_token(TokenKind::Equal) {
            self.error("Invalid assignment target.");
        }
    }

    pub(super) fn named_variable(&mut self, name: crate::scanner::Token<'src>, can_assign: bool) {
        let top = self.scopes.len() - 1;
        let (get_op, set_op, arg) = if let Some(slot) = self.resolve_local(top, name) {
            (op::GET_LOCAL, op::SET_LOCAL, slot as u8)
        } else if let Some(slot) = self.resolve_upvalue(top, name) {
            (op::GET_UPVALUE, op::SET_UPVALUE, slot as u8)
        } else {
            let constant = self.identifier_constant(name);
            (op::GET_GLOBAL, op::SET_GLOBAL, constant)
        };

        if can_assign && self.match_token(TokenKind::Equal) {
            self.expression();
            self.emit_bytes(set_op, arg);
        } else {
            self.emit_bytes(get_op, arg);
        }
    }

    pub(super) fn argument_list(&mut self) -> u8 {
        let mut count: u32 = 0;
        if !self.check(TokenKind::RightParen) {
            loop {
                self.expression();
                if count == 255 {
                    self.error("Can't have more than 255 arguments.");
                }
                count += 1;
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "Expect ')' after arguments.");
        count as u8
    }
}

fn number<'src, 'vm>(c: &mut Compiler<'src, 'vm>, _can_assign: bool) {
    let value: f64 = c
        .previous
        .lexeme
        .parse()
        .expect("scanner only ever produces well-formed number lexemes");
    c.emit_constant(Value::Number(value));
}

fn string_literal<'src, 'vm>(c: &mut Compiler<'src, 'vm>, _can_assign: bool) {
    let lexeme = c.previous.lexeme;
    let content = &lexeme[1..lexeme.len() - 1];
    let obj = c.vm.intern(content);
    c.emit_constant(Value::Obj(obj));
}

fn grouping<'src, 'vm>(c: &mut Compiler<'src, 'vm>, _can_assign: bool) {
    c.expression();
    c.consume(TokenKind::RightParen, "Expect ')' after expression.");
}

fn unary<'src, 'vm>(c: &mut Compiler<'src, 'vm>, _can_assign: bool) {
    let operator = c.previous.kind;
    c.parse_precedence(Precedence::Unary);
    match operator {
        TokenKind::Bang => c.emit_byte(op::NOT),
        TokenKind::Minus => c.emit_byte(op::NEGATE),
        _ => unreachable!("unary() is only wired to Bang and Minus"),
    }
}

fn binary<'src, 'vm>(c: &mut Compiler<'src, 'vm>, _can_assign: bool) {
    let operator = c.previous.kind;
    let rule_precedence: Precedence = get_rule::<'src, 'vm>(operator).precedence;
    c.parse_precedence(rule_precedence.next());
    match operator {
        TokenKind::BangEqual => {
            c.emit_byte(op::EQUAL);
            c.emit_byte(op::NOT);
        }
        TokenKind::EqualEqual => c.emit_byte(op::EQUAL),
        TokenKind::Greater => c.emit_byte(op::GREATER),
        TokenKind::GreaterEqual => {
            c.emit_byte(op::LESS);
            c.emit_byte(op::NOT);
        }
        TokenKind::Less => c.emit_byte(op::LESS),
        TokenKind::LessEqual => {
            c.emit_byte(op::GREATER);
            c.emit_byte(op::NOT);
        }
        TokenKind::Plus => c.emit_byte(op::ADD),
        TokenKind::Minus => c.emit_byte(op::SUBTRACT),
        TokenKind::Star => c.emit_byte(op::MULTIPLY),
        TokenKind::Slash => c.emit_byte(op::DIVIDE),
        _ => unreachable!("binary() is only wired to the arithmetic/comparison operators"),
    }
}

fn literal<'src, 'vm>(c: &mut Compiler<'src, 'vm>, _can_assign: bool) {
    match c.previous.kind {
        TokenKind::False => c.emit_byte(op::FALSE),
        TokenKind::Nil => c.emit_byte(op::NIL),
        TokenKind::True => c.emit_byte(op::TRUE),
        _ => unreachable!("literal() is only wired to False, Nil and True"),
    }
}

fn and_<'src, 'vm>(c: &mut Compiler<'src, 'vm>, _can_assign: bool) {
    let end_jump = c.emit_jump(op::JUMP_IF_FALSE);
    c.emit_byte(op::POP);
    c.parse_precedence(Precedence::And);
    c.patch_jump(end_jump);
}

fn or_<'src, 'vm>(c: &mut Compiler<'src, 'vm>, _can_assign: bool) {
    let else_jump = c.emit_jump(op::JUMP_IF_FALSE);
    let end_jump = c.emit_jump(op::JUMP);
    c.patch_jump(else_jump);
    c.emit_byte(op::POP);
    c.parse_precedence(Precedence::Or);
    c.patch_jump(end_jump);
}

fn variable<'src, 'vm>(c: &mut Compiler<'src, 'vm>, can_assign: bool) {
    c.named_variable(c.previous, can_assign);
}

fn call<'src, 'vm>(c: &mut Compiler<'src, 'vm>, _can_assign: bool) {
    let arg_count = c.argument_list();
    c.emit_bytes(op::CALL, arg_count);
}

fn dot<'src, 'vm>(c: &mut Compiler<'src, 'vm>, can_assign: bool) {
    c.consume(TokenKind::Identifier, "Expect property name after '.'.");
    let name = c.identifier_constant(c.previous);
    if can_assign && c.match_token(TokenKind::Equal) {
        c.expression();
        c.emit_bytes(op::SET_PROPERTY, name);
    } else if c.match_token(TokenKind::LeftParen) {
        let arg_count = c.argument_list();
        c.emit_bytes(op::INVOKE, name);
        c.emit_byte(arg_count);
    } else {
        c.emit_bytes(op::GET_PROPERTY, name);
    }
}

fn this<'src, 'vm>(c: &mut Compiler<'src, 'vm>, _can_assign: bool) {
    if c.classes.is_empty() {
        c.error("Can't use 'this' outside of a class.");
        return;
    }
    variable(c, false);
}

fn super_<'src, 'vm>(c: &mut Compiler<'src, 'vm>, _can_assign: bool) {
    if c.classes.is_empty() {
        c.error("Can't use 'super' outside of a class.");
    } else if !c.classes.last().expect("just checked non-empty").has_superclass {
        c.error("Can't use 'super' in a class with no superclass.");
    }

    c.consume(TokenKind::Dot, "Expect '.' after 'super'.");
    c.consume(TokenKind::Identifier, "Expect superclass method name.");
    let name = c.identifier_constant(c.previous);

    c.named_variable(super::synthetic_token("this"), false);
    if c.match_token(TokenKind::LeftParen) {
        let arg_count = c.argument_list();
        c.named_variable(super::synthetic_token("super"), false);
        c.emit_bytes(op::SUPER_INVOKE, name);
        c.emit_byte(arg_count);
    } else {
        c.named_variable(super::synthetic_token("super"), false);
        c.emit_bytes(op::GET_SUPER, name);
    }
}
