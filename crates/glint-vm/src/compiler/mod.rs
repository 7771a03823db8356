// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Single-pass Pratt compiler: source text straight to bytecode, with no
//! intermediate AST. Declarations and statements are compiled recursive-
//! descent style; expressions go through the precedence-climbing table in
//! [`rules`].
//!
//! Functions (including the implicit top-level script) are compiled with
//! a stack of [`scope::FunctionScope`]s, outermost first. Each function's
//! [`crate::object::FunctionObj`] is heap-allocated the moment compilation
//! of it begins and pushed onto [`crate::vm::Vm::compiler_roots`], so a GC
//! cycle triggered by a string literal or constant mid-function still sees
//! it as a root.

#[cfg(test)]
mod compiler_test;
mod rules;
mod scope;

use crate::bytecode::{Chunk, op};
use crate::object::{FunctionObj, Obj, ObjKind};
use crate::scanner::{Scanner, Token, TokenKind};
use crate::value::Value;
use crate::vm::Vm;
use core::ptr::NonNull;
use scope::{FunctionKind, FunctionScope};

struct ClassCompiler {
    has_superclass: bool,
}

/// A single compile-time diagnostic, structured for hosts (like
/// `glint-human`) that want the message as data instead of scraped bytes
/// from the VM's configured error stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileDiagnostic {
    pub line: u32,
    pub locus: Locus,
    pub message: String,
}

/// Where in the token stream a compile error was reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locus {
    /// The error token was synthetic (the scanner's own `Error` token);
    /// it carries no source lexeme to point at.
    None,
    AtEnd,
    AtLexeme(String),
}

struct Compiler<'src, 'vm> {
    vm: &'vm mut Vm,
    scanner: Scanner<'src>,
    current: Token<'src>,
    previous: Token<'src>,
    had_error: bool,
    panic_mode: bool,
    scopes: Vec<FunctionScope<'src>>,
    classes: Vec<ClassCompiler>,
}

/// A token that never appeared in the source, used to synthesize the
/// implicit `this`/`super` references a class body needs.
fn synthetic_token<'src>(lexeme: &'src str) -> Token<'src> {
    Token {
        kind: TokenKind::Identifier,
        lexeme,
        line: 0,
    }
}

/// Compiles `source` into a top-level script function, or `None` if any
/// compile error was reported. Diagnostics are written directly to the
/// VM's error stream as they are found, matching the VM's own runtime
/// error handling.
pub fn compile(vm: &mut Vm, source: &str) -> Option<NonNull<Obj>> {
    vm.compile_diagnostics.clear();
    let function = vm.alloc(ObjKind::Function(FunctionObj::new(None)));
    vm.compiler_roots.push(function);

    let placeholder = Token {
        kind: TokenKind::Eof,
        lexeme: "",
        line: 0,
    };
    let mut compiler = Compiler {
        vm,
        scanner: Scanner::new(source),
        current: placeholder,
        previous: placeholder,
        had_error: false,
        panic_mode: false,
        scopes: vec![FunctionScope::new(function, FunctionKind::Script)],
        classes: Vec::new(),
    };

    compiler.advance();
    while !compiler.match_token(TokenKind::Eof) {
        compiler.declaration();
    }
    compiler.emit_return();
    let had_error = compiler.had_error;

    compiler.vm.compiler_roots.pop();
    if had_error { None } else { Some(function) }
}

impl<'src, 'vm> Compiler<'src, 'vm> {
    // --- token stream plumbing -------------------------------------

    fn advance(&mut self) {
        self.previous = self.current;
        loop {
            self.current = self.scanner.scan_token();
            if self.current.kind != TokenKind::Error {
                break;
            }
            self.error_at_current(self.current.lexeme);
        }
    }

    fn consume(&mut self, kind: TokenKind, message: &str) {
        if self.current.kind == kind {
            self.advance();
            return;
        }
        self.error_at_current(message);
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if !self.check(kind) {
            return false;
        }
        self.advance();
        true
    }

    // --- error reporting ---------------------------------------------

    fn error_at_current(&mut self, message: &str) {
        self.error_at(self.current, message);
    }

    fn error(&mut self, message: &str) {
        self.error_at(self.previous, message);
    }

    fn error_at(&mut self, token: Token<'src>, message: &str) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;
        self.had_error = true;

        let (locus_text, locus) = match token.kind {
            TokenKind::Eof => (" at end".to_string(), Locus::AtEnd),
            TokenKind::Error => (String::new(), Locus::None),
            _ => (format!(" at '{}'", token.lexeme), Locus::AtLexeme(token.lexeme.to_string())),
        };
        let _ = writeln!(self.vm.stderr_mut(), "[line {}] Error{}: {}", token.line, locus_text, message);
        self.vm.compile_diagnostics.push(CompileDiagnostic {
            line: token.line,
            locus,
            message: message.to_string(),
        });
    }

    fn synchronize(&mut self) {
        self.panic_mode = false;
        while self.current.kind != TokenKind::Eof {
            if self.previous.kind == TokenKind::Semicolon {
                return;
            }
            match self.current.kind {
                TokenKind::Class
                | TokenKind::Fun
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::Return => return,
                _ => self.advance(),
            }
        }
    }

    // --- bytecode emission ---------------------------------------------

    fn chunk_mut(&mut self) -> &mut Chunk {
        let function = self.current_scope().function;
        // SAFETY: only this compiler mutates the function under
        // construction, and it outlives every reference taken here.
        let ObjKind::Function(f) = &mut unsafe { &mut *function.as_ptr() }.kind else {
            unreachable!("a compiler scope's function is always ObjKind::Function")
        };
        &mut f.chunk
    }

    fn emit_byte(&mut self, byte: u8) {
        let line = self.previous.line;
        self.chunk_mut().write(byte, line);
    }

    fn emit_bytes(&mut self, a: u8, b: u8) {
        self.emit_byte(a);
        self.emit_byte(b);
    }

    fn make_constant(&mut self, value: Value) -> u8 {
        match self.chunk_mut().add_constant(value) {
            Some(index) => index,
            None => {
                self.error("Too many constants in one chunk.");
                0
            }
        }
    }

    fn emit_constant(&mut self, value: Value) {
        let index = self.make_constant(value);
        self.emit_bytes(op::CONSTANT, index);
    }

    fn identifier_constant(&mut self, name: Token<'src>) -> u8 {
        let obj = self.vm.intern(name.lexeme);
        self.make_constant(Value::Obj(obj))
    }

    fn emit_jump(&mut self, instruction: u8) -> usize {
        self.emit_byte(instruction);
        self.emit_byte(0xff);
        self.emit_byte(0xff);
        self.chunk_mut().len() - 2
    }

    fn patch_jump(&mut self, offset: usize) {
        let jump = self.chunk_mut().len() - offset - 2;
        if jump > u16::MAX as usize {
            self.error("Too much code to jump over.");
        }
        let bytes = (jump as u16).to_be_bytes();
        self.chunk_mut().patch(offset, bytes[0]);
        self.chunk_mut().patch(offset + 1, bytes[1]);
    }

    fn emit_loop(&mut self, loop_start: usize) {
        self.emit_byte(op::LOOP);
        let offset = self.chunk_mut().len() - loop_start + 2;
        if offset > u16::MAX as usize {
            self.error("Loop body too large.");
        }
        let bytes = (offset as u16).to_be_bytes();
        self.emit_byte(bytes[0]);
        self.emit_byte(bytes[1]);
    }

    fn emit_return(&mut self) {
        if self.current_scope().kind == FunctionKind::Initializer {
            self.emit_bytes(op::GET_LOCAL, 0);
        } else {
            self.emit_byte(op::NIL);
        }
        self.emit_byte(op::RETURN);
    }

    // --- declarations and statements -----------------------------------

    fn declaration(&mut self) {
        if self.match_token(TokenKind::Class) {
            self.class_declaration();
        } else if self.match_token(TokenKind::Fun) {
            self.fun_declaration();
        } else if self.match_token(TokenKind::Var) {
            self.var_declaration();
        } else {
            self.statement();
        }

        if self.panic_mode {
            self.synchronize();
        }
    }

    fn class_declaration(&mut self) {
        self.consume(TokenKind::Identifier, "Expect class name.");
        let class_name = self.previous;
        let name_constant = self.identifier_constant(class_name);
        self.declare_variable();

        self.emit_bytes(op::CLASS, name_constant);
        self.define_variable(name_constant);

        self.classes.push(ClassCompiler { has_superclass: false });

        if self.match_token(TokenKind::Less) {
            self.consume(TokenKind::Identifier, "Expect superclass name.");
            self.named_variable(self.previous, false);
            if self.previous.lexeme == class_name.lexeme {
                self.error("A class can't inherit from itself.");
            }

            self.begin_scope();
            self.add_local(synthetic_token("super"));
            self.define_variable(0);

            self.named_variable(class_name, false);
            self.emit_byte(op::INHERIT);
            self.classes.last_mut().expect("just pushed").has_superclass = true;
        }

        self.named_variable(class_name, false);
        self.consume(TokenKind::LeftBrace, "Expect '{' before class body.");
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            self.method();
        }
        self.consume(TokenKind::RightBrace, "Expect '}' after class body.");
        self.emit_byte(op::POP);

        if self.classes.last().expect("pushed at function start").has_superclass {
            self.end_scope();
        }

        self.classes.pop();
    }

    fn method(&mut self) {
        self.consume(TokenKind::Identifier, "Expect method name.");
        let name = self.previous;
        let constant = self.identifier_constant(name);

        let kind = if name.lexeme == "init" {
            FunctionKind::Initializer
        } else {
            FunctionKind::Method
        };
        self.compile_function(kind);
        self.emit_bytes(op::METHOD, constant);
    }

    fn fun_declaration(&mut self) {
        let global = self.parse_variable("Expect function name.");
        self.mark_initialized();
        self.compile_function(FunctionKind::Function);
        self.define_variable(global);
    }

    fn compile_function(&mut self, kind: FunctionKind) {
        // The function must be rooted before interning its name: for a
        // nested `fun` the name never becomes a constant, so until it's
        // reachable from `function.name` it only survives through this
        // root, and allocating the function after interning the name
        // would leave the name unrooted across that allocation.
        let function = self.vm.alloc(ObjKind::Function(FunctionObj::new(None)));
        self.vm.compiler_roots.push(function);
        let name_obj = self.vm.intern(self.previous.lexeme);
        set_function_name(function, Some(name_obj));
        self.scopes.push(FunctionScope::new(function, kind));
        self.begin_scope();

        self.consume(TokenKind::LeftParen, "Expect '(' after function name.");
        if !self.check(TokenKind::RightParen) {
            loop {
                let arity = function_arity(function);
                if arity == 255 {
                    self.error_at_current("Can't have more than 255 parameters.");
                }
                let constant = self.parse_variable("Expect parameter name.");
                self.define_variable(constant);
                set_function_arity(function, arity.saturating_add(1));
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "Expect ')' after parameters.");
        self.consume(TokenKind::LeftBrace, "Expect '{' before function body.");
        self.block();

        self.end_function();
    }

    fn end_function(&mut self) {
        self.emit_return();
        let scope = self.scopes.pop().expect("compile_function always pushes a scope");
        self.vm.compiler_roots.pop();

        let constant = self.make_constant(Value::Obj(scope.function));
        self.emit_bytes(op::CLOSURE, constant);
        for upvalue in &scope.upvalues {
            self.emit_byte(u8::from(upvalue.is_local));
            self.emit_byte(upvalue.index);
        }
    }

    fn var_declaration(&mut self) {
        let global = self.parse_variable("Expect variable name.");
        if self.match_token(TokenKind::Equal) {
            self.expression();
        } else {
            self.emit_byte(op::NIL);
        }
        self.consume(TokenKind::Semicolon, "Expect ';' after variable declaration.");
        self.define_variable(global);
    }

    fn parse_variable(&mut self, message: &str) -> u8 {
        self.consume(TokenKind::Identifier, message);
        self.declare_variable();
        if self.current_scope().scope_depth > 0 {
            return 0;
        }
        self.identifier_constant(self.previous)
    }

    fn define_variable(&mut self, global: u8) {
        if self.current_scope().scope_depth > 0 {
            self.mark_initialized();
            return;
        }
        self.emit_bytes(op::DEFINE_GLOBAL, global);
    }

    fn statement(&mut self) {
        if self.match_token(TokenKind::Print) {
            self.print_statement();
        } else if self.match_token(TokenKind::For) {
            self.for_statement();
        } else if self.match_token(TokenKind::If) {
            self.if_statement();
        } else if self.match_token(TokenKind::Return) {
            self.return_statement();
        } else if self.match_token(TokenKind::While) {
            self.while_statement();
        } else if self.match_token(TokenKind::LeftBrace) {
            self.begin_scope();
            self.block();
            self.end_scope();
        } else {
            self.expression_statement();
        }
    }

    fn block(&mut self) {
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            self.declaration();
        }
        self.consume(TokenKind::RightBrace, "Expect '}' after block.");
    }

    fn print_statement(&mut self) {
        self.expression();
        self.consume(TokenKind::Semicolon, "Expect ';' after value.");
        self.emit_byte(op::PRINT);
    }

    fn expression_statement(&mut self) {
        self.expression();
        self.consume(TokenKind::Semicolon, "Expect ';' after expression.");
        self.emit_byte(op::POP);
    }

    fn if_statement(&mut self) {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'if'.");
        self.expression();
        self.consume(TokenKind::RightParen, "Expect ')' after condition.");

        let then_jump = self.emit_jump(op::JUMP_IF_FALSE);
        self.emit_byte(op::POP);
        self.statement();

        let else_jump = self.emit_jump(op::JUMP);
        self.patch_jump(then_jump);
        self.emit_byte(op::POP);

        if self.match_token(TokenKind::Else) {
            self.statement();
        }
        self.patch_jump(else_jump);
    }

    fn while_statement(&mut self) {
        let loop_start = self.chunk_mut().len();
        self.consume(TokenKind::LeftParen, "Expect '(' after 'while'.");
        self.expression();
        self.consume(TokenKind::RightParen, "Expect ')' after condition.");

        let exit_jump = self.emit_jump(op::JUMP_IF_FALSE);
        self.emit_byte(op::POP);
        self.statement();
        self.emit_loop(loop_start);

        self.patch_jump(exit_jump);
        self.emit_byte(op::POP);
    }

    fn for_statement(&mut self) {
        self.begin_scope();
        self.consume(TokenKind::LeftParen, "Expect '(' after 'for'.");
        if self.match_token(TokenKind::Semicolon) {
            // no initializer
        } else if self.match_token(TokenKind::Var) {
            self.var_declaration();
        } else {
            self.expression_statement();
        }

        let mut loop_start = self.chunk_mut().len();
        let mut exit_jump = None;
        if !self.match_token(TokenKind::Semicolon) {
            self.expression();
            self.consume(TokenKind::Semicolon, "Expect ';' after loop condition.");
            exit_jump = Some(self.emit_jump(op::JUMP_IF_FALSE));
            self.emit_byte(op::POP);
        }

        if !self.match_token(TokenKind::RightParen) {
            let body_jump = self.emit_jump(op::JUMP);
            let increment_start = self.chunk_mut().len();
            self.expression();
            self.emit_byte(op::POP);
            self.consume(TokenKind::RightParen, "Expect ')' after for clauses.");

            self.emit_loop(loop_start);
            loop_start = increment_start;
            self.patch_jump(body_jump);
        }

        self.statement();
        self.emit_loop(loop_start);

        if let Some(exit) = exit_jump {
            self.patch_jump(exit);
            self.emit_byte(op::POP);
        }

        self.end_scope();
    }

    fn return_statement(&mut self) {
        if self.current_scope().kind == FunctionKind::Script {
            self.error("Can't return from top-level code.");
        }

        if self.match_token(TokenKind::Semicolon) {
            self.emit_return();
        } else {
            if self.current_scope().kind == FunctionKind::Initializer {
                self.error("Can't return a value from an initializer.");
            }
            self.expression();
            self.consume(TokenKind::Semicolon, "Expect ';' after return value.");
            self.emit_byte(op::RETURN);
        }
    }
}

fn function_arity(function: NonNull<Obj>) -> u8 {
    // SAFETY: the function is still under construction by this compiler.
    let ObjKind::Function(f) = &unsafe { function.as_ref() }.kind else {
        unreachable!("compile_function always allocates ObjKind::Function")
    };
    f.arity
}

fn set_function_arity(function: NonNull<Obj>, arity: u8) {
    // SAFETY: the function is still under construction by this compiler.
    let ObjKind::Function(f) = &mut unsafe { &mut *function.as_ptr() }.kind else {
        unreachable!("compile_function always allocates ObjKind::Function")
    };
    f.arity = arity;
}

fn set_function_name(function: NonNull<Obj>, name: Option<NonNull<Obj>>) {
    // SAFETY: the function is still under construction by this compiler.
    let ObjKind::Function(f) = &mut unsafe { &mut *function.as_ptr() }.kind else {
        unreachable!("compile_function always allocates ObjKind::Function")
    };
    f.name = name;
}
