// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Per-function compiler state: locals, upvalue descriptors, and scope
//! depth. One [`FunctionScope`] exists per function currently under
//! construction; they are kept on a stack (outer before inner) on the
//! driving [`super::Compiler`].

use super::Compiler;
use crate::object::{Obj, ObjKind};
use crate::scanner::{Token, TokenKind};
use core::ptr::NonNull;

#[derive(Clone, Copy, PartialEq, Eq)]
pub(super) enum FunctionKind {
    Script,
    Function,
    Method,
    Initializer,
}

pub(super) struct Local<'src> {
    pub(super) name: Token<'src>,
    /// `-1` means "declared but not yet initialized".
    pub(super) depth: i32,
    pub(super) is_captured: bool,
}

pub(super) struct UpvalueDesc {
    pub(super) index: u8,
    pub(super) is_local: bool,
}

pub(super) struct FunctionScope<'src> {
    pub(super) function: NonNull<Obj>,
    pub(super) kind: FunctionKind,
    pub(super) locals: Vec<Local<'src>>,
    pub(super) upvalues: Vec<UpvalueDesc>,
    pub(super) scope_depth: i32,
}

impl<'src> FunctionScope<'src> {
    pub(super) fn new(function: NonNull<Obj>, kind: FunctionKind) -> Self {
        // Slot 0 is reserved for the VM; methods and initializers bind it
        // to `this`, everything else leaves it nameless and unreachable.
        let slot0_name = match kind {
            FunctionKind::Method | FunctionKind::Initializer => "this",
            FunctionKind::Function | FunctionKind::Script => "",
        };
        Self {
            function,
            kind,
            locals: vec![Local {
                name: Token {
                    kind: TokenKind::Identifier,
                    lexeme: slot0_name,
                    line: 0,
                },
                depth: 0,
                is_captured: false,
            }],
            upvalues: Vec::new(),
            scope_depth: 0,
        }
    }
}

impl<'src> Compiler<'src, '_> {
    pub(super) fn current_scope(&self) -> &FunctionScope<'src> {
        self.scopes.last().expect("compiler always has an active function scope")
    }

    pub(super) fn current_scope_mut(&mut self) -> &mut FunctionScope<'src> {
        self.scopes.last_mut().expect("compiler always has an active function scope")
    }

    pub(super) fn begin_scope(&mut self) {
        self.current_scope_mut().scope_depth += 1;
    }

    pub(super) fn end_scope(&mut self) {
        self.current_scope_mut().scope_depth -= 1;
        let depth = self.current_scope().scope_depth;
        loop {
            let popped_capture = match self.current_scope().locals.last() {
                Some(local) if local.depth > depth => Some(local.is_captured),
                _ => None,
            };
            let Some(captured) = popped_capture else { break };
            if captured {
                self.emit_byte(crate::bytecode::op::CLOSE_UPVALUE);
            } else {
                self.emit_byte(crate::bytecode::op::POP);
            }
            self.current_scope_mut().locals.pop();
        }
    }

    pub(super) fn declare_variable(&mut self) {
        if self.current_scope().scope_depth == 0 {
            return;
        }
        let name = self.previous;
        let depth = self.current_scope().scope_depth;
        let duplicate = self
            .current_scope()
            .locals
            .iter()
            .rev()
            .take_while(|l| l.depth == -1 || l.depth >= depth)
            .any(|l| l.depth == depth && l.name.lexeme == name.lexeme);
        if duplicate {
            self.error("Already a variable with this name in this scope.");
        }
        self.add_local(name);
    }

    pub(super) fn add_local(&mut self, name: Token<'src>) {
        if self.current_scope().locals.len() >= 256 {
            self.error("Too many local variables in function.");
            return;
        }
        self.current_scope_mut().locals.push(Local {
            name,
            depth: -1,
            is_captured: false,
        });
    }

    pub(super) fn mark_initialized(&mut self) {
        if self.current_scope().scope_depth == 0 {
            return;
        }
        let depth = self.current_scope().scope_depth;
        if let Some(last) = self.current_scope_mut().locals.last_mut() {
            last.depth = depth;
        }
    }

    pub(super) fn resolve_local(&mut self, scope_index: usize, name: Token<'src>) -> Option<usize> {
        let found = self
            .scopes[scope_index]
            .locals
            .iter()
            .enumerate()
            .rev()
            .find(|(_, local)| local.name.lexeme == name.lexeme)
            .map(|(i, local)| (i, local.depth));

        match found {
            Some((i, -1)) => {
                self.error("Can't read local variable in its own initializer.");
                Some(i)
            }
            Some((i, _)) => Some(i),
            None => None,
        }
    }

    pub(super) fn resolve_upvalue(&mut self, scope_index: usize, name: Token<'src>) -> Option<usize> {
        if scope_index == 0 {
            return None;
        }
        let enclosing = scope_index - 1;
        if let Some(local_slot) = self.resolve_local(enclosing, name) {
            self.scopes[enclosing].locals[local_slot].is_captured = true;
            return Some(self.add_upvalue(scope_index, local_slot as u8, true));
        }
        if let Some(upvalue_slot) = self.resolve_upvalue(enclosing, name) {
            return Some(self.add_upvalue(scope_index, upvalue_slot as u8, false));
        }
        None
    }

    fn add_upvalue(&mut self, scope_index: usize, index: u8, is_local: bool) -> usize {
        if let Some(i) = self.scopes[scope_index]
            .upvalues
            .iter()
            .position(|up| up.index == index && up.is_local == is_local)
        {
            return i;
        }
        if self.scopes[scope_index].upvalues.len() >= 256 {
            self.error("Too many closure variables in function.");
            return 0;
        }
        self.scopes[scope_index].upvalues.push(UpvalueDesc { index, is_local });
        let count = self.scopes[scope_index].upvalues.len() as u8;
        let function = self.scopes[scope_index].function;
        // SAFETY: the function is still under construction by this
        // compiler; nothing else observes it mutably.
        let ObjKind::Function(f) = &mut unsafe { &mut *function.as_ptr() }.kind else {
            unreachable!("a compiler scope's function is always ObjKind::Function")
        };
        f.upvalue_count = count;
        self.scopes[scope_index].upvalues.len() - 1
    }
}
