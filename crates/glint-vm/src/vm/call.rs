// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Call protocol: dispatching `CALL`/`INVOKE`/`SUPER_INVOKE`, binding
//! methods, and building the runtime-error stack trace.

use super::{CallFrame, FRAMES_MAX, Vm};
use crate::object::{BoundMethodObj, ClassObj, ClosureObj, InstanceObj, Obj, ObjKind};
use crate::value::Value;
use core::ptr::NonNull;

/// A runtime error: the message printed to stderr plus the already
/// formatted per-frame stack trace, captured at the point of failure
/// (before the stack is reset).
#[derive(Debug, Clone)]
pub struct RuntimeError {
    pub message: String,
    pub(crate) trace: Vec<String>,
}

impl RuntimeError {
    /// Per-frame `[line N] in <name>` trace lines, innermost frame first.
    #[must_use]
    pub fn trace(&self) -> &[String] {
        &self.trace
    }
}

pub(crate) fn capture_stack_trace(vm: &Vm) -> Vec<String> {
    vm.frames
        .iter()
        .rev()
        .map(|frame| {
            let chunk = vm.chunk_of(frame.closure);
            let line = chunk.line_at(frame.ip.saturating_sub(1));
            format!("[line {line}] in {}", frame_name(frame))
        })
        .collect()
}

fn frame_name(frame: &CallFrame) -> String {
    // SAFETY: a call frame's closure and function outlive the frame.
    let ObjKind::Closure(c) = &unsafe { frame.closure.as_ref() }.kind else {
        unreachable!("call frames always hold a closure")
    };
    let ObjKind::Function(f) = &unsafe { c.function.as_ref() }.kind else {
        unreachable!("a closure always wraps a function")
    };
    match f.name {
        None => "script".to_string(),
        Some(name) => {
            let ObjKind::String(s) = &unsafe { name.as_ref() }.kind else {
                unreachable!("function names are always strings")
            };
            format!("{}()", s.as_str())
        }
    }
}

impl Vm {
    fn undefined_property(&self, name: NonNull<Obj>) -> RuntimeError {
        // SAFETY: property/method names are always interned strings.
        let ObjKind::String(s) = &unsafe { name.as_ref() }.kind else {
            unreachable!("property names are always strings")
        };
        self.runtime_error(format!("Undefined property '{}'.", s.as_str()))
    }

    /// Dispatches `CALL`: the callee sits at `stack[len - arg_count - 1]`.
    pub(crate) fn call_value(&mut self, callee: Value, arg_count: usize) -> Result<(), RuntimeError> {
        let Some(obj) = callee.as_obj() else {
            return Err(self.runtime_error("Can only call functions and classes."));
        };
        // SAFETY: object kinds are fixed at allocation time; reading the
        // tag does not alias any `&mut` access performed below.
        match unsafe { &obj.as_ref().kind } {
            ObjKind::Closure(_) => self.call(obj, arg_count),
            ObjKind::Native(n) => {
                let native = n.function;
                let base = self.stack.len() - arg_count;
                let result = native(&self.stack[base..]);
                self.stack.truncate(base - 1);
                self.push(result);
                Ok(())
            }
            ObjKind::Class(_) => self.call_class(obj, arg_count),
            ObjKind::BoundMethod(b) => {
                let receiver = b.receiver;
                let method = b.method;
                let slot = self.stack.len() - arg_count - 1;
                self.stack[slot] = receiver;
                self.call(method, arg_count)
            }
            _ => Err(self.runtime_error("Can only call functions and classes.")),
        }
    }

    fn call(&mut self, closure: NonNull<Obj>, arg_count: usize) -> Result<(), RuntimeError> {
        // SAFETY: `closure` was just matched as `ObjKind::Closure`.
        let ObjKind::Closure(c) = &unsafe { closure.as_ref() }.kind else {
            unreachable!("call() is only reached for closures and bound methods")
        };
        let function = c.function;
        let ObjKind::Function(f) = &unsafe { function.as_ref() }.kind else {
            unreachable!("a closure always wraps a function")
        };
        let arity = f.arity as usize;
        if arg_count != arity {
            return Err(self.runtime_error(format!("Expected {arity} arguments but got {arg_count}.")));
        }
        if self.frames.len() >= FRAMES_MAX {
            return Err(self.runtime_error("Stack overflow."));
        }
        let slots_base = self.stack.len() - arg_count - 1;
        self.frames.push(CallFrame {
            closure,
            ip: 0,
            slots_base,
        });
        Ok(())
    }

    fn call_class(&mut self, class: NonNull<Obj>, arg_count: usize) -> Result<(), RuntimeError> {
        let instance = self.alloc(ObjKind::Instance(InstanceObj::new(class)));
        let slot = self.stack.len() - arg_count - 1;
        self.stack[slot] = Value::Obj(instance);

        // SAFETY: `class` was just matched as `ObjKind::Class`.
        let ObjKind::Class(c) = &unsafe { class.as_ref() }.kind else {
            unreachable!("call_class() is only reached for classes")
        };
        if let Some(init) = c.methods.get(self.init_string) {
            let method = init.as_obj().expect("methods are always closure values");
            return self.call(method, arg_count);
        }
        if arg_count != 0 {
            return Err(self.runtime_error(format!("Expected 0 arguments but got {arg_count}.")));
        }
        Ok(())
    }

    /// Fused `GET_PROPERTY` + `CALL` on an instance, falling back to a
    /// plain field lookup if the name is a field rather than a method.
    pub(crate) fn invoke(&mut self, name: NonNull<Obj>, arg_count: usize) -> Result<(), RuntimeError> {
        let receiver = self.peek(arg_count);
        let Some(obj) = receiver.as_obj() else {
            return Err(self.runtime_error("Only instances have methods."));
        };
        let ObjKind::Instance(inst) = &unsafe { obj.as_ref() }.kind else {
            return Err(self.runtime_error("Only instances have methods."));
        };
        if let Some(field) = inst.fields.get(name) {
            let slot = self.stack.len() - arg_count - 1;
            self.stack[slot] = field;
            return self.call_value(field, arg_count);
        }
        let class = inst.class;
        self.invoke_from_class(class, name, arg_count)
    }

    pub(crate) fn invoke_from_class(
        &mut self,
        class: NonNull<Obj>,
        name: NonNull<Obj>,
        arg_count: usize,
    ) -> Result<(), RuntimeError> {
        let ObjKind::Class(c) = &unsafe { class.as_ref() }.kind else {
            unreachable!("invoke_from_class() is only reached for classes")
        };
        let Some(method) = c.methods.get(name) else {
            return Err(self.undefined_property(name));
        };
        let method_obj = method.as_obj().expect("methods are always closure values");
        self.call(method_obj, arg_count)
    }

    pub(crate) fn get_property(&mut self) -> Result<(), RuntimeError> {
        let name = self.read_string_constant();
        let receiver = self.peek(0);
        let Some(obj) = receiver.as_obj() else {
            return Err(self.runtime_error("Only instances have properties."));
        };
        let ObjKind::Instance(inst) = &unsafe { obj.as_ref() }.kind else {
            return Err(self.runtime_error("Only instances have properties."));
        };
        if let Some(value) = inst.fields.get(name) {
            self.pop();
            self.push(value);
            return Ok(());
        }
        let class = inst.class;
        self.bind_method(class, name)
    }

    pub(crate) fn set_property(&mut self) -> Result<(), RuntimeError> {
        let name = self.read_string_constant();
        let receiver = self.peek(1);
        let Some(obj) = receiver.as_obj() else {
            return Err(self.runtime_error("Only instances have fields."));
        };
        // SAFETY: exclusive access — nothing else observes this instance
        // mutably while the VM is stepping a single instruction.
        let ObjKind::Instance(inst) = &mut unsafe { &mut *obj.as_ptr() }.kind else {
            return Err(self.runtime_error("Only instances have fields."));
        };
        let value = self.peek(0);
        inst.fields.set(name, value);
        let value = self.pop();
        self.pop();
        self.push(value);
        Ok(())
    }

    pub(crate) fn get_super(&mut self) -> Result<(), RuntimeError> {
        let name = self.read_string_constant();
        let superclass = self.pop();
        let class = superclass
            .as_obj()
            .expect("GET_SUPER operand is always a class value");
        self.bind_method(class, name)
    }

    fn bind_method(&mut self, class: NonNull<Obj>, name: NonNull<Obj>) -> Result<(), RuntimeError> {
        let ObjKind::Class(c) = &unsafe { class.as_ref() }.kind else {
            unreachable!("bind_method() is only reached for classes")
        };
        let Some(method) = c.methods.get(name) else {
            return Err(self.undefined_property(name));
        };
        let method_obj = method.as_obj().expect("methods are always closure values");
        let receiver = self.pop();
        let bound = self.alloc(ObjKind::BoundMethod(BoundMethodObj::new(receiver, method_obj)));
        self.push(Value::Obj(bound));
        Ok(())
    }

    pub(crate) fn closure(&mut self) -> Result<(), RuntimeError> {
        let function = self
            .read_constant()
            .as_obj()
            .expect("CLOSURE operand is always a function constant");
        let ObjKind::Function(f) = &unsafe { function.as_ref() }.kind else {
            unreachable!("CLOSURE operand is always ObjKind::Function")
        };
        let upvalue_count = f.upvalue_count as usize;
        let closure_obj = self.alloc(ObjKind::Closure(ClosureObj::new(function, upvalue_count, function)));
        self.push(Value::Obj(closure_obj));

        for i in 0..upvalue_count {
            let is_local = self.read_byte() != 0;
            let index = self.read_byte() as usize;
            let upvalue = if is_local {
                let base = self.current_frame().slots_base;
                self.capture_upvalue(base + index)
            } else {
                let ObjKind::Closure(enclosing) = &unsafe { self.current_frame().closure.as_ref() }.kind else {
                    unreachable!("enclosing frame always holds a closure")
                };
                enclosing.upvalues[index].get()
            };
            let ObjKind::Closure(c) = &unsafe { closure_obj.as_ref() }.kind else {
                unreachable!("just allocated as ObjKind::Closure")
            };
            c.upvalues[i].set(upvalue);
        }
        Ok(())
    }

    pub(crate) fn class(&mut self) -> Result<(), RuntimeError> {
        let name = self.read_string_constant();
        let class = self.alloc(ObjKind::Class(ClassObj::new(name)));
        self.push(Value::Obj(class));
        Ok(())
    }

    pub(crate) fn inherit(&mut self) -> Result<(), RuntimeError> {
        let superclass = self.peek(1);
        let Some(super_obj) = superclass.as_obj() else {
            return Err(self.runtime_error("Superclass must be a class."));
        };
        let ObjKind::Class(super_class) = &unsafe { super_obj.as_ref() }.kind else {
            return Err(self.runtime_error("Superclass must be a class."));
        };
        let subclass = self
            .peek(0)
            .as_obj()
            .expect("INHERIT subclass operand is always a class value");
        // SAFETY: `subclass` and `super_obj` are distinct heap objects.
        let ObjKind::Class(sub) = &mut unsafe { &mut *subclass.as_ptr() }.kind else {
            unreachable!("INHERIT subclass operand is always ObjKind::Class")
        };
        sub.methods.add_all(&super_class.methods);
        self.pop(); // subclass
        Ok(())
    }

    pub(crate) fn method(&mut self) -> Result<(), RuntimeError> {
        let name = self.read_string_constant();
        let closure = self.pop();
        let class = self.peek(0).as_obj().expect("METHOD target is always a class value");
        // SAFETY: exclusive access during method table population.
        let ObjKind::Class(c) = &mut unsafe { &mut *class.as_ptr() }.kind else {
            unreachable!("METHOD target is always ObjKind::Class")
        };
        c.methods.set(name, closure);
        Ok(())
    }
}
