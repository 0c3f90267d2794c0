//! Instruction selection for one method
//!
//! Each IR instruction becomes a short, stack-balanced run of mnemonics:
//! operands are pushed, the operation consumes them, and an assignment ends
//! with a store into the destination's slot.

use super::code::Code;
use super::descriptor::ClassNames;
use super::method::MethodDescriptor;
use super::opcodes::{self, load_bool_constant, load_int_constant, load_var, return_for, store_var};
use crate::ast::BinOp;
use crate::common::error::{Error, Result};
use crate::ir::{Call, CallKind, Instr, IrType, Operand, Rhs};

pub struct MethodGen<'a, 'm> {
    desc: &'a MethodDescriptor<'m>,
    names: ClassNames<'a>,
    code: Code,
}

impl<'a, 'm> MethodGen<'a, 'm> {
    pub fn new(desc: &'a MethodDescriptor<'m>, names: ClassNames<'a>) -> Self {
        Self {
            desc,
            names,
            code: Code::new(),
        }
    }

    /// Body lines of the method, without the framing directives
    pub fn generate(mut self) -> Result<Vec<String>> {
        for instr in self.desc.instructions() {
            self.gen_instr(instr)?;
        }
        Ok(self.code.into_lines())
    }

    fn gen_instr(&mut self, instr: &Instr) -> Result<()> {
        match instr {
            Instr::Assign { dest, rhs } => {
                self.gen_rhs(rhs)?;
                let slot = self.desc.slot(dest)?.slot;
                self.code.emit(store_var(slot, &dest.ty));
            }
            Instr::ArrayStore { array, index, value } => {
                let slot = self.desc.slot(array)?.slot;
                self.code.emit(load_var(slot, &array.ty));
                self.load(index)?;
                self.load(value)?;
                self.code.emit(opcodes::IASTORE);
            }
            Instr::Call(call) => {
                self.gen_call(call)?;
                if call.ret != IrType::Void {
                    self.code.emit(opcodes::POP);
                }
            }
            Instr::PutField { object, field, value } => {
                self.load(object)?;
                self.load(value)?;
                let owner = self.names.owner(object)?;
                let desc = self.names.descriptor(&field.ty)?;
                self.code.emit(format!("{} {}/{} {}", opcodes::PUTFIELD, owner, field.name, desc));
            }
            Instr::Return(Some(value)) => {
                self.load(value)?;
                self.code.emit(return_for(&value.ty()));
            }
            Instr::Return(None) => self.code.emit(opcodes::RETURN),
            Instr::Goto(label) => self.code.emit_op(opcodes::GOTO, label),
            Instr::Branch { cond, negate, label } => {
                self.load(cond)?;
                let op = if *negate { opcodes::IFEQ } else { opcodes::IFNE };
                self.code.emit_op(op, label);
            }
            Instr::Label(label) => self.code.label(label),
            // Operands have no side effects
            Instr::NoOp(_) => {}
        }
        Ok(())
    }

    /// Leave the value of `rhs` on the stack
    fn gen_rhs(&mut self, rhs: &Rhs) -> Result<()> {
        match rhs {
            Rhs::Operand(op) => self.load(op)?,
            Rhs::Binary { op, left, right } => {
                self.load(left)?;
                self.load(right)?;
                self.gen_binary(*op);
            }
            Rhs::Not(op) => {
                self.load(op)?;
                self.code.emit(load_int_constant(1));
                self.code.emit(opcodes::IXOR);
            }
            Rhs::Call(call) => self.gen_call(call)?,
            Rhs::GetField { object, field } => {
                self.load(object)?;
                let owner = self.names.owner(object)?;
                let desc = self.names.descriptor(&field.ty)?;
                self.code.emit(format!("{} {}/{} {}", opcodes::GETFIELD, owner, field.name, desc));
            }
            Rhs::ArrayLength(array) => {
                self.load(array)?;
                self.code.emit(opcodes::ARRAYLENGTH);
            }
            Rhs::ArrayLoad { array, index } => {
                let slot = self.desc.slot(array)?.slot;
                self.code.emit(load_var(slot, &array.ty));
                self.load(index)?;
                self.code.emit(opcodes::IALOAD);
            }
            Rhs::NewObject(class) => {
                let class = self.names.qualify(class)?;
                self.code.emit_op(opcodes::NEW, &class);
                self.code.emit(opcodes::DUP);
                self.code.emit(format!("{} {}/<init>()V", opcodes::INVOKESPECIAL, class));
            }
            Rhs::NewArray(len) => {
                self.load(len)?;
                self.code.emit_op(opcodes::NEWARRAY, "int");
            }
        }
        Ok(())
    }

    fn gen_binary(&mut self, op: BinOp) {
        let simple = match op {
            BinOp::Add => opcodes::IADD,
            BinOp::Sub => opcodes::ISUB,
            BinOp::Mul => opcodes::IMUL,
            BinOp::Div => opcodes::IDIV,
            BinOp::And => opcodes::IAND,
            BinOp::Or => opcodes::IOR,
            BinOp::Lt | BinOp::Gt => {
                let jump = if op == BinOp::Lt { opcodes::IF_ICMPLT } else { opcodes::IF_ICMPGT };
                let (on_true, end) = self.code.cmp_labels();
                self.code.emit_op(jump, &on_true);
                self.code.emit(load_bool_constant(false));
                self.code.emit_op(opcodes::GOTO, &end);
                self.code.label(&on_true);
                self.code.emit(load_bool_constant(true));
                self.code.label(&end);
                return;
            }
        };
        self.code.emit(simple);
    }

    fn gen_call(&mut self, call: &Call) -> Result<()> {
        let (mnemonic, owner) = match (call.kind, &call.target) {
            (CallKind::Static, Operand::Class(name)) => (opcodes::INVOKESTATIC, self.names.qualify(name)?),
            (CallKind::Static, other) => {
                return Err(Error::malformed_ir(
                    &self.desc.method.name,
                    format!("static call through a value {}", other),
                ));
            }
            (CallKind::Virtual, target) => {
                self.load(target)?;
                (opcodes::INVOKEVIRTUAL, self.names.owner(target)?)
            }
        };
        if call.params.len() != call.args.len() {
            return Err(Error::malformed_ir(
                &self.desc.method.name,
                format!("call to {} passes {} argument(s) for {} parameter(s)", call.method, call.args.len(), call.params.len()),
            ));
        }
        for arg in &call.args {
            self.load(arg)?;
        }
        let desc = self.names.method_descriptor(call.params.iter(), &call.ret)?;
        self.code.emit(format!("{} {}/{}{}", mnemonic, owner, call.method, desc));
        Ok(())
    }

    fn load(&mut self, op: &Operand) -> Result<()> {
        let instr = match op {
            Operand::Int(v) => load_int_constant(*v),
            Operand::Bool(b) => load_bool_constant(*b),
            Operand::Str(s) => opcodes::load_string_constant(s),
            Operand::Var(var) => load_var(self.desc.slot(var)?.slot, &var.ty),
            Operand::This(_) if !self.desc.method.is_static => load_var(0, &op.ty()),
            Operand::This(_) => {
                return Err(Error::malformed_ir(&self.desc.method.name, "'this' used in a static method"));
            }
            Operand::Class(name) => {
                return Err(Error::malformed_ir(
                    &self.desc.method.name,
                    format!("class {} used as a value", name),
                ));
            }
        };
        self.code.emit(instr);
        Ok(())
    }
}
