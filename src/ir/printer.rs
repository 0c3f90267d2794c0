//! Textual form of the IR
//!
//! Every value carries its type as a suffix (`a.i32`, `flag.bool`,
//! `xs.array.i32`) and assignments carry the destination type (`:=.i32`).

use super::{Call, CallKind, Instr, IrClass, IrMethod, IrType, Operand, Rhs, Var};
use std::fmt;

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::Int => write!(f, ".i32"),
            IrType::Bool => write!(f, ".bool"),
            IrType::IntArray => write!(f, ".array.i32"),
            IrType::StringArray => write!(f, ".array.String"),
            IrType::String => write!(f, ".String"),
            IrType::Object(name) => write!(f, ".{}", name),
            IrType::Void => write!(f, ".V"),
        }
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.ty)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Int(v) => write!(f, "{}.i32", v),
            Operand::Bool(b) => write!(f, "{}.bool", u8::from(*b)),
            Operand::Str(s) => write!(f, "{:?}.String", s),
            Operand::Var(v) => write!(f, "{}", v),
            Operand::This(_) => write!(f, "this"),
            Operand::Class(name) => write!(f, "{}", name),
        }
    }
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallKind::Static => write!(f, "invokestatic"),
            CallKind::Virtual => write!(f, "invokevirtual"),
        }
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, {:?}", self.kind, self.target, self.method)?;
        for arg in &self.args {
            write!(f, ", {}", arg)?;
        }
        write!(f, "){}", self.ret)
    }
}

impl fmt::Display for Rhs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rhs::Operand(op) => write!(f, "{}", op),
            Rhs::Binary { op, left, right } => {
                let result = if op.is_arithmetic() { IrType::Int } else { IrType::Bool };
                write!(f, "{} {}{} {}", left, op, result, right)
            }
            Rhs::Not(op) => write!(f, "!.bool {}", op),
            Rhs::Call(call) => write!(f, "{}", call),
            Rhs::GetField { object, field } => write!(f, "getfield({}, {}){}", object, field, field.ty),
            Rhs::ArrayLength(op) => write!(f, "arraylength({}).i32", op),
            Rhs::ArrayLoad { array, index } => write!(f, "{}[{}].i32", array.name, index),
            Rhs::NewObject(class) => write!(f, "new({}).{}", class, class),
            Rhs::NewArray(len) => write!(f, "new(array, {}).array.i32", len),
        }
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::Assign { dest, rhs } => write!(f, "{} :={} {};", dest, dest.ty, rhs),
            Instr::ArrayStore { array, index, value } => {
                write!(f, "{}[{}].i32 :=.i32 {};", array.name, index, value)
            }
            Instr::Call(call) => write!(f, "{};", call),
            Instr::PutField { object, field, value } => {
                write!(f, "putfield({}, {}, {}).V;", object, field, value)
            }
            Instr::Return(Some(value)) => write!(f, "ret{} {};", value.ty(), value),
            Instr::Return(None) => write!(f, "ret.V;"),
            Instr::Goto(label) => write!(f, "goto {};", label),
            Instr::Branch { cond, negate: false, label } => write!(f, "if ({}) goto {};", cond, label),
            Instr::Branch { cond, negate: true, label } => write!(f, "if (!.bool {}) goto {};", cond, label),
            Instr::Label(label) => write!(f, "{}:", label),
            Instr::NoOp(op) => write!(f, "{};", op),
        }
    }
}

impl fmt::Display for IrMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(Var::to_string).collect();
        let modifiers = if self.is_static { "public static" } else { "public" };
        writeln!(f, ".method {} {}({}){} {{", modifiers, self.name, params.join(", "), self.return_type)?;
        for instr in &self.instructions {
            match instr {
                Instr::Label(_) => writeln!(f, "  {}", instr)?,
                _ => writeln!(f, "    {}", instr)?,
            }
        }
        writeln!(f, "}}")
    }
}

impl fmt::Display for IrClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for import in &self.imports {
            writeln!(f, "import {};", import)?;
        }
        if !self.imports.is_empty() {
            writeln!(f)?;
        }
        match self.superclass {
            Some(ref sup) => writeln!(f, "{} extends {} {{", self.name, sup)?,
            None => writeln!(f, "{} {{", self.name)?,
        }
        for field in &self.fields {
            writeln!(f, ".field private {};", field)?;
        }
        writeln!(f)?;
        writeln!(f, ".construct {}().V {{", self.name)?;
        writeln!(f, "    invokespecial(this, \"<init>\").V;")?;
        writeln!(f, "}}")?;
        for method in &self.methods {
            writeln!(f)?;
            write!(f, "{}", method)?;
        }
        writeln!(f, "}}")
    }
}
