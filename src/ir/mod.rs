//! Intermediate representation
//!
//! Per method, a flat sequence of typed instructions over literals, named
//! variables and generator-introduced temporaries. Control structure survives
//! only as labels, gotos and conditional branches. Temporaries are assigned
//! exactly once; user variables may be reassigned.

pub mod context;
pub mod gen;
mod printer;

pub use context::GenContext;
pub use gen::IrGenerator;

use crate::ast::BinOp;
use crate::common::config::Config;
use crate::common::error::{Error, Result};
use crate::wash::Type;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IrType {
    Int,
    Bool,
    IntArray,
    StringArray,
    String,
    Object(String),
    Void,
}

impl IrType {
    /// Map an analyzer type. Arrays exist only of `int` and `String`.
    pub fn from_type(ty: &Type) -> Result<IrType> {
        let mapped = match (ty.name.as_str(), ty.is_array) {
            ("int", false) => IrType::Int,
            ("int", true) => IrType::IntArray,
            ("boolean", false) => IrType::Bool,
            ("void", false) => IrType::Void,
            ("String", false) => IrType::String,
            ("String", true) => IrType::StringArray,
            (name, false) => IrType::Object(name.to_string()),
            _ => return Err(Error::unknown_type(ty.to_string())),
        };
        Ok(mapped)
    }

    /// Stored and loaded with the reference-family instructions
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            IrType::IntArray | IrType::StringArray | IrType::String | IrType::Object(_)
        )
    }
}

/// A named, typed storage location (variable, temporary, parameter or field)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Var {
    pub name: String,
    pub ty: IrType,
}

impl Var {
    pub fn new(name: impl Into<String>, ty: IrType) -> Self {
        Self { name: name.into(), ty }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Int(i32),
    Bool(bool),
    Str(String),
    Var(Var),
    /// The receiver; carries the class name for typing
    This(String),
    /// A class named as a static call target
    Class(String),
}

impl Operand {
    pub fn var(name: impl Into<String>, ty: IrType) -> Self {
        Operand::Var(Var::new(name, ty))
    }

    pub fn ty(&self) -> IrType {
        match self {
            Operand::Int(_) => IrType::Int,
            Operand::Bool(_) => IrType::Bool,
            Operand::Str(_) => IrType::String,
            Operand::Var(v) => v.ty.clone(),
            Operand::This(class) | Operand::Class(class) => IrType::Object(class.clone()),
        }
    }

    pub fn as_var(&self) -> Option<&Var> {
        match self {
            Operand::Var(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Operand::Int(_) | Operand::Bool(_) | Operand::Str(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Static,
    Virtual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub kind: CallKind,
    pub target: Operand,
    pub method: String,
    pub args: Vec<Operand>,
    /// Parameter types of the callee's signature, positionally matching `args`
    pub params: Vec<IrType>,
    pub ret: IrType,
}

/// Right-hand side of an assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rhs {
    Operand(Operand),
    Binary { op: BinOp, left: Operand, right: Operand },
    Not(Operand),
    Call(Call),
    GetField { object: Operand, field: Var },
    ArrayLength(Operand),
    ArrayLoad { array: Var, index: Operand },
    /// Allocation plus the no-argument constructor call
    NewObject(String),
    NewArray(Operand),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instr {
    Assign { dest: Var, rhs: Rhs },
    ArrayStore { array: Var, index: Operand, value: Operand },
    Call(Call),
    PutField { object: Operand, field: Var, value: Operand },
    Return(Option<Operand>),
    Goto(String),
    /// Jump to `label` when `cond` is true, or false when `negate` is set
    Branch { cond: Operand, negate: bool, label: String },
    Label(String),
    NoOp(Operand),
}

impl Instr {
    /// Control never falls through to the next instruction
    pub fn is_terminator(&self) -> bool {
        matches!(self, Instr::Return(_) | Instr::Goto(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrMethod {
    pub name: String,
    pub is_static: bool,
    pub params: Vec<Var>,
    pub locals: Vec<Var>,
    pub return_type: IrType,
    pub instructions: Vec<Instr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrClass {
    pub name: String,
    pub superclass: Option<String>,
    pub imports: Vec<String>,
    pub fields: Vec<Var>,
    pub methods: Vec<IrMethod>,
}

impl IrClass {
    pub fn method(&self, name: &str) -> Option<&IrMethod> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// Output of IR generation: the program, its text and the pass-through config
#[derive(Debug, Clone)]
pub struct IrResult {
    pub class: IrClass,
    pub text: String,
    pub config: Config,
}
