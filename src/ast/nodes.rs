use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a field, parameter, local or method result
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeName {
    pub name: String,
    #[serde(default)]
    pub is_array: bool,
}

impl TypeName {
    pub fn new(name: impl Into<String>, is_array: bool) -> Self {
        Self {
            name: name.into(),
            is_array,
        }
    }

    pub fn int() -> Self {
        Self::new("int", false)
    }

    pub fn int_array() -> Self {
        Self::new("int", true)
    }

    pub fn boolean() -> Self {
        Self::new("boolean", false)
    }

    pub fn void() -> Self {
        Self::new("void", false)
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, false)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_array {
            write!(f, "{}[]", self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// Binary operators of the source language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "||")]
    Or,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(self, BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }

    pub fn is_comparison(self) -> bool {
        matches!(self, BinOp::Lt | BinOp::Gt)
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Closed set of node kinds.
///
/// Values the parser attaches to a node (its name, operator, literal value or
/// declared type) are carried by the variant itself. Child order per kind:
///
/// - `Program`: import declarations, then the class declaration
/// - `ClassDeclaration`: fields, then methods
/// - `Method`: `ReturnType`, arguments, locals, statements
/// - `Main`: locals, statements
/// - `Conditional`: `Condition`, `IfStatement`, `ElseStatement`
/// - `While`: `Condition`, body statements
/// - `ArrayAssignment`: index, value
/// - `MethodInvocation`: target, arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum NodeKind {
    Program,
    ImportDeclaration {
        path: Vec<String>,
    },
    ClassDeclaration {
        name: String,
        #[serde(default)]
        extends: Option<String>,
    },
    ClassField {
        name: String,
        ty: TypeName,
    },
    Method {
        name: String,
        #[serde(default = "default_public")]
        is_public: bool,
    },
    Main {
        #[serde(default = "default_main_arg")]
        arg_name: String,
    },
    Argument {
        name: String,
        ty: TypeName,
    },
    VarDeclaration {
        name: String,
        ty: TypeName,
    },
    ReturnType {
        ty: TypeName,
    },

    // Statements
    CodeBlock,
    Conditional,
    IfStatement,
    ElseStatement,
    While,
    Condition,
    ExprStmt,
    Assignment {
        name: String,
    },
    ArrayAssignment {
        name: String,
    },
    ReturnStatement,

    // Expressions
    BinaryOp {
        op: BinOp,
    },
    Negation,
    ArrayAccess,
    ArrayLength,
    MethodInvocation {
        method: String,
    },
    ArrayInstantiation,
    CustomInstantiation {
        class: String,
    },
    Parenthesis,
    Integer {
        value: i32,
    },
    True,
    False,
    Identifier {
        name: String,
    },
    CurrentObject,
    /// String literal
    Literal {
        value: String,
    },
    /// Class name used in expression position, e.g. a static call target
    CustomType {
        name: String,
    },
}

fn default_public() -> bool {
    true
}

fn default_main_arg() -> String {
    "args".to_string()
}

impl NodeKind {
    pub fn kind_name(&self) -> &'static str {
        match self {
            NodeKind::Program => "Program",
            NodeKind::ImportDeclaration { .. } => "ImportDeclaration",
            NodeKind::ClassDeclaration { .. } => "ClassDeclaration",
            NodeKind::ClassField { .. } => "ClassField",
            NodeKind::Method { .. } => "Method",
            NodeKind::Main { .. } => "Main",
            NodeKind::Argument { .. } => "Argument",
            NodeKind::VarDeclaration { .. } => "VarDeclaration",
            NodeKind::ReturnType { .. } => "ReturnType",
            NodeKind::CodeBlock => "CodeBlock",
            NodeKind::Conditional => "Conditional",
            NodeKind::IfStatement => "IfStatement",
            NodeKind::ElseStatement => "ElseStatement",
            NodeKind::While => "While",
            NodeKind::Condition => "Condition",
            NodeKind::ExprStmt => "ExprStmt",
            NodeKind::Assignment { .. } => "Assignment",
            NodeKind::ArrayAssignment { .. } => "ArrayAssignment",
            NodeKind::ReturnStatement => "ReturnStatement",
            NodeKind::BinaryOp { .. } => "BinaryOp",
            NodeKind::Negation => "Negation",
            NodeKind::ArrayAccess => "ArrayAccess",
            NodeKind::ArrayLength => "ArrayLength",
            NodeKind::MethodInvocation { .. } => "MethodInvocation",
            NodeKind::ArrayInstantiation => "ArrayInstantiation",
            NodeKind::CustomInstantiation { .. } => "CustomInstantiation",
            NodeKind::Parenthesis => "Parenthesis",
            NodeKind::Integer { .. } => "Integer",
            NodeKind::True => "True",
            NodeKind::False => "False",
            NodeKind::Identifier { .. } => "Identifier",
            NodeKind::CurrentObject => "CurrentObject",
            NodeKind::Literal { .. } => "Literal",
            NodeKind::CustomType { .. } => "CustomType",
        }
    }

    /// Integer or boolean constant
    pub fn is_literal(&self) -> bool {
        matches!(self, NodeKind::Integer { .. } | NodeKind::True | NodeKind::False)
    }

    pub fn boolean(value: bool) -> Self {
        if value {
            NodeKind::True
        } else {
            NodeKind::False
        }
    }

    /// Method or entry method
    pub fn is_method(&self) -> bool {
        matches!(self, NodeKind::Method { .. } | NodeKind::Main { .. })
    }

    /// Nodes that only declare names and never execute
    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            NodeKind::ReturnType { .. } | NodeKind::Argument { .. } | NodeKind::VarDeclaration { .. }
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::ImportDeclaration { path } => write!(f, "ImportDeclaration {}", path.join(".")),
            NodeKind::ClassDeclaration { name, extends: Some(sup) } => {
                write!(f, "ClassDeclaration {} extends {}", name, sup)
            }
            NodeKind::ClassDeclaration { name, extends: None } => write!(f, "ClassDeclaration {}", name),
            NodeKind::ClassField { name, ty } => write!(f, "ClassField {} {}", ty, name),
            NodeKind::Method { name, is_public } => {
                if *is_public {
                    write!(f, "Method public {}", name)
                } else {
                    write!(f, "Method {}", name)
                }
            }
            NodeKind::Main { arg_name } => write!(f, "Main ({})", arg_name),
            NodeKind::Argument { name, ty } => write!(f, "Argument {} {}", ty, name),
            NodeKind::VarDeclaration { name, ty } => write!(f, "VarDeclaration {} {}", ty, name),
            NodeKind::ReturnType { ty } => write!(f, "ReturnType {}", ty),
            NodeKind::Assignment { name } => write!(f, "Assignment {}", name),
            NodeKind::ArrayAssignment { name } => write!(f, "ArrayAssignment {}", name),
            NodeKind::BinaryOp { op } => write!(f, "BinaryOp {}", op),
            NodeKind::MethodInvocation { method } => write!(f, "MethodInvocation .{}", method),
            NodeKind::CustomInstantiation { class } => write!(f, "CustomInstantiation {}", class),
            NodeKind::Integer { value } => write!(f, "Integer {}", value),
            NodeKind::Identifier { name } => write!(f, "Identifier {}", name),
            NodeKind::Literal { value } => write!(f, "Literal {:?}", value),
            NodeKind::CustomType { name } => write!(f, "CustomType {}", name),
            other => f.write_str(other.kind_name()),
        }
    }
}
