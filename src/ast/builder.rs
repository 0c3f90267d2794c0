//! Construction helpers for ASTs
//!
//! [`NodeSpec`] is an owned, nested description of a subtree. It is what the
//! external parser serializes (see [`Ast::from_json`]) and what tests build by
//! hand with the free functions below; [`Ast::from_spec`] flattens it into the
//! arena.

use super::{Ast, BinOp, NodeId, NodeKind, Span, TypeName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,
    #[serde(default)]
    pub line: usize,
    #[serde(default)]
    pub col: usize,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
}

impl NodeSpec {
    pub fn new(kind: NodeKind, children: Vec<NodeSpec>) -> Self {
        Self {
            kind,
            children,
            line: 0,
            col: 0,
            attrs: BTreeMap::new(),
        }
    }

    pub fn leaf(kind: NodeKind) -> Self {
        Self::new(kind, Vec::new())
    }

    /// Attach a source position
    pub fn at(mut self, line: usize, col: usize) -> Self {
        self.line = line;
        self.col = col;
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }
}

impl Ast {
    /// Flatten a nested description into a fresh arena
    pub fn from_spec(spec: &NodeSpec) -> Ast {
        let mut ast = Ast::new(spec.kind.clone(), Span::point(spec.line, spec.col));
        let root = ast.root();
        ast.node_mut(root).attrs = spec.attrs.clone();
        for child in &spec.children {
            ast.add_spec(root, child);
        }
        ast
    }

    /// Rebuild the nested description of a subtree
    pub fn to_spec(&self, id: NodeId) -> NodeSpec {
        let node = self.node(id);
        NodeSpec {
            kind: node.kind.clone(),
            children: node.children.iter().map(|&c| self.to_spec(c)).collect(),
            line: node.span.start.line,
            col: node.span.start.column,
            attrs: node.attrs.clone(),
        }
    }

    /// Add a described subtree as the last child of `parent`
    pub fn add_spec(&mut self, parent: NodeId, spec: &NodeSpec) -> NodeId {
        let id = self.add_node(spec.kind.clone(), Span::point(spec.line, spec.col));
        self.node_mut(id).attrs = spec.attrs.clone();
        self.node_mut(id).parent = Some(parent);
        self.node_mut(parent).children.push(id);
        for child in &spec.children {
            self.add_spec(id, child);
        }
        id
    }
}

// Declarations

pub fn program(imports: Vec<NodeSpec>, class: NodeSpec) -> NodeSpec {
    let mut children = imports;
    children.push(class);
    NodeSpec::new(NodeKind::Program, children)
}

pub fn import(path: &str) -> NodeSpec {
    NodeSpec::leaf(NodeKind::ImportDeclaration {
        path: path.split('.').map(str::to_string).collect(),
    })
}

pub fn class(name: &str, extends: Option<&str>, members: Vec<NodeSpec>) -> NodeSpec {
    NodeSpec::new(
        NodeKind::ClassDeclaration {
            name: name.to_string(),
            extends: extends.map(str::to_string),
        },
        members,
    )
}

pub fn field(ty: TypeName, name: &str) -> NodeSpec {
    NodeSpec::leaf(NodeKind::ClassField {
        name: name.to_string(),
        ty,
    })
}

/// A public method. `body` holds locals followed by statements.
pub fn method(ret: TypeName, name: &str, args: Vec<NodeSpec>, body: Vec<NodeSpec>) -> NodeSpec {
    let mut children = vec![NodeSpec::leaf(NodeKind::ReturnType { ty: ret })];
    children.extend(args);
    children.extend(body);
    NodeSpec::new(
        NodeKind::Method {
            name: name.to_string(),
            is_public: true,
        },
        children,
    )
}

pub fn main_method(body: Vec<NodeSpec>) -> NodeSpec {
    NodeSpec::new(
        NodeKind::Main {
            arg_name: "args".to_string(),
        },
        body,
    )
}

pub fn arg(ty: TypeName, name: &str) -> NodeSpec {
    NodeSpec::leaf(NodeKind::Argument {
        name: name.to_string(),
        ty,
    })
}

pub fn var(ty: TypeName, name: &str) -> NodeSpec {
    NodeSpec::leaf(NodeKind::VarDeclaration {
        name: name.to_string(),
        ty,
    })
}

// Statements

pub fn block(stmts: Vec<NodeSpec>) -> NodeSpec {
    NodeSpec::new(NodeKind::CodeBlock, stmts)
}

pub fn if_else(cond: NodeSpec, then_stmts: Vec<NodeSpec>, else_stmts: Vec<NodeSpec>) -> NodeSpec {
    NodeSpec::new(
        NodeKind::Conditional,
        vec![
            NodeSpec::new(NodeKind::Condition, vec![cond]),
            NodeSpec::new(NodeKind::IfStatement, then_stmts),
            NodeSpec::new(NodeKind::ElseStatement, else_stmts),
        ],
    )
}

pub fn while_loop(cond: NodeSpec, body: Vec<NodeSpec>) -> NodeSpec {
    let mut children = vec![NodeSpec::new(NodeKind::Condition, vec![cond])];
    children.extend(body);
    NodeSpec::new(NodeKind::While, children)
}

pub fn expr_stmt(expr: NodeSpec) -> NodeSpec {
    NodeSpec::new(NodeKind::ExprStmt, vec![expr])
}

pub fn assign(name: &str, value: NodeSpec) -> NodeSpec {
    NodeSpec::new(NodeKind::Assignment { name: name.to_string() }, vec![value])
}

pub fn array_assign(name: &str, index: NodeSpec, value: NodeSpec) -> NodeSpec {
    NodeSpec::new(NodeKind::ArrayAssignment { name: name.to_string() }, vec![index, value])
}

pub fn ret(value: NodeSpec) -> NodeSpec {
    NodeSpec::new(NodeKind::ReturnStatement, vec![value])
}

pub fn ret_void() -> NodeSpec {
    NodeSpec::leaf(NodeKind::ReturnStatement)
}

// Expressions

pub fn int(value: i32) -> NodeSpec {
    NodeSpec::leaf(NodeKind::Integer { value })
}

pub fn boolean(value: bool) -> NodeSpec {
    NodeSpec::leaf(NodeKind::boolean(value))
}

pub fn string(value: &str) -> NodeSpec {
    NodeSpec::leaf(NodeKind::Literal {
        value: value.to_string(),
    })
}

pub fn ident(name: &str) -> NodeSpec {
    NodeSpec::leaf(NodeKind::Identifier { name: name.to_string() })
}

pub fn this() -> NodeSpec {
    NodeSpec::leaf(NodeKind::CurrentObject)
}

pub fn class_ref(name: &str) -> NodeSpec {
    NodeSpec::leaf(NodeKind::CustomType { name: name.to_string() })
}

pub fn binary(op: BinOp, left: NodeSpec, right: NodeSpec) -> NodeSpec {
    NodeSpec::new(NodeKind::BinaryOp { op }, vec![left, right])
}

pub fn not(operand: NodeSpec) -> NodeSpec {
    NodeSpec::new(NodeKind::Negation, vec![operand])
}

pub fn paren(inner: NodeSpec) -> NodeSpec {
    NodeSpec::new(NodeKind::Parenthesis, vec![inner])
}

pub fn index(array: NodeSpec, idx: NodeSpec) -> NodeSpec {
    NodeSpec::new(NodeKind::ArrayAccess, vec![array, idx])
}

pub fn length(array: NodeSpec) -> NodeSpec {
    NodeSpec::new(NodeKind::ArrayLength, vec![array])
}

pub fn call(target: NodeSpec, method: &str, args: Vec<NodeSpec>) -> NodeSpec {
    let mut children = vec![target];
    children.extend(args);
    NodeSpec::new(
        NodeKind::MethodInvocation {
            method: method.to_string(),
        },
        children,
    )
}

pub fn new_array(len: NodeSpec) -> NodeSpec {
    NodeSpec::new(NodeKind::ArrayInstantiation, vec![len])
}

pub fn new_object(class: &str) -> NodeSpec {
    NodeSpec::leaf(NodeKind::CustomInstantiation {
        class: class.to_string(),
    })
}
