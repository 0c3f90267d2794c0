//! Static evaluation of literal-only expressions
//!
//! Arithmetic follows the target machine: 32-bit two's complement with
//! wrapping overflow and truncating division. Division by zero has no static
//! value.

use crate::ast::{Ast, BinOp, NodeId, NodeKind};
use std::collections::HashMap;

/// Variable name to known constant
pub type ConstEnv = HashMap<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Int(i32),
    Bool(bool),
}

impl Value {
    /// The constant held by a literal node
    pub fn from_kind(kind: &NodeKind) -> Option<Value> {
        match kind {
            NodeKind::Integer { value } => Some(Value::Int(*value)),
            NodeKind::True => Some(Value::Bool(true)),
            NodeKind::False => Some(Value::Bool(false)),
            _ => None,
        }
    }

    pub fn to_kind(self) -> NodeKind {
        match self {
            Value::Int(value) => NodeKind::Integer { value },
            Value::Bool(value) => NodeKind::boolean(value),
        }
    }
}

pub fn apply_binary(op: BinOp, left: Value, right: Value) -> Option<Value> {
    use Value::{Bool, Int};
    let value = match (op, left, right) {
        (BinOp::Add, Int(a), Int(b)) => Int(a.wrapping_add(b)),
        (BinOp::Sub, Int(a), Int(b)) => Int(a.wrapping_sub(b)),
        (BinOp::Mul, Int(a), Int(b)) => Int(a.wrapping_mul(b)),
        (BinOp::Div, Int(_), Int(0)) => return None,
        (BinOp::Div, Int(a), Int(b)) => Int(a.wrapping_div(b)),
        (BinOp::And, Bool(a), Bool(b)) => Bool(a && b),
        (BinOp::Or, Bool(a), Bool(b)) => Bool(a || b),
        (BinOp::Lt, Int(a), Int(b)) => Bool(a < b),
        (BinOp::Gt, Int(a), Int(b)) => Bool(a > b),
        _ => return None,
    };
    Some(value)
}

/// Value of an expression under `env`, if it is statically known
pub fn eval_expr(ast: &Ast, id: NodeId, env: &ConstEnv) -> Option<Value> {
    match ast.kind(id) {
        NodeKind::Integer { .. } | NodeKind::True | NodeKind::False => Value::from_kind(ast.kind(id)),
        NodeKind::Identifier { name } => env.get(name).copied(),
        NodeKind::Parenthesis => eval_expr(ast, *ast.children(id).first()?, env),
        NodeKind::Negation => match eval_expr(ast, *ast.children(id).first()?, env)? {
            Value::Bool(b) => Some(Value::Bool(!b)),
            Value::Int(_) => None,
        },
        NodeKind::BinaryOp { op } => {
            let children = ast.children(id);
            let left = eval_expr(ast, *children.first()?, env)?;
            let right = eval_expr(ast, *children.get(1)?, env)?;
            apply_binary(*op, left, right)
        }
        _ => None,
    }
}
