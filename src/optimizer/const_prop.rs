//! Constant propagation over the AST
//!
//! A single top-down pass per method that remembers the last literal assigned
//! to each local variable or parameter and replaces later reads of that name
//! with a copy of the literal. Fields are never tracked: any call may change
//! them. Control flow is handled conservatively; see [`loop_prop`](super::loop_prop)
//! for loops.

use super::eval::{ConstEnv, Value};
use crate::ast::{Ast, NodeId, NodeKind};
use crate::common::consts::ENTRY_METHOD_NAME;
use crate::common::error::Result;
use crate::wash::{SymbolTable, VarScope};

pub struct ConstPropagator<'a> {
    pub(super) symtab: &'a SymbolTable,
    pub(super) method: String,
    pub(super) env: ConstEnv,
    pub(super) substitutions: usize,
}

impl<'a> ConstPropagator<'a> {
    pub fn new(symtab: &'a SymbolTable) -> Self {
        Self {
            symtab,
            method: String::new(),
            env: ConstEnv::new(),
            substitutions: 0,
        }
    }

    /// Propagate through every method of the class, returning the number of substitutions
    pub fn propagate(&mut self, ast: &mut Ast) -> Result<usize> {
        self.substitutions = 0;
        let class = ast.class_decl()?;
        for member in ast.children(class).to_vec() {
            let name = match ast.kind(member) {
                NodeKind::Method { name, .. } => name.clone(),
                NodeKind::Main { .. } => ENTRY_METHOD_NAME.to_string(),
                _ => continue,
            };
            // Counters and constants never leak across methods
            self.method = name;
            self.env.clear();
            let body = ast.children(member).to_vec();
            self.visit_stmts(ast, &body)?;
        }
        if self.substitutions > 0 {
            log::debug!("const prop: {} substitution(s)", self.substitutions);
        }
        Ok(self.substitutions)
    }

    pub(super) fn visit_stmts(&mut self, ast: &mut Ast, stmts: &[NodeId]) -> Result<()> {
        for &stmt in stmts {
            self.visit_stmt(ast, stmt)?;
        }
        Ok(())
    }

    pub(super) fn visit_stmt(&mut self, ast: &mut Ast, id: NodeId) -> Result<()> {
        match ast.kind(id).clone() {
            NodeKind::ReturnType { .. } | NodeKind::Argument { .. } | NodeKind::VarDeclaration { .. } => {}
            NodeKind::CodeBlock | NodeKind::IfStatement | NodeKind::ElseStatement => {
                let stmts = ast.children(id).to_vec();
                self.visit_stmts(ast, &stmts)?;
            }
            NodeKind::Assignment { name } => {
                let value = ast.child(id, 0, "value")?;
                if !ast.kind(value).is_literal() {
                    self.visit_expr(ast, value)?;
                }
                // The value slot may now hold a substituted literal
                let value = ast.child(id, 0, "value")?;
                match Value::from_kind(ast.kind(value)) {
                    Some(v) if self.is_trackable(&name) => {
                        self.env.insert(name, v);
                    }
                    _ => {
                        self.env.remove(&name);
                    }
                }
            }
            NodeKind::Conditional => self.visit_conditional(ast, id)?,
            NodeKind::While => self.visit_while(ast, id)?,
            NodeKind::Condition => {
                let expr = ast.child(id, 0, "guard expression")?;
                self.visit_expr(ast, expr)?;
            }
            NodeKind::ArrayAssignment { .. } | NodeKind::ExprStmt | NodeKind::ReturnStatement => {
                for child in ast.children(id).to_vec() {
                    self.visit_expr(ast, child)?;
                }
            }
            _ => self.visit_expr(ast, id)?,
        }
        Ok(())
    }

    fn visit_conditional(&mut self, ast: &mut Ast, id: NodeId) -> Result<()> {
        let condition = ast.child(id, 0, "condition")?;
        self.visit_stmt(ast, condition)?;

        let incoming = self.env.clone();
        let then_branch = ast.child(id, 1, "then branch")?;
        self.visit_stmt(ast, then_branch)?;
        let after_then = std::mem::replace(&mut self.env, incoming);
        if let Some(&else_branch) = ast.children(id).get(2) {
            self.visit_stmt(ast, else_branch)?;
        }
        // Keep only what both arms agree on
        self.env.retain(|name, value| after_then.get(name) == Some(value));
        Ok(())
    }

    /// Substitute known constants inside an expression
    pub(super) fn visit_expr(&mut self, ast: &mut Ast, id: NodeId) -> Result<()> {
        match ast.kind(id) {
            NodeKind::Identifier { name } => {
                if let Some(value) = self.env.get(name).copied() {
                    if ast.parent(id).is_some() {
                        let literal = ast.add_node(value.to_kind(), ast.span(id));
                        ast.replace_node(id, literal)?;
                        self.substitutions += 1;
                    }
                }
            }
            NodeKind::BinaryOp { .. }
            | NodeKind::Negation
            | NodeKind::Parenthesis
            | NodeKind::ArrayAccess
            | NodeKind::ArrayLength
            | NodeKind::ArrayInstantiation
            | NodeKind::MethodInvocation { .. } => {
                for child in ast.children(id).to_vec() {
                    self.visit_expr(ast, child)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Locals and parameters of the current method
    pub(super) fn is_trackable(&self, name: &str) -> bool {
        matches!(
            self.symtab.resolve_variable(&self.method, name),
            Some((VarScope::Local | VarScope::Parameter, _))
        )
    }
}
