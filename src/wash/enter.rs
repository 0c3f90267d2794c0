//! Enter phase - symbol table construction
//!
//! Pure structural extraction from the class-level tree: imports, superclass,
//! fields and method signatures. No type resolution happens here. Duplicate
//! declarations are reported as diagnostics and the first declaration wins.

use super::symtab::{MethodInfo, Symbol, SymbolTable};
use super::types::Type;
use crate::ast::{Ast, NodeId, NodeKind, TypeName};
use crate::common::consts::ENTRY_METHOD_NAME;
use crate::common::diagnostic::{Diagnostic, Stage};
use crate::common::error::{Error, Result};

pub struct Enter<'a> {
    ast: &'a Ast,
    diagnostics: &'a mut Vec<Diagnostic>,
}

impl<'a> Enter<'a> {
    pub fn new(ast: &'a Ast, diagnostics: &'a mut Vec<Diagnostic>) -> Self {
        Self { ast, diagnostics }
    }

    /// Build the table for the whole compilation unit
    pub fn build(mut self) -> Result<SymbolTable> {
        let ast = self.ast;
        let mut table = SymbolTable::default();
        let root = ast.root();

        if matches!(ast.kind(root), NodeKind::Program) {
            for &child in ast.children(root) {
                if let NodeKind::ImportDeclaration { path } = ast.kind(child) {
                    table.imports.push(path.join("."));
                }
            }
        }

        let class = ast.class_decl()?;
        let NodeKind::ClassDeclaration { name, extends } = ast.kind(class) else {
            return Err(Error::malformed(class.0, "expected a class declaration"));
        };
        table.class_name = name.clone();
        table.superclass = extends.clone();

        for &member in ast.children(class) {
            match ast.kind(member) {
                NodeKind::ClassField { name, ty } => {
                    if table.field(name).is_some() {
                        self.report(member, format!("field '{}' is already defined", name));
                        continue;
                    }
                    table.fields.push(Symbol::new(name.clone(), Type::from_declared(ty)));
                }
                NodeKind::Method { .. } | NodeKind::Main { .. } => {
                    let info = self.method_info(member)?;
                    if table.methods.contains_key(&info.name) {
                        self.report(member, format!("method '{}' is already defined in class '{}'", info.name, table.class_name));
                        continue;
                    }
                    table.method_order.push(info.name.clone());
                    table.methods.insert(info.name.clone(), info);
                }
                other => {
                    return Err(Error::malformed(
                        member.0,
                        format!("unexpected {} in class body", other.kind_name()),
                    ))
                }
            }
        }

        log::debug!(
            "enter: class={} imports={} fields={} methods={}",
            table.class_name,
            table.imports.len(),
            table.fields.len(),
            table.method_order.len()
        );
        Ok(table)
    }

    fn method_info(&mut self, method: NodeId) -> Result<MethodInfo> {
        let ast = self.ast;
        let (name, return_type, is_static, mut parameters) = match ast.kind(method) {
            NodeKind::Main { arg_name } => (
                ENTRY_METHOD_NAME.to_string(),
                Type::void(),
                true,
                vec![Symbol::new(arg_name.clone(), Type::string_array())],
            ),
            NodeKind::Method { name, .. } => {
                let ret = ast
                    .find_child(method, |k| matches!(k, NodeKind::ReturnType { .. }))
                    .ok_or_else(|| Error::malformed(method.0, format!("method '{}' has no return type", name)))?;
                let NodeKind::ReturnType { ty } = ast.kind(ret) else {
                    unreachable!("find_child matched a ReturnType");
                };
                (name.clone(), Type::from_declared(ty), false, Vec::new())
            }
            other => {
                return Err(Error::malformed(method.0, format!("{} is not a method", other.kind_name())))
            }
        };

        let mut locals: Vec<Symbol> = Vec::new();
        for &child in ast.children(method) {
            match ast.kind(child) {
                NodeKind::Argument { name: arg, ty } => {
                    if parameters.iter().any(|p| &p.name == arg) {
                        self.report(child, format!("duplicate parameter '{}' in method '{}'", arg, name));
                        continue;
                    }
                    parameters.push(declared(arg, ty));
                }
                NodeKind::VarDeclaration { name: var, ty } => {
                    if locals.iter().any(|l| &l.name == var) {
                        self.report(child, format!("variable '{}' is already defined in method '{}'", var, name));
                        continue;
                    }
                    if parameters.iter().any(|p| &p.name == var) {
                        self.report(child, format!("variable '{}' is already defined as a parameter of '{}'", var, name));
                        continue;
                    }
                    locals.push(declared(var, ty));
                }
                _ => {}
            }
        }

        Ok(MethodInfo {
            name,
            return_type,
            parameters,
            locals,
            is_static,
        })
    }

    fn report(&mut self, node: NodeId, message: String) {
        self.diagnostics.push(Diagnostic::error(
            Stage::Semantic,
            self.ast.line(node),
            self.ast.column(node),
            message,
        ));
    }
}

fn declared(name: &str, ty: &TypeName) -> Symbol {
    Symbol::new(name.to_string(), Type::from_declared(ty))
}
