//! Attr phase - type checking
//!
//! A scope-aware, bottom-up type checker. Every expression yields its
//! inferred [`Type`], or `None` once a rule has been violated below it; the
//! violation has already been reported, so parents stay quiet and traversal
//! simply continues. Only structurally malformed trees abort with an error.

use super::symtab::{SymbolTable, VarScope};
use super::types::{Type, TypeOrigin};
use crate::ast::{Ast, BinOp, NodeId, NodeKind, TypeName};
use crate::common::consts::ENTRY_METHOD_NAME;
use crate::common::diagnostic::{Diagnostic, Stage};
use crate::common::error::Result;

/// Per-method attribution context
#[derive(Debug, Clone)]
struct MethodContext {
    name: String,
    is_static: bool,
    return_type: Type,
}

pub struct Attr<'a> {
    ast: &'a Ast,
    symtab: &'a SymbolTable,
    diagnostics: &'a mut Vec<Diagnostic>,
    method: Option<MethodContext>,
}

impl<'a> Attr<'a> {
    pub fn new(ast: &'a Ast, symtab: &'a SymbolTable, diagnostics: &'a mut Vec<Diagnostic>) -> Self {
        Self {
            ast,
            symtab,
            diagnostics,
            method: None,
        }
    }

    /// Type-check every method body of the class
    pub fn check(&mut self) -> Result<()> {
        let ast = self.ast;
        let class = ast.class_decl()?;
        for &member in ast.children(class) {
            if let NodeKind::ClassField { ty, .. } = ast.kind(member) {
                self.check_declared_type(member, ty);
            }
        }
        for &member in ast.children(class) {
            let name = match ast.kind(member) {
                NodeKind::Method { name, .. } => name.clone(),
                NodeKind::Main { .. } => ENTRY_METHOD_NAME.to_string(),
                _ => continue,
            };
            let Some(info) = self.symtab.method(&name) else {
                continue;
            };
            log::trace!("attr: checking method {}", name);
            self.method = Some(MethodContext {
                name,
                is_static: info.is_static,
                return_type: self.symtab.tag_origin(info.return_type.clone()),
            });
            for &stmt in ast.children(member) {
                self.visit_stmt(stmt)?;
            }
            self.method = None;
        }
        Ok(())
    }

    fn visit_stmt(&mut self, id: NodeId) -> Result<()> {
        let ast = self.ast;
        match ast.kind(id) {
            NodeKind::ReturnType { ty } | NodeKind::Argument { ty, .. } | NodeKind::VarDeclaration { ty, .. } => {
                self.check_declared_type(id, ty);
            }
            NodeKind::CodeBlock | NodeKind::IfStatement | NodeKind::ElseStatement => {
                for &child in ast.children(id) {
                    self.visit_stmt(child)?;
                }
            }
            NodeKind::Conditional => {
                self.visit_condition(ast.child(id, 0, "condition")?)?;
                self.visit_stmt(ast.child(id, 1, "then branch")?)?;
                if let Some(&else_branch) = ast.children(id).get(2) {
                    self.visit_stmt(else_branch)?;
                }
            }
            NodeKind::While => {
                self.visit_condition(ast.child(id, 0, "condition")?)?;
                for &child in &ast.children(id)[1..] {
                    self.visit_stmt(child)?;
                }
            }
            NodeKind::Condition => self.visit_condition(id)?,
            NodeKind::ExprStmt => {
                self.visit_expr(ast.child(id, 0, "expression")?)?;
            }
            NodeKind::Assignment { name } => {
                let value_node = ast.child(id, 0, "value")?;
                let value = self.visit_expr(value_node)?;
                let Some(target) = self.resolve_variable(id, name) else {
                    return Ok(());
                };
                if let Some(value) = value {
                    if !self.assignable(&target, &value, is_call(ast, value_node)) {
                        self.report(id, format!("incompatible types: cannot assign {} to '{}' of type {}", value, name, target));
                    }
                }
            }
            NodeKind::ArrayAssignment { name } => {
                let index = self.visit_expr(ast.child(id, 0, "index")?)?;
                let value = self.visit_expr(ast.child(id, 1, "value")?)?;
                if let Some(target) = self.resolve_variable(id, name) {
                    if !target.is_int_array() {
                        self.report(id, format!("'{}' of type {} is not an int array", name, target));
                    }
                }
                if let Some(index) = index {
                    if !index.is_int() {
                        self.report(id, format!("array index must be int, found {}", index));
                    }
                }
                if let Some(value) = value {
                    if !value.is_int() {
                        self.report(id, format!("array element must be int, found {}", value));
                    }
                }
            }
            NodeKind::ReturnStatement => self.visit_return(id)?,
            _ => {
                // Expression in statement position
                self.visit_expr(id)?;
            }
        }
        Ok(())
    }

    /// Declared types must be built in or name a class this unit can see
    fn check_declared_type(&mut self, id: NodeId, ty: &TypeName) {
        match (ty.name.as_str(), ty.is_array) {
            ("int" | "String", _) | ("boolean" | "void", false) => {}
            (name, false) if self.symtab.class_reference(name).is_some() => {}
            (name, false) => self.report(id, format!("cannot find class '{}'", name)),
            (name, true) => self.report(id, format!("arrays of {} are not supported", name)),
        }
    }

    fn visit_condition(&mut self, id: NodeId) -> Result<()> {
        let ast = self.ast;
        let expr = match ast.kind(id) {
            NodeKind::Condition => ast.child(id, 0, "guard expression")?,
            _ => id,
        };
        if let Some(ty) = self.visit_expr(expr)? {
            if !ty.is_boolean() {
                self.report(expr, format!("condition must be boolean, found {}", ty));
            }
        }
        Ok(())
    }

    fn visit_return(&mut self, id: NodeId) -> Result<()> {
        let ast = self.ast;
        let Some(ctx) = self.method.clone() else {
            return Ok(());
        };
        match ast.children(id).first() {
            Some(&value_node) => {
                let value = self.visit_expr(value_node)?;
                if ctx.return_type.is_void() {
                    self.report(id, format!("method '{}' returns void and cannot return a value", ctx.name));
                } else if let Some(value) = value {
                    if !self.assignable(&ctx.return_type, &value, is_call(ast, value_node)) {
                        self.report(id, format!("incompatible return type: expected {}, found {}", ctx.return_type, value));
                    }
                }
            }
            None if !ctx.return_type.is_void() => {
                self.report(id, format!("method '{}' must return a value of type {}", ctx.name, ctx.return_type));
            }
            None => {}
        }
        Ok(())
    }

    /// Infer the type of an expression node
    pub fn visit_expr(&mut self, id: NodeId) -> Result<Option<Type>> {
        let ast = self.ast;
        let ty = match ast.kind(id) {
            NodeKind::Integer { .. } => Some(Type::int()),
            NodeKind::True | NodeKind::False => Some(Type::boolean()),
            NodeKind::Literal { .. } => Some(Type::string()),
            NodeKind::Parenthesis => self.visit_expr(ast.child(id, 0, "inner expression")?)?,
            NodeKind::Identifier { name } => self.resolve_identifier(id, name),
            NodeKind::CustomType { name } => {
                let class = self.symtab.class_reference(name);
                if class.is_none() {
                    self.report(id, format!("cannot find class '{}'", name));
                }
                class
            }
            NodeKind::CurrentObject => {
                if self.in_static_method() {
                    self.report(id, "'this' cannot be used in a static method");
                    None
                } else {
                    Some(Type::this(self.symtab.class_name()))
                }
            }
            NodeKind::BinaryOp { op } => {
                let op = *op;
                let left = self.visit_expr(ast.child(id, 0, "left operand")?)?;
                let right = self.visit_expr(ast.child(id, 1, "right operand")?)?;
                self.check_binary(id, op, left, right)
            }
            NodeKind::Negation => match self.visit_expr(ast.child(id, 0, "operand")?)? {
                Some(ty) if ty.is_boolean() => Some(Type::boolean()),
                Some(ty) => {
                    self.report(id, format!("operator ! requires boolean, found {}", ty));
                    None
                }
                None => None,
            },
            NodeKind::ArrayAccess => {
                let base = self.visit_expr(ast.child(id, 0, "array")?)?;
                let index = self.visit_expr(ast.child(id, 1, "index")?)?;
                match (base, index) {
                    (Some(base), _) if !base.is_int_array() => {
                        self.report(id, format!("array access requires int[], found {}", base));
                        None
                    }
                    (_, Some(index)) if !index.is_int() => {
                        self.report(id, format!("array index must be int, found {}", index));
                        None
                    }
                    (Some(_), Some(_)) => Some(Type::int()),
                    _ => None,
                }
            }
            NodeKind::ArrayLength => match self.visit_expr(ast.child(id, 0, "array")?)? {
                Some(base) if base.is_array => Some(Type::int()),
                Some(base) => {
                    self.report(id, format!("length requires an array, found {}", base));
                    None
                }
                None => None,
            },
            NodeKind::ArrayInstantiation => match self.visit_expr(ast.child(id, 0, "length")?)? {
                Some(len) if len.is_int() => Some(Type::int_array()),
                Some(len) => {
                    self.report(id, format!("array size must be int, found {}", len));
                    None
                }
                None => None,
            },
            NodeKind::CustomInstantiation { class } => {
                let ty = self.symtab.class_reference(class);
                if ty.is_none() {
                    self.report(id, format!("cannot instantiate unknown class '{}'", class));
                }
                ty
            }
            NodeKind::MethodInvocation { method } => self.visit_invocation(id, method)?,
            other => {
                self.report(id, format!("{} is not an expression", other.kind_name()));
                None
            }
        };
        Ok(ty)
    }

    fn check_binary(&mut self, id: NodeId, op: BinOp, left: Option<Type>, right: Option<Type>) -> Option<Type> {
        let (left, right) = (left?, right?);
        let (operand_ok, result) = if op.is_arithmetic() {
            (left.is_int() && right.is_int(), Type::int())
        } else if op.is_logical() {
            (left.is_boolean() && right.is_boolean(), Type::boolean())
        } else {
            (left.is_int() && right.is_int(), Type::boolean())
        };
        if operand_ok {
            Some(result)
        } else {
            let expected = if op.is_logical() { "boolean" } else { "int" };
            self.report(
                id,
                format!("operator {} requires {} operands, found {} and {}", op, expected, left, right),
            );
            None
        }
    }

    fn visit_invocation(&mut self, id: NodeId, method: &str) -> Result<Option<Type>> {
        let ast = self.ast;
        let target_node = ast.child(id, 0, "invocation target")?;
        let target = self.visit_expr(target_node)?;
        let args = &ast.children(id)[1..];
        for &arg in args {
            self.visit_expr(arg)?;
        }
        let Some(target) = target else {
            return Ok(None);
        };

        let own_class = target.origin == TypeOrigin::This || (!target.is_array && target.name == self.symtab.class_name());
        if own_class {
            if let Some(info) = self.symtab.method(method) {
                if !info.is_static && self.names_own_class(target_node) {
                    self.report(
                        id,
                        format!("non-static method '{}' cannot be referenced from a static context", method),
                    );
                }
                if info.parameters.len() != args.len() {
                    self.report(
                        id,
                        format!("method '{}' expects {} argument(s), found {}", method, info.parameters.len(), args.len()),
                    );
                }
                return Ok(Some(info.return_type.clone().with_origin(TypeOrigin::Method)));
            }
            return Ok(match self.symtab.superclass() {
                // Inherited from a class we cannot see
                Some(sup) => Some(Type::new(sup, false, TypeOrigin::Extension)),
                None => {
                    self.report(
                        id,
                        format!("method '{}' is not declared in class '{}'", method, self.symtab.class_name()),
                    );
                    None
                }
            });
        }

        if target.is_array || matches!(target.name.as_str(), "int" | "boolean" | "void") {
            self.report(id, format!("cannot invoke '{}' on a value of type {}", method, target));
            return Ok(None);
        }
        Ok(Some(target))
    }

    /// The node is the bare own class name rather than a value of that type
    fn names_own_class(&self, id: NodeId) -> bool {
        let name = match self.ast.kind(id) {
            NodeKind::CustomType { name } => name,
            NodeKind::Identifier { name } => {
                let method = self.method.as_ref().map(|m| m.name.as_str()).unwrap_or_default();
                if self.symtab.resolve_variable(method, name).is_some() {
                    return false;
                }
                name
            }
            NodeKind::Parenthesis => {
                return self.ast.children(id).first().is_some_and(|&inner| self.names_own_class(inner));
            }
            _ => return false,
        };
        name == self.symtab.class_name()
    }

    fn resolve_identifier(&mut self, id: NodeId, name: &str) -> Option<Type> {
        if let Some(ty) = self.lookup_variable(id, name) {
            return Some(ty);
        }
        if let Some(class) = self.symtab.class_reference(name) {
            return Some(class);
        }
        self.report(id, format!("cannot find symbol '{}'", name));
        None
    }

    /// Resolve an assignment target or variable read, reporting when undeclared
    fn resolve_variable(&mut self, id: NodeId, name: &str) -> Option<Type> {
        let ty = self.lookup_variable(id, name);
        if ty.is_none() && !self.reported_static_field(name) {
            self.report(id, format!("cannot find variable '{}'", name));
        }
        ty
    }

    fn lookup_variable(&mut self, id: NodeId, name: &str) -> Option<Type> {
        let method = self.method.as_ref().map(|m| m.name.clone()).unwrap_or_default();
        let (scope, symbol) = self.symtab.resolve_variable(&method, name)?;
        if scope == VarScope::Field && self.in_static_method() {
            self.report(id, format!("non-static field '{}' cannot be referenced from a static context", name));
            return None;
        }
        Some(self.symtab.tag_origin(symbol.ty.clone()))
    }

    fn reported_static_field(&self, name: &str) -> bool {
        self.in_static_method() && self.symtab.field(name).is_some()
    }

    fn in_static_method(&self) -> bool {
        self.method.as_ref().is_some_and(|m| m.is_static)
    }

    /// Assignment compatibility of `value` into a location typed `target`
    fn assignable(&self, target: &Type, value: &Type, value_is_call: bool) -> bool {
        // The superclass' members are invisible, so assume compatibility
        if target.origin == TypeOrigin::Extension || value.origin == TypeOrigin::Extension {
            return true;
        }
        let class_name = self.symtab.class_name();
        if target.origin == TypeOrigin::Import {
            return value.origin == TypeOrigin::Import
                || (!value.is_array && self.symtab.is_import(&value.name));
        }
        if target.origin == TypeOrigin::This || (!target.is_array && target.name == class_name) {
            return value.origin == TypeOrigin::This || (!value.is_array && value.name == class_name);
        }
        if target.is_builtin() {
            return target == value || (value_is_call && value.origin == TypeOrigin::Import);
        }
        target == value
    }

    fn report(&mut self, node: NodeId, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::error(
            Stage::Semantic,
            self.ast.line(node),
            self.ast.column(node),
            message,
        ));
    }
}

fn is_call(ast: &Ast, id: NodeId) -> bool {
    match ast.kind(id) {
        NodeKind::MethodInvocation { .. } => true,
        NodeKind::Parenthesis => ast.children(id).first().is_some_and(|&c| is_call(ast, c)),
        _ => false,
    }
}
