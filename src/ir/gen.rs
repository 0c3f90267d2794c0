//! AST to IR lowering
//!
//! Every expression lowers to a [`Lowered`] pair: the instructions that must
//! run first, and the operand holding the value afterwards. Composite
//! expressions concatenate their children's code left to right before adding
//! their own instruction, which always targets a fresh temporary.
//!
//! The tree is expected to have passed semantic analysis. Anything the
//! generator cannot give a meaning to is a [`MalformedAst`](crate::Error::MalformedAst)
//! error, never silently skipped code.

use super::context::GenContext;
use super::{Call, CallKind, Instr, IrClass, IrMethod, IrType, Operand, Rhs, Var};
use crate::ast::{Ast, NodeId, NodeKind};
use crate::common::consts::ENTRY_METHOD_NAME;
use crate::common::error::{Error, Result};
use crate::wash::{MethodInfo, SymbolTable, VarScope};
use std::collections::HashSet;

/// Code to run, then the operand that holds the result
#[derive(Debug, Clone)]
pub struct Lowered {
    pub code: Vec<Instr>,
    pub value: Operand,
}

impl Lowered {
    fn operand(value: Operand) -> Self {
        Self { code: Vec::new(), value }
    }
}

pub struct IrGenerator<'a> {
    ast: &'a Ast,
    symtab: &'a SymbolTable,
}

impl<'a> IrGenerator<'a> {
    pub fn new(ast: &'a Ast, symtab: &'a SymbolTable) -> Self {
        Self { ast, symtab }
    }

    pub fn generate(&self) -> Result<IrClass> {
        let ast = self.ast;
        let class = ast.class_decl()?;
        let fields = self
            .symtab
            .fields()
            .iter()
            .map(|f| Ok(Var::new(f.name.clone(), IrType::from_type(&f.ty)?)))
            .collect::<Result<Vec<_>>>()?;

        let mut methods = Vec::new();
        for &member in ast.children(class) {
            let name = match ast.kind(member) {
                NodeKind::Method { name, .. } => name.as_str(),
                NodeKind::Main { .. } => ENTRY_METHOD_NAME,
                _ => continue,
            };
            let info = self
                .symtab
                .method(name)
                .ok_or_else(|| Error::malformed(member.0, format!("method '{}' is missing from the symbol table", name)))?;
            methods.push(MethodLowering::new(ast, self.symtab, info).lower(member)?);
        }

        Ok(IrClass {
            name: self.symtab.class_name().to_string(),
            superclass: self.symtab.superclass().map(str::to_string),
            imports: self.symtab.imports().to_vec(),
            fields,
            methods,
        })
    }
}

/// Lowering state for one method body
struct MethodLowering<'a> {
    ast: &'a Ast,
    symtab: &'a SymbolTable,
    info: &'a MethodInfo,
    ctx: GenContext,
    temps: HashSet<String>,
}

impl<'a> MethodLowering<'a> {
    fn new(ast: &'a Ast, symtab: &'a SymbolTable, info: &'a MethodInfo) -> Self {
        let reserved = info
            .parameters
            .iter()
            .chain(info.locals.iter())
            .chain(symtab.fields().iter())
            .map(|s| s.name.clone());
        Self {
            ast,
            symtab,
            info,
            ctx: GenContext::new(reserved),
            temps: HashSet::new(),
        }
    }

    fn lower(mut self, method: NodeId) -> Result<IrMethod> {
        let ast = self.ast;
        let mut instructions = Vec::new();
        for &stmt in ast.children(method) {
            instructions.extend(self.lower_stmt(stmt)?);
        }

        let return_type = IrType::from_type(&self.info.return_type)?;
        if return_type == IrType::Void && !matches!(instructions.last(), Some(Instr::Return(_))) {
            instructions.push(Instr::Return(None));
        }
        log::debug!(
            "ir: method {} lowered to {} instruction(s), {} temporaries",
            self.info.name,
            instructions.len(),
            self.ctx.temps_issued()
        );

        Ok(IrMethod {
            name: self.info.name.clone(),
            is_static: self.info.is_static,
            params: to_vars(&self.info.parameters)?,
            locals: to_vars(&self.info.locals)?,
            return_type,
            instructions,
        })
    }

    fn lower_stmt(&mut self, id: NodeId) -> Result<Vec<Instr>> {
        let ast = self.ast;
        let mut code = Vec::new();
        match ast.kind(id) {
            NodeKind::ReturnType { .. } | NodeKind::Argument { .. } | NodeKind::VarDeclaration { .. } => {}
            NodeKind::CodeBlock | NodeKind::IfStatement | NodeKind::ElseStatement => {
                for &child in ast.children(id) {
                    code.extend(self.lower_stmt(child)?);
                }
            }
            NodeKind::Conditional => {
                let label = self.ctx.fresh_label_id();
                let (else_label, end_label) = (format!("Else_{}", label), format!("EndIf_{}", label));
                let cond = self.lower_condition(ast.child(id, 0, "condition")?)?;
                code.extend(cond.code);
                code.push(Instr::Branch { cond: cond.value, negate: true, label: else_label.clone() });
                code.extend(self.lower_stmt(ast.child(id, 1, "then branch")?)?);
                code.push(Instr::Goto(end_label.clone()));
                code.push(Instr::Label(else_label));
                if let Some(&else_branch) = ast.children(id).get(2) {
                    code.extend(self.lower_stmt(else_branch)?);
                }
                code.push(Instr::Label(end_label));
            }
            NodeKind::While => {
                let label = self.ctx.fresh_label_id();
                let (top, end) = (format!("Loop_{}", label), format!("EndLoop_{}", label));
                let guard = ast.child(id, 0, "condition")?;

                let entry = self.lower_condition(guard)?;
                code.extend(entry.code);
                code.push(Instr::Branch { cond: entry.value, negate: true, label: end.clone() });
                code.push(Instr::Label(top.clone()));
                for &child in &ast.children(id)[1..] {
                    code.extend(self.lower_stmt(child)?);
                }
                // Re-test with fresh temporaries so each one is still assigned once
                let again = self.lower_condition(guard)?;
                code.extend(again.code);
                code.push(Instr::Branch { cond: again.value, negate: false, label: top });
                code.push(Instr::Label(end));
            }
            NodeKind::ExprStmt => code.extend(self.lower_expr_stmt(ast.child(id, 0, "expression")?)?),
            NodeKind::Assignment { name } => code.extend(self.lower_assignment(id, name)?),
            NodeKind::ArrayAssignment { name } => {
                let (scope, array) = self.variable(id, name)?;
                let array = match scope {
                    VarScope::Field => {
                        let temp = self.temp(array.ty.clone());
                        code.push(Instr::Assign {
                            dest: temp.clone(),
                            rhs: Rhs::GetField { object: self.this(), field: array },
                        });
                        temp
                    }
                    _ => array,
                };
                let index = self.lower_expr(ast.child(id, 0, "index")?, Some(&IrType::Int))?;
                let value = self.lower_expr(ast.child(id, 1, "value")?, Some(&IrType::Int))?;
                code.extend(index.code);
                code.extend(value.code);
                code.push(Instr::ArrayStore { array, index: index.value, value: value.value });
            }
            NodeKind::ReturnStatement => match ast.children(id).first() {
                Some(&value) => {
                    let ret = IrType::from_type(&self.info.return_type)?;
                    let lowered = self.lower_expr(value, Some(&ret))?;
                    code.extend(lowered.code);
                    code.push(Instr::Return(Some(lowered.value)));
                }
                None => code.push(Instr::Return(None)),
            },
            NodeKind::Condition => {
                let cond = self.lower_condition(id)?;
                code.extend(cond.code);
                code.push(Instr::NoOp(cond.value));
            }
            _ => code.extend(self.lower_expr_stmt(id)?),
        }
        Ok(code)
    }

    fn lower_condition(&mut self, id: NodeId) -> Result<Lowered> {
        let ast = self.ast;
        let expr = match ast.kind(id) {
            NodeKind::Condition => ast.child(id, 0, "guard expression")?,
            _ => id,
        };
        self.lower_expr(expr, Some(&IrType::Bool))
    }

    /// An expression evaluated for its effect; calls keep a void result
    fn lower_expr_stmt(&mut self, id: NodeId) -> Result<Vec<Instr>> {
        let ast = self.ast;
        match ast.kind(id) {
            NodeKind::Parenthesis => self.lower_expr_stmt(ast.child(id, 0, "inner expression")?),
            NodeKind::MethodInvocation { method } => {
                let (mut code, call) = self.lower_call(id, method, None)?;
                code.push(Instr::Call(call));
                Ok(code)
            }
            _ => {
                let lowered = self.lower_expr(id, None)?;
                let mut code = lowered.code;
                code.push(Instr::NoOp(lowered.value));
                Ok(code)
            }
        }
    }

    fn lower_assignment(&mut self, id: NodeId, name: &str) -> Result<Vec<Instr>> {
        let (scope, dest) = self.variable(id, name)?;
        let value_node = self.ast.child(id, 0, "value")?;
        let value = self.lower_expr(value_node, Some(&dest.ty))?;
        let mut code = value.code;

        if scope == VarScope::Field {
            code.push(Instr::PutField { object: self.this(), field: dest, value: value.value });
            return Ok(code);
        }

        // Write straight into the destination instead of through a temporary
        if let Operand::Var(ref result) = value.value {
            if self.temps.contains(&result.name) && result.ty == dest.ty {
                if let Some(Instr::Assign { dest: last, .. }) = code.last_mut() {
                    if last == result {
                        self.temps.remove(&result.name);
                        *last = dest;
                        return Ok(code);
                    }
                }
            }
        }
        code.push(Instr::Assign { dest, rhs: Rhs::Operand(value.value) });
        Ok(code)
    }

    /// Lower an expression in value position. `expected` is the type the
    /// context wants, used to type calls the symbol table knows nothing about.
    fn lower_expr(&mut self, id: NodeId, expected: Option<&IrType>) -> Result<Lowered> {
        let ast = self.ast;
        let lowered = match ast.kind(id) {
            NodeKind::Integer { value } => Lowered::operand(Operand::Int(*value)),
            NodeKind::True => Lowered::operand(Operand::Bool(true)),
            NodeKind::False => Lowered::operand(Operand::Bool(false)),
            NodeKind::Literal { value } => Lowered::operand(Operand::Str(value.clone())),
            NodeKind::Parenthesis => self.lower_expr(ast.child(id, 0, "inner expression")?, expected)?,
            NodeKind::CurrentObject => Lowered::operand(self.this()),
            NodeKind::CustomType { name } => Lowered::operand(Operand::Class(name.clone())),
            NodeKind::Identifier { name } => self.lower_identifier(id, name)?,
            NodeKind::BinaryOp { op } => {
                let op = *op;
                let operand_ty = if op.is_logical() { IrType::Bool } else { IrType::Int };
                let left = self.lower_expr(ast.child(id, 0, "left operand")?, Some(&operand_ty))?;
                let right = self.lower_expr(ast.child(id, 1, "right operand")?, Some(&operand_ty))?;
                let result_ty = if op.is_arithmetic() { IrType::Int } else { IrType::Bool };
                let mut code = left.code;
                code.extend(right.code);
                self.assign_temp(code, result_ty, Rhs::Binary { op, left: left.value, right: right.value })
            }
            NodeKind::Negation => {
                let inner = self.lower_expr(ast.child(id, 0, "operand")?, Some(&IrType::Bool))?;
                self.assign_temp(inner.code, IrType::Bool, Rhs::Not(inner.value))
            }
            NodeKind::ArrayAccess => {
                let base = self.lower_expr(ast.child(id, 0, "array")?, Some(&IrType::IntArray))?;
                let index = self.lower_expr(ast.child(id, 1, "index")?, Some(&IrType::Int))?;
                let array = base
                    .value
                    .as_var()
                    .cloned()
                    .ok_or_else(|| Error::malformed(id.0, format!("cannot index into {}", base.value)))?;
                let mut code = base.code;
                code.extend(index.code);
                self.assign_temp(code, IrType::Int, Rhs::ArrayLoad { array, index: index.value })
            }
            NodeKind::ArrayLength => {
                let base = self.lower_expr(ast.child(id, 0, "array")?, None)?;
                self.assign_temp(base.code, IrType::Int, Rhs::ArrayLength(base.value))
            }
            NodeKind::ArrayInstantiation => {
                let len = self.lower_expr(ast.child(id, 0, "length")?, Some(&IrType::Int))?;
                self.assign_temp(len.code, IrType::IntArray, Rhs::NewArray(len.value))
            }
            NodeKind::CustomInstantiation { class } => {
                self.assign_temp(Vec::new(), IrType::Object(class.clone()), Rhs::NewObject(class.clone()))
            }
            NodeKind::MethodInvocation { method } => {
                // In value position an untyped call defaults to int
                let expected = expected.cloned().unwrap_or(IrType::Int);
                let (code, call) = self.lower_call(id, method, Some(&expected))?;
                let ret = call.ret.clone();
                self.assign_temp(code, ret, Rhs::Call(call))
            }
            other => {
                return Err(Error::malformed(id.0, format!("{} cannot be lowered as an expression", other.kind_name())));
            }
        };
        Ok(lowered)
    }

    fn lower_identifier(&mut self, id: NodeId, name: &str) -> Result<Lowered> {
        if let Some((scope, symbol)) = self.symtab.resolve_variable(&self.info.name, name) {
            let var = Var::new(name, IrType::from_type(&symbol.ty)?);
            if scope == VarScope::Field && !self.info.is_static {
                let field_ty = var.ty.clone();
                return Ok(self.assign_temp(Vec::new(), field_ty, Rhs::GetField { object: self.this(), field: var }));
            }
            if scope != VarScope::Field {
                return Ok(Lowered::operand(Operand::Var(var)));
            }
        }
        if self.symtab.class_reference(name).is_some() {
            return Ok(Lowered::operand(Operand::Class(name.to_string())));
        }
        Err(Error::malformed(id.0, format!("unresolved identifier '{}' reached IR generation", name)))
    }

    /// Lower target and arguments of a call. `expected` types a call whose
    /// signature is unknown; `None` means the result is discarded.
    fn lower_call(&mut self, id: NodeId, method: &str, expected: Option<&IrType>) -> Result<(Vec<Instr>, Call)> {
        let ast = self.ast;
        let target = self.lower_expr(ast.child(id, 0, "invocation target")?, None)?;
        let mut code = target.code;

        let own_class = match &target.value {
            Operand::Class(name) => name == self.symtab.class_name(),
            other => other.ty() == IrType::Object(self.symtab.class_name().to_string()),
        };
        let declared = if own_class { self.symtab.method(method) } else { None };

        let mut args = Vec::new();
        let mut params = Vec::new();
        for (i, &arg) in ast.children(id)[1..].iter().enumerate() {
            let param_ty = match declared.and_then(|info| info.parameters.get(i)) {
                Some(param) => Some(IrType::from_type(&param.ty)?),
                None => None,
            };
            let lowered = self.lower_expr(arg, param_ty.as_ref())?;
            code.extend(lowered.code);
            // Signatures outside this class are only known through the arguments
            params.push(param_ty.unwrap_or_else(|| lowered.value.ty()));
            args.push(lowered.value);
        }

        let ret = match declared {
            Some(info) => IrType::from_type(&info.return_type)?,
            None => expected.cloned().unwrap_or(IrType::Void),
        };
        let kind = match target.value {
            Operand::Class(_) => CallKind::Static,
            _ => CallKind::Virtual,
        };
        Ok((code, Call { kind, target: target.value, method: method.to_string(), args, params, ret }))
    }

    fn variable(&self, id: NodeId, name: &str) -> Result<(VarScope, Var)> {
        let (scope, symbol) = self
            .symtab
            .resolve_variable(&self.info.name, name)
            .ok_or_else(|| Error::malformed(id.0, format!("assignment to undeclared variable '{}'", name)))?;
        Ok((scope, Var::new(name, IrType::from_type(&symbol.ty)?)))
    }

    fn assign_temp(&mut self, mut code: Vec<Instr>, ty: IrType, rhs: Rhs) -> Lowered {
        let dest = self.temp(ty);
        code.push(Instr::Assign { dest: dest.clone(), rhs });
        Lowered { code, value: Operand::Var(dest) }
    }

    fn temp(&mut self, ty: IrType) -> Var {
        let var = self.ctx.fresh_temp(ty);
        self.temps.insert(var.name.clone());
        var
    }

    fn this(&self) -> Operand {
        Operand::This(self.symtab.class_name().to_string())
    }
}

fn to_vars(symbols: &[crate::wash::Symbol]) -> Result<Vec<Var>> {
    symbols
        .iter()
        .map(|s| Ok(Var::new(s.name.clone(), IrType::from_type(&s.ty)?)))
        .collect()
}
