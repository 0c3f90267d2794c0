//! Constant folding over the AST
//!
//! Bottom-up: a `BinaryOp` whose operands are both literals, a `Negation` of a
//! boolean literal and a `Parenthesis` around a literal are each replaced in
//! their parent's child slot by a single literal node. Passes repeat until one
//! performs no rewrite.

use super::eval::{apply_binary, Value};
use crate::ast::{Ast, BinOp, NodeId, NodeKind};
use crate::common::diagnostic::{Diagnostic, Stage};
use crate::common::error::Result;
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct ConstFolder {
    /// Divisions by zero already reported
    warned: HashSet<NodeId>,
}

impl ConstFolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the subtree under `root` to a fixpoint, returning the number of rewrites
    pub fn fold(&mut self, ast: &mut Ast, root: NodeId, diagnostics: &mut Vec<Diagnostic>) -> Result<usize> {
        let mut total = 0;
        loop {
            let rewrites = self.fold_pass(ast, root, diagnostics)?;
            if rewrites == 0 {
                break;
            }
            total += rewrites;
        }
        if total > 0 {
            log::debug!("const fold: {} rewrite(s)", total);
        }
        Ok(total)
    }

    fn fold_pass(&mut self, ast: &mut Ast, root: NodeId, diagnostics: &mut Vec<Diagnostic>) -> Result<usize> {
        let mut order = ast.preorder(root);
        order.reverse();
        let mut rewrites = 0;
        for id in order {
            // Skip nodes detached earlier in this pass
            if id != root && ast.parent(id).is_none() {
                continue;
            }
            let Some(value) = self.folded_value(ast, id, diagnostics) else {
                continue;
            };
            if id == root {
                // The root has no slot to rewrite
                continue;
            }
            let literal = ast.add_node(value.to_kind(), ast.span(id));
            ast.replace_node(id, literal)?;
            rewrites += 1;
        }
        Ok(rewrites)
    }

    fn folded_value(&mut self, ast: &Ast, id: NodeId, diagnostics: &mut Vec<Diagnostic>) -> Option<Value> {
        let children = ast.children(id);
        match ast.kind(id) {
            NodeKind::BinaryOp { op } => {
                let left = Value::from_kind(ast.kind(*children.first()?))?;
                let right = Value::from_kind(ast.kind(*children.get(1)?))?;
                if *op == BinOp::Div && right == Value::Int(0) {
                    if self.warned.insert(id) {
                        diagnostics.push(Diagnostic::warning(
                            Stage::Optimization,
                            ast.line(id),
                            ast.column(id),
                            "division by zero in constant expression; left unfolded",
                        ));
                    }
                    return None;
                }
                apply_binary(*op, left, right)
            }
            NodeKind::Negation => match Value::from_kind(ast.kind(*children.first()?))? {
                Value::Bool(b) => Some(Value::Bool(!b)),
                Value::Int(_) => None,
            },
            NodeKind::Parenthesis if children.len() == 1 => Value::from_kind(ast.kind(children[0])),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;

    fn fold_expr(spec: NodeSpec) -> (Ast, Vec<Diagnostic>) {
        // Wrap in an assignment so the expression has a parent slot
        let mut ast = Ast::from_spec(&assign("a", spec));
        let root = ast.root();
        let mut diags = Vec::new();
        ConstFolder::new().fold(&mut ast, root, &mut diags).unwrap();
        (ast, diags)
    }

    fn folded(ast: &Ast) -> &NodeKind {
        ast.kind(ast.children(ast.root())[0])
    }

    #[test]
    fn test_nested_arithmetic_folds_to_single_literal() {
        let (ast, _) = fold_expr(binary(BinOp::Add, int(2), binary(BinOp::Mul, int(3), int(4))));
        assert_eq!(folded(&ast), &NodeKind::Integer { value: 14 });
    }

    #[test]
    fn test_boolean_and_comparison_fold() {
        let (ast, _) = fold_expr(binary(BinOp::And, boolean(true), boolean(false)));
        assert_eq!(folded(&ast), &NodeKind::False);
        let (ast, _) = fold_expr(not(paren(binary(BinOp::Lt, int(1), int(2)))));
        assert_eq!(folded(&ast), &NodeKind::False);
    }

    #[test]
    fn test_non_literal_operand_blocks_folding() {
        let (ast, _) = fold_expr(binary(BinOp::Add, ident("x"), binary(BinOp::Sub, int(5), int(7))));
        let top = ast.children(ast.root())[0];
        assert_eq!(ast.kind(top), &NodeKind::BinaryOp { op: BinOp::Add });
        assert_eq!(ast.kind(ast.children(top)[1]), &NodeKind::Integer { value: -2 });
    }

    #[test]
    fn test_division_by_zero_is_kept_and_warned_once() {
        let mut ast = Ast::from_spec(&assign("a", binary(BinOp::Div, int(1), int(0))));
        let root = ast.root();
        let mut diags = Vec::new();
        let mut folder = ConstFolder::new();
        assert_eq!(folder.fold(&mut ast, root, &mut diags).unwrap(), 0);
        folder.fold(&mut ast, root, &mut diags).unwrap();
        assert_eq!(diags.len(), 1);
        assert!(!diags[0].is_error());
    }

    #[test]
    fn test_replacement_is_reparented() {
        let (ast, _) = fold_expr(binary(BinOp::Mul, int(6), int(7)));
        let lit = ast.children(ast.root())[0];
        assert_eq!(ast.parent(lit), Some(ast.root()));
    }
}
