//! Loop handling for constant propagation
//!
//! Inside a `while`, any variable the loop writes is unknown at the loop head,
//! so it is dropped from the environment before the condition and body are
//! visited; constants the loop never writes are still substituted.
//!
//! What the loop leaves behind is decided by a bounded simulation: when the
//! condition and every body statement are assignments computable from known
//! constants, the loop is run statically for at most
//! [`LOOP_SIMULATION_LIMIT`] iterations. If it exits within the bound its final
//! values are exact and stay known after the loop. Anything else (an unknown
//! value, a call, nested control flow, too many iterations) leaves every loop
//! variable unknown. The loop body itself is never rewritten with simulated
//! values.

use super::const_prop::ConstPropagator;
use super::eval::{eval_expr, ConstEnv, Value};
use crate::ast::{Ast, NodeId, NodeKind};
use crate::common::consts::LOOP_SIMULATION_LIMIT;
use crate::common::error::Result;
use std::collections::BTreeSet;

impl<'a> ConstPropagator<'a> {
    pub(super) fn visit_while(&mut self, ast: &mut Ast, id: NodeId) -> Result<()> {
        let condition = ast.child(id, 0, "condition")?;
        let body: Vec<NodeId> = ast.children(id)[1..].to_vec();
        let written = assigned_names(ast, id);
        let entry = self.env.clone();

        let exit = self.simulate(ast, condition, &body, &written, &entry);

        for name in &written {
            self.env.remove(name);
        }
        let loop_head = self.env.clone();
        self.visit_stmt(ast, condition)?;
        self.visit_stmts(ast, &body)?;

        self.env = match exit {
            Some(exit) => {
                log::trace!("loop prop: loop at node {} converged statically", id.0);
                exit
            }
            None => loop_head,
        };
        Ok(())
    }

    /// Run the loop on constants; `None` when that cannot be done soundly
    fn simulate(
        &self,
        ast: &Ast,
        condition: NodeId,
        body: &[NodeId],
        written: &BTreeSet<String>,
        entry: &ConstEnv,
    ) -> Option<ConstEnv> {
        if !written.iter().all(|name| self.is_trackable(name)) {
            return None;
        }
        let guard = match ast.kind(condition) {
            NodeKind::Condition => *ast.children(condition).first()?,
            _ => condition,
        };
        let steps = straight_line_assignments(ast, body)?;

        let mut env = entry.clone();
        for _ in 0..=LOOP_SIMULATION_LIMIT {
            match eval_expr(ast, guard, &env)? {
                Value::Bool(false) => return Some(env),
                Value::Bool(true) => {}
                Value::Int(_) => return None,
            }
            for &(ref name, value) in &steps {
                let v = eval_expr(ast, value, &env)?;
                env.insert(name.clone(), v);
            }
        }
        log::debug!("loop prop: loop did not converge within {} iterations", LOOP_SIMULATION_LIMIT);
        None
    }
}

/// Names assigned anywhere inside a subtree
fn assigned_names(ast: &Ast, id: NodeId) -> BTreeSet<String> {
    ast.preorder(id)
        .into_iter()
        .filter_map(|n| match ast.kind(n) {
            NodeKind::Assignment { name } => Some(name.clone()),
            _ => None,
        })
        .collect()
}

/// `(target, value)` pairs when the body is only scalar assignments
fn straight_line_assignments(ast: &Ast, body: &[NodeId]) -> Option<Vec<(String, NodeId)>> {
    let mut steps = Vec::new();
    for &stmt in body {
        match ast.kind(stmt) {
            NodeKind::Assignment { name } => steps.push((name.clone(), *ast.children(stmt).first()?)),
            NodeKind::CodeBlock => steps.extend(straight_line_assignments(ast, ast.children(stmt))?),
            NodeKind::VarDeclaration { .. } => {}
            _ => return None,
        }
    }
    Some(steps)
}
