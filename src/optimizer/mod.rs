//! Optimizations
//!
//! AST level, before IR generation:
//! - const_fold: literal-only sub-expressions collapse to one literal
//! - const_prop: reads of locals/parameters with a known literal value are substituted
//! - loop_prop: the `while` sub-pass of propagation
//!
//! IR level:
//! - liveness: per-instruction use/def sets and the backward live-variable fixpoint

pub mod const_fold;
pub mod const_prop;
pub mod eval;
pub mod liveness;
mod loop_prop;

pub use const_fold::ConstFolder;
pub use const_prop::ConstPropagator;
pub use eval::{eval_expr, ConstEnv, Value};
pub use liveness::{defs, uses, Liveness};

use crate::ast::Ast;
use crate::common::consts::OPTIMIZE_MAX_ROUNDS;
use crate::common::diagnostic::Diagnostic;
use crate::common::error::Result;
use crate::wash::SymbolTable;

/// Alternate folding and propagation until a round changes nothing.
/// Returns the total number of tree rewrites.
pub fn optimize_ast(ast: &mut Ast, symtab: &SymbolTable, diagnostics: &mut Vec<Diagnostic>) -> Result<usize> {
    let mut folder = ConstFolder::new();
    let root = ast.root();
    let mut total = 0;
    for round in 0..OPTIMIZE_MAX_ROUNDS {
        let folded = folder.fold(ast, root, diagnostics)?;
        let propagated = ConstPropagator::new(symtab).propagate(ast)?;
        log::trace!("optimize round {}: {} folded, {} propagated", round, folded, propagated);
        total += folded + propagated;
        if folded + propagated == 0 {
            break;
        }
    }
    log::debug!("optimize: {} rewrite(s)", total);
    Ok(total)
}
