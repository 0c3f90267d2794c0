//! Semantic analysis pipeline
//!
//! - Enter: symbol table construction from the class-level tree
//! - Attr: scope-aware type checking of every method body
//!
//! Both phases report problems in the user's program as diagnostics and keep
//! going; only a structurally malformed tree stops the pipeline.

pub mod attr;
pub mod enter;
pub mod symtab;
pub mod types;

pub use symtab::{MethodInfo, Symbol, SymbolTable, VarScope};
pub use types::{Type, TypeOrigin};

use crate::ast::Ast;
use crate::common::config::Config;
use crate::common::diagnostic::{has_errors, Diagnostic};
use crate::common::error::Result;

/// Output of semantic analysis: the tree, its symbol table and every diagnostic
#[derive(Debug, Clone)]
pub struct SemanticsResult {
    pub ast: Ast,
    pub symtab: SymbolTable,
    pub diagnostics: Vec<Diagnostic>,
    pub config: Config,
}

impl SemanticsResult {
    /// True when no error-severity diagnostic was reported
    pub fn is_accepted(&self) -> bool {
        !has_errors(&self.diagnostics)
    }
}

/// Main semantic analysis pipeline: Enter → Attr
#[derive(Debug, Default)]
pub struct SemanticAnalyzer;

impl SemanticAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&mut self, ast: Ast, config: &Config) -> Result<SemanticsResult> {
        log::debug!("semantic analysis start");
        let mut diagnostics = Vec::new();

        // Phase 1: Enter - build the symbol table
        let symtab = enter::Enter::new(&ast, &mut diagnostics).build()?;

        // Phase 2: Attr - type checking
        attr::Attr::new(&ast, &symtab, &mut diagnostics).check()?;

        log::debug!("semantic analysis end: {} diagnostic(s)", diagnostics.len());
        Ok(SemanticsResult {
            ast,
            symtab,
            diagnostics,
            config: config.clone(),
        })
    }
}
