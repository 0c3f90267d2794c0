//! jmmc: middle and back end of a compiler for a small object-oriented language
//!
//! The front end (lexing and parsing) is external; it hands over an AST as
//! JSON. From there:
//!
//! - **ast**: arena tree with stable node ids and in-place child replacement
//! - **wash**: semantic analysis (Enter → Attr) producing a symbol table and diagnostics
//! - **optimizer**: constant folding/propagation on the AST, liveness on the IR
//! - **ir**: lowering to a typed three-address IR with its own text form
//! - **codegen**: stack-machine assembly text for an external assembler
//!
//! ```text
//! AST JSON → Ast → Enter → Attr → [optimize] → IR → assembly text
//! ```

pub mod ast;
pub mod codegen;
pub mod common;
pub mod ir;
pub mod optimizer;
pub mod wash;

pub use common::config::Config;
pub use common::diagnostic::{Diagnostic, Severity, Stage};
pub use common::error::{Error, Result};

use ast::Ast;
use codegen::BytecodeResult;
use ir::{IrGenerator, IrResult};
use std::path::Path;
use wash::{SemanticAnalyzer, SemanticsResult, SymbolTable};

/// Everything one compilation produced. IR and assembly are absent when
/// semantic analysis reported errors.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub semantics: SemanticsResult,
    pub ir: Option<IrResult>,
    pub bytecode: Option<BytecodeResult>,
}

impl CompileOutput {
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.semantics.diagnostics
    }

    pub fn is_success(&self) -> bool {
        self.semantics.is_accepted() && self.bytecode.is_some()
    }
}

/// Build the symbol table and type-check every method
pub fn analyze(ast: Ast, config: &Config) -> Result<SemanticsResult> {
    SemanticAnalyzer::new().analyze(ast, config)
}

/// Fold and propagate constants in place when `config.optimize` is set.
/// Returns the number of tree rewrites.
pub fn optimize(semantics: &mut SemanticsResult, config: &Config) -> Result<usize> {
    if !config.optimize {
        return Ok(0);
    }
    let SemanticsResult {
        ast, symtab, diagnostics, ..
    } = semantics;
    optimizer::optimize_ast(ast, symtab, diagnostics)
}

pub fn to_ir(semantics: &SemanticsResult, config: &Config) -> Result<IrResult> {
    let class = IrGenerator::new(&semantics.ast, &semantics.symtab).generate()?;
    let text = class.to_string();
    Ok(IrResult {
        class,
        text,
        config: config.clone(),
    })
}

pub fn to_bytecode(ir: &IrResult, symtab: &SymbolTable) -> Result<BytecodeResult> {
    codegen::emit_class(&ir.class, symtab, &ir.config)
}

/// Run every stage. Stops after analysis when it reported errors; the
/// diagnostics are in the returned output.
pub fn compile(ast: Ast, config: &Config) -> Result<CompileOutput> {
    log::info!("compiling {}", config.input.as_deref().unwrap_or("<memory>"));
    let mut semantics = analyze(ast, config)?;
    if !semantics.is_accepted() {
        log::info!("semantic analysis rejected the program");
        return Ok(CompileOutput {
            semantics,
            ir: None,
            bytecode: None,
        });
    }

    let rewrites = optimize(&mut semantics, config)?;
    if config.optimize {
        log::info!("optimizer applied {} rewrite(s)", rewrites);
    }
    let ir = to_ir(&semantics, config)?;
    let bytecode = to_bytecode(&ir, &semantics.symtab)?;
    log::info!("compiled class {}", bytecode.class_name);

    Ok(CompileOutput {
        semantics,
        ir: Some(ir),
        bytecode: Some(bytecode),
    })
}

/// Read an AST JSON file and compile it
pub fn compile_file(path: impl AsRef<Path>, config: &Config) -> Result<CompileOutput> {
    let path = path.as_ref();
    let ast = Ast::from_json_file(path)?;
    let config = match config.input {
        Some(_) => config.clone(),
        None => config.clone().with_input(path.display().to_string()),
    };
    compile(ast, &config)
}
