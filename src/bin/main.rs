use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use jmmc::ast::AstPrinter;
use jmmc::Config;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "jmmc")]
#[command(about = "Check, optimize and lower a parsed class to IR and stack-machine assembly")]
#[command(version)]
struct Cli {
    /// AST of one compilation unit, as JSON
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output directory for generated files
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Run constant folding and propagation before IR generation
    #[arg(long)]
    optimize: bool,

    /// Verbose tracing
    #[arg(short, long)]
    debug: bool,

    /// Local slot budget per method
    #[arg(short = 'r', long = "register-allocation", value_name = "N")]
    register_allocation: Option<u32>,

    /// What to write
    #[arg(long, value_enum, default_value_t = Emit::All)]
    emit: Emit,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    Ast,
    Ir,
    Jasmin,
    All,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug { log::LevelFilter::Debug } else { log::LevelFilter::Warn };
    env_logger::Builder::from_default_env().filter_level(level).init();

    if !cli.input.is_file() {
        bail!("input file {} does not exist", cli.input.display());
    }
    let config = Config::new()
        .with_input(cli.input.display().to_string())
        .with_optimize(cli.optimize)
        .with_debug(cli.debug)
        .with_register_allocation(cli.register_allocation);

    let output = jmmc::compile_file(&cli.input, &config)
        .with_context(|| format!("failed to compile {}", cli.input.display()))?;
    for diagnostic in output.diagnostics() {
        eprintln!("{}", diagnostic);
    }
    if !output.semantics.is_accepted() {
        let errors = output.diagnostics().iter().filter(|d| d.is_error()).count();
        bail!("{} error(s) in {}", errors, cli.input.display());
    }

    let out_dir = cli.output.unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&out_dir).with_context(|| format!("cannot create {}", out_dir.display()))?;
    let class_name = output.semantics.symtab.class_name().to_string();

    if matches!(cli.emit, Emit::Ast | Emit::All) {
        let text = AstPrinter::new().with_positions().print(&output.semantics.ast);
        write_output(&out_dir, &class_name, "ast", &text)?;
    }
    if let (true, Some(ir)) = (matches!(cli.emit, Emit::Ir | Emit::All), &output.ir) {
        write_output(&out_dir, &class_name, "ollir", &ir.text)?;
    }
    if let (true, Some(bytecode)) = (matches!(cli.emit, Emit::Jasmin | Emit::All), &output.bytecode) {
        write_output(&out_dir, &class_name, "j", &bytecode.text)?;
    }
    Ok(())
}

fn write_output(dir: &Path, class_name: &str, extension: &str, text: &str) -> Result<()> {
    let path = dir.join(format!("{}.{}", class_name, extension));
    fs::write(&path, text).with_context(|| format!("cannot write {}", path.display()))?;
    log::info!("wrote {}", path.display());
    Ok(())
}
