//! Stack-machine assembly emission
//!
//! Lowers an [`IrClass`] to the line-oriented assembly dialect consumed by an
//! external assembler (`.class`, `.super`, `.field`, `.method`, `.limit`).
//! Assembling that text into a loadable binary is not done here.

pub mod class_writer;
pub mod code;
pub mod descriptor;
pub mod gen;
pub mod method;
pub mod opcodes;
pub mod register_alloc;

pub use class_writer::ClassWriter;
pub use descriptor::ClassNames;
pub use method::MethodDescriptor;
pub use register_alloc::{FixedSlotAllocator, SlotAllocator, VarEntry, VarTable};

use crate::common::config::Config;
use crate::common::consts::DEFAULT_LOCALS_LIMIT;
use crate::common::error::Result;
use crate::ir::IrClass;
use crate::wash::SymbolTable;

/// Output of emission: the assembly text and the pass-through config
#[derive(Debug, Clone)]
pub struct BytecodeResult {
    pub class_name: String,
    pub text: String,
    pub config: Config,
}

/// Emit a class with the fixed slot allocator sized from `config`
pub fn emit_class(class: &IrClass, symtab: &SymbolTable, config: &Config) -> Result<BytecodeResult> {
    let budget = config.register_allocation.unwrap_or(DEFAULT_LOCALS_LIMIT);
    let text = ClassWriter::new(symtab)
        .with_allocator(FixedSlotAllocator::new(budget))
        .write_class(class)?;
    Ok(BytecodeResult {
        class_name: class.name.clone(),
        text,
        config: config.clone(),
    })
}
