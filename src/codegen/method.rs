//! Codegen-facing view of one IR method

use super::register_alloc::{SlotAllocator, VarEntry, VarTable};
use crate::common::error::{Error, Result};
use crate::ir::{Instr, IrMethod, Var};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct MethodDescriptor<'m> {
    pub method: &'m IrMethod,
    pub var_table: VarTable,
    /// Label name to the index of its `Label` instruction
    pub labels: HashMap<String, usize>,
    pub locals_limit: u32,
}

impl<'m> MethodDescriptor<'m> {
    pub fn build(method: &'m IrMethod, allocator: &mut dyn SlotAllocator) -> Result<Self> {
        let var_table = allocator.allocate(method)?;
        let locals_limit = allocator.locals_limit(&var_table);

        let mut labels = HashMap::new();
        for (i, instr) in method.instructions.iter().enumerate() {
            if let Instr::Label(name) = instr {
                if labels.insert(name.clone(), i).is_some() {
                    return Err(Error::malformed_ir(&method.name, format!("label {} defined twice", name)));
                }
            }
        }
        for instr in &method.instructions {
            if let Instr::Goto(label) | Instr::Branch { label, .. } = instr {
                if !labels.contains_key(label) {
                    return Err(Error::malformed_ir(&method.name, format!("jump to undefined label {}", label)));
                }
            }
        }

        Ok(Self {
            method,
            var_table,
            labels,
            locals_limit,
        })
    }

    pub fn instructions(&self) -> &'m [Instr] {
        &self.method.instructions
    }

    /// Slot of a variable; a variable without one is a generator bug
    pub fn slot(&self, var: &Var) -> Result<&VarEntry> {
        self.var_table.get(&var.name).ok_or_else(|| {
            Error::malformed_ir(&self.method.name, format!("variable {} has no slot", var.name))
        })
    }
}
