//! Local variable slot assignment
//!
//! [`SlotAllocator`] is the seam where a real register allocator (one driven
//! by [`Liveness`](crate::optimizer::Liveness)) would plug in. The shipped
//! [`FixedSlotAllocator`] gives every variable its own slot for the whole
//! method and reports a fixed frame budget.

use crate::common::consts::DEFAULT_LOCALS_LIMIT;
use crate::common::error::{Error, Result};
use crate::ir::{Instr, IrMethod, IrType};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarEntry {
    pub slot: u16,
    pub ty: IrType,
}

/// Variable name to slot and type for one method
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VarTable {
    entries: HashMap<String, VarEntry>,
    next_slot: u16,
}

impl VarTable {
    pub fn get(&self, name: &str) -> Option<&VarEntry> {
        self.entries.get(name)
    }

    /// Give `name` the next free slot unless it already has one
    pub fn assign(&mut self, name: &str, ty: &IrType) -> Result<u16> {
        if let Some(entry) = self.entries.get(name) {
            return Ok(entry.slot);
        }
        let slot = self.next_slot;
        self.next_slot = slot
            .checked_add(1)
            .ok_or_else(|| Error::unsupported("more than 65535 local variable slots"))?;
        self.entries.insert(name.to_string(), VarEntry { slot, ty: ty.clone() });
        Ok(slot)
    }

    /// Reserve a slot no variable name maps to
    pub fn reserve(&mut self) -> u16 {
        let slot = self.next_slot;
        self.next_slot += 1;
        slot
    }

    /// Number of slots handed out, including reserved ones
    pub fn slots_used(&self) -> u16 {
        self.next_slot
    }
}

pub trait SlotAllocator {
    fn allocate(&mut self, method: &IrMethod) -> Result<VarTable>;

    /// Value for `.limit locals`; never below what `table` needs
    fn locals_limit(&self, table: &VarTable) -> u32;
}

/// One slot per variable: receiver, parameters, declared locals, then
/// temporaries in the order they are first assigned
#[derive(Debug, Clone)]
pub struct FixedSlotAllocator {
    budget: u32,
}

impl FixedSlotAllocator {
    pub fn new(budget: u32) -> Self {
        Self { budget }
    }
}

impl Default for FixedSlotAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_LOCALS_LIMIT)
    }
}

impl SlotAllocator for FixedSlotAllocator {
    fn allocate(&mut self, method: &IrMethod) -> Result<VarTable> {
        let mut table = VarTable::default();
        if !method.is_static {
            table.reserve();
        }
        for var in method.params.iter().chain(method.locals.iter()) {
            table.assign(&var.name, &var.ty)?;
        }
        for instr in &method.instructions {
            if let Instr::Assign { dest, .. } = instr {
                table.assign(&dest.name, &dest.ty)?;
            }
        }
        log::trace!("slots for {}: {}", method.name, table.slots_used());
        Ok(table)
    }

    fn locals_limit(&self, table: &VarTable) -> u32 {
        self.budget.max(u32::from(table.slots_used()))
    }
}
