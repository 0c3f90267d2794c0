//! Per-method generation state
//!
//! Temporary and label counters live here and are threaded explicitly through
//! generation. A fresh context is created for every method, so names never
//! collide across methods and nothing is shared between compilations.

use super::{IrType, Var};
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct GenContext {
    next_temp: usize,
    next_label: usize,
    /// Declared names a temporary must not shadow
    reserved: HashSet<String>,
}

impl GenContext {
    pub fn new(reserved: impl IntoIterator<Item = String>) -> Self {
        Self {
            next_temp: 0,
            next_label: 0,
            reserved: reserved.into_iter().collect(),
        }
    }

    /// A never-before-used temporary `tN`
    pub fn fresh_temp(&mut self, ty: IrType) -> Var {
        loop {
            let name = format!("t{}", self.next_temp);
            self.next_temp += 1;
            if !self.reserved.contains(&name) {
                return Var::new(name, ty);
            }
        }
    }

    /// Suffix shared by the labels of one control construct
    pub fn fresh_label_id(&mut self) -> usize {
        let id = self.next_label;
        self.next_label += 1;
        id
    }

    pub fn temps_issued(&self) -> usize {
        self.next_temp
    }
}
