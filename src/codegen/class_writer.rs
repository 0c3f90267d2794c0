//! Class-level assembly text: header, fields, constructor and method blocks

use super::descriptor::ClassNames;
use super::gen::MethodGen;
use super::method::MethodDescriptor;
use super::register_alloc::{FixedSlotAllocator, SlotAllocator};
use crate::common::consts::DEFAULT_STACK_LIMIT;
use crate::common::error::Result;
use crate::ir::{IrClass, IrMethod};
use crate::wash::SymbolTable;

pub struct ClassWriter<'a> {
    names: ClassNames<'a>,
    allocator: Box<dyn SlotAllocator + 'a>,
    stack_limit: u32,
}

impl<'a> ClassWriter<'a> {
    pub fn new(symtab: &'a SymbolTable) -> Self {
        Self {
            names: ClassNames::new(symtab),
            allocator: Box::new(FixedSlotAllocator::default()),
            stack_limit: DEFAULT_STACK_LIMIT,
        }
    }

    pub fn with_allocator(mut self, allocator: impl SlotAllocator + 'a) -> Self {
        self.allocator = Box::new(allocator);
        self
    }

    pub fn write_class(&mut self, class: &IrClass) -> Result<String> {
        let superclass = self.names.superclass()?;
        let mut lines = vec![
            format!(".class public {}", class.name),
            format!(".super {}", superclass),
        ];
        if !class.fields.is_empty() {
            lines.push(String::new());
        }
        for field in &class.fields {
            lines.push(format!(".field private {} {}", field.name, self.names.descriptor(&field.ty)?));
        }

        lines.push(String::new());
        lines.push(".method public <init>()V".to_string());
        lines.push("    aload_0".to_string());
        lines.push(format!("    invokespecial {}/<init>()V", superclass));
        lines.push("    return".to_string());
        lines.push(".end method".to_string());

        for method in &class.methods {
            lines.push(String::new());
            lines.extend(self.write_method(method)?);
        }
        log::debug!("jasmin: class {} with {} method(s)", class.name, class.methods.len());

        let mut out = lines.join("\n");
        out.push('\n');
        Ok(out)
    }

    fn write_method(&mut self, method: &IrMethod) -> Result<Vec<String>> {
        let desc = MethodDescriptor::build(method, self.allocator.as_mut())?;
        let signature = self
            .names
            .method_descriptor(method.params.iter().map(|p| &p.ty), &method.return_type)?;
        let modifiers = if method.is_static { "public static" } else { "public" };

        let mut lines = vec![
            format!(".method {} {}{}", modifiers, method.name, signature),
            format!("    .limit stack {}", self.stack_limit),
            format!("    .limit locals {}", desc.locals_limit),
        ];
        lines.extend(MethodGen::new(&desc, self.names).generate()?);
        lines.push(".end method".to_string());
        Ok(lines)
    }
}
