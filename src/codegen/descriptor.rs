//! Type descriptors and fully-qualified class names

use crate::common::consts::{ROOT_OBJECT_CLASS, STRING_CLASS};
use crate::common::error::{Error, Result};
use crate::ir::{IrType, Operand};
use crate::wash::SymbolTable;

/// Resolves simple class names to their slash-separated internal form
#[derive(Debug, Clone, Copy)]
pub struct ClassNames<'a> {
    symtab: &'a SymbolTable,
}

impl<'a> ClassNames<'a> {
    pub fn new(symtab: &'a SymbolTable) -> Self {
        Self { symtab }
    }

    /// Internal name of a class known to this compilation unit.
    /// Unknown names fail rather than guess a package.
    pub fn qualify(&self, name: &str) -> Result<String> {
        if name == self.symtab.class_name() {
            return Ok(name.to_string());
        }
        if let Some(path) = self.symtab.import_path(name) {
            return Ok(path.replace('.', "/"));
        }
        if name == "String" {
            return Ok(STRING_CLASS.to_string());
        }
        if self.symtab.is_superclass(name) {
            return Ok(name.to_string());
        }
        Err(Error::unknown_type(name))
    }

    pub fn superclass(&self) -> Result<String> {
        match self.symtab.superclass() {
            Some(sup) => self.qualify(sup),
            None => Ok(ROOT_OBJECT_CLASS.to_string()),
        }
    }

    /// Owning class of a member accessed through `object`
    pub fn owner(&self, object: &Operand) -> Result<String> {
        match object.ty() {
            IrType::Object(name) => self.qualify(&name),
            other => Err(Error::unknown_type(format!("member access on{}", other))),
        }
    }

    pub fn descriptor(&self, ty: &IrType) -> Result<String> {
        let desc = match ty {
            IrType::Int => "I".to_string(),
            IrType::Bool => "Z".to_string(),
            IrType::IntArray => "[I".to_string(),
            IrType::String => format!("L{};", STRING_CLASS),
            IrType::StringArray => format!("[L{};", STRING_CLASS),
            IrType::Object(name) => format!("L{};", self.qualify(name)?),
            IrType::Void => "V".to_string(),
        };
        Ok(desc)
    }

    pub fn method_descriptor<'t>(&self, params: impl IntoIterator<Item = &'t IrType>, ret: &IrType) -> Result<String> {
        let mut desc = String::from("(");
        for param in params {
            desc.push_str(&self.descriptor(param)?);
        }
        desc.push(')');
        desc.push_str(&self.descriptor(ret)?);
        Ok(desc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{class, import, program, Ast};
    use crate::wash::enter::Enter;

    fn symtab() -> SymbolTable {
        let ast = Ast::from_spec(&program(
            vec![import("java.util.Scanner"), import("io")],
            class("Calc", Some("Base"), vec![]),
        ));
        Enter::new(&ast, &mut Vec::new()).build().unwrap()
    }

    #[test]
    fn test_descriptors() {
        let st = symtab();
        let names = ClassNames::new(&st);
        assert_eq!(names.descriptor(&IrType::Int).unwrap(), "I");
        assert_eq!(names.descriptor(&IrType::Bool).unwrap(), "Z");
        assert_eq!(names.descriptor(&IrType::IntArray).unwrap(), "[I");
        assert_eq!(names.descriptor(&IrType::String).unwrap(), "Ljava/lang/String;");
        assert_eq!(names.descriptor(&IrType::Void).unwrap(), "V");
        assert_eq!(names.descriptor(&IrType::Object("Scanner".into())).unwrap(), "Ljava/util/Scanner;");
        assert_eq!(
            names.method_descriptor([&IrType::StringArray], &IrType::Void).unwrap(),
            "([Ljava/lang/String;)V"
        );
    }

    #[test]
    fn test_unknown_class_fails() {
        let st = symtab();
        let names = ClassNames::new(&st);
        assert!(matches!(
            names.descriptor(&IrType::Object("Mystery".into())),
            Err(Error::UnknownType { .. })
        ));
    }

    #[test]
    fn test_superclass_defaults_to_root_object() {
        let st = symtab();
        assert_eq!(ClassNames::new(&st).superclass().unwrap(), "Base");
        let bare = SymbolTable::default();
        assert_eq!(ClassNames::new(&bare).superclass().unwrap(), "java/lang/Object");
    }
}
