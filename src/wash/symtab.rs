//! Symbol table for one compilation unit
//!
//! Holds the class name, superclass, imports, fields and per-method
//! signatures. Built once by [`enter`](super::enter) and read-only afterwards.

use super::types::{Type, TypeOrigin};
use std::collections::HashMap;

/// A named, typed declaration (field, parameter or local)
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
}

impl Symbol {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self { name: name.into(), ty }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo {
    pub name: String,
    pub return_type: Type,
    pub parameters: Vec<Symbol>,
    pub locals: Vec<Symbol>,
    pub is_static: bool,
}

/// Which declaration list a name was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarScope {
    Local,
    Parameter,
    Field,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    pub(crate) class_name: String,
    pub(crate) superclass: Option<String>,
    pub(crate) imports: Vec<String>,
    pub(crate) fields: Vec<Symbol>,
    pub(crate) methods: HashMap<String, MethodInfo>,
    pub(crate) method_order: Vec<String>,
}

impl SymbolTable {
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn superclass(&self) -> Option<&str> {
        self.superclass.as_deref()
    }

    /// Dotted import paths in declaration order
    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    pub fn fields(&self) -> &[Symbol] {
        &self.fields
    }

    /// Method names in declaration order
    pub fn method_names(&self) -> &[String] {
        &self.method_order
    }

    pub fn method(&self, name: &str) -> Option<&MethodInfo> {
        self.methods.get(name)
    }

    pub fn return_type(&self, method: &str) -> Option<&Type> {
        self.method(method).map(|m| &m.return_type)
    }

    pub fn parameters(&self, method: &str) -> Option<&[Symbol]> {
        self.method(method).map(|m| m.parameters.as_slice())
    }

    pub fn local_variables(&self, method: &str) -> Option<&[Symbol]> {
        self.method(method).map(|m| m.locals.as_slice())
    }

    pub fn field(&self, name: &str) -> Option<&Symbol> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Resolve a variable name inside a method: local, then parameter, then field
    pub fn resolve_variable(&self, method: &str, name: &str) -> Option<(VarScope, &Symbol)> {
        if let Some(info) = self.method(method) {
            if let Some(sym) = info.locals.iter().find(|s| s.name == name) {
                return Some((VarScope::Local, sym));
            }
            if let Some(sym) = info.parameters.iter().find(|s| s.name == name) {
                return Some((VarScope::Parameter, sym));
            }
        }
        self.field(name).map(|sym| (VarScope::Field, sym))
    }

    /// Dotted path of the import whose last segment is `simple_name`
    pub fn import_path(&self, simple_name: &str) -> Option<&str> {
        self.imports
            .iter()
            .map(String::as_str)
            .find(|path| path.rsplit('.').next() == Some(simple_name))
    }

    pub fn is_import(&self, simple_name: &str) -> bool {
        self.import_path(simple_name).is_some()
    }

    pub fn is_superclass(&self, name: &str) -> bool {
        self.superclass.as_deref() == Some(name)
    }

    /// Re-tag a resolved type whose name is the superclass or an import
    pub fn tag_origin(&self, ty: Type) -> Type {
        if ty.is_array || ty.origin == TypeOrigin::This {
            return ty;
        }
        if self.is_superclass(&ty.name) {
            ty.with_origin(TypeOrigin::Extension)
        } else if self.is_import(&ty.name) {
            ty.with_origin(TypeOrigin::Import)
        } else {
            ty
        }
    }

    /// Type of a class name used as a value (static call target, `new` operand)
    pub fn class_reference(&self, name: &str) -> Option<Type> {
        if self.is_superclass(name) {
            Some(Type::new(name, false, TypeOrigin::Extension))
        } else if self.is_import(name) {
            Some(Type::new(name, false, TypeOrigin::Import))
        } else if name == self.class_name {
            Some(Type::new(name, false, TypeOrigin::Object))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SymbolTable {
        let mut st = SymbolTable {
            class_name: "Calc".into(),
            superclass: Some("Base".into()),
            imports: vec!["java.util.Scanner".into(), "io".into()],
            fields: vec![Symbol::new("x", Type::int())],
            ..Default::default()
        };
        st.methods.insert(
            "f".into(),
            MethodInfo {
                name: "f".into(),
                return_type: Type::int(),
                parameters: vec![Symbol::new("x", Type::boolean())],
                locals: vec![Symbol::new("y", Type::int_array())],
                is_static: false,
            },
        );
        st.method_order.push("f".into());
        st
    }

    #[test]
    fn test_resolution_order() {
        let st = table();
        let (scope, sym) = st.resolve_variable("f", "x").unwrap();
        assert_eq!(scope, VarScope::Parameter);
        assert!(sym.ty.is_boolean());
        assert_eq!(st.resolve_variable("f", "y").unwrap().0, VarScope::Local);
        assert_eq!(st.resolve_variable("g", "x").unwrap().0, VarScope::Field);
        assert!(st.resolve_variable("f", "z").is_none());
    }

    #[test]
    fn test_import_matches_last_segment() {
        let st = table();
        assert_eq!(st.import_path("Scanner"), Some("java.util.Scanner"));
        assert!(st.is_import("io"));
        assert!(!st.is_import("util"));
    }

    #[test]
    fn test_tag_origin() {
        let st = table();
        assert_eq!(st.tag_origin(Type::new("Base", false, TypeOrigin::Object)).origin, TypeOrigin::Extension);
        assert_eq!(st.tag_origin(Type::new("Scanner", false, TypeOrigin::Object)).origin, TypeOrigin::Import);
        assert_eq!(st.tag_origin(Type::int()).origin, TypeOrigin::Primitive);
    }
}
