//! Static types seen by the analyzer

use crate::ast::TypeName;
use std::fmt;

/// Where a type came from. Origins never take part in equality; they drive the
/// special-case compatibility rules for classes the analyzer cannot see into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeOrigin {
    Primitive,
    Object,
    /// A class brought in by an import declaration
    Import,
    /// The declared superclass
    Extension,
    /// The receiver of the current method
    This,
    /// Result type of a method declared in this class
    Method,
}

#[derive(Debug, Clone, Eq)]
pub struct Type {
    pub name: String,
    pub is_array: bool,
    pub origin: TypeOrigin,
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.is_array == other.is_array && self.name == other.name
    }
}

impl std::hash::Hash for Type {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.is_array.hash(state);
    }
}

pub const INT: &str = "int";
pub const BOOLEAN: &str = "boolean";
pub const VOID: &str = "void";
pub const STRING: &str = "String";

impl Type {
    pub fn new(name: impl Into<String>, is_array: bool, origin: TypeOrigin) -> Self {
        Self {
            name: name.into(),
            is_array,
            origin,
        }
    }

    pub fn int() -> Self {
        Self::new(INT, false, TypeOrigin::Primitive)
    }

    pub fn int_array() -> Self {
        Self::new(INT, true, TypeOrigin::Primitive)
    }

    pub fn boolean() -> Self {
        Self::new(BOOLEAN, false, TypeOrigin::Primitive)
    }

    pub fn void() -> Self {
        Self::new(VOID, false, TypeOrigin::Primitive)
    }

    pub fn string() -> Self {
        Self::new(STRING, false, TypeOrigin::Object)
    }

    pub fn string_array() -> Self {
        Self::new(STRING, true, TypeOrigin::Object)
    }

    pub fn this(class_name: impl Into<String>) -> Self {
        Self::new(class_name, false, TypeOrigin::This)
    }

    pub fn with_origin(mut self, origin: TypeOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Type of a declaration as written in the source
    pub fn from_declared(ty: &TypeName) -> Self {
        let origin = match ty.name.as_str() {
            INT | BOOLEAN | VOID => TypeOrigin::Primitive,
            _ => TypeOrigin::Object,
        };
        Self::new(ty.name.clone(), ty.is_array, origin)
    }

    pub fn is_int(&self) -> bool {
        !self.is_array && self.name == INT
    }

    pub fn is_boolean(&self) -> bool {
        !self.is_array && self.name == BOOLEAN
    }

    pub fn is_int_array(&self) -> bool {
        self.is_array && self.name == INT
    }

    pub fn is_void(&self) -> bool {
        !self.is_array && self.name == VOID
    }

    /// int, boolean, String and arrays of those
    pub fn is_builtin(&self) -> bool {
        matches!(self.name.as_str(), INT | BOOLEAN | VOID | STRING)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_array {
            write!(f, "{}[]", self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}
