//! Instruction mnemonics and operand-width-dependent selection
//!
//! The assembler consumes mnemonics, so everything here is text. Selection
//! follows the target's rules exactly: dedicated constant opcodes where they
//! exist, then the narrowest immediate that fits, then the constant pool.

use crate::ir::IrType;

pub const ICONST_M1: &str = "iconst_m1";
pub const BIPUSH: &str = "bipush";
pub const SIPUSH: &str = "sipush";
pub const LDC: &str = "ldc";

pub const IADD: &str = "iadd";
pub const ISUB: &str = "isub";
pub const IMUL: &str = "imul";
pub const IDIV: &str = "idiv";
pub const IAND: &str = "iand";
pub const IOR: &str = "ior";
pub const IXOR: &str = "ixor";

pub const IF_ICMPLT: &str = "if_icmplt";
pub const IF_ICMPGT: &str = "if_icmpgt";
pub const IFEQ: &str = "ifeq";
pub const IFNE: &str = "ifne";
pub const GOTO: &str = "goto";

pub const IALOAD: &str = "iaload";
pub const IASTORE: &str = "iastore";
pub const ARRAYLENGTH: &str = "arraylength";
pub const NEWARRAY: &str = "newarray";
pub const NEW: &str = "new";
pub const DUP: &str = "dup";
pub const POP: &str = "pop";

pub const GETFIELD: &str = "getfield";
pub const PUTFIELD: &str = "putfield";
pub const INVOKESTATIC: &str = "invokestatic";
pub const INVOKEVIRTUAL: &str = "invokevirtual";
pub const INVOKESPECIAL: &str = "invokespecial";

pub const RETURN: &str = "return";
pub const IRETURN: &str = "ireturn";
pub const ARETURN: &str = "areturn";

/// Push an `int` constant
pub fn load_int_constant(value: i32) -> String {
    match value {
        -1 => ICONST_M1.to_string(),
        0..=5 => format!("iconst_{}", value),
        -128..=127 => format!("{} {}", BIPUSH, value),
        -32768..=32767 => format!("{} {}", SIPUSH, value),
        _ => format!("{} {}", LDC, value),
    }
}

pub fn load_bool_constant(value: bool) -> String {
    load_int_constant(i32::from(value))
}

/// Push a string constant. The assembler reads Java-style escapes only, so
/// anything outside printable ASCII is written as UTF-16 `\uXXXX` units.
pub fn load_string_constant(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            ' '..='~' => quoted.push(c),
            _ => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    quoted.push_str(&format!("\\u{:04x}", unit));
                }
            }
        }
    }
    quoted.push('"');
    format!("{} {}", LDC, quoted)
}

/// `i`-family for int/boolean, `a`-family for references
fn family(ty: &IrType) -> char {
    if ty.is_reference() {
        'a'
    } else {
        'i'
    }
}

fn slot_form(prefix: char, op: &str, slot: u16) -> String {
    if slot <= 3 {
        format!("{}{}_{}", prefix, op, slot)
    } else {
        format!("{}{} {}", prefix, op, slot)
    }
}

pub fn load_var(slot: u16, ty: &IrType) -> String {
    slot_form(family(ty), "load", slot)
}

pub fn store_var(slot: u16, ty: &IrType) -> String {
    slot_form(family(ty), "store", slot)
}

pub fn return_for(ty: &IrType) -> &'static str {
    match ty {
        IrType::Void => RETURN,
        t if t.is_reference() => ARETURN,
        _ => IRETURN,
    }
}
