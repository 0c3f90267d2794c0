//! Common utilities and definitions shared across modules
//!
//! This module contains the configuration map, fatal error definitions,
//! recoverable diagnostics and constants used throughout the compiler.

pub mod config;
pub mod consts;
pub mod diagnostic;
pub mod error;

// Re-export commonly used items for convenience
pub use config::Config;
pub use consts::*;
pub use diagnostic::{Diagnostic, Severity, Stage};
pub use error::{Error, Result};
