//! Recoverable, user-facing diagnostics
//!
//! Stages append to a shared list and keep going, so a single compilation
//! reports every problem it can detect.

use std::fmt;

/// Pipeline stage that produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Semantic,
    Optimization,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub stage: Stage,
    pub severity: Severity,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn error(stage: Stage, line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            stage,
            severity: Severity::Error,
            line,
            column,
            message: message.into(),
        }
    }

    pub fn warning(stage: Stage, line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            stage,
            severity: Severity::Warning,
            line,
            column,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Semantic => write!(f, "semantic"),
            Stage::Optimization => write!(f, "optimization"),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}[{}] {}:{}: {}", severity, self.stage, self.line, self.column, self.message)
    }
}

/// True when any diagnostic in the list has error severity
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_format() {
        let d = Diagnostic::error(Stage::Semantic, 3, 7, "undeclared variable 'x'");
        assert_eq!(d.to_string(), "error[semantic] 3:7: undeclared variable 'x'");
    }

    #[test]
    fn test_has_errors_ignores_warnings() {
        let diags = vec![Diagnostic::warning(Stage::Optimization, 1, 1, "division by zero")];
        assert!(!has_errors(&diags));
    }
}
