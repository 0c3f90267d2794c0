//! Output buffer for one method body

#[derive(Debug, Default)]
pub struct Code {
    lines: Vec<String>,
    /// Suffix for the next comparison's label pair
    next_cmp: usize,
}

impl Code {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, instr: impl Into<String>) {
        self.lines.push(format!("    {}", instr.into()));
    }

    pub fn emit_op(&mut self, mnemonic: &str, operand: impl std::fmt::Display) {
        self.emit(format!("{} {}", mnemonic, operand));
    }

    pub fn label(&mut self, name: &str) {
        self.lines.push(format!("{}:", name));
    }

    /// `CMP_TRUE_n`/`CMP_END_n` for one comparison
    pub fn cmp_labels(&mut self) -> (String, String) {
        let n = self.next_cmp;
        self.next_cmp += 1;
        (format!("CMP_TRUE_{}", n), format!("CMP_END_{}", n))
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}
