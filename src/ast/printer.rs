use super::{Ast, NodeId};

/// AST printer for debugging and output
pub struct AstPrinter {
    indent_level: usize,
    output: String,
    positions: bool,
}

impl AstPrinter {
    pub fn new() -> Self {
        Self {
            indent_level: 0,
            output: String::new(),
            positions: false,
        }
    }

    /// Append `@line:col` to every node
    pub fn with_positions(mut self) -> Self {
        self.positions = true;
        self
    }

    pub fn print(&mut self, ast: &Ast) -> String {
        self.output.clear();
        self.indent_level = 0;
        self.print_node(ast, ast.root());
        std::mem::take(&mut self.output)
    }

    fn print_node(&mut self, ast: &Ast, id: NodeId) {
        let line = if self.positions {
            format!("{} @{}:{}", ast.kind(id), ast.line(id), ast.column(id))
        } else {
            ast.kind(id).to_string()
        };
        self.writeln(&line);
        self.indent();
        for &child in ast.children(id) {
            self.print_node(ast, child);
        }
        self.dedent();
    }

    fn indent(&mut self) {
        self.indent_level += 2;
    }

    fn dedent(&mut self) {
        if self.indent_level >= 2 {
            self.indent_level -= 2;
        }
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push(' ');
        }
    }

    fn writeln(&mut self, s: &str) {
        self.write_indent();
        self.output.push_str(s);
        self.output.push('\n');
    }
}

impl Default for AstPrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Ast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&AstPrinter::new().print(self))
    }
}
