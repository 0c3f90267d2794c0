//! Loading the parser's JSON tree
//!
//! Each node is an object carrying its `kind`, the kind's payload fields,
//! optional `children`, `line`, `col` and `attrs`.

use super::{Ast, NodeSpec};
use crate::common::error::Result;
use std::path::Path;

impl Ast {
    pub fn from_json(text: &str) -> Result<Ast> {
        let spec: NodeSpec = serde_json::from_str(text)?;
        let ast = Ast::from_spec(&spec);
        log::debug!("loaded AST with {} nodes", ast.len());
        Ok(ast)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Ast> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_spec(self.root()))?)
    }
}
