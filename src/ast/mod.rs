//! Abstract Syntax Tree (AST) representation
//!
//! The tree is handed in by an external parser. It is stored as an arena of
//! nodes addressed by [`NodeId`]; every node keeps its ordered children and the
//! index of its parent, so optimizer passes can rewrite a child slot in place
//! without any shared ownership.

mod builder;
mod json;
mod nodes;
mod printer;

pub use builder::*;
pub use json::*;
pub use nodes::*;
pub use printer::*;

use crate::common::error::{Error, Result};
use std::collections::BTreeMap;

/// Source location information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Span of source code (start and end locations)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: Location,
    pub end: Location,
}

impl Span {
    pub fn new(start: Location, end: Location) -> Self {
        Self { start, end }
    }

    /// Zero-width span at a single position
    pub fn point(line: usize, column: usize) -> Self {
        let loc = Location::new(line, column);
        Self { start: loc, end: loc }
    }
}

/// Stable index of a node inside its [`Ast`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<NodeId>,
    /// Back-reference used only for in-place rewriting
    pub parent: Option<NodeId>,
    pub span: Span,
    /// Extra string metadata forwarded by the parser
    pub attrs: BTreeMap<String, String>,
}

/// Node arena with a distinguished root
#[derive(Debug, Clone, PartialEq)]
pub struct Ast {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Ast {
    /// Create a tree holding only its root node
    pub fn new(root: NodeKind, span: Span) -> Self {
        let node = Node {
            kind: root,
            children: Vec::new(),
            parent: None,
            span,
            attrs: BTreeMap::new(),
        };
        Self {
            nodes: vec![node],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena, detached ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.node(id).span
    }

    pub fn line(&self, id: NodeId) -> usize {
        self.node(id).span.start.line
    }

    pub fn column(&self, id: NodeId) -> usize {
        self.node(id).span.start.column
    }

    pub fn attr(&self, id: NodeId, key: &str) -> Option<&str> {
        self.node(id).attrs.get(key).map(String::as_str)
    }

    /// The `index`-th child, or a malformed-tree error naming what was expected
    pub fn child(&self, id: NodeId, index: usize, expected: &str) -> Result<NodeId> {
        self.children(id).get(index).copied().ok_or_else(|| {
            Error::malformed(
                id.0,
                format!("{} is missing its {} (child #{})", self.kind(id).kind_name(), expected, index),
            )
        })
    }

    /// Allocate a detached node
    pub fn add_node(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            children: Vec::new(),
            parent: None,
            span,
            attrs: BTreeMap::new(),
        });
        id
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check_detached(child)?;
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
        Ok(())
    }

    /// Position of a node among its parent's children
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// Swap the child at `index` for the detached node `new`, returning the old child.
    /// The old child stays in the arena but no longer has a parent.
    pub fn replace_child(&mut self, parent: NodeId, index: usize, new: NodeId) -> Result<NodeId> {
        self.check_detached(new)?;
        let old = *self.children(parent).get(index).ok_or_else(|| {
            Error::malformed(parent.0, format!("no child at position {} to replace", index))
        })?;
        self.node_mut(parent).children[index] = new;
        self.node_mut(new).parent = Some(parent);
        self.node_mut(old).parent = None;
        Ok(old)
    }

    /// Put `new` in the slot `old` occupies in its parent
    pub fn replace_node(&mut self, old: NodeId, new: NodeId) -> Result<()> {
        let parent = self
            .parent(old)
            .ok_or_else(|| Error::malformed(old.0, "cannot replace a node without a parent"))?;
        let index = self
            .index_in_parent(old)
            .ok_or_else(|| Error::malformed(old.0, "node is not listed among its parent's children"))?;
        self.replace_child(parent, index, new)?;
        Ok(())
    }

    /// Deep copy of a subtree; the copy is detached
    pub fn copy_subtree(&mut self, id: NodeId) -> NodeId {
        let node = self.node(id).clone();
        let copy = self.add_node(node.kind, node.span);
        self.node_mut(copy).attrs = node.attrs;
        for child in node.children {
            let child_copy = self.copy_subtree(child);
            self.node_mut(child_copy).parent = Some(copy);
            self.node_mut(copy).children.push(child_copy);
        }
        copy
    }

    /// Pre-order listing of the subtree rooted at `id`
    pub fn preorder(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// First direct child of `id` whose kind satisfies `pred`
    pub fn find_child(&self, id: NodeId, pred: impl Fn(&NodeKind) -> bool) -> Option<NodeId> {
        self.children(id).iter().copied().find(|&c| pred(self.kind(c)))
    }

    /// The single class declaration under the program root
    pub fn class_decl(&self) -> Result<NodeId> {
        let root = self.root;
        if matches!(self.kind(root), NodeKind::ClassDeclaration { .. }) {
            return Ok(root);
        }
        self.find_child(root, |k| matches!(k, NodeKind::ClassDeclaration { .. }))
            .ok_or_else(|| Error::malformed(root.0, "program has no class declaration"))
    }

    fn check_detached(&self, id: NodeId) -> Result<()> {
        if self.parent(id).is_some() || id == self.root {
            return Err(Error::malformed(id.0, "node is already attached to the tree"));
        }
        Ok(())
    }
}
