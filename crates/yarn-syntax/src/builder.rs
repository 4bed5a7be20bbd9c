//! Incremental builder for the green tree.

use text_size::TextSize;

use crate::green::{GreenElement, GreenNode, GreenToken, GreenTrivia};
use crate::{NodeOrToken, SyntaxKind};

const DEFAULT_TREE_DEPTH: usize = 64;
const DEFAULT_CHILDREN_LEN: usize = 256;

/// Builds a [`GreenNode`] from a stream of start/token/finish calls.
///
/// Token text is sliced out of the source in order, so the builder only needs
/// lengths from the caller.
pub struct Builder<'a> {
    text: &'a str,
    offset: TextSize,
    parents: Vec<(SyntaxKind, usize)>,
    children: Vec<GreenElement>,
}

impl Drop for Builder<'_> {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.parents.is_empty() {
            panic!("you should call `Builder::finish()`");
        }
    }
}

impl<'a> Builder<'a> {
    pub fn new(text: &'a str) -> Self {
        Self::at(text, TextSize::new(0))
    }

    /// Starts building at `offset` inside `text`, for subtrees that are
    /// spliced back into an existing tree.
    pub fn at(text: &'a str, offset: TextSize) -> Self {
        Self {
            text,
            offset,
            parents: Vec::with_capacity(DEFAULT_TREE_DEPTH),
            children: Vec::with_capacity(DEFAULT_CHILDREN_LEN),
        }
    }

    pub fn offset(&self) -> TextSize {
        self.offset
    }

    pub fn start_node(&mut self, kind: SyntaxKind) {
        self.parents.push((kind, self.children.len()));
    }

    pub fn token(
        &mut self,
        leading: GreenTrivia,
        kind: SyntaxKind,
        len: TextSize,
        trailing: GreenTrivia,
    ) {
        let start = self.offset;
        let end = start + leading.len() + len + trailing.len();
        let text = &self.text[usize::from(start)..usize::from(end)];
        self.offset = end;

        let token = GreenToken::new(leading, kind, text, trailing);
        self.children.push(NodeOrToken::Token(token));
    }

    pub fn finish_node(&mut self) {
        let Some((kind, first_child)) = self.parents.pop() else {
            panic!("unbalanced `finish_node`");
        };

        let children = self.children.split_off(first_child);
        let node = GreenNode::new(kind, children);
        self.children.push(NodeOrToken::Node(node));
    }

    pub fn finish(mut self) -> GreenNode {
        assert!(self.parents.is_empty(), "unclosed nodes left in the builder");
        assert_eq!(self.children.len(), 1, "the builder must produce exactly one root");

        match self.children.pop() {
            Some(NodeOrToken::Node(node)) => node,
            _ => panic!("the root must be a node"),
        }
    }
}
