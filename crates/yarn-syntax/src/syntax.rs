//! Positioned, parent-linked view over the green tree.

use std::fmt;

use text_size::{TextRange, TextSize};
use triomphe::Arc;

use crate::green::{GreenElement, GreenNode, GreenToken, GreenTrivia};
use crate::{SyntaxKind, TriviaPieceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeOrToken<N, T> {
    Node(N),
    Token(T),
}

impl<N, T> NodeOrToken<N, T> {
    pub fn into_node(self) -> Option<N> {
        match self {
            NodeOrToken::Node(node) => Some(node),
            NodeOrToken::Token(_) => None,
        }
    }

    pub fn into_token(self) -> Option<T> {
        match self {
            NodeOrToken::Node(_) => None,
            NodeOrToken::Token(token) => Some(token),
        }
    }
}

pub type SyntaxElement = NodeOrToken<SyntaxNode, SyntaxToken>;

impl SyntaxElement {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            NodeOrToken::Node(node) => node.kind(),
            NodeOrToken::Token(token) => token.kind(),
        }
    }

    pub fn text_range(&self) -> TextRange {
        match self {
            NodeOrToken::Node(node) => node.text_range(),
            NodeOrToken::Token(token) => token.text_range(),
        }
    }

    fn new(parent: &SyntaxNode, index: usize, offset: TextSize, green: &GreenElement) -> Self {
        match green {
            NodeOrToken::Node(green) => NodeOrToken::Node(SyntaxNode(Arc::new(NodeData {
                parent: Some(parent.clone()),
                index: index as u32,
                offset,
                green: green.clone(),
            }))),
            NodeOrToken::Token(green) => NodeOrToken::Token(SyntaxToken {
                parent: parent.clone(),
                index: index as u32,
                offset,
                green: green.clone(),
            }),
        }
    }
}

struct NodeData {
    parent: Option<SyntaxNode>,
    index: u32,
    offset: TextSize,
    green: GreenNode,
}

/// A node handle that knows its absolute position and its parent.
///
/// Handles are created on demand while walking down from the root and are
/// cheap to clone.
#[derive(Clone)]
pub struct SyntaxNode(Arc<NodeData>);

impl PartialEq for SyntaxNode {
    fn eq(&self, other: &Self) -> bool {
        self.0.offset == other.0.offset && self.0.green.ptr_eq(&other.0.green)
    }
}

impl Eq for SyntaxNode {}

impl SyntaxNode {
    pub fn new_root(green: GreenNode) -> Self {
        Self(Arc::new(NodeData { parent: None, index: 0, offset: TextSize::new(0), green }))
    }

    pub fn kind(&self) -> SyntaxKind {
        self.0.green.kind()
    }

    pub fn green(&self) -> &GreenNode {
        &self.0.green
    }

    /// Position of this node among its parent's children, tokens included.
    pub fn index(&self) -> usize {
        self.0.index as usize
    }

    pub fn text_range(&self) -> TextRange {
        TextRange::at(self.0.offset, self.0.green.text_len())
    }

    /// The range without the leading trivia of the first token and the
    /// trailing trivia of the last one.
    pub fn trimmed_range(&self) -> TextRange {
        match (self.first_token(), self.last_token()) {
            (Some(first), Some(last)) => {
                let start = first.trimmed_range().start();
                let end = last.trimmed_range().end().max(start);
                TextRange::new(start, end)
            }
            _ => TextRange::empty(self.0.offset),
        }
    }

    pub fn text(&self) -> String {
        let mut buf = String::with_capacity(self.0.green.text_len().into());
        self.0.green.write_text(&mut buf);
        buf
    }

    pub fn text_trimmed(&self) -> String {
        let text = self.text();
        let range = self.trimmed_range() - self.0.offset;
        text[range].to_owned()
    }

    pub fn parent(&self) -> Option<&SyntaxNode> {
        self.0.parent.as_ref()
    }

    /// `self`, then every enclosing node up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = SyntaxNode> + use<> {
        std::iter::successors(Some(self.clone()), |node| node.parent().cloned())
    }

    pub fn children_with_tokens(&self) -> SyntaxElementChildren {
        SyntaxElementChildren { parent: self.clone(), next: 0, offset: self.0.offset }
    }

    pub fn children(&self) -> impl Iterator<Item = SyntaxNode> + use<> {
        self.children_with_tokens().filter_map(NodeOrToken::into_node)
    }

    pub fn tokens(&self) -> impl Iterator<Item = SyntaxToken> + use<> {
        self.children_with_tokens().filter_map(NodeOrToken::into_token)
    }

    pub fn first_child(&self) -> Option<SyntaxNode> {
        self.children().next()
    }

    pub fn next_sibling(&self) -> Option<SyntaxNode> {
        let parent = self.parent()?.clone();
        let siblings = SyntaxElementChildren {
            parent,
            next: self.index() + 1,
            offset: self.text_range().end(),
        };
        siblings.filter_map(NodeOrToken::into_node).next()
    }

    pub fn first_token(&self) -> Option<SyntaxToken> {
        self.children_with_tokens().find_map(|element| match element {
            NodeOrToken::Node(node) => node.first_token(),
            NodeOrToken::Token(token) => Some(token),
        })
    }

    pub fn last_token(&self) -> Option<SyntaxToken> {
        let elements: Vec<_> = self.children_with_tokens().collect();
        elements.into_iter().rev().find_map(|element| match element {
            NodeOrToken::Node(node) => node.last_token(),
            NodeOrToken::Token(token) => Some(token),
        })
    }

    pub fn preorder(&self) -> Preorder {
        Preorder::new(self.clone())
    }

    /// All nodes in this subtree, `self` included, in document order.
    pub fn descendants(&self) -> impl Iterator<Item = SyntaxNode> + use<> {
        self.preorder().filter_map(|event| match event {
            WalkEvent::Enter(node) => Some(node),
            WalkEvent::Leave(_) => None,
        })
    }

    /// All tokens in this subtree in document order.
    pub fn descendant_tokens(&self) -> Vec<SyntaxToken> {
        let mut tokens = Vec::new();
        self.collect_tokens(&mut tokens);
        tokens
    }

    fn collect_tokens(&self, acc: &mut Vec<SyntaxToken>) {
        for element in self.children_with_tokens() {
            match element {
                NodeOrToken::Node(node) => node.collect_tokens(acc),
                NodeOrToken::Token(token) => acc.push(token),
            }
        }
    }
}

impl fmt::Debug for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.text_range())
    }
}

pub struct SyntaxElementChildren {
    parent: SyntaxNode,
    next: usize,
    offset: TextSize,
}

impl Iterator for SyntaxElementChildren {
    type Item = SyntaxElement;

    fn next(&mut self) -> Option<Self::Item> {
        let green = self.parent.green().children().get(self.next)?;
        let element = SyntaxElement::new(&self.parent, self.next, self.offset, green);

        self.next += 1;
        self.offset += green.text_len();

        Some(element)
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct SyntaxToken {
    parent: SyntaxNode,
    index: u32,
    offset: TextSize,
    green: GreenToken,
}

impl SyntaxToken {
    pub fn kind(&self) -> SyntaxKind {
        self.green.kind()
    }

    pub fn green(&self) -> &GreenToken {
        &self.green
    }

    pub fn index(&self) -> usize {
        self.index as usize
    }

    /// Token text including trivia.
    pub fn text(&self) -> &str {
        self.green.text()
    }

    pub fn text_trimmed(&self) -> &str {
        self.green.text_trimmed()
    }

    pub fn text_range(&self) -> TextRange {
        TextRange::at(self.offset, self.green.text_len())
    }

    pub fn trimmed_range(&self) -> TextRange {
        let range = self.text_range();
        let start = range.start() + self.green.leading().len();
        let end = range.end() - self.green.trailing().len();
        TextRange::new(start, end)
    }

    pub fn parent(&self) -> &SyntaxNode {
        &self.parent
    }

    pub fn leading_trivia(&self) -> impl Iterator<Item = (TriviaPieceKind, TextRange)> + use<> {
        trivia_ranges(self.green.leading().clone(), self.offset)
    }

    pub fn trailing_trivia(&self) -> impl Iterator<Item = (TriviaPieceKind, TextRange)> + use<> {
        trivia_ranges(self.green.trailing().clone(), self.trimmed_range().end())
    }
}

fn trivia_ranges(
    trivia: GreenTrivia,
    mut offset: TextSize,
) -> impl Iterator<Item = (TriviaPieceKind, TextRange)> {
    let pieces = trivia.pieces().to_vec();
    pieces.into_iter().map(move |piece| {
        let range = TextRange::at(offset, piece.len);
        offset += piece.len;
        (piece.kind, range)
    })
}

impl fmt::Debug for SyntaxToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?} {:?}", self.kind(), self.trimmed_range(), self.text_trimmed())
    }
}

pub struct Preorder {
    start: SyntaxNode,
    next: Option<WalkEvent>,
    skip_subtree: bool,
}

impl Preorder {
    fn new(start: SyntaxNode) -> Self {
        let next = Some(WalkEvent::Enter(start.clone()));
        Self { start, next, skip_subtree: false }
    }

    pub fn skip_subtree(&mut self) {
        self.skip_subtree = true;
    }
}

impl Iterator for Preorder {
    type Item = WalkEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.skip_subtree {
            self.next = self.next.take().and_then(|next| match next {
                WalkEvent::Enter(first_child) => first_child.parent().cloned().map(WalkEvent::Leave),
                WalkEvent::Leave(parent) => Some(WalkEvent::Leave(parent)),
            });
            self.skip_subtree = false;
        }

        let next = self.next.take();

        self.next = next.as_ref().and_then(|event| {
            Some(match event {
                WalkEvent::Enter(node) => match node.first_child() {
                    Some(child) => WalkEvent::Enter(child),
                    None => WalkEvent::Leave(node.clone()),
                },
                WalkEvent::Leave(node) => {
                    if node == &self.start {
                        return None;
                    }

                    match node.next_sibling() {
                        Some(sibling) => WalkEvent::Enter(sibling),
                        None => WalkEvent::Leave(node.parent()?.clone()),
                    }
                }
            })
        });

        next
    }
}

#[derive(Debug, Clone)]
pub enum WalkEvent {
    Enter(SyntaxNode),
    Leave(SyntaxNode),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Builder, TriviaPiece};

    fn tree() -> SyntaxNode {
        let text = "  a b\n";
        let mut builder = Builder::new(text);
        builder.start_node(SyntaxKind::SOURCE_FILE);
        builder.start_node(SyntaxKind::LINE_TEXT);
        builder.token(
            GreenTrivia::new(&[TriviaPiece::new(TriviaPieceKind::Whitespace, 2.into())]),
            SyntaxKind::TEXT,
            1.into(),
            GreenTrivia::new(&[TriviaPiece::new(TriviaPieceKind::Whitespace, 1.into())]),
        );
        builder.token(GreenTrivia::empty(), SyntaxKind::TEXT, 1.into(), GreenTrivia::empty());
        builder.finish_node();
        builder.token(GreenTrivia::empty(), SyntaxKind::NEWLINE, 1.into(), GreenTrivia::empty());
        builder.finish_node();
        SyntaxNode::new_root(builder.finish())
    }

    #[test]
    fn ranges() {
        let root = tree();
        let line = root.first_child().unwrap();

        assert_eq!(root.text(), "  a b\n");
        assert_eq!(line.text_range(), TextRange::new(0.into(), 5.into()));
        assert_eq!(line.trimmed_range(), TextRange::new(2.into(), 5.into()));
        assert_eq!(line.text_trimmed(), "a b");

        let first = line.first_token().unwrap();
        assert_eq!(first.text(), "  a ");
        assert_eq!(first.text_trimmed(), "a");
        let leading: Vec<_> = first.leading_trivia().collect();
        assert_eq!(
            leading,
            vec![(TriviaPieceKind::Whitespace, TextRange::new(0.into(), 2.into()))]
        );
        let trailing: Vec<_> = first.trailing_trivia().collect();
        assert_eq!(
            trailing,
            vec![(TriviaPieceKind::Whitespace, TextRange::new(3.into(), 4.into()))]
        );
    }

    #[test]
    fn navigation() {
        let root = tree();
        let kinds: Vec<_> = root.descendants().map(|node| node.kind()).collect();
        assert_eq!(kinds, vec![SyntaxKind::SOURCE_FILE, SyntaxKind::LINE_TEXT]);

        let last = root.last_token().unwrap();
        assert_eq!(last.kind(), SyntaxKind::NEWLINE);
        assert_eq!(last.parent(), &root);

        let line = root.first_child().unwrap();
        assert_eq!(line.ancestors().count(), 2);
        assert!(line.next_sibling().is_none());
    }
}
