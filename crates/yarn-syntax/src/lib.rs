//! Lossless syntax tree for Yarn dialogue scripts.
//!
//! The tree has two layers: an immutable, structurally shared green tree
//! that stores kinds, text and trivia, and a red view of positioned,
//! parent-linked handles created on demand while walking it.

/// Typed AST wrappers around the raw syntax tree.
pub mod ast;
mod builder;
mod green;
mod syntax;
mod syntax_kind;
mod syntax_set;
mod trivia;

/// Incremental builder for constructing a green tree.
pub use builder::Builder;
/// Immutable tree storage.
pub use green::{GreenElement, GreenNode, GreenToken, GreenTrivia};
/// Positioned tree API.
pub use syntax::{
    NodeOrToken, Preorder, SyntaxElement, SyntaxElementChildren, SyntaxNode, SyntaxToken,
    WalkEvent,
};
/// Token and node kinds used throughout the tree.
pub use syntax_kind::SyntaxKind;
/// Compact set for grouping `SyntaxKind` values.
pub use syntax_set::SyntaxSet;
/// Trivia pieces attached to tokens.
pub use trivia::{TriviaPiece, TriviaPieceKind};
