//! Trivia pieces attached to tokens.

use text_size::TextSize;

/// Kinds of trivia stored alongside tokens.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TriviaPieceKind {
    /// Spaces and tabs.
    Whitespace,
    /// A line break inside a skipped blank or comment-only line.
    Newline,
    /// `//` to the end of the line.
    SingleLineComment,
}

impl TriviaPieceKind {
    pub fn syntax_kind(self) -> crate::SyntaxKind {
        match self {
            Self::Whitespace => crate::SyntaxKind::WHITESPACE,
            Self::Newline => crate::SyntaxKind::LINE_BREAK,
            Self::SingleLineComment => crate::SyntaxKind::COMMENT,
        }
    }
}

/// A trivia fragment with its kind and length.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TriviaPiece {
    pub kind: TriviaPieceKind,
    pub len: TextSize,
}

impl TriviaPiece {
    /// Creates a new trivia piece with the given kind and length.
    pub fn new(kind: TriviaPieceKind, len: TextSize) -> Self {
        Self { kind, len }
    }
}
