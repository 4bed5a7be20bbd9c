//! Diagnostics produced while scanning and parsing.
//!
//! Parsing never fails outright; instead every problem becomes a
//! [`Diagnostic`] with a machine-readable [`DiagnosticKind`], a byte span and
//! the matching line/column positions.

use std::fmt::{self, Display};

pub use annotate_snippets::Renderer;
use annotate_snippets::{Level, Snippet};
pub use line_index::LineIndex;
pub use text_size::{TextRange, TextSize};

/// Problems detected by the tokenizer. Each one is confined to a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum LexicalError {
    #[error("indentation does not match any enclosing block")]
    IndentationMismatch,
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated escape sequence")]
    UnterminatedEscape,
    #[error("unexpected character")]
    UnexpectedCharacter,
    #[error("unmatched `}}`")]
    UnmatchedBrace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum SyntaxError {
    #[error("unexpected token")]
    UnexpectedToken,
    #[error("missing end marker")]
    MissingEndMarker,
    #[error("node has no title")]
    MissingTitle,
    #[error("node has more than one title")]
    DuplicateTitle,
    #[error("clause does not belong to any open statement")]
    UnresolvedAmbiguity,
    #[error("file contains no nodes")]
    EmptyFile,
    #[error("parsing was cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    Lexical(LexicalError),
    Syntax(SyntaxError),
}

impl DiagnosticKind {
    /// A stable identifier, suitable for matching in tests and tools.
    pub fn code(self) -> &'static str {
        match self {
            Self::Lexical(LexicalError::IndentationMismatch) => "indentation-mismatch",
            Self::Lexical(LexicalError::UnterminatedString) => "unterminated-string",
            Self::Lexical(LexicalError::UnterminatedEscape) => "unterminated-escape",
            Self::Lexical(LexicalError::UnexpectedCharacter) => "unexpected-character",
            Self::Lexical(LexicalError::UnmatchedBrace) => "unmatched-brace",
            Self::Syntax(SyntaxError::UnexpectedToken) => "unexpected-token",
            Self::Syntax(SyntaxError::MissingEndMarker) => "missing-end-marker",
            Self::Syntax(SyntaxError::MissingTitle) => "missing-title",
            Self::Syntax(SyntaxError::DuplicateTitle) => "duplicate-title",
            Self::Syntax(SyntaxError::UnresolvedAmbiguity) => "unresolved-ambiguity",
            Self::Syntax(SyntaxError::EmptyFile) => "empty-file",
            Self::Syntax(SyntaxError::Cancelled) => "cancelled",
        }
    }

    pub fn is_lexical(self) -> bool {
        matches!(self, Self::Lexical(_))
    }
}

impl From<LexicalError> for DiagnosticKind {
    fn from(error: LexicalError) -> Self {
        Self::Lexical(error)
    }
}

impl From<SyntaxError> for DiagnosticKind {
    fn from(error: SyntaxError) -> Self {
        Self::Syntax(error)
    }
}

impl Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lexical(error) => error.fmt(f),
            Self::Syntax(error) => error.fmt(f),
        }
    }
}

/// Zero-based line and byte column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

impl Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

impl LineCol {
    pub fn of(index: &LineIndex, offset: TextSize) -> Self {
        let line_col = index.line_col(offset);
        Self { line: line_col.line, col: line_col.col }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    kind: DiagnosticKind,
    message: String,
    range: TextRange,
    start: LineCol,
    end: LineCol,
}

impl Diagnostic {
    /// Creates a diagnostic whose line/column positions are filled in later
    /// by [`Diagnostic::locate`].
    pub fn new(kind: impl Into<DiagnosticKind>, message: impl Into<String>, range: TextRange) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            range,
            start: LineCol::default(),
            end: LineCol::default(),
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn start(&self) -> LineCol {
        self.start
    }

    pub fn end(&self) -> LineCol {
        self.end
    }

    pub fn locate(&mut self, index: &LineIndex) {
        self.start = LineCol::of(index, self.range.start());
        self.end = LineCol::of(index, self.range.end());
    }

    /// Moves the span by `delta` bytes, keeping its length.
    pub fn shift(&mut self, delta: i64) {
        let start = i64::from(u32::from(self.range.start())) + delta;
        let start = TextSize::new(u32::try_from(start.max(0)).unwrap_or(u32::MAX));
        self.range = TextRange::at(start, self.range.len());
    }

    pub fn render<'a>(
        &'a self,
        renderer: &'a Renderer,
        path: &'a str,
        text: &'a str,
    ) -> impl Display + 'a {
        let message = Level::Error.title(&self.message).id(self.kind.code()).snippet(
            Snippet::source(text)
                .origin(path)
                .annotation(Level::Error.span(self.range.into()).label(self.kind.code()))
                .fold(true),
        );
        renderer.render(message)
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} [{}]", self.start, self.message, self.kind.code())
    }
}

/// Fills in line/column positions for every diagnostic.
pub fn locate_all(diagnostics: &mut [Diagnostic], text: &str) {
    let index = LineIndex::new(text);
    for diagnostic in diagnostics {
        diagnostic.locate(&index);
    }
}
