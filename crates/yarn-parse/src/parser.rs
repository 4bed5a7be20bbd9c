use drop_bomb::DropBomb;
use text_size::{TextRange, TextSize};
use yarn_errors::{Diagnostic, SyntaxError};
use yarn_syntax::{Builder, GreenNode, SyntaxKind, SyntaxSet};
use yarn_tokenizer::{IndentStack, LexMode, ScannerConfig, Token, Tokenizer};

use crate::Checkpoint;

/// How deep statements and expressions may nest before the parser stops
/// descending and reports an error.
const MAX_DEPTH: u32 = 128;

pub(crate) struct Parser<'a> {
    text: &'a str,
    start: TextSize,
    tokenizer: Tokenizer<'a>,
    events: Vec<Event>,
    diagnostics: Vec<Diagnostic>,
    checkpoints: Vec<Checkpoint>,
    cancel: Option<&'a dyn Fn() -> bool>,
    cancelled: bool,
    depth: u32,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(text: &'a str, config: ScannerConfig) -> Self {
        Self::resume(text, TextSize::new(0), IndentStack::new(), config)
    }

    pub(crate) fn resume(
        text: &'a str,
        offset: TextSize,
        stack: IndentStack,
        config: ScannerConfig,
    ) -> Self {
        Self {
            text,
            start: offset,
            tokenizer: Tokenizer::resume(text, offset, stack, config),
            events: Vec::new(),
            diagnostics: Vec::new(),
            checkpoints: Vec::new(),
            cancel: None,
            cancelled: false,
            depth: 0,
        }
    }

    pub(crate) fn with_cancel(mut self, cancel: &'a dyn Fn() -> bool) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub(crate) fn config(&self) -> &ScannerConfig {
        self.tokenizer.config()
    }

    pub(crate) fn offset(&self) -> TextSize {
        self.tokenizer.offset()
    }

    pub(crate) fn peek(&mut self, mode: LexMode) -> &Token {
        self.tokenizer.peek(mode)
    }

    pub(crate) fn peek_kind(&mut self, mode: LexMode) -> SyntaxKind {
        self.tokenizer.peek(mode).kind
    }

    /// The keyword following `<<` when the next token is a command start.
    pub(crate) fn at_command(&mut self, mode: LexMode) -> Option<SyntaxKind> {
        self.tokenizer.peek_command_keyword(mode)
    }

    pub(crate) fn at(&mut self, mode: LexMode, kind: SyntaxKind) -> bool {
        self.peek_kind(mode) == kind
    }

    pub(crate) fn at_set(&mut self, mode: LexMode, set: &SyntaxSet) -> bool {
        set.contains(self.peek_kind(mode))
    }

    pub(crate) fn at_line_end(&mut self, mode: LexMode) -> bool {
        matches!(self.peek_kind(mode), SyntaxKind::NEWLINE | SyntaxKind::EOF)
    }

    pub(crate) fn advance(&mut self, mode: LexMode) {
        if self.peek_kind(mode) == SyntaxKind::EOF {
            return;
        }

        let token = self.tokenizer.bump(mode);
        self.diagnostics.append(&mut self.tokenizer.take_diagnostics());
        self.events.push(Event::Token(token));
    }

    pub(crate) fn eat(&mut self, mode: LexMode, kind: SyntaxKind) -> bool {
        if self.at(mode, kind) {
            self.advance(mode);
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, mode: LexMode, kind: SyntaxKind, message: &str) -> bool {
        if self.eat(mode, kind) {
            return true;
        }

        self.error(mode, message);
        false
    }

    /// Consumes the EOF token itself, which `advance` never does.
    pub(crate) fn eof(&mut self) {
        let token = self.tokenizer.bump(LexMode::Header);
        debug_assert_eq!(token.kind, SyntaxKind::EOF);
        self.events.push(Event::Token(token));
    }

    /// Consumes everything that is left as a single ERROR_TOKEN.
    pub(crate) fn advance_rest(&mut self) {
        if let Some(token) = self.tokenizer.bump_rest() {
            self.events.push(Event::Token(token));
        }
    }

    /// Runs `f` one level deeper, or returns `None` without running it once
    /// the nesting limit is reached.
    pub(crate) fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> Option<T> {
        if self.depth >= MAX_DEPTH {
            return None;
        }

        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        Some(result)
    }

    pub(crate) fn start(&mut self) -> Marker {
        let pos = self.events.len() as u32;
        self.events.push(Event::TOMBSTONE);
        Marker::new(pos)
    }

    /// Reports an unexpected token at the current position.
    pub(crate) fn error(&mut self, mode: LexMode, message: &str) {
        self.error_kind(mode, SyntaxError::UnexpectedToken, message);
    }

    pub(crate) fn error_kind(&mut self, mode: LexMode, kind: SyntaxError, message: &str) {
        let token = self.tokenizer.peek(mode);
        // The tokenizer reports its own error for an error token.
        if token.kind == SyntaxKind::ERROR_TOKEN {
            return;
        }

        let range = token.kind_range;
        self.error_at(range, kind, message);
    }

    pub(crate) fn error_at(&mut self, range: TextRange, kind: SyntaxError, message: &str) {
        if self.cancelled {
            return;
        }

        self.diagnostics.push(Diagnostic::new(kind, message, range));
    }

    /// Reports an error and, unless the current token belongs to `recovery`
    /// or ends the line, wraps it in an ERROR node.
    pub(crate) fn error_recover(&mut self, mode: LexMode, message: &str, recovery: &SyntaxSet) {
        self.error(mode, message);

        if self.at_set(mode, recovery) || self.at_line_end(mode) {
            return;
        }

        let m = self.start();
        self.advance(mode);
        m.complete(self, SyntaxKind::ERROR);
    }

    /// Reports an error and wraps the rest of the line, without its line
    /// break, in an ERROR node.
    pub(crate) fn error_line(&mut self, mode: LexMode, message: &str) {
        self.error(mode, message);
        self.skip_line(mode);
    }

    pub(crate) fn skip_line(&mut self, mode: LexMode) {
        if self.at_line_end(mode) {
            return;
        }

        let m = self.start();
        self.advance(mode);
        while !self.at_line_end(LexMode::Text) {
            self.advance(LexMode::Text);
        }
        m.complete(self, SyntaxKind::ERROR);
    }

    /// Polls the cancellation callback. Once it has fired, it stays fired.
    pub(crate) fn cancelled(&mut self) -> bool {
        if !self.cancelled && self.cancel.is_some_and(|cancel| cancel()) {
            self.cancelled = true;
            let range = TextRange::empty(self.offset());
            self.diagnostics.push(Diagnostic::new(
                SyntaxError::Cancelled,
                SyntaxError::Cancelled.to_string(),
                range,
            ));
        }
        self.cancelled
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub(crate) fn checkpoint(&mut self) {
        let checkpoint = Checkpoint {
            offset: self.offset(),
            state: self.tokenizer.stack().serialize(),
            diagnostics: self.diagnostics.len(),
        };
        self.checkpoints.push(checkpoint);
    }

    /// The serialized indentation state at the current position.
    pub(crate) fn state(&self) -> Vec<u8> {
        self.tokenizer.stack().serialize()
    }

    pub(crate) fn build_tree(self) -> (GreenNode, Vec<Diagnostic>, Vec<Checkpoint>) {
        let Parser { text, start, tokenizer, mut events, mut diagnostics, checkpoints, .. } = self;
        let (rest, _) = tokenizer.finish();
        diagnostics.extend(rest);

        let mut builder = Builder::at(text, start);
        let mut forward_parents = Vec::new();

        for i in 0..events.len() {
            match std::mem::replace(&mut events[i], Event::TOMBSTONE) {
                Event::Start { kind, forward_parent } => {
                    if kind == SyntaxKind::TOMBSTONE {
                        continue;
                    }

                    forward_parents.push(kind);
                    let mut idx = i;
                    let mut fp = forward_parent;
                    while let Some(fwd) = fp {
                        idx += fwd as usize;

                        fp = match std::mem::replace(&mut events[idx], Event::TOMBSTONE) {
                            Event::Start { kind, forward_parent, .. } => {
                                if kind != SyntaxKind::TOMBSTONE {
                                    forward_parents.push(kind);
                                }
                                forward_parent
                            }
                            _ => unreachable!(),
                        };
                    }

                    for kind in forward_parents.drain(..).rev() {
                        builder.start_node(kind);
                    }
                }
                Event::Finish => {
                    builder.finish_node();
                }
                Event::Token(Token { leading, kind, kind_range, trailing }) => {
                    builder.token(leading, kind, kind_range.len(), trailing);
                }
            }
        }

        (builder.finish(), diagnostics, checkpoints)
    }
}

enum Event {
    Start { kind: SyntaxKind, forward_parent: Option<u32> },
    Token(Token),
    Finish,
}

impl Event {
    const TOMBSTONE: Self = Event::Start { kind: SyntaxKind::TOMBSTONE, forward_parent: None };
}

pub(crate) struct Marker {
    position: u32,
    bomb: DropBomb,
}

impl Marker {
    fn new(pos: u32) -> Marker {
        Marker {
            position: pos,
            bomb: DropBomb::new("Marker must be either completed or abandoned"),
        }
    }

    pub(crate) fn complete(mut self, p: &mut Parser<'_>, kind: SyntaxKind) -> CompletedMarker {
        self.bomb.defuse();

        match &mut p.events[self.position as usize] {
            Event::Start { kind: slot, .. } => {
                *slot = kind;
            }
            _ => unreachable!(),
        }

        p.events.push(Event::Finish);
        CompletedMarker::new(self.position, kind)
    }

    pub(crate) fn abandon(mut self, p: &mut Parser<'_>) {
        self.bomb.defuse();

        if self.position as usize == p.events.len() - 1 {
            match p.events.pop() {
                Some(Event::Start { kind: SyntaxKind::TOMBSTONE, forward_parent: None }) => {}
                _ => unreachable!(),
            }
        }
    }
}

pub(crate) struct CompletedMarker {
    pos: u32,
    kind: SyntaxKind,
}

impl CompletedMarker {
    fn new(pos: u32, kind: SyntaxKind) -> Self {
        CompletedMarker { pos, kind }
    }

    pub(crate) fn kind(&self) -> SyntaxKind {
        self.kind
    }

    pub(crate) fn precede(self, p: &mut Parser<'_>) -> Marker {
        let new_pos = p.start();

        match &mut p.events[self.pos as usize] {
            Event::Start { forward_parent, .. } => {
                *forward_parent = Some(new_pos.position - self.pos);
            }
            _ => unreachable!(),
        }

        new_pos
    }
}
