//! Mode-driven tokenizer with indentation tracking.
//!
//! The parser asks for one token at a time and says which [`LexMode`] it is
//! in; keywords are only recognized where that mode expects them. At the
//! start of each statement line the tokenizer compares the line's
//! indentation with its [`IndentStack`] and hands out the synthesized
//! INDENT, DEDENT and BLANK_LINE tokens before the line's first real token.

mod config;
mod cursor;
mod indent;
mod mode;

use cursor::{Cursor, newline_len};
pub use config::{OptionBreak, ScannerConfig};
pub use indent::{IndentStack, StateError};
use indent::measure;
pub use mode::{LexMode, command_keyword, command_keyword_at};
use mode::{header_keyword, ident_len, is_ident_continue, is_ident_start};
use text_size::{TextLen, TextRange, TextSize};
use tracing::trace;
use yarn_errors::{Diagnostic, LexicalError, LineCol, LineIndex};
pub use yarn_syntax::SyntaxKind;
use yarn_syntax::SyntaxKind::*;
use yarn_syntax::{GreenTrivia, TriviaPiece, TriviaPieceKind};

/// A lexed token with its trivia. Positions are byte offsets; line and
/// column come from [`Token::start`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub leading: GreenTrivia,
    pub kind: SyntaxKind,
    pub kind_range: TextRange,
    pub trailing: GreenTrivia,
}

impl Token {
    /// The span including leading and trailing trivia.
    pub fn range(&self) -> TextRange {
        TextRange::new(
            self.kind_range.start() - self.leading.len(),
            self.kind_range.end() + self.trailing.len(),
        )
    }

    /// Line and column where the token's own text begins.
    pub fn start(&self, index: &LineIndex) -> LineCol {
        LineCol::of(index, self.kind_range.start())
    }

    fn bare(kind: SyntaxKind, kind_range: TextRange) -> Self {
        Self { leading: GreenTrivia::empty(), kind, kind_range, trailing: GreenTrivia::empty() }
    }
}

/// What bumping a token does to the tokenizer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Effect {
    Dedent,
    Blank,
    Indent(u16),
    Content,
}

#[derive(Debug, Clone)]
struct Lexed {
    mode: LexMode,
    token: Token,
    error: Option<LexicalError>,
    effect: Effect,
}

/// Indentation decisions for the line at the current position, computed
/// once and consumed token by token.
#[derive(Debug, Clone)]
struct LinePlan {
    content: TextSize,
    dedents: usize,
    indent: Option<u16>,
    blank: Option<TextRange>,
    mismatch: bool,
}

pub struct Tokenizer<'a> {
    text: &'a str,
    config: ScannerConfig,
    offset: TextSize,
    stack: IndentStack,
    line_start: bool,
    line: Option<LinePlan>,
    peeked: Option<Lexed>,
    trivia_pieces: Vec<TriviaPiece>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(text: &'a str, config: ScannerConfig) -> Self {
        Self::resume(text, TextSize::new(0), IndentStack::new(), config)
    }

    /// Starts at the beginning of the line at `offset` with a stack restored
    /// from an earlier run.
    pub fn resume(text: &'a str, offset: TextSize, stack: IndentStack, config: ScannerConfig) -> Self {
        Self {
            text,
            config,
            offset,
            stack,
            line_start: true,
            line: None,
            peeked: None,
            trivia_pieces: Vec::with_capacity(4),
            diagnostics: Vec::new(),
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// End of the last consumed token.
    pub fn offset(&self) -> TextSize {
        self.offset
    }

    pub fn stack(&self) -> &IndentStack {
        &self.stack
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Moves out the diagnostics reported so far.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn finish(self) -> (Vec<Diagnostic>, IndentStack) {
        (self.diagnostics, self.stack)
    }

    pub fn peek(&mut self, mode: LexMode) -> &Token {
        let lexed = match self.peeked.take() {
            Some(lexed) if lexed.mode == mode => lexed,
            _ => self.lex(mode),
        };
        &self.peeked.insert(lexed).token
    }

    /// The command keyword after the `<<` at the current position, if the
    /// next token in `mode` is a `<<`.
    pub fn peek_command_keyword(&mut self, mode: LexMode) -> Option<SyntaxKind> {
        let token = self.peek(mode);
        if token.kind != COMMAND_START {
            return None;
        }
        let after = usize::from(token.kind_range.end());
        command_keyword_at(&self.text[after..])
    }

    pub fn bump(&mut self, mode: LexMode) -> Token {
        let lexed = match self.peeked.take() {
            Some(lexed) if lexed.mode == mode => lexed,
            _ => self.lex(mode),
        };
        self.apply(lexed)
    }

    /// Consumes everything that is left as a single ERROR_TOKEN and drops any
    /// open blocks.
    pub fn bump_rest(&mut self) -> Option<Token> {
        self.peeked = None;
        self.line = None;
        self.line_start = false;
        self.stack = IndentStack::new();

        let end = self.text.text_len();
        if self.offset == end {
            return None;
        }

        let token = Token::bare(ERROR_TOKEN, TextRange::new(self.offset, end));
        self.offset = end;
        Some(token)
    }

    fn apply(&mut self, lexed: Lexed) -> Token {
        let Lexed { token, error, effect, .. } = lexed;

        if let Some(error) = error {
            self.diagnostics.push(Diagnostic::new(error, error.to_string(), token.kind_range));
        }

        match effect {
            Effect::Dedent => {
                let width = self.stack.pop();
                if let Some(plan) = &mut self.line {
                    plan.dedents -= 1;
                }
                trace!(?width, depth = self.stack.len(), "dedent");
            }
            Effect::Blank => {
                self.offset = token.range().end();
                if let Some(plan) = &mut self.line {
                    plan.blank = None;
                }
            }
            Effect::Indent(width) => {
                self.stack.push(width);
                self.offset = token.range().end();
                if let Some(plan) = &mut self.line {
                    plan.indent = None;
                }
                trace!(width, depth = self.stack.len(), "indent");
            }
            Effect::Content => {
                self.offset = token.range().end();
                self.line = None;
                self.line_start = token.kind == NEWLINE;
            }
        }

        token
    }

    fn lex(&mut self, mode: LexMode) -> Lexed {
        if !self.line_start && mode.is_indent_sensitive() && self.at_unterminated_end() {
            self.line_start = true;
        }

        if self.line_start {
            if self.line.is_none() && mode.is_indent_sensitive() {
                self.line = Some(self.plan_line());
            }

            if let Some(lexed) = self.structural(mode) {
                return lexed;
            }
        }

        let text = self.text;
        let mut cursor = Cursor::new(&text[usize::from(self.offset)..]);
        if self.line_start {
            self.skip_lines(&mut cursor);
        } else {
            self.leading(&mut cursor, mode);
        }
        let trailing_start = self.trivia_pieces.len();

        let leading_len: TextSize = self.trivia_pieces.iter().map(|piece| piece.len).sum();
        let kind_start = self.offset + leading_len;
        let (kind, error) = token_kind(&mut cursor, mode);
        let kind_range = TextRange::at(kind_start, cursor.pos_within_token());
        cursor.reset_pos_within_token();

        self.trailing(&mut cursor, mode, kind);

        let (leading, trailing) = self.trivia_pieces.split_at(trailing_start);
        let token = Token {
            leading: GreenTrivia::new(leading),
            kind,
            kind_range,
            trailing: GreenTrivia::new(trailing),
        };
        self.trivia_pieces.clear();

        Lexed { mode, token, error, effect: Effect::Content }
    }

    /// The last line has no newline and blocks are still open. End of input
    /// closes them the same way an empty final line does.
    fn at_unterminated_end(&self) -> bool {
        !self.stack.is_empty()
            && self.text[usize::from(self.offset)..].trim_start_matches([' ', '\t']).is_empty()
    }

    /// Pending INDENT/DEDENT/BLANK_LINE tokens of the current line.
    fn structural(&mut self, mode: LexMode) -> Option<Lexed> {
        let plan = self.line.clone()?;

        let lexed = |token, effect| Some(Lexed { mode, token, error: None, effect });

        if plan.dedents > 0 {
            return lexed(Token::bare(DEDENT, TextRange::empty(self.offset)), Effect::Dedent);
        }

        if mode == LexMode::AfterOption
            && let Some(blank) = plan.blank.filter(|blank| blank.start() == self.offset)
        {
            return lexed(Token::bare(BLANK_LINE, blank), Effect::Blank);
        }

        if let Some(width) = plan.indent {
            let leading = self.line_trivia();
            let token = Token {
                leading,
                kind: INDENT,
                kind_range: TextRange::empty(plan.content),
                trailing: GreenTrivia::empty(),
            };
            return lexed(token, Effect::Indent(width));
        }

        if plan.mismatch {
            let leading = self.line_trivia();
            let line = &self.text[usize::from(plan.content)..];
            let len = line.find(['\n', '\r']).unwrap_or(line.len());
            let token = Token {
                leading,
                kind: ERROR_TOKEN,
                kind_range: TextRange::at(plan.content, TextSize::new(len as u32)),
                trailing: GreenTrivia::empty(),
            };
            return Some(Lexed {
                mode,
                token,
                error: Some(LexicalError::IndentationMismatch),
                effect: Effect::Content,
            });
        }

        None
    }

    fn line_trivia(&mut self) -> GreenTrivia {
        let text = self.text;
        let mut cursor = Cursor::new(&text[usize::from(self.offset)..]);
        self.skip_lines(&mut cursor);
        let trivia = GreenTrivia::new(&self.trivia_pieces);
        self.trivia_pieces.clear();
        trivia
    }

    fn plan_line(&self) -> LinePlan {
        let rest = &self.text[usize::from(self.offset)..];
        let mut pos = 0;
        let mut blank = None;
        let mut first = true;

        let (content, indentation) = loop {
            let line_start = pos;
            pos += rest[pos..].len() - rest[pos..].trim_start_matches([' ', '\t']).len();
            let indent_end = pos;

            let line = &rest[pos..];
            if line.starts_with("//") {
                pos += line.find(['\n', '\r']).unwrap_or(line.len());
            } else if newline_len(line).is_none() {
                break (pos, &rest[line_start..indent_end]);
            }

            match newline_len(&rest[pos..]) {
                Some(len) => {
                    let is_blank = indent_end == pos;
                    pos += len;
                    if first && is_blank {
                        blank = Some(TextRange::new(
                            self.offset + TextSize::new(line_start as u32),
                            self.offset + TextSize::new(pos as u32),
                        ));
                    }
                    first = false;
                }
                None => break (pos, ""),
            }
        };

        let line = &rest[content..];
        let content = self.offset + TextSize::new(content as u32);
        let closing = line.is_empty()
            || line.starts_with("===")
            || header_keyword(line).is_some_and(|(kind, _)| kind == TITLE_KW);

        let mut plan = LinePlan { content, dedents: 0, indent: None, blank, mismatch: false };

        if closing {
            plan.dedents = self.stack.len();
        } else {
            let width = measure(indentation, self.config.tab_width);
            let widths = self.stack.widths();
            let kept = widths.iter().take_while(|&&level| level <= width).count();
            plan.dedents = widths.len() - kept;

            let top = if kept == 0 { 0 } else { widths[kept - 1] };
            if plan.dedents > 0 && top != width {
                plan.mismatch = true;
            } else if width > top {
                plan.indent = Some(width);
            }
        }

        trace!(
            offset = ?self.offset,
            dedents = plan.dedents,
            indent = ?plan.indent,
            blank = plan.blank.is_some(),
            mismatch = plan.mismatch,
            "line"
        );
        plan
    }

    fn push_piece(&mut self, cursor: &mut Cursor<'_>, kind: TriviaPieceKind) {
        self.trivia_pieces.push(TriviaPiece::new(kind, cursor.pos_within_token()));
        cursor.reset_pos_within_token();
    }

    /// Blank lines, comment-only lines and the indentation of the next
    /// content line.
    fn skip_lines(&mut self, cursor: &mut Cursor<'_>) {
        loop {
            if cursor.eat_horizontal_whitespace() {
                self.push_piece(cursor, TriviaPieceKind::Whitespace);
            }

            if cursor.eat_comment() {
                self.push_piece(cursor, TriviaPieceKind::SingleLineComment);
            }

            match cursor.newline_len() {
                Some(len) => {
                    cursor.advance_by(len);
                    self.push_piece(cursor, TriviaPieceKind::Newline);
                }
                None => break,
            }
        }
    }

    fn leading(&mut self, cursor: &mut Cursor<'_>, mode: LexMode) {
        let spaces = !matches!(mode, LexMode::Text | LexMode::Hashtag | LexMode::CommandText);
        if spaces && cursor.eat_horizontal_whitespace() {
            self.push_piece(cursor, TriviaPieceKind::Whitespace);
        }

        if mode.allows_comments() && cursor.eat_comment() {
            self.push_piece(cursor, TriviaPieceKind::SingleLineComment);
        }
    }

    fn trailing(&mut self, cursor: &mut Cursor<'_>, mode: LexMode, kind: SyntaxKind) {
        if matches!(kind, NEWLINE | EOF | HASH) || kind.is_structural() {
            return;
        }

        // Tokens that can be followed by more dialogue or command text keep
        // the spaces in front of it.
        let keeps_spaces = matches!(
            kind,
            TEXT | TEXT_ESCAPE
                | RIGHT_BRACE
                | COMMAND_END
                | HASHTAG_TEXT
                | COMMAND_TEXT
                | REST_OF_LINE
                | ERROR_TOKEN
        );
        let eat_spaces = !keeps_spaces || {
            let mut probe = cursor.clone();
            probe.eat_horizontal_whitespace();
            probe.at_line_end()
                || probe.starts_with("//")
                || probe.starts_with("#")
                || probe.starts_with("<<")
                || probe.starts_with(">>")
        };
        if eat_spaces && cursor.eat_horizontal_whitespace() {
            self.push_piece(cursor, TriviaPieceKind::Whitespace);
        }

        let comments = (mode.allows_comments() || kind == COMMAND_END)
            && !matches!(kind, COMMAND_START | LEFT_BRACE);
        if comments && cursor.eat_comment() {
            self.push_piece(cursor, TriviaPieceKind::SingleLineComment);
        }
    }
}

type Lexeme = (SyntaxKind, Option<LexicalError>);

fn token_kind(cursor: &mut Cursor<'_>, mode: LexMode) -> Lexeme {
    if cursor.is_eof() {
        return (EOF, None);
    }

    if let Some(len) = cursor.newline_len() {
        cursor.advance_by(len);
        return (NEWLINE, None);
    }

    match mode {
        LexMode::Header => header_token(cursor),
        LexMode::HeaderValue => rest_of_line(cursor),
        LexMode::Statement | LexMode::AfterOption => statement_token(cursor),
        LexMode::Text => text_token(cursor),
        LexMode::Hashtag => hashtag_token(cursor),
        LexMode::CommandText => command_text_token(cursor),
        LexMode::WhenHeader | LexMode::Command | LexMode::Expr | LexMode::Name => {
            expr_token(cursor, mode)
        }
    }
}

fn rest_of_line_error(cursor: &mut Cursor<'_>) -> Lexeme {
    cursor.advance_while(|c| c != '\n' && c != '\r');
    (ERROR_TOKEN, Some(LexicalError::UnexpectedCharacter))
}

fn header_token(cursor: &mut Cursor<'_>) -> Lexeme {
    let rest = cursor.rest();

    let (kind, len) = if rest.starts_with("---") {
        (BODY_START, 3)
    } else if rest.starts_with("===") {
        (BODY_END, 3)
    } else if let Some(keyword) = header_keyword(rest) {
        keyword
    } else if let Some(len) = ident_len(rest) {
        (IDENT, len)
    } else if rest.starts_with('#') {
        (HASH, 1)
    } else if rest.starts_with(':') {
        (COLON, 1)
    } else {
        return rest_of_line_error(cursor);
    };

    cursor.advance_by(len);
    (kind, None)
}

/// Header values run to the end of the line or to a comment, without
/// trailing whitespace.
fn rest_of_line(cursor: &mut Cursor<'_>) -> Lexeme {
    let rest = cursor.rest();
    let line = &rest[..rest.find(['\n', '\r']).unwrap_or(rest.len())];
    let value = &line[..line.find("//").unwrap_or(line.len())];
    let value = value.trim_end_matches([' ', '\t']);

    if value.is_empty() {
        return header_token(cursor);
    }

    cursor.advance_by(value.len());
    (REST_OF_LINE, None)
}

fn statement_token(cursor: &mut Cursor<'_>) -> Lexeme {
    let rest = cursor.rest();

    let (kind, len) = if rest.starts_with("===") {
        (BODY_END, 3)
    } else if let Some((TITLE_KW, len)) = header_keyword(rest) {
        (TITLE_KW, len)
    } else if rest.starts_with("->") {
        (SHORTCUT_ARROW, 2)
    } else if rest.starts_with("=>") {
        (LINE_GROUP_ARROW, 2)
    } else {
        return text_token(cursor);
    };

    cursor.advance_by(len);
    (kind, None)
}

fn is_text_stop(c: char) -> bool {
    matches!(c, '#' | '<' | '>' | '{' | '}' | '\\' | '\r' | '\n')
}

/// Length of a run of `text` up to `stop` or a comment, with trailing
/// whitespace left out when the run ends the visible part of a line.
fn run_len(text: &str, stop: impl Fn(char) -> bool, trim_before: &[&str]) -> usize {
    let mut end = text.len();
    for (index, c) in text.char_indices() {
        if stop(c) || text[index..].starts_with("//") {
            end = index;
            break;
        }
    }

    let after = &text[end..];
    let trims = after.is_empty()
        || newline_len(after).is_some()
        || trim_before.iter().any(|marker| after.starts_with(marker));
    if trims {
        let trimmed = text[..end].trim_end_matches([' ', '\t']).len();
        if trimmed > 0 {
            end = trimmed;
        }
    }

    end
}

fn text_token(cursor: &mut Cursor<'_>) -> Lexeme {
    match (cursor.peek(), cursor.second()) {
        ('<', '<') => {
            cursor.advance_by(2);
            (COMMAND_START, None)
        }
        ('{', _) => {
            cursor.advance();
            (LEFT_BRACE, None)
        }
        ('}', _) => {
            cursor.advance();
            (ERROR_TOKEN, Some(LexicalError::UnmatchedBrace))
        }
        ('#', _) => {
            cursor.advance();
            (HASH, None)
        }
        ('\\', _) => {
            cursor.advance();
            if cursor.at_line_end() {
                return (ERROR_TOKEN, Some(LexicalError::UnterminatedEscape));
            }
            cursor.advance();
            (TEXT_ESCAPE, None)
        }
        ('<' | '>', _) => {
            cursor.advance();
            (TEXT, None)
        }
        _ => {
            let len = run_len(cursor.rest(), is_text_stop, &["//", "#", "<<"]);
            if len == 0 {
                cursor.advance();
                return (ERROR_TOKEN, Some(LexicalError::UnexpectedCharacter));
            }
            cursor.advance_by(len);
            (TEXT, None)
        }
    }
}

fn hashtag_token(cursor: &mut Cursor<'_>) -> Lexeme {
    let first = cursor.peek();
    if first.is_whitespace() || is_text_stop(first) || cursor.starts_with("//") {
        return text_token(cursor);
    }

    let stop = |c| matches!(c, '#' | '<' | '>' | '{' | '}' | '\r' | '\n');
    let len = run_len(cursor.rest(), stop, &["#", "<", ">", "{", "}", "//"]);
    cursor.advance_by(len);
    (HASHTAG_TEXT, None)
}

fn command_text_token(cursor: &mut Cursor<'_>) -> Lexeme {
    if cursor.starts_with(">>") {
        cursor.advance_by(2);
        return (COMMAND_END, None);
    }
    if cursor.starts_with("{") {
        cursor.advance();
        return (LEFT_BRACE, None);
    }

    let rest = cursor.rest();
    let mut end = rest.len();
    for (index, c) in rest.char_indices() {
        if c == '{' || c == '\n' || c == '\r' || rest[index..].starts_with(">>") {
            end = index;
            break;
        }
    }
    let after = &rest[end..];
    if after.is_empty() || after.starts_with(">>") || newline_len(after).is_some() {
        let trimmed = rest[..end].trim_end_matches([' ', '\t']).len();
        if trimmed > 0 {
            end = trimmed;
        }
    }

    cursor.advance_by(end);
    (COMMAND_TEXT, None)
}

fn expr_token(cursor: &mut Cursor<'_>, mode: LexMode) -> Lexeme {
    let rest = cursor.rest();
    let first = cursor.advance();

    let double = match (first, cursor.peek()) {
        ('=', '=') => Some(EQ2),
        ('!', '=') => Some(NEQ),
        ('<', '=') => Some(LTEQ),
        ('>', '=') => Some(GTEQ),
        ('>', '>') => Some(COMMAND_END),
        ('+', '=') => Some(PLUS_EQ),
        ('-', '=') => Some(MINUS_EQ),
        ('*', '=') => Some(STAR_EQ),
        ('/', '=') => Some(SLASH_EQ),
        ('%', '=') => Some(PERCENT_EQ),
        ('&', '&') => Some(AMP2),
        ('|', '|') => Some(PIPE2),
        _ => None,
    };
    if let Some(kind) = double {
        cursor.advance();
        return (kind, None);
    }

    let kind = match first {
        '(' => LEFT_PAREN,
        ')' => RIGHT_PAREN,
        ',' => COMMA,
        '.' => DOT,
        '$' => DOLLAR,
        '{' => LEFT_BRACE,
        '}' => RIGHT_BRACE,
        ':' => COLON,
        '^' => CARET,
        '=' => EQ,
        '!' => BANG,
        '<' => LT,
        '>' => GT,
        '+' => PLUS,
        '-' => MINUS,
        '*' => STAR,
        '/' => SLASH,
        '%' => PERCENT,
        '"' => return string(cursor),
        '0'..='9' => {
            cursor.advance_while(|c| c.is_ascii_digit());
            if cursor.peek() == '.' && cursor.second().is_ascii_digit() {
                cursor.advance();
                cursor.advance_while(|c| c.is_ascii_digit());
            }
            NUMBER
        }
        c if is_ident_start(c) => {
            cursor.advance_while(is_ident_continue);
            let word = &rest[..rest.len() - cursor.rest().len()];
            mode.keyword(word).unwrap_or(IDENT)
        }
        _ => return (ERROR_TOKEN, Some(LexicalError::UnexpectedCharacter)),
    };

    (kind, None)
}

/// A double-quoted string; the opening quote is already consumed.
fn string(cursor: &mut Cursor<'_>) -> Lexeme {
    loop {
        if cursor.at_line_end() {
            return (ERROR_TOKEN, Some(LexicalError::UnterminatedString));
        }

        match cursor.advance() {
            '"' => return (STRING, None),
            '\\' if !cursor.at_line_end() => {
                cursor.advance();
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests;
