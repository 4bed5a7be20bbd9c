//! Lexing modes and the contextual keyword tables.
//!
//! There are no reserved words. The parser tells the tokenizer which
//! production it is in, and only the keywords of that production are
//! recognized; every other word is an identifier or plain text.

use yarn_syntax::SyntaxKind::{self, *};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexMode {
    /// Start of a header line, a file hashtag or a body delimiter.
    Header,
    /// The value after `key:`, up to the end of the line.
    HeaderValue,
    /// The value after `when:`.
    WhenHeader,
    /// The first token of a statement line. Indentation is tracked here.
    Statement,
    /// Like [`LexMode::Statement`], but a blank line at the current position
    /// is reported as BLANK_LINE.
    AfterOption,
    /// Dialogue text.
    Text,
    /// Directly after `#`.
    Hashtag,
    /// Directly after `<<`, and the keyword slots of commands
    /// (`to`, `as`, the `if` of `once if`).
    Command,
    /// The free-form body of a generic command.
    CommandText,
    /// Expressions, inside `{}` and command arguments.
    Expr,
    /// A bare name, where no word is a keyword.
    Name,
}

impl LexMode {
    pub fn is_indent_sensitive(self) -> bool {
        matches!(self, Self::Statement | Self::AfterOption)
    }

    /// Modes where `//` starts a comment.
    pub(crate) fn allows_comments(self) -> bool {
        !matches!(self, Self::Command | Self::CommandText | Self::Expr | Self::Name)
    }

    pub(crate) fn keyword(self, word: &str) -> Option<SyntaxKind> {
        match self {
            Self::Command => command_keyword(word),
            Self::Expr => expr_keyword(word),
            Self::WhenHeader => when_keyword(word).or_else(|| expr_keyword(word)),
            Self::Header
            | Self::HeaderValue
            | Self::Statement
            | Self::AfterOption
            | Self::Text
            | Self::Hashtag
            | Self::CommandText
            | Self::Name => None,
        }
    }
}

/// Keywords that may follow `<<`, plus the operator words used inside
/// command payloads.
pub fn command_keyword(word: &str) -> Option<SyntaxKind> {
    let kind = match word {
        "if" => IF_KW,
        "elseif" => ELSEIF_KW,
        "else" => ELSE_KW,
        "endif" => ENDIF_KW,
        "once" => ONCE_KW,
        "endonce" => ENDONCE_KW,
        "set" => SET_KW,
        "call" => CALL_KW,
        "declare" => DECLARE_KW,
        "jump" => JUMP_KW,
        "detour" => DETOUR_KW,
        "return" => RETURN_KW,
        "enum" => ENUM_KW,
        "case" => CASE_KW,
        "endenum" => ENDENUM_KW,
        "to" => TO_KW,
        "as" => AS_KW,
        _ => return None,
    };
    Some(kind)
}

fn expr_keyword(word: &str) -> Option<SyntaxKind> {
    let kind = match word {
        "not" => NOT_KW,
        "and" => AND_KW,
        "or" => OR_KW,
        "xor" => XOR_KW,
        "lte" => LTE_KW,
        "gte" => GTE_KW,
        "lt" => LT_KW,
        "gt" => GT_KW,
        "is" => IS_KW,
        "eq" => EQ_KW,
        "neq" => NEQ_KW,
        "true" => TRUE_KW,
        "false" => FALSE_KW,
        "null" => NULL_KW,
        _ => return None,
    };
    Some(kind)
}

fn when_keyword(word: &str) -> Option<SyntaxKind> {
    match word {
        "always" => Some(ALWAYS_KW),
        "once" => Some(ONCE_KW),
        "if" => Some(IF_KW),
        _ => None,
    }
}

pub(crate) fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

pub(crate) fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Length of the identifier at the start of `text`, if any.
pub(crate) fn ident_len(text: &str) -> Option<usize> {
    let mut chars = text.chars();
    if !chars.next().is_some_and(is_ident_start) {
        return None;
    }
    Some(1 + chars.take_while(|&c| is_ident_continue(c)).count())
}

/// Length of a `title` or `when` keyword at the start of `text` when it is
/// followed by a header delimiter.
pub(crate) fn header_keyword(text: &str) -> Option<(SyntaxKind, usize)> {
    let len = ident_len(text)?;
    let kind = match &text[..len] {
        "title" => TITLE_KW,
        "when" => WHEN_KW,
        _ => return None,
    };
    let after = text[len..].trim_start_matches([' ', '\t']);
    after.starts_with(':').then_some((kind, len))
}

/// Classifies the command that starts at `text`, which must begin right
/// after a `<<` delimiter.
pub fn command_keyword_at(text: &str) -> Option<SyntaxKind> {
    let text = text.trim_start_matches([' ', '\t']);
    let len = ident_len(text)?;
    command_keyword(&text[..len]).filter(|kind| !matches!(kind, TO_KW | AS_KW))
}
