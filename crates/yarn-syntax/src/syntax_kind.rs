#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[repr(u16)]
pub enum SyntaxKind {
    // Landmarks with fixed spellings.
    BODY_START,
    BODY_END,
    COMMAND_START,
    COMMAND_END,
    LEFT_BRACE,
    RIGHT_BRACE,
    LEFT_PAREN,
    RIGHT_PAREN,
    SHORTCUT_ARROW,
    LINE_GROUP_ARROW,
    HASH,
    COLON,
    COMMA,
    DOT,
    DOLLAR,

    // Operators.
    EQ,
    EQ2,
    NEQ,
    LT,
    GT,
    LTEQ,
    GTEQ,
    PLUS,
    MINUS,
    STAR,
    SLASH,
    PERCENT,
    BANG,
    AMP2,
    PIPE2,
    CARET,
    PLUS_EQ,
    MINUS_EQ,
    STAR_EQ,
    SLASH_EQ,
    PERCENT_EQ,

    // Contextual keywords.
    TITLE_KW,
    WHEN_KW,
    ALWAYS_KW,
    ONCE_KW,
    IF_KW,
    ELSEIF_KW,
    ELSE_KW,
    ENDIF_KW,
    ENDONCE_KW,
    ENUM_KW,
    ENDENUM_KW,
    CASE_KW,
    SET_KW,
    CALL_KW,
    DECLARE_KW,
    JUMP_KW,
    DETOUR_KW,
    RETURN_KW,
    AS_KW,
    TO_KW,
    NOT_KW,
    AND_KW,
    OR_KW,
    XOR_KW,
    LTE_KW,
    GTE_KW,
    LT_KW,
    GT_KW,
    IS_KW,
    EQ_KW,
    NEQ_KW,
    TRUE_KW,
    FALSE_KW,
    NULL_KW,

    // Literals and free text.
    IDENT,
    NUMBER,
    STRING,
    TEXT,
    TEXT_ESCAPE,
    COMMAND_TEXT,
    HASHTAG_TEXT,
    REST_OF_LINE,

    // Structural tokens.
    NEWLINE,
    INDENT,
    DEDENT,
    BLANK_LINE,

    // Trivia.
    WHITESPACE,
    LINE_BREAK,
    COMMENT,

    ERROR_TOKEN,
    UNKNOWN,
    EOF,

    // Nodes.
    SOURCE_FILE,
    FILE_HASHTAG,
    DIALOGUE_NODE,
    TITLE_HEADER,
    WHEN_HEADER,
    WHEN_CONDITION,
    HEADER,
    BODY,
    BLOCK,
    LINE_STMT,
    LINE_TEXT,
    INTERPOLATION,
    LINE_CONDITION,
    HASHTAG,
    SHORTCUT_OPTION_GROUP,
    SHORTCUT_OPTION,
    LINE_GROUP,
    LINE_GROUP_ITEM,
    IF_STMT,
    IF_CLAUSE,
    ELSE_IF_CLAUSE,
    ELSE_CLAUSE,
    ONCE_STMT,
    ONCE_CLAUSE,
    ONCE_ELSE_CLAUSE,
    SET_STMT,
    CALL_STMT,
    DECLARE_STMT,
    TYPE_ANNOTATION,
    ENUM_STMT,
    ENUM_CASE,
    JUMP_STMT,
    RETURN_STMT,
    COMMAND_STMT,
    NAME,

    PAREN_EXPR,
    UNARY_EXPR,
    BINARY_EXPR,
    CALL_EXPR,
    ARG_LIST,
    MEMBER_EXPR,
    NUMBER_EXPR,
    STRING_EXPR,
    VARIABLE_EXPR,
    IDENT_EXPR,
    BOOL_EXPR,
    NULL_EXPR,

    ERROR,
    TOMBSTONE,
}

use SyntaxKind::*;

impl SyntaxKind {
    pub const fn is_trivia(self) -> bool {
        matches!(self, WHITESPACE | LINE_BREAK | COMMENT)
    }

    pub const fn is_keyword(self) -> bool {
        self as u16 >= TITLE_KW as u16 && self as u16 <= NULL_KW as u16
    }

    /// Zero-width tokens synthesized by the indentation tracker.
    pub const fn is_structural(self) -> bool {
        matches!(self, INDENT | DEDENT | BLANK_LINE)
    }

    pub const fn is_token(self) -> bool {
        (self as u16) < SOURCE_FILE as u16
    }

    /// The fixed spelling of punctuation, operators and keywords.
    pub const fn text(self) -> Option<&'static str> {
        let text = match self {
            BODY_START => "---",
            BODY_END => "===",
            COMMAND_START => "<<",
            COMMAND_END => ">>",
            LEFT_BRACE => "{",
            RIGHT_BRACE => "}",
            LEFT_PAREN => "(",
            RIGHT_PAREN => ")",
            SHORTCUT_ARROW => "->",
            LINE_GROUP_ARROW => "=>",
            HASH => "#",
            COLON => ":",
            COMMA => ",",
            DOT => ".",
            DOLLAR => "$",
            EQ => "=",
            EQ2 => "==",
            NEQ => "!=",
            LT => "<",
            GT => ">",
            LTEQ => "<=",
            GTEQ => ">=",
            PLUS => "+",
            MINUS => "-",
            STAR => "*",
            SLASH => "/",
            PERCENT => "%",
            BANG => "!",
            AMP2 => "&&",
            PIPE2 => "||",
            CARET => "^",
            PLUS_EQ => "+=",
            MINUS_EQ => "-=",
            STAR_EQ => "*=",
            SLASH_EQ => "/=",
            PERCENT_EQ => "%=",
            TITLE_KW => "title",
            WHEN_KW => "when",
            ALWAYS_KW => "always",
            ONCE_KW => "once",
            IF_KW => "if",
            ELSEIF_KW => "elseif",
            ELSE_KW => "else",
            ENDIF_KW => "endif",
            ENDONCE_KW => "endonce",
            ENUM_KW => "enum",
            ENDENUM_KW => "endenum",
            CASE_KW => "case",
            SET_KW => "set",
            CALL_KW => "call",
            DECLARE_KW => "declare",
            JUMP_KW => "jump",
            DETOUR_KW => "detour",
            RETURN_KW => "return",
            AS_KW => "as",
            TO_KW => "to",
            NOT_KW => "not",
            AND_KW => "and",
            OR_KW => "or",
            XOR_KW => "xor",
            LTE_KW => "lte",
            GTE_KW => "gte",
            LT_KW => "lt",
            GT_KW => "gt",
            IS_KW => "is",
            EQ_KW => "eq",
            NEQ_KW => "neq",
            TRUE_KW => "true",
            FALSE_KW => "false",
            NULL_KW => "null",
            _ => return None,
        };
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_range_is_contiguous() {
        assert!(TITLE_KW.is_keyword());
        assert!(NULL_KW.is_keyword());
        assert!(AND_KW.is_keyword());
        assert!(!IDENT.is_keyword());
        assert!(!PERCENT_EQ.is_keyword());
    }

    #[test]
    fn tokens_precede_nodes() {
        assert!(EOF.is_token());
        assert!(INDENT.is_token());
        assert!(!SOURCE_FILE.is_token());
        assert!(!BINARY_EXPR.is_token());
    }
}
