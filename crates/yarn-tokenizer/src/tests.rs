use expect_test::{Expect, expect};
use yarn_errors::DiagnosticKind;

use super::*;
use LexMode::*;

fn token_text<'a>(token: &Token, text: &'a str) -> &'a str {
    &text[token.kind_range]
}

fn lex(text: &str, modes: &[LexMode]) -> Vec<(SyntaxKind, String)> {
    let mut tokenizer = Tokenizer::new(text, ScannerConfig::default());
    modes
        .iter()
        .map(|&mode| {
            let token = tokenizer.bump(mode);
            (token.kind, token_text(&token, text).to_owned())
        })
        .collect()
}

fn check(text: &str, modes: &[LexMode], expect: Expect) {
    let actual = lex(text, modes)
        .into_iter()
        .map(|(kind, text)| format!("{kind:?} {text:?}\n"))
        .collect::<String>();
    expect.assert_eq(&actual);
}

#[test]
fn test_eq_operator() {
    let text = "x = y";
    let mut tokenizer = Tokenizer::new(text, ScannerConfig::default());

    let token = tokenizer.bump(Expr);
    assert_eq!(token.kind, IDENT);
    assert_eq!(token_text(&token, text), "x");

    let token = tokenizer.bump(Expr);
    assert_eq!(token.kind, EQ);
    assert_eq!(token_text(&token, text), "=");

    let token = tokenizer.bump(Expr);
    assert_eq!(token.kind, IDENT);
    assert_eq!(token_text(&token, text), "y");

    assert_eq!(tokenizer.bump(Expr).kind, EOF);
}

#[test]
fn test_keywords_are_contextual() {
    let text = "if you set it";
    assert_eq!(lex(text, &[Text]), [(TEXT, text.to_owned())]);
    assert_eq!(lex(text, &[Command])[0], (IF_KW, "if".to_owned()));
    assert_eq!(lex(text, &[Expr])[0], (IDENT, "if".to_owned()));
    assert_eq!(lex("and", &[Expr])[0], (AND_KW, "and".to_owned()));
    assert_eq!(lex("and", &[Name])[0], (IDENT, "and".to_owned()));
}

#[test]
fn test_operators() {
    check(
        "<= >= != == += && || ^ % >>",
        &[Expr; 11],
        expect![[r#"
            LTEQ "<="
            GTEQ ">="
            NEQ "!="
            EQ2 "=="
            PLUS_EQ "+="
            AMP2 "&&"
            PIPE2 "||"
            CARET "^"
            PERCENT "%"
            COMMAND_END ">>"
            EOF ""
        "#]],
    );
}

#[test]
fn test_literals() {
    check(
        r#""say \"hi\"" 12.5 7. $gold"#,
        &[Expr; 6],
        expect![[r#"
            STRING "\"say \\\"hi\\\"\""
            NUMBER "12.5"
            NUMBER "7"
            DOT "."
            DOLLAR "$"
            IDENT "gold"
        "#]],
    );
}

#[test]
fn test_unterminated_string() {
    let text = "\"abc\n";
    let mut tokenizer = Tokenizer::new(text, ScannerConfig::default());

    let token = tokenizer.bump(Expr);
    assert_eq!(token.kind, ERROR_TOKEN);
    assert_eq!(token_text(&token, text), "\"abc");
    assert_eq!(tokenizer.bump(Expr).kind, NEWLINE);

    let (diagnostics, _) = tokenizer.finish();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind(), DiagnosticKind::Lexical(LexicalError::UnterminatedString));
}

#[test]
fn test_errors_are_reported_once() {
    let text = "@";
    let mut tokenizer = Tokenizer::new(text, ScannerConfig::default());

    assert_eq!(tokenizer.peek(Expr).kind, ERROR_TOKEN);
    assert_eq!(tokenizer.peek(Expr).kind, ERROR_TOKEN);
    assert!(tokenizer.diagnostics().is_empty());

    tokenizer.bump(Expr);
    assert_eq!(tokenizer.diagnostics().len(), 1);
}

#[test]
fn test_header() {
    check(
        "title: Start Node  // note\n",
        &[Header, Header, HeaderValue, HeaderValue],
        expect![[r#"
            TITLE_KW "title"
            COLON ":"
            REST_OF_LINE "Start Node"
            NEWLINE "\n"
        "#]],
    );
}

#[test]
fn test_title_without_colon_is_an_ident() {
    check(
        "titles: x",
        &[Header],
        expect![[r#"
            IDENT "titles"
        "#]],
    );
}

#[test]
fn test_text_with_escapes_and_hashtags() {
    check(
        r"Hi \{there\} #tag1 #tag2",
        &[Text, Text, Text, Text, Text, Hashtag, Text, Hashtag, Text],
        expect![[r##"
            TEXT "Hi "
            TEXT_ESCAPE "\\{"
            TEXT "there"
            TEXT_ESCAPE "\\}"
            HASH "#"
            HASHTAG_TEXT "tag1"
            HASH "#"
            HASHTAG_TEXT "tag2"
            EOF ""
        "##]],
    );
}

#[test]
fn test_interpolation_keeps_surrounding_spaces() {
    check(
        "Gold: {$gold} coins",
        &[Text, Text, Expr, Expr, Expr, Text],
        expect![[r#"
            TEXT "Gold: "
            LEFT_BRACE "{"
            DOLLAR "$"
            IDENT "gold"
            RIGHT_BRACE "}"
            TEXT " coins"
        "#]],
    );
}

#[test]
fn test_generic_command() {
    check(
        "<<wait 2 >> // pause\n",
        &[Statement, CommandText, CommandText, CommandText],
        expect![[r#"
            COMMAND_START "<<"
            COMMAND_TEXT "wait 2"
            COMMAND_END ">>"
            NEWLINE "\n"
        "#]],
    );
}

#[test]
fn test_comment_is_trailing_trivia() {
    let text = "Hello // note\n";
    let mut tokenizer = Tokenizer::new(text, ScannerConfig::default());

    let token = tokenizer.bump(Text);
    assert_eq!(token.kind, TEXT);
    assert_eq!(token_text(&token, text), "Hello");
    assert_eq!(token.range(), TextRange::new(0.into(), 13.into()));
    assert_eq!(tokenizer.bump(Text).kind, NEWLINE);
}

#[test]
fn test_token_start() {
    let text = "a\n  -> b\n";
    let index = LineIndex::new(text);
    let mut tokenizer = Tokenizer::new(text, ScannerConfig::default());
    tokenizer.bump(Statement);
    tokenizer.bump(Text);
    assert_eq!(tokenizer.bump(Statement).kind, INDENT);

    let arrow = tokenizer.bump(Statement);
    assert_eq!(arrow.kind, SHORTCUT_ARROW);
    assert_eq!(arrow.start(&index), LineCol { line: 1, col: 2 });
}

#[test]
fn test_peek_command_keyword() {
    let mut tokenizer = Tokenizer::new("<<if $x>>", ScannerConfig::default());
    assert_eq!(tokenizer.peek_command_keyword(Statement), Some(IF_KW));

    let mut tokenizer = Tokenizer::new("<<wait>>", ScannerConfig::default());
    assert_eq!(tokenizer.peek_command_keyword(Statement), None);

    let mut tokenizer = Tokenizer::new("if", ScannerConfig::default());
    assert_eq!(tokenizer.peek_command_keyword(Statement), None);
}

#[test]
fn test_indent_and_dedent() {
    let text = "-> A\n    B\n-> C\n";
    check(
        text,
        &[
            Statement,
            Text,
            Text,
            AfterOption,
            Statement,
            Text,
            Statement,
            Statement,
            Text,
            Text,
            Statement,
        ],
        expect![[r#"
            SHORTCUT_ARROW "->"
            TEXT "A"
            NEWLINE "\n"
            INDENT ""
            TEXT "B"
            NEWLINE "\n"
            DEDENT ""
            SHORTCUT_ARROW "->"
            TEXT "C"
            NEWLINE "\n"
            EOF ""
        "#]],
    );
}

#[test]
fn test_indent_carries_line_trivia() {
    let text = "A\n\n  // note\n    B";
    let mut tokenizer = Tokenizer::new(text, ScannerConfig::default());
    tokenizer.bump(Statement);
    tokenizer.bump(Text);

    let indent = tokenizer.bump(Statement);
    assert_eq!(indent.kind, INDENT);
    assert_eq!(indent.kind_range, TextRange::empty(17.into()));
    assert_eq!(indent.range(), TextRange::new(2.into(), 17.into()));
    assert_eq!(tokenizer.stack().widths(), [4]);

    let kinds = indent.leading.pieces().iter().map(|piece| piece.kind).collect::<Vec<_>>();
    assert_eq!(
        kinds,
        [
            TriviaPieceKind::Newline,
            TriviaPieceKind::Whitespace,
            TriviaPieceKind::SingleLineComment,
            TriviaPieceKind::Newline,
            TriviaPieceKind::Whitespace,
        ]
    );
}

#[test]
fn test_blank_line_after_option() {
    check(
        "-> A\n\n-> B\n",
        &[Statement, Text, Text, AfterOption, AfterOption],
        expect![[r#"
            SHORTCUT_ARROW "->"
            TEXT "A"
            NEWLINE "\n"
            BLANK_LINE "\n"
            SHORTCUT_ARROW "->"
        "#]],
    );
}

#[test]
fn test_blank_line_is_trivia_in_statement_mode() {
    let text = "-> A\n\n-> B\n";
    let mut tokenizer = Tokenizer::new(text, ScannerConfig::default());
    tokenizer.bump(Statement);
    tokenizer.bump(Text);
    tokenizer.bump(Text);

    let arrow = tokenizer.bump(Statement);
    assert_eq!(arrow.kind, SHORTCUT_ARROW);
    assert_eq!(arrow.leading.len(), TextSize::from(1));
}

#[test]
fn test_indentation_mismatch() {
    let text = "a\n    b\n   c\n";
    let mut tokenizer = Tokenizer::new(text, ScannerConfig::default());
    let mut kinds = Vec::new();
    let modes =
        [Statement, Text, Statement, Statement, Text, Statement, Statement, Text, Statement];
    for mode in modes {
        kinds.push(tokenizer.bump(mode).kind);
    }

    assert_eq!(
        kinds,
        [TEXT, NEWLINE, INDENT, TEXT, NEWLINE, DEDENT, ERROR_TOKEN, NEWLINE, EOF]
    );

    let (diagnostics, stack) = tokenizer.finish();
    assert!(stack.is_empty());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind(), DiagnosticKind::Lexical(LexicalError::IndentationMismatch));
    assert_eq!(diagnostics[0].range(), TextRange::new(11.into(), 12.into()));
}

#[test]
fn test_node_end_closes_every_block() {
    let text = "a\n  b\n    c\n===\n";
    let mut tokenizer = Tokenizer::new(text, ScannerConfig::default());
    let mut kinds = Vec::new();
    let modes = [
        Statement, Text, Statement, Statement, Text, Statement, Statement, Text, Statement,
        Statement, Statement,
    ];
    for mode in modes {
        kinds.push(tokenizer.bump(mode).kind);
    }

    assert_eq!(
        kinds,
        [TEXT, NEWLINE, INDENT, TEXT, NEWLINE, INDENT, TEXT, NEWLINE, DEDENT, DEDENT, BODY_END]
    );
    assert!(tokenizer.stack().is_empty());
}

#[test]
fn test_end_of_input_closes_blocks_without_a_newline() {
    let text = "-> a\n    b  ";
    let mut tokenizer = Tokenizer::new(text, ScannerConfig::default());
    let modes = [Statement, Text, Text, Statement, Statement, Text, Statement, Statement];
    let kinds = modes.map(|mode| tokenizer.bump(mode).kind);

    assert_eq!(kinds, [SHORTCUT_ARROW, TEXT, NEWLINE, INDENT, TEXT, EOF, DEDENT, EOF]);
    assert!(tokenizer.stack().is_empty());
}

#[test]
fn test_tabs_use_tab_width() {
    let config = ScannerConfig { tab_width: 4, ..ScannerConfig::default() };
    let mut tokenizer = Tokenizer::new("a\n\tb\n", config);
    tokenizer.bump(Statement);
    tokenizer.bump(Text);

    assert_eq!(tokenizer.bump(Statement).kind, INDENT);
    assert_eq!(tokenizer.stack().widths(), [4]);
}

#[test]
fn test_resume_with_saved_stack() {
    let text = "-> A\n    B\n-> C\n";
    let stack = IndentStack::deserialize(&[1, 0, 4, 0]).unwrap();
    let mut tokenizer = Tokenizer::resume(text, 11.into(), stack, ScannerConfig::default());

    assert_eq!(tokenizer.bump(Statement).kind, DEDENT);
    assert_eq!(tokenizer.bump(Statement).kind, SHORTCUT_ARROW);
}

#[test]
fn test_bump_rest() {
    let text = "abc\ndef";
    let mut tokenizer = Tokenizer::new(text, ScannerConfig::default());
    tokenizer.bump(Text);

    let rest = tokenizer.bump_rest().unwrap();
    assert_eq!(rest.kind, ERROR_TOKEN);
    assert_eq!(token_text(&rest, text), "\ndef");
    assert_eq!(tokenizer.bump_rest(), None);
}

#[test]
fn test_bump_rest_drops_open_blocks() {
    let text = "a\n    b";
    let mut tokenizer = Tokenizer::new(text, ScannerConfig::default());
    tokenizer.bump(Statement);
    tokenizer.bump(Text);
    assert_eq!(tokenizer.bump(Statement).kind, INDENT);

    assert!(tokenizer.bump_rest().is_some());
    assert!(tokenizer.stack().is_empty());
    assert_eq!(tokenizer.bump(Statement).kind, EOF);
}

#[test]
fn test_tokens_cover_the_input() {
    let text = "-> A // c\n    B\r\n\n  -> C {$x}\n";
    let mut tokenizer = Tokenizer::new(text, ScannerConfig::default());
    let mut end = TextSize::new(0);
    let mut mode = Statement;

    loop {
        let token = tokenizer.bump(mode);
        assert_eq!(token.range().start(), end, "{token:?}");
        end = token.range().end();

        mode = match token.kind {
            EOF => break,
            NEWLINE | INDENT | DEDENT | BLANK_LINE => Statement,
            LEFT_BRACE | DOLLAR | IDENT => Expr,
            _ => Text,
        };
    }

    assert_eq!(end, TextSize::of(text));
}
