//! Statements of a node body.
//!
//! Ambiguous constructs are resolved the same way everywhere:
//!
//! * repetitions (options, line-group items, enum cases) take every
//!   contiguous item they can before the group is closed;
//! * `<<elseif>>`, `<<else>>` and `<<endif>>` (and the `once` variants)
//!   belong to the innermost chain that is still open, which falls out of
//!   the recursion: a nested chain stops its statement list at its own
//!   clause keywords first;
//! * an `<<elseif>>` after `<<else>>`, or a second `<<else>>`, could belong
//!   to more than one chain and is reported instead of guessed at.

use yarn_errors::SyntaxError;
use yarn_syntax::SyntaxKind::{self, *};
use yarn_syntax::SyntaxSet;
use yarn_tokenizer::LexMode;

use crate::grammar::exprs;
use crate::grammar::{command_end, end_of_line, name};
use crate::parser::{Marker, Parser};

/// Command keywords that close or continue a construct and never start a
/// statement of their own.
const CLAUSE_KEYWORDS: SyntaxSet =
    SyntaxSet::new([ELSEIF_KW, ELSE_KW, ENDIF_KW, ENDONCE_KW, CASE_KW, ENDENUM_KW]);

const IF_TERMINATORS: SyntaxSet = SyntaxSet::new([ELSEIF_KW, ELSE_KW, ENDIF_KW]);
const ONCE_TERMINATORS: SyntaxSet = SyntaxSet::new([ELSE_KW, ENDONCE_KW]);

const NAME_RECOVERY: SyntaxSet = SyntaxSet::new([COMMAND_END, EQ, TO_KW, NEWLINE, EOF]);

/// Parses statements until the end of the enclosing block or body, or until
/// a command whose keyword is in `terminators`.
pub(crate) fn stmt_list(p: &mut Parser<'_>, terminators: &SyntaxSet) {
    loop {
        if p.cancelled() {
            break;
        }

        match p.peek_kind(LexMode::Statement) {
            EOF | BODY_END | TITLE_KW | DEDENT => break,
            COMMAND_START
                if p.at_command(LexMode::Statement)
                    .is_some_and(|keyword| terminators.contains(keyword)) =>
            {
                break;
            }
            _ => {}
        }

        let start = p.offset();
        stmt(p, terminators);
        if p.offset() == start && !p.at(LexMode::Statement, EOF) {
            p.error(LexMode::Statement, "expected a statement");
            let m = p.start();
            p.advance(LexMode::Statement);
            m.complete(p, ERROR);
        }
    }
}

pub(crate) fn stmt(p: &mut Parser<'_>, terminators: &SyntaxSet) {
    if p.nested(|p| stmt_kind(p, terminators)).is_none() {
        p.error_line(LexMode::Statement, "statement is nested too deeply");
        p.eat(LexMode::Text, NEWLINE);
    }
}

fn stmt_kind(p: &mut Parser<'_>, terminators: &SyntaxSet) {
    match p.peek_kind(LexMode::Statement) {
        INDENT => block(p),
        SHORTCUT_ARROW => option_group(p, SHORTCUT_ARROW),
        LINE_GROUP_ARROW => option_group(p, LINE_GROUP_ARROW),
        COMMAND_START => command(p, terminators),
        ERROR_TOKEN => {
            p.skip_line(LexMode::Statement);
            p.eat(LexMode::Text, NEWLINE);
        }
        _ => line_stmt(p, LexMode::Statement),
    }
}

/// An indented run of statements.
pub(crate) fn block(p: &mut Parser<'_>) {
    debug_assert_eq!(p.peek_kind(LexMode::Statement), INDENT);

    let m = p.start();
    p.advance(LexMode::Statement);
    stmt_list(p, &SyntaxSet::EMPTY);
    p.expect(LexMode::Statement, DEDENT, "expected the end of the indented block");
    m.complete(p, BLOCK);
}

fn option_group(p: &mut Parser<'_>, arrow: SyntaxKind) {
    let line_group = arrow == LINE_GROUP_ARROW;
    let (group_kind, item_kind) =
        if line_group { (LINE_GROUP, LINE_GROUP_ITEM) } else { (SHORTCUT_OPTION_GROUP, SHORTCUT_OPTION) };

    let group = p.start();
    let mut mode = LexMode::Statement;

    loop {
        let item = p.start();
        p.advance(mode);
        line_stmt(p, LexMode::Text);

        let had_block = p.at(LexMode::Statement, INDENT);
        if had_block {
            block(p);
        }
        item.complete(p, item_kind);

        mode = if p.config().breaks_after(had_block, line_group) {
            LexMode::AfterOption
        } else {
            LexMode::Statement
        };

        if p.eat(mode, BLANK_LINE) || p.cancelled() || !p.at(mode, arrow) {
            break;
        }
    }

    group.complete(p, group_kind);
}

/// `text {expr} text <<if cond>> #tag` up to the end of the line.
pub(crate) fn line_stmt(p: &mut Parser<'_>, first: LexMode) {
    let m = p.start();

    if !line_text(p, first) {
        p.error(first, "expected line text");
    }

    if p.at(LexMode::Text, COMMAND_START) {
        match p.at_command(LexMode::Text) {
            Some(IF_KW | ONCE_KW) => line_condition(p),
            _ => p.error_line(LexMode::Text, "expected `<<if` or `<<once` after line text"),
        }
    }

    hashtags(p);
    end_of_line(p, LexMode::Text);
    m.complete(p, LINE_STMT);
}

fn line_text(p: &mut Parser<'_>, first: LexMode) -> bool {
    let m = p.start();
    let mut mode = first;
    let mut empty = true;

    loop {
        match p.peek_kind(mode) {
            TEXT | TEXT_ESCAPE => p.advance(mode),
            LEFT_BRACE => interpolation(p, mode),
            ERROR_TOKEN => {
                let error = p.start();
                p.advance(mode);
                error.complete(p, ERROR);
            }
            _ => break,
        }
        mode = LexMode::Text;
        empty = false;
    }

    if empty {
        m.abandon(p);
    } else {
        m.complete(p, LINE_TEXT);
    }
    !empty
}

/// `{ expr }`, entered with the `{` lexed in `mode`.
pub(crate) fn interpolation(p: &mut Parser<'_>, mode: LexMode) {
    debug_assert_eq!(p.peek_kind(mode), LEFT_BRACE);

    let m = p.start();
    p.advance(mode);
    exprs::expr(p);

    if !p.eat(LexMode::Expr, RIGHT_BRACE) {
        p.error(LexMode::Expr, "expected `}`");

        let error = p.start();
        while !p.at_set(LexMode::Expr, &SyntaxSet::new([RIGHT_BRACE, COMMAND_END, NEWLINE, EOF])) {
            p.advance(LexMode::Expr);
        }
        error.complete(p, ERROR);
        p.eat(LexMode::Expr, RIGHT_BRACE);
    }

    m.complete(p, INTERPOLATION);
}

fn line_condition(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance(LexMode::Text);

    if p.eat(LexMode::Command, ONCE_KW) {
        if p.eat(LexMode::Command, IF_KW) {
            exprs::expr(p);
        }
    } else {
        p.expect(LexMode::Command, IF_KW, "expected `if`");
        exprs::expr(p);
    }

    command_end(p, LexMode::Expr);
    m.complete(p, LINE_CONDITION);
}

fn hashtags(p: &mut Parser<'_>) {
    while p.at(LexMode::Text, HASH) {
        hashtag(p);
    }
}

fn hashtag(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance(LexMode::Text);
    p.expect(LexMode::Hashtag, HASHTAG_TEXT, "expected hashtag text");
    m.complete(p, HASHTAG);
}

fn command(p: &mut Parser<'_>, terminators: &SyntaxSet) {
    match p.at_command(LexMode::Statement) {
        Some(IF_KW) => if_stmt(p, terminators),
        Some(ONCE_KW) => once_stmt(p, terminators),
        Some(SET_KW) => set_stmt(p),
        Some(CALL_KW) => call_stmt(p),
        Some(DECLARE_KW) => declare_stmt(p),
        Some(JUMP_KW | DETOUR_KW) => jump_stmt(p),
        Some(RETURN_KW) => simple_command(p, RETURN_STMT),
        Some(ENUM_KW) => enum_stmt(p),
        Some(keyword) if CLAUSE_KEYWORDS.contains(keyword) => stray_clause(p, keyword),
        _ => command_stmt(p),
    }
}

/// Opens a node at `<< keyword`.
fn command_start(p: &mut Parser<'_>) -> Marker {
    let m = p.start();
    command_keyword(p);
    m
}

fn command_keyword(p: &mut Parser<'_>) {
    p.advance(LexMode::Statement);
    p.advance(LexMode::Command);
}

fn stray_clause(p: &mut Parser<'_>, keyword: SyntaxKind) {
    let message = match keyword {
        ELSEIF_KW | ELSE_KW | ENDIF_KW => "this clause has no open `<<if>>` to belong to",
        ENDONCE_KW => "`<<endonce>>` without an open `<<once>>`",
        _ => "enum cases are only allowed inside `<<enum>>`",
    };
    p.error(LexMode::Statement, message);

    let m = p.start();
    p.advance(LexMode::Statement);
    while !p.at_line_end(LexMode::Text) {
        p.advance(LexMode::Text);
    }
    m.complete(p, ERROR);
    p.eat(LexMode::Text, NEWLINE);
}

fn if_stmt(p: &mut Parser<'_>, terminators: &SyntaxSet) {
    let m = p.start();
    let inner = terminators.clone().union(&IF_TERMINATORS);

    clause(p, IF_CLAUSE, true, &inner);

    let mut seen_else = false;
    loop {
        match p.at_command(LexMode::Statement) {
            Some(ELSEIF_KW) => {
                if seen_else {
                    p.error_kind(
                        LexMode::Statement,
                        SyntaxError::UnresolvedAmbiguity,
                        "`<<elseif>>` after `<<else>>` cannot be attached to a chain",
                    );
                }
                clause(p, ELSE_IF_CLAUSE, true, &inner);
            }
            Some(ELSE_KW) => {
                if seen_else {
                    p.error_kind(
                        LexMode::Statement,
                        SyntaxError::UnresolvedAmbiguity,
                        "a second `<<else>>` cannot be attached to a chain",
                    );
                }
                seen_else = true;
                clause(p, ELSE_CLAUSE, false, &inner);
            }
            _ => break,
        }
    }

    close_chain(p, m, ENDIF_KW, IF_STMT, "expected `<<endif>>`");
}

fn once_stmt(p: &mut Parser<'_>, terminators: &SyntaxSet) {
    let m = p.start();
    let inner = terminators.clone().union(&ONCE_TERMINATORS);

    let once = command_start(p);
    if p.eat(LexMode::Command, IF_KW) {
        exprs::expr(p);
    }
    command_end(p, LexMode::Command);
    clause_body(p, &inner);
    once.complete(p, ONCE_CLAUSE);

    let mut seen_else = false;
    while p.at_command(LexMode::Statement) == Some(ELSE_KW) {
        if seen_else {
            p.error_kind(
                LexMode::Statement,
                SyntaxError::UnresolvedAmbiguity,
                "a second `<<else>>` cannot be attached to a chain",
            );
        }
        seen_else = true;
        clause(p, ONCE_ELSE_CLAUSE, false, &inner);
    }

    close_chain(p, m, ENDONCE_KW, ONCE_STMT, "expected `<<endonce>>`");
}

/// `<< keyword expr? >>` followed by the clause's statements.
fn clause(p: &mut Parser<'_>, kind: SyntaxKind, condition: bool, terminators: &SyntaxSet) {
    let m = command_start(p);
    if condition {
        exprs::expr(p);
    }
    command_end(p, LexMode::Command);
    clause_body(p, terminators);
    m.complete(p, kind);
}

fn clause_body(p: &mut Parser<'_>, terminators: &SyntaxSet) {
    end_of_line(p, LexMode::Text);
    stmt_list(p, terminators);
}

/// Consumes the `<<end...>>` of a chain, or turns the chain into an ERROR
/// node when it is missing.
fn close_chain(
    p: &mut Parser<'_>,
    m: Marker,
    end: SyntaxKind,
    kind: SyntaxKind,
    message: &str,
) {
    if p.at_command(LexMode::Statement) == Some(end) {
        command_keyword(p);
        command_end(p, LexMode::Command);
        end_of_line(p, LexMode::Text);
        m.complete(p, kind);
    } else {
        p.error_kind(LexMode::Statement, SyntaxError::MissingEndMarker, message);
        m.complete(p, ERROR);
    }
}

fn set_stmt(p: &mut Parser<'_>) {
    let m = command_start(p);
    variable(p);

    if matches!(
        p.peek_kind(LexMode::Command),
        EQ | TO_KW | PLUS_EQ | MINUS_EQ | STAR_EQ | SLASH_EQ | PERCENT_EQ
    ) {
        p.advance(LexMode::Command);
    } else {
        p.error(LexMode::Command, "expected `=`, `to` or a compound assignment");
    }

    exprs::expr(p);
    finish_command(p, m, SET_STMT);
}

fn call_stmt(p: &mut Parser<'_>) {
    let m = command_start(p);

    let range = p.peek(LexMode::Expr).kind_range;
    if let Some(call) = exprs::expr(p)
        && call.kind() != CALL_EXPR
    {
        p.error_at(range, SyntaxError::UnexpectedToken, "expected a function call");
    }

    finish_command(p, m, CALL_STMT);
}

fn declare_stmt(p: &mut Parser<'_>) {
    let m = command_start(p);
    variable(p);

    if !p.eat(LexMode::Command, EQ) && !p.eat(LexMode::Command, TO_KW) {
        p.error(LexMode::Command, "expected `=` or `to`");
    }
    exprs::expr(p);

    if p.at(LexMode::Command, AS_KW) {
        let annotation = p.start();
        p.advance(LexMode::Command);
        name(p, &NAME_RECOVERY);
        annotation.complete(p, TYPE_ANNOTATION);
    }

    finish_command(p, m, DECLARE_STMT);
}

fn variable(p: &mut Parser<'_>) {
    if p.at(LexMode::Expr, DOLLAR) {
        exprs::variable_expr(p);
    } else {
        p.error_recover(LexMode::Expr, "expected a variable", &NAME_RECOVERY);
    }
}

fn jump_stmt(p: &mut Parser<'_>) {
    let m = command_start(p);

    if p.at(LexMode::Name, LEFT_BRACE) {
        interpolation(p, LexMode::Name);
    } else {
        name(p, &NAME_RECOVERY);
    }

    finish_command(p, m, JUMP_STMT);
}

/// `<< keyword >>` with nothing in between.
fn simple_command(p: &mut Parser<'_>, kind: SyntaxKind) {
    let m = command_start(p);
    finish_command(p, m, kind);
}

fn finish_command(p: &mut Parser<'_>, m: Marker, kind: SyntaxKind) {
    command_end(p, LexMode::Command);
    end_of_line(p, LexMode::Text);
    m.complete(p, kind);
}

fn enum_stmt(p: &mut Parser<'_>) {
    let m = command_start(p);
    name(p, &NAME_RECOVERY);
    command_end(p, LexMode::Command);
    end_of_line(p, LexMode::Text);

    let mut cases = 0;
    loop {
        if p.cancelled() {
            break;
        }

        match p.peek_kind(LexMode::Statement) {
            INDENT => cases += case_block(p),
            COMMAND_START => match p.at_command(LexMode::Statement) {
                Some(CASE_KW) => {
                    enum_case(p);
                    cases += 1;
                }
                _ => break,
            },
            _ => break,
        }
    }

    if cases == 0 {
        p.error(LexMode::Statement, "expected `<<case`");
    }

    close_chain(p, m, ENDENUM_KW, ENUM_STMT, "expected `<<endenum>>`");
}

/// An indented run of `<<case>>` lines inside an enum.
fn case_block(p: &mut Parser<'_>) -> usize {
    let m = p.start();
    p.advance(LexMode::Statement);

    let mut cases = 0;
    loop {
        match p.peek_kind(LexMode::Statement) {
            EOF | BODY_END | TITLE_KW | DEDENT => break,
            INDENT => cases += case_block(p),
            _ if p.at_command(LexMode::Statement) == Some(CASE_KW) => {
                enum_case(p);
                cases += 1;
            }
            _ => {
                p.error_line(LexMode::Statement, "only `<<case>>` lines are allowed in an enum");
                p.eat(LexMode::Text, NEWLINE);
            }
        }
    }

    p.expect(LexMode::Statement, DEDENT, "expected the end of the indented block");
    m.complete(p, BLOCK);
    cases
}

fn enum_case(p: &mut Parser<'_>) {
    let m = command_start(p);
    name(p, &NAME_RECOVERY);

    if p.eat(LexMode::Command, EQ) || p.eat(LexMode::Command, TO_KW) {
        exprs::expr(p);
    }

    finish_command(p, m, ENUM_CASE);
}

/// Any other `<< ... >>`, kept as free text with interpolations.
fn command_stmt(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance(LexMode::Statement);

    let mut empty = true;
    loop {
        match p.peek_kind(LexMode::CommandText) {
            COMMAND_TEXT => p.advance(LexMode::CommandText),
            LEFT_BRACE => interpolation(p, LexMode::CommandText),
            _ => break,
        }
        empty = false;
    }

    if empty {
        p.error(LexMode::CommandText, "expected a command");
    }
    if !p.eat(LexMode::CommandText, COMMAND_END) {
        p.error(LexMode::CommandText, "expected `>>`");
    }

    hashtags(p);
    end_of_line(p, LexMode::Text);
    m.complete(p, COMMAND_STMT);
}
