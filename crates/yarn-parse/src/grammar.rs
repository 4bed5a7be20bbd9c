use yarn_syntax::SyntaxKind::{self, *};
use yarn_syntax::SyntaxSet;
use yarn_tokenizer::LexMode;

use crate::parser::Parser;

pub(crate) mod exprs;
pub(crate) mod nodes;
pub(crate) mod stmts;

/// A bare name; no word is a keyword here.
pub(crate) fn name(p: &mut Parser<'_>, recovery: &SyntaxSet) -> bool {
    if p.at(LexMode::Name, IDENT) {
        let m = p.start();
        p.advance(LexMode::Name);
        m.complete(p, NAME);
        true
    } else {
        p.error_recover(LexMode::Name, "expected a name", recovery);
        false
    }
}

pub(crate) fn delimited(
    p: &mut Parser<'_>,
    mode: LexMode,
    bra: SyntaxKind,
    ket: SyntaxKind,
    delim: SyntaxKind,
    unexpected_delim_message: &'static str,
    first_set: &SyntaxSet,
    mut parser: impl FnMut(&mut Parser<'_>) -> bool,
) {
    debug_assert_eq!(p.peek_kind(mode), bra);
    p.advance(mode);

    while !p.at(mode, ket) && !p.at_set(mode, &LINE_ENDS) {
        if p.at(mode, delim) {
            let m = p.start();
            p.error(mode, unexpected_delim_message);
            p.advance(mode);
            m.complete(p, ERROR);
            continue;
        }

        if !parser(p) {
            break;
        }

        if !p.eat(mode, delim) {
            if p.at_set(mode, first_set) {
                p.expect(mode, delim, "expected `,`");
            } else {
                break;
            }
        }
    }

    let message = format!("expected `{}`", ket.text().unwrap_or("closing delimiter"));
    p.expect(mode, ket, &message);
}

/// Tokens that end a command, an interpolation or the line.
const LINE_ENDS: SyntaxSet = SyntaxSet::new([NEWLINE, EOF, COMMAND_END]);

/// Expects the end of a line: a line break, or the end of the file.
pub(crate) fn end_of_line(p: &mut Parser<'_>, mode: LexMode) {
    if p.at(mode, EOF) || p.eat(mode, NEWLINE) {
        return;
    }

    p.error_line(mode, "expected end of line");
    p.eat(LexMode::Text, NEWLINE);
}

/// Expects `>>`, skipping anything left before it on the line.
pub(crate) fn command_end(p: &mut Parser<'_>, mode: LexMode) {
    if p.eat(mode, COMMAND_END) {
        return;
    }

    p.error(mode, "expected `>>`");
    if p.at_line_end(mode) {
        return;
    }

    let m = p.start();
    while !p.at_set(LexMode::Expr, &LINE_ENDS) {
        p.advance(LexMode::Expr);
    }
    m.complete(p, ERROR);
    p.eat(LexMode::Expr, COMMAND_END);
}
