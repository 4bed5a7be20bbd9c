use yarn_syntax::SyntaxKind::*;
use yarn_syntax::SyntaxSet;
use yarn_syntax::ast::{BinaryOp, UnaryOp};
use yarn_tokenizer::LexMode;

use crate::grammar::{delimited, name};
use crate::parser::{CompletedMarker, Parser};

pub(crate) const EXPR_FIRST: SyntaxSet = SyntaxSet::new([
    LEFT_PAREN, NUMBER, STRING, DOLLAR, TRUE_KW, FALSE_KW, NULL_KW, IDENT, DOT, MINUS, BANG,
    NOT_KW,
]);

/// Tokens an expression never swallows while recovering.
const EXPR_RECOVERY: SyntaxSet =
    SyntaxSet::new([COMMAND_END, RIGHT_BRACE, RIGHT_PAREN, COMMA, NEWLINE, EOF]);

pub(crate) fn expr(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    expr_bp(p, 0)
}

fn expr_bp(p: &mut Parser<'_>, min_precedence: u8) -> Option<CompletedMarker> {
    let mut lhs = unary_expr(p)?;

    while let Some(op) = BinaryOp::from_kind(p.peek_kind(LexMode::Expr)) {
        let precedence = op.precedence();
        if precedence <= min_precedence {
            break;
        }

        let m = lhs.precede(p);
        p.advance(LexMode::Expr);
        expr_bp(p, precedence);
        lhs = m.complete(p, BINARY_EXPR);
    }

    lhs.into()
}

fn unary_expr(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    match p.nested(unary_or_primary) {
        Some(lhs) => lhs,
        None => Some(too_deep(p)),
    }
}

fn unary_or_primary(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    if UnaryOp::from_kind(p.peek_kind(LexMode::Expr)).is_none() {
        return primary_expr(p);
    }

    let m = p.start();
    p.advance(LexMode::Expr);
    unary_expr(p);
    m.complete(p, UNARY_EXPR).into()
}

/// Skips an operand nested past the limit. Parentheses stay balanced, so
/// the enclosing ones still find their `)`.
fn too_deep(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    p.error(LexMode::Expr, "expression is nested too deeply");

    let mut open = 0usize;
    loop {
        match p.peek_kind(LexMode::Expr) {
            LEFT_PAREN => open += 1,
            RIGHT_PAREN if open > 0 => open -= 1,
            kind if EXPR_RECOVERY.contains(kind) => break,
            _ => {}
        }
        p.advance(LexMode::Expr);
    }

    m.complete(p, ERROR)
}

fn primary_expr(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    let kind = match p.peek_kind(LexMode::Expr) {
        NUMBER => NUMBER_EXPR,
        STRING => STRING_EXPR,
        TRUE_KW | FALSE_KW => BOOL_EXPR,
        NULL_KW => NULL_EXPR,
        LEFT_PAREN => return paren_expr(p).into(),
        DOLLAR => return variable_expr(p).into(),
        DOT => return member_expr(p, None).into(),
        IDENT => return ident_expr(p).into(),
        _ => {
            p.error_recover(LexMode::Expr, "expected expression", &EXPR_RECOVERY);
            return None;
        }
    };

    let m = p.start();
    p.advance(LexMode::Expr);
    m.complete(p, kind).into()
}

fn paren_expr(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    p.advance(LexMode::Expr);
    expr(p);
    p.expect(LexMode::Expr, RIGHT_PAREN, "expected `)`");
    m.complete(p, PAREN_EXPR)
}

pub(crate) fn variable_expr(p: &mut Parser<'_>) -> CompletedMarker {
    debug_assert_eq!(p.peek_kind(LexMode::Expr), DOLLAR);

    let m = p.start();
    p.advance(LexMode::Expr);
    p.expect(LexMode::Name, IDENT, "expected a variable name");
    m.complete(p, VARIABLE_EXPR)
}

fn ident_expr(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    p.advance(LexMode::Expr);

    match p.peek_kind(LexMode::Expr) {
        LEFT_PAREN => {
            let call = m.complete(p, NAME).precede(p);
            arg_list(p);
            call.complete(p, CALL_EXPR)
        }
        DOT => {
            let name = m.complete(p, NAME);
            member_expr(p, Some(name))
        }
        _ => m.complete(p, IDENT_EXPR),
    }
}

/// `Type.member`, or `.member` when the type is implied.
fn member_expr(p: &mut Parser<'_>, type_name: Option<CompletedMarker>) -> CompletedMarker {
    let m = match type_name {
        Some(name) => name.precede(p),
        None => p.start(),
    };
    p.advance(LexMode::Expr);
    name(p, &EXPR_RECOVERY);
    m.complete(p, MEMBER_EXPR)
}

fn arg_list(p: &mut Parser<'_>) {
    let m = p.start();
    delimited(
        p,
        LexMode::Expr,
        LEFT_PAREN,
        RIGHT_PAREN,
        COMMA,
        "expected an argument",
        &EXPR_FIRST,
        |p| expr(p).is_some(),
    );
    m.complete(p, ARG_LIST);
}
