use text_size::TextRange;
use yarn_errors::SyntaxError;
use yarn_syntax::SyntaxKind::*;
use yarn_syntax::SyntaxSet;
use yarn_tokenizer::LexMode;

use crate::grammar::stmts::stmt_list;
use crate::grammar::{end_of_line, exprs};
use crate::parser::Parser;

const NODE_FIRST: SyntaxSet = SyntaxSet::new([TITLE_KW, WHEN_KW, IDENT, BODY_START]);

/// Parses a whole file. Every child of the root starts at a recorded
/// checkpoint, so a single dialogue node can later be parsed on its own.
pub(crate) fn source_file(p: &mut Parser<'_>) {
    let m = p.start();
    let mut nodes = 0;

    loop {
        p.checkpoint();
        if p.cancelled() {
            break;
        }

        match p.peek_kind(LexMode::Header) {
            EOF => break,
            HASH => file_hashtag(p),
            kind if NODE_FIRST.contains(kind) => {
                dialogue_node(p);
                nodes += 1;
            }
            _ => stray_line(p),
        }
    }

    if p.is_cancelled() {
        let error = p.start();
        p.advance_rest();
        error.complete(p, ERROR);
    } else if nodes == 0 {
        let range = TextRange::empty(p.peek(LexMode::Header).kind_range.start());
        p.error_at(range, SyntaxError::EmptyFile, "expected at least one node");
    }

    p.eof();
    m.complete(p, SOURCE_FILE);
}

/// Parses the dialogue node at a checkpoint, if one starts there.
pub(crate) fn item(p: &mut Parser<'_>) -> bool {
    if !p.at_set(LexMode::Header, &NODE_FIRST) {
        return false;
    }

    dialogue_node(p);
    true
}

fn stray_line(p: &mut Parser<'_>) {
    let m = p.start();
    p.error(LexMode::Header, "expected a node header");
    p.skip_line(LexMode::Header);
    p.eat(LexMode::Text, NEWLINE);
    m.complete(p, ERROR);
}

fn file_hashtag(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance(LexMode::Header);
    p.expect(LexMode::Hashtag, HASHTAG_TEXT, "expected hashtag text");
    end_of_line(p, LexMode::Header);
    m.complete(p, FILE_HASHTAG);
}

fn dialogue_node(p: &mut Parser<'_>) {
    let m = p.start();
    let first = p.peek(LexMode::Header).kind_range;
    let mut titles = 0;

    loop {
        match p.peek_kind(LexMode::Header) {
            TITLE_KW => {
                if titles > 0 {
                    p.error_kind(
                        LexMode::Header,
                        SyntaxError::DuplicateTitle,
                        "a node can only have one `title` header",
                    );
                }
                titles += 1;
                title_header(p);
            }
            WHEN_KW => when_header(p),
            IDENT => generic_header(p),
            BODY_START | BODY_END | EOF => break,
            _ => {
                p.error_line(LexMode::Header, "expected a header or `---`");
                p.eat(LexMode::Text, NEWLINE);
            }
        }
    }

    if titles == 0 {
        p.error_at(first, SyntaxError::MissingTitle, "expected a `title` header");
    }

    if !p.at(LexMode::Header, BODY_START) {
        p.error(LexMode::Header, "expected `---`");
        m.complete(p, ERROR);
        return;
    }

    let closed = body(p);
    m.complete(p, if closed { DIALOGUE_NODE } else { ERROR });
}

fn title_header(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance(LexMode::Header);
    p.expect(LexMode::Header, COLON, "expected `:`");

    if !p.eat(LexMode::HeaderValue, REST_OF_LINE) {
        p.error(LexMode::HeaderValue, "expected node title");
    }

    end_of_line(p, LexMode::Header);
    m.complete(p, TITLE_HEADER);
}

fn when_header(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance(LexMode::Header);
    p.expect(LexMode::Header, COLON, "expected `:`");

    let condition = p.start();
    match p.peek_kind(LexMode::WhenHeader) {
        ALWAYS_KW => p.advance(LexMode::WhenHeader),
        ONCE_KW => {
            p.advance(LexMode::WhenHeader);
            if p.eat(LexMode::WhenHeader, IF_KW) {
                exprs::expr(p);
            }
        }
        _ => {
            exprs::expr(p);
        }
    }
    condition.complete(p, WHEN_CONDITION);

    end_of_line(p, LexMode::Header);
    m.complete(p, WHEN_HEADER);
}

fn generic_header(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance(LexMode::Header);

    if p.expect(LexMode::Header, COLON, "expected `:`") {
        p.eat(LexMode::HeaderValue, REST_OF_LINE);
        end_of_line(p, LexMode::Header);
    } else {
        p.skip_line(LexMode::Text);
        p.eat(LexMode::Text, NEWLINE);
    }

    m.complete(p, HEADER);
}

/// `---` statements `===`. Returns whether the closing marker was found.
fn body(p: &mut Parser<'_>) -> bool {
    let m = p.start();
    p.advance(LexMode::Header);
    end_of_line(p, LexMode::Text);

    loop {
        stmt_list(p, &SyntaxSet::EMPTY);

        if p.is_cancelled() || !p.at(LexMode::Statement, DEDENT) {
            break;
        }
        let error = p.start();
        p.error(LexMode::Statement, "unexpected end of block");
        p.advance(LexMode::Statement);
        error.complete(p, ERROR);
    }

    let closed = p.eat(LexMode::Statement, BODY_END);
    if closed {
        end_of_line(p, LexMode::Header);
    } else {
        p.error_kind(LexMode::Statement, SyntaxError::MissingEndMarker, "expected `===`");
    }

    m.complete(p, BODY);
    closed
}
