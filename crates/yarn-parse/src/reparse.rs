//! Re-parsing a single dialogue node after an edit.
//!
//! Every top-level item starts on a fresh line at a recorded checkpoint, and
//! the tokenizer's only state across lines is the indentation stack. If the
//! edited node, parsed again from its checkpoint, ends at the shifted start
//! of the next item with the same stack, everything after it would parse
//! exactly as before and the old siblings can be reused.

use text_size::{TextRange, TextSize};
use tracing::debug;
use yarn_errors::locate_all;
use yarn_syntax::NodeOrToken;
use yarn_syntax::SyntaxKind::DIALOGUE_NODE;
use yarn_tokenizer::IndentStack;

use crate::grammar::nodes;
use crate::parser::Parser;
use crate::{Parse, TextEdit};

pub(crate) fn reparse_node(old: &Parse, edit: &TextEdit, text: &str) -> Option<Parse> {
    let old_len = i64::from(u32::from(old.green.text_len()));
    if old_len + edit.delta() != text.len() as i64 {
        return None;
    }

    let mut start = TextSize::new(0);
    for (index, child) in old.green.children().iter().enumerate() {
        let range = TextRange::at(start, child.text_len());
        start = range.end();

        if child.kind() == DIALOGUE_NODE
            && range.start() < edit.delete.start()
            && edit.delete.end() < range.end()
        {
            return reparse_child(old, index, range, edit, text);
        }
    }

    None
}

fn reparse_child(
    old: &Parse,
    index: usize,
    range: TextRange,
    edit: &TextEdit,
    text: &str,
) -> Option<Parse> {
    let checkpoint = old.checkpoints.get(index)?;
    let next = old.checkpoints.get(index + 1)?;
    let stack = IndentStack::deserialize(&checkpoint.state).ok()?;
    let delta = edit.delta();

    let mut p = Parser::resume(text, checkpoint.offset, stack, old.config);
    if !nodes::item(&mut p) {
        return None;
    }

    let end = p.offset();
    let state = p.state();
    let (green, diagnostics, _) = p.build_tree();

    if green.kind() != DIALOGUE_NODE {
        debug!(index, "edited node no longer parses as a node");
        return None;
    }
    if end != shift(range.end(), delta) || state != next.state {
        debug!(index, ?end, "edited node changed its boundary");
        return None;
    }

    let removed = next.diagnostics - checkpoint.diagnostics;
    let added = diagnostics.len();

    let mut new_diagnostics = Vec::with_capacity(old.diagnostics.len() - removed + added);
    new_diagnostics.extend_from_slice(&old.diagnostics[..checkpoint.diagnostics]);
    new_diagnostics.extend(diagnostics);
    new_diagnostics.extend(old.diagnostics[next.diagnostics..].iter().cloned().map(|mut d| {
        d.shift(delta);
        d
    }));
    locate_all(&mut new_diagnostics, text);

    let mut checkpoints = old.checkpoints.clone();
    for later in &mut checkpoints[index + 1..] {
        later.offset = shift(later.offset, delta);
        later.diagnostics = later.diagnostics - removed + added;
    }

    debug!(index, removed, added, "reused all but one top-level item");
    Some(Parse {
        green: old.green.replace_child(index, NodeOrToken::Node(green)),
        diagnostics: new_diagnostics,
        checkpoints,
        config: old.config,
    })
}

fn shift(offset: TextSize, delta: i64) -> TextSize {
    let shifted = i64::from(u32::from(offset)) + delta;
    TextSize::new(u32::try_from(shifted).unwrap_or(0))
}

