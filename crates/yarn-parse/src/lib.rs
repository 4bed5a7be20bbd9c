//! Parser for Yarn dialogue scripts.
//!
//! [`parse`] turns a script into a lossless [`GreenNode`] tree plus a list of
//! [`Diagnostic`]s; it never fails. [`Parse::reparse`] applies an edit by
//! re-parsing only the dialogue node that contains it, and falls back to a
//! full parse whenever the node boundaries or the indentation state around it
//! could have changed.

use std::fmt::Write as _;

use text_size::{TextRange, TextSize};
use tracing::debug;
use yarn_errors::{Diagnostic, locate_all};
use yarn_syntax::{GreenNode, NodeOrToken, SyntaxNode, ast};
pub use yarn_tokenizer::{OptionBreak, ScannerConfig};

mod grammar;
mod parser;
mod reparse;

use parser::Parser;

/// Parser state at the start of a top-level item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Checkpoint {
    pub(crate) offset: TextSize,
    /// Serialized indentation stack.
    pub(crate) state: Vec<u8>,
    /// Number of diagnostics reported before the item.
    pub(crate) diagnostics: usize,
}

/// The result of parsing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parse {
    green: GreenNode,
    diagnostics: Vec<Diagnostic>,
    checkpoints: Vec<Checkpoint>,
    config: ScannerConfig,
}

impl Parse {
    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn tree(&self) -> ast::SourceFile {
        ast::SourceFile::new_root(self.green.clone())
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn config(&self) -> ScannerConfig {
        self.config
    }

    /// Applies `edit`, which turned the parsed text into `text`.
    ///
    /// The result is always the same as `parse_with(text, self.config())`.
    pub fn reparse(&self, edit: &TextEdit, text: &str) -> Parse {
        if let Some(parse) = reparse::reparse_node(self, edit, text) {
            return parse;
        }

        debug!(?edit, "falling back to a full parse");
        parse_with(text, self.config)
    }

    /// An indented dump of the tree, one node or token per line.
    pub fn debug_tree(&self) -> String {
        let mut buf = String::new();
        write_tree(&mut buf, &self.syntax(), 0);
        buf
    }
}

fn write_tree(buf: &mut String, node: &SyntaxNode, depth: usize) {
    let _ = writeln!(buf, "{:indent$}{node:?}", "", indent = depth * 2);

    for child in node.children_with_tokens() {
        match child {
            NodeOrToken::Node(node) => write_tree(buf, &node, depth + 1),
            NodeOrToken::Token(token) => {
                let _ = writeln!(buf, "{:indent$}{token:?}", "", indent = (depth + 1) * 2);
            }
        }
    }
}

/// A single replacement: the bytes in `delete` were replaced by
/// `insert_len` new bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEdit {
    pub delete: TextRange,
    pub insert_len: TextSize,
}

impl TextEdit {
    pub fn new(delete: TextRange, insert_len: TextSize) -> Self {
        Self { delete, insert_len }
    }

    pub fn replace(delete: TextRange, insert: &str) -> Self {
        Self::new(delete, TextSize::of(insert))
    }

    pub fn insert(offset: TextSize, insert: &str) -> Self {
        Self::replace(TextRange::empty(offset), insert)
    }

    pub fn delete(range: TextRange) -> Self {
        Self::new(range, TextSize::new(0))
    }

    /// Change in text length.
    pub fn delta(&self) -> i64 {
        i64::from(u32::from(self.insert_len)) - i64::from(u32::from(self.delete.len()))
    }

    /// Applies the edit to `text`.
    pub fn apply(&self, text: &mut String, insert: &str) {
        debug_assert_eq!(TextSize::of(insert), self.insert_len);
        text.replace_range(std::ops::Range::<usize>::from(self.delete), insert);
    }
}

pub fn parse(text: &str) -> Parse {
    parse_with(text, ScannerConfig::default())
}

pub fn parse_with(text: &str, config: ScannerConfig) -> Parse {
    finish(Parser::new(text, config), text, config)
}

/// Like [`parse_with`], but stops early once `cancel` returns `true`. The
/// unparsed rest of the file ends up in a single ERROR node.
pub fn parse_with_cancel(text: &str, config: ScannerConfig, cancel: &dyn Fn() -> bool) -> Parse {
    finish(Parser::new(text, config).with_cancel(cancel), text, config)
}

fn finish(mut p: Parser<'_>, text: &str, config: ScannerConfig) -> Parse {
    grammar::nodes::source_file(&mut p);

    let cancelled = p.is_cancelled();
    let (green, mut diagnostics, mut checkpoints) = p.build_tree();
    if cancelled {
        // A truncated tree cannot be reused.
        checkpoints.clear();
    }
    locate_all(&mut diagnostics, text);

    debug!(bytes = text.len(), diagnostics = diagnostics.len(), cancelled, "parsed file");
    Parse { green, diagnostics, checkpoints, config }
}
