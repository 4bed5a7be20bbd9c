//! Memoized queries over Yarn files.
//!
//! A [`File`] is a salsa input holding the text and the scanner settings it
//! is parsed with. Edits made through [`edit_file`] remember the previous
//! parse so the next [`File::parse`] only re-parses the dialogue node that
//! was touched.

use camino::Utf8PathBuf;
pub use line_index::LineIndex;
use salsa::Setter as _;
use tracing::debug;
pub use yarn_errors::Diagnostic;
use yarn_parse::{Parse, ScannerConfig, TextEdit};

#[salsa::db]
#[derive(Clone, Default)]
pub struct RootDatabase {
    storage: salsa::Storage<Self>,
}

#[salsa::db]
impl salsa::Database for RootDatabase {}

/// A parse to start from, and the edit that was applied on top of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    pub base: Parse,
    pub edit: TextEdit,
}

#[salsa::input(debug)]
pub struct File {
    #[returns(ref)]
    pub path: Utf8PathBuf,
    #[returns(deref)]
    pub text: String,
    pub config: ScannerConfig,
    #[returns(ref)]
    pub pending: Option<PendingEdit>,
}

impl File {
    /// A file parsed with the default scanner settings.
    pub fn open<Db: salsa::Database>(db: &Db, path: Utf8PathBuf, text: String) -> Self {
        Self::new(db, path, text, ScannerConfig::default(), None)
    }
}

#[salsa::tracked]
impl File {
    #[salsa::tracked(returns(ref))]
    pub fn parse(self, db: &dyn salsa::Database) -> Parse {
        let text = self.text(db);
        let config = self.config(db);

        match self.pending(db) {
            Some(PendingEdit { base, edit }) if base.config() == config => {
                base.reparse(edit, text)
            }
            _ => yarn_parse::parse_with(text, config),
        }
    }

    #[salsa::tracked(returns(ref), no_eq)]
    pub fn line_index(self, db: &dyn salsa::Database) -> LineIndex {
        LineIndex::new(self.text(db))
    }
}

/// All diagnostics of `file`, in source order.
#[salsa::tracked(returns(ref))]
pub fn check_file(db: &dyn salsa::Database, file: File) -> Vec<Diagnostic> {
    let mut diagnostics = file.parse(db).diagnostics().to_vec();
    diagnostics.sort_by_key(|diagnostic| diagnostic.range().start());
    diagnostics
}

/// Replaces `edit.delete` with `insert`, keeping the current parse around so
/// the next parse can reuse the untouched nodes.
pub fn edit_file(db: &mut RootDatabase, file: File, edit: TextEdit, insert: &str) {
    let base = file.parse(&*db).clone();

    let mut text = file.text(&*db).to_owned();
    edit.apply(&mut text, insert);
    debug!(path = %file.path(&*db), ?edit, "editing file");

    file.set_text(db).to(text);
    file.set_pending(db).to(Some(PendingEdit { base, edit }));
}

/// Replaces the whole text of `file`.
pub fn set_file_text(db: &mut RootDatabase, file: File, text: String) {
    file.set_text(db).to(text);
    file.set_pending(db).to(None);
}
