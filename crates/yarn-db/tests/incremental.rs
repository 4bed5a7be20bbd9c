use salsa::Setter as _;
use text_size::{TextRange, TextSize};
use yarn_db::{File, RootDatabase, check_file, edit_file, set_file_text};
use yarn_parse::{OptionBreak, ScannerConfig, TextEdit};

const TEXT: &str = "title: A\n---\n-> one\n\n-> two\n===\ntitle: B\n---\nhello\n===\n";

fn replace(db: &mut RootDatabase, file: File, needle: &str, insert: &str) {
    let start = file.text(&*db).find(needle).unwrap();
    let delete = TextRange::at(TextSize::new(start as u32), TextSize::of(needle));
    edit_file(db, file, TextEdit::replace(delete, insert), insert);
}

#[test]
fn edits_match_a_fresh_parse() {
    let mut db = RootDatabase::default();
    let file = File::open(&db, "a.yarn".into(), TEXT.to_owned());
    let before = file.parse(&db).clone();

    replace(&mut db, file, "hello", "hello {$name}");
    assert_eq!(file.text(&db), TEXT.replace("hello", "hello {$name}"));
    assert_eq!(file.parse(&db), &yarn_parse::parse(file.text(&db)));

    let after = file.parse(&db);
    let first = |parse: &yarn_parse::Parse| match &parse.green().children()[0] {
        yarn_syntax::NodeOrToken::Node(node) => node.clone(),
        yarn_syntax::NodeOrToken::Token(_) => unreachable!(),
    };
    assert!(first(after).ptr_eq(&first(&before)));
}

#[test]
fn edits_that_break_a_node() {
    let mut db = RootDatabase::default();
    let file = File::open(&db, "a.yarn".into(), TEXT.to_owned());
    assert!(check_file(&db, file).is_empty());

    replace(&mut db, file, "hello\n===", "hello\n");
    assert_eq!(file.parse(&db), &yarn_parse::parse(file.text(&db)));

    let codes: Vec<_> = check_file(&db, file).iter().map(|d| d.kind().code()).collect();
    assert_eq!(codes, ["missing-end-marker"]);
}

#[test]
fn config_changes_invalidate_the_parse() {
    let mut db = RootDatabase::default();
    let file = File::open(&db, "a.yarn".into(), TEXT.to_owned());
    let groups = |db: &RootDatabase| {
        let tree = file.parse(db).tree();
        let node = tree.nodes().next().unwrap();
        node.body().unwrap().statements().count()
    };
    assert_eq!(groups(&db), 1);

    replace(&mut db, file, "one", "uno");
    file.set_config(&mut db)
        .to(ScannerConfig { option_break: OptionBreak::AfterAnyItem, ..ScannerConfig::default() });
    assert_eq!(groups(&db), 2);
    assert_eq!(file.parse(&db).config().option_break, OptionBreak::AfterAnyItem);
}

#[test]
fn replacing_the_text_drops_the_pending_edit() {
    let mut db = RootDatabase::default();
    let file = File::open(&db, "a.yarn".into(), TEXT.to_owned());

    replace(&mut db, file, "hello", "bye");
    set_file_text(&mut db, file, "title: C\n---\n===\n".to_owned());

    assert!(file.pending(&db).is_none());
    assert_eq!(file.parse(&db), &yarn_parse::parse("title: C\n---\n===\n"));
}
