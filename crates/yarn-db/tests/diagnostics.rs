use yarn_db::{File, RootDatabase, check_file};

/// A diagnostic pinned to a 1-based source line.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Annotation {
    line: usize,
    message: String,
}

/// Reads `//~ ERROR message` markers. The marker is a Yarn comment, so the
/// fixture stays a valid script apart from the errors it documents.
fn annotations(fixture: &str) -> Vec<Annotation> {
    let mut annotations: Vec<_> = fixture
        .lines()
        .zip(1..)
        .filter_map(|(text, line)| {
            let (_, marker) = text.split_once("//~")?;
            let marker = marker.trim();
            let message = marker.strip_prefix("ERROR").unwrap_or(marker).trim();
            (!message.is_empty()).then(|| Annotation { line, message: message.to_owned() })
        })
        .collect();
    annotations.sort();
    annotations
}

fn reported(db: &RootDatabase, file: File) -> Vec<Annotation> {
    let line_index = file.line_index(db);
    let mut reported: Vec<_> = check_file(db, file)
        .iter()
        .map(|diagnostic| Annotation {
            line: line_index.line_col(diagnostic.range().start()).line as usize + 1,
            message: diagnostic.message().to_owned(),
        })
        .collect();
    reported.sort();
    reported
}

#[track_caller]
fn check(fixture: &str) {
    let fixture = fixture.strip_prefix('\n').unwrap_or(fixture);

    let db = RootDatabase::default();
    let file = File::open(&db, "fixture.yarn".into(), fixture.to_owned());

    let mut unmatched = reported(&db, file);
    let wanted = annotations(fixture);
    assert_eq!(
        wanted.len(),
        unmatched.len(),
        "wrong number of diagnostics\nwanted: {wanted:#?}\nreported: {unmatched:#?}",
    );

    for annotation in &wanted {
        let found = unmatched.iter().position(|reported| {
            reported.line == annotation.line && reported.message.contains(&annotation.message)
        });
        match found {
            Some(index) => {
                unmatched.remove(index);
            }
            None => panic!(
                "no diagnostic on line {} mentions `{}`\nreported: {unmatched:#?}",
                annotation.line, annotation.message
            ),
        }
    }
}

#[test]
fn well_formed_story() {
    check(
        r#"
title: Start
---
Hello {$name}. <<if $met>> #greeting
-> Stay
    <<set $stay to true>>
-> Leave
    <<jump End>>
===
title: End
---
Bye.
===
"#,
    );
}

#[test]
fn missing_endif() {
    check(
        r#"
title: A
---
<<if $x>>
    hi
=== //~ ERROR expected `<<endif>>`
"#,
    );
}

#[test]
fn missing_body_end_only_affects_its_node() {
    check(
        r#"
title: A
---
hello
title: B //~ ERROR expected `===`
---
world
===
"#,
    );
}

#[test]
fn duplicate_title() {
    check(
        r#"
title: A
title: B //~ ERROR a node can only have one `title` header
---
===
"#,
    );
}

#[test]
fn missing_title() {
    check(
        r#"
speaker: Bob //~ ERROR expected a `title` header
---
===
"#,
    );
}

#[test]
fn second_else() {
    check(
        r#"
title: A
---
<<if $x>>
    a
<<else>>
    b
<<else>> //~ ERROR a second `<<else>>` cannot be attached to a chain
    c
<<endif>>
===
"#,
    );
}

#[test]
fn stray_endif() {
    check(
        r#"
title: A
---
<<endif>> //~ ERROR no open `<<if>>`
===
"#,
    );
}

#[test]
fn indentation_mismatch() {
    check(
        r#"
title: A
---
<<if true>>
    a
   b //~ ERROR indentation does not match any enclosing block
<<endif>>
===
"#,
    );
}

#[test]
fn call_without_a_call() {
    check(
        r#"
title: A
---
<<call $x>> //~ ERROR expected a function call
===
"#,
    );
}

#[test]
fn enum_needs_cases() {
    check(
        r#"
title: A
---
<<enum Food>>
<<endenum>> //~ ERROR expected `<<case`
===
"#,
    );
}

#[test]
fn unmatched_brace_in_text() {
    check(
        r#"
title: A
---
Oops } here //~ ERROR unmatched `}`
===
"#,
    );
}
