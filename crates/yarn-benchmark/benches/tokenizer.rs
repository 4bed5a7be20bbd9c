use codspeed_criterion_compat::{
    Criterion, Throughput, black_box, criterion_group, criterion_main,
};
use yarn_tokenizer::{LexMode, ScannerConfig, SyntaxKind, Tokenizer};

static DIALOGUE: &str = "\
Narrator: It was the year when they finally immanentized the Eschaton. #intro
Narrator: It was the year when they finally immanentized the Eschaton. #intro
Narrator: It was the year when they finally immanentized the Eschaton. #intro
Narrator: It was the year when they finally immanentized the Eschaton. #intro
Narrator: It was the year when they finally immanentized the Eschaton. #intro
Narrator: It was the year when they finally immanentized the Eschaton. #intro
Narrator: It was the year when they finally immanentized the Eschaton. #intro
Narrator: It was the year when they finally immanentized the Eschaton. #intro
";

static NESTED: &str = "\
-> one
    -> two
        -> three
            deep
        back
    out
-> one
    -> two
        -> three
            deep
        back
    out
-> one
    -> two
        -> three
            deep
        back
    out
";

static CANDIDATES: [(&str, &str); 2] = [("dialogue", DIALOGUE), ("indentation", NESTED)];

fn iterate(s: &str) {
    let mut tokenizer = Tokenizer::new(s, ScannerConfig::default());
    let mut mode = LexMode::Statement;

    loop {
        let token = tokenizer.bump(mode);

        mode = match token.kind {
            SyntaxKind::EOF => break,
            SyntaxKind::NEWLINE | SyntaxKind::INDENT | SyntaxKind::DEDENT => LexMode::Statement,
            SyntaxKind::HASH => LexMode::Hashtag,
            _ => LexMode::Text,
        };

        black_box(token);
    }
}

fn bench_iterate(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterate");

    for (name, source) in CANDIDATES {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(name, &source, |b, &s| b.iter(|| iterate(s)));
    }
}

criterion_group!(benches, bench_iterate);
criterion_main!(benches);
