use std::process::ExitCode;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use yarn_db::{File, RootDatabase, check_file};
use yarn_errors::{LineCol, Renderer};
use yarn_parse::{OptionBreak, ScannerConfig};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "yarn", about = "Parses Yarn dialogue scripts")]
struct Options {
    #[command(flatten)]
    scanner: ScannerOptions,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Reports every diagnostic and fails if there were any.
    Check {
        #[arg(required = true)]
        paths: Vec<Utf8PathBuf>,
    },
    /// Prints the syntax tree.
    Tree { path: Utf8PathBuf },
    /// Prints every token with its kind and position.
    Tokens { path: Utf8PathBuf },
}

#[derive(Args)]
struct ScannerOptions {
    /// Columns a tab counts for in indentation.
    #[arg(long, global = true, default_value_t = 8)]
    tab_width: u16,

    /// When a blank line after an option ends the option group.
    #[arg(long, global = true, value_enum, default_value_t = BreakArg::AfterNestedBlock)]
    option_break: BreakArg,

    /// Keep `=>` line groups together across blank lines.
    #[arg(long, global = true)]
    join_line_groups: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum BreakArg {
    AfterNestedBlock,
    AfterAnyItem,
    Never,
}

impl From<BreakArg> for OptionBreak {
    fn from(arg: BreakArg) -> Self {
        match arg {
            BreakArg::AfterNestedBlock => Self::AfterNestedBlock,
            BreakArg::AfterAnyItem => Self::AfterAnyItem,
            BreakArg::Never => Self::Never,
        }
    }
}

impl ScannerOptions {
    fn config(&self) -> ScannerConfig {
        ScannerConfig {
            tab_width: self.tab_width,
            option_break: self.option_break.into(),
            break_line_groups: !self.join_line_groups,
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("YARN_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = Options::parse();
    let config = options.scanner.config();
    let db = RootDatabase::default();

    match options.command {
        Command::Check { paths } => check(&db, paths, config),
        Command::Tree { path } => {
            let file = open(&db, path, config)?;
            print!("{}", file.parse(&db).debug_tree());
            Ok(ExitCode::SUCCESS)
        }
        Command::Tokens { path } => {
            let file = open(&db, path, config)?;
            let line_index = file.line_index(&db);

            for token in file.parse(&db).syntax().descendant_tokens() {
                let start = LineCol::of(line_index, token.trimmed_range().start()).to_string();
                let kind = format!("{:?}", token.kind());
                println!("{kind:<20} {start:<8} {:?}", token.text_trimmed());
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn open(db: &RootDatabase, path: Utf8PathBuf, config: ScannerConfig) -> anyhow::Result<File> {
    let text =
        std::fs::read_to_string(&path).with_context(|| format!("failed to read `{path}`"))?;
    Ok(File::new(db, path, text, config, None))
}

fn check(
    db: &RootDatabase,
    paths: Vec<Utf8PathBuf>,
    config: ScannerConfig,
) -> anyhow::Result<ExitCode> {
    let renderer = Renderer::styled();
    let mut errors = 0;

    for path in paths {
        let file = open(db, path, config)?;
        let diagnostics = check_file(db, file);

        let path = file.path(db).as_str();
        let text = file.text(db);
        for diagnostic in diagnostics {
            eprintln!("{}", diagnostic.render(&renderer, path, text));
        }

        debug!(path, diagnostics = diagnostics.len(), "checked file");
        errors += diagnostics.len();
    }

    if errors > 0 {
        eprintln!("found {errors} error(s)");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
