mod reports;
mod sources;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use marketsynth_engine::{BatchReport, CollisionPolicy, CommitOptions, CommitSummary, MarketEngine};
use sources::{FileCorpus, FileLoader};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Grouped `// STATE:` block of formatted records
    Entries,
    /// Colored summary for humans
    Console,
    Json,
    Markdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnCollision {
    /// Keep whichever record has the higher overall score
    KeepHigherScore,
    /// Never overwrite an existing record
    KeepExisting,
    /// Always overwrite with the new record
    Replace,
}

impl From<OnCollision> for CollisionPolicy {
    fn from(value: OnCollision) -> Self {
        match value {
            OnCollision::KeepHigherScore => Self::KeepHigherScore,
            OnCollision::KeepExisting => Self::KeepExisting,
            OnCollision::Replace => Self::Replace,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "marketsynth", version)]
#[command(about = "Synthesize short-term-rental market records for towns without curated data")]
struct Args {
    /// JSON array of city descriptors (defaults to the bundled list)
    #[arg(long)]
    descriptors: Option<PathBuf>,

    /// JSON calibration tables (defaults to the bundled tables)
    #[arg(long)]
    calibration: Option<PathBuf>,

    /// Existing corpus file; known ids are skipped
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Entries)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Insert the new records into the corpus file and rewrite it
    #[arg(long, requires = "corpus")]
    insert: bool,

    /// Collapse duplicate ids in the corpus to their best-scoring record
    #[arg(long, requires = "corpus")]
    dedup: bool,

    /// How inserted records resolve ids already in the corpus
    #[arg(long, value_enum, default_value_t = OnCollision::KeepHigherScore)]
    on_collision: OnCollision,

    /// Only synthesize these ids (comma-separated)
    #[arg(long)]
    only: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    announce_banner();

    let start_time = Instant::now();
    let mut sink = ReportSink::open(args.output.as_deref(), args.corpus.as_deref())?;
    let engine = MarketEngine::new(
        FileLoader {
            descriptors: args.descriptors.clone(),
            calibration: args.calibration.clone(),
        },
        FileCorpus {
            path: args.corpus.clone(),
        },
    );

    let only = args.only.as_deref().map(split_csv);
    let mut run = engine
        .generate(only.as_ref())
        .context("failed to synthesize descriptors")?;
    if args.verbose {
        eprintln!(
            "🏗️  {} synthesized, {} rejected, {} skipped",
            run.report.cities.len(),
            run.report.rejections.len(),
            run.report.skipped.len()
        );
    }

    let commit = if args.insert || args.dedup {
        let summary = engine
            .commit(&mut run, commit_options(&args))
            .context("failed to update corpus")?;
        Some(summary)
    } else {
        None
    };

    write_report(&mut sink, args.report, &run.report, commit.as_ref(), start_time)?;
    sink.finish()?;

    if run.report.has_rejections() {
        for rejection in &run.report.rejections {
            eprintln!("❌ {}", rejection.error.to_string().red());
        }
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn announce_banner() {
    eprintln!("{}", "🏘️  Marketsynth".bright_cyan().bold());
    eprintln!("{}", "===============".cyan());
}

fn split_csv(s: &str) -> BTreeSet<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn commit_options(args: &Args) -> CommitOptions {
    CommitOptions {
        insert: args.insert,
        dedup: args.dedup,
        policy: args.on_collision.into(),
    }
}

fn write_report<W: Write>(
    out: &mut W,
    format: ReportFormat,
    report: &BatchReport,
    commit: Option<&CommitSummary>,
    start_time: Instant,
) -> Result<()> {
    match format {
        ReportFormat::Entries => reports::generate_entries_report(out, report),
        ReportFormat::Json => reports::generate_json_report(out, report, commit),
        ReportFormat::Markdown => reports::generate_markdown_report(out, report, commit),
        ReportFormat::Console => {
            reports::generate_console_report(out, report, commit, start_time.elapsed())
        }
    }
}

/// Where the report goes: the `--output` file, or stdout.
///
/// The report file is opened before any synthesis so a bad path fails fast,
/// and it may never be the corpus file that `--insert`/`--dedup` rewrite.
struct ReportSink {
    writer: BufWriter<Box<dyn Write>>,
    path: Option<PathBuf>,
}

impl ReportSink {
    fn open(output: Option<&Path>, corpus: Option<&Path>) -> Result<Self> {
        let Some(path) = output else {
            return Ok(Self {
                writer: BufWriter::new(Box::new(stdout())),
                path: None,
            });
        };
        if corpus.is_some_and(|corpus| same_location(corpus, path)) {
            bail!(
                "report output {} is the corpus file; choose another --output",
                path.display()
            );
        }
        let file = File::create(path)
            .with_context(|| format!("failed to create report {}", path.display()))?;
        Ok(Self {
            writer: BufWriter::new(Box::new(file)),
            path: Some(path.to_path_buf()),
        })
    }

    fn finish(mut self) -> Result<()> {
        self.writer.flush().context("failed to flush report")?;
        if let Some(path) = &self.path {
            log::info!("report written to {}", path.display());
        }
        Ok(())
    }
}

impl Write for ReportSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

fn same_location(left: &Path, right: &Path) -> bool {
    if left == right {
        return true;
    }
    match (fs::canonicalize(left), fs::canonicalize(right)) {
        (Ok(left), Ok(right)) => left == right,
        _ => false,
    }
}
