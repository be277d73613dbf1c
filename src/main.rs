//! contentlist - catalog directory trees into manifests and verify them later.
//!
//! Usage:
//!   contentlist create <OUTPUT> <INPUTS>...      Write a manifest of the inputs
//!   contentlist validate <MANIFEST> <BASE_DIR>   Check files against a manifest
//!   contentlist ls <MANIFEST> [PATH]             List a directory of a manifest
//!   contentlist search <MANIFEST> <TEXT>         Find manifest nodes by name
//!   contentlist show <MANIFEST> <PATH>           Print one manifest entry
//!   contentlist --help                           Show help

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, bail};
use tracing_subscriber::EnvFilter;

use contentlist_codec::{EntryReader, EntryWriter, hex, meta};
use contentlist_core::{CancelToken, ContentPath, CreateConfig, Entry, WriterConfig};
use contentlist_scan::{Creator, WriterSink};
use contentlist_verify::{Outcome, TreeValidator, ValidateEvents, VerifyError, validate_manifest};
use contentlist_vfs::{SearchOptions, VirtualFileSystem};

#[derive(Parser)]
#[command(
    name = "contentlist",
    version,
    about = "Catalog directory trees into manifests and verify them later",
    long_about = "contentlist records the size, timestamps, a leading sample and the \
                  SHA-256 digest of every file below the given inputs, and later \
                  re-checks a directory against that record."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a manifest describing the inputs
    Create {
        /// Manifest file to write
        output: PathBuf,

        /// Files and directories to catalog; each becomes a top-level entry
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Number of leading bytes sampled from each file
        #[arg(short, long, default_value_t = contentlist_core::DEFAULT_SAMPLE_SIZE)]
        sample_size: usize,

        /// Skip the SHA-256 digest
        #[arg(long)]
        no_hash: bool,

        /// Omit the files and directories columns
        #[arg(long)]
        no_counts: bool,

        /// Omit the sample column
        #[arg(long)]
        no_sample: bool,

        /// Omit the meta column
        #[arg(long)]
        no_meta: bool,
    },

    /// Check a directory against a manifest
    Validate {
        /// Manifest to check against
        manifest: PathBuf,

        /// Directory the manifest's root maps to
        base_dir: PathBuf,

        /// Only validate this manifest subtree
        #[arg(short, long)]
        path: Option<String>,
    },

    /// List the contents of a manifest directory
    Ls {
        /// Manifest to read
        manifest: PathBuf,

        /// Directory inside the manifest
        #[arg(default_value = "/")]
        path: String,

        /// Include the `.` and `..` links
        #[arg(short, long)]
        all: bool,
    },

    /// Find manifest nodes by name
    Search {
        /// Manifest to read
        manifest: PathBuf,

        /// Text to look for in node names
        text: String,

        /// Directory to search below
        #[arg(short, long, default_value = "/")]
        path: String,

        /// Match case exactly
        #[arg(short, long)]
        case_sensitive: bool,

        /// Match the whole name instead of a substring
        #[arg(short, long)]
        exact: bool,

        /// Sort directories first, then by name
        #[arg(short, long)]
        sort: bool,
    },

    /// Print a single manifest entry
    Show {
        /// Manifest to read
        manifest: PathBuf,

        /// Entry path inside the manifest
        path: String,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Create {
            output,
            inputs,
            sample_size,
            no_hash,
            no_counts,
            no_sample,
            no_meta,
        } => {
            let config = CreateConfig::builder()
                .sample_size(sample_size)
                .compute_hash(!no_hash)
                .build()
                .context("Invalid create options")?;
            let writer_config = WriterConfig::builder()
                .files_and_directories(!no_counts)
                .sample(!no_sample)
                .metadata(!no_meta)
                .build()
                .context("Invalid writer options")?;
            run_create(&output, &inputs, config, writer_config)?;
        }
        Command::Validate {
            manifest,
            base_dir,
            path,
        } => {
            run_validate(&manifest, &base_dir, path.as_deref())?;
        }
        Command::Ls {
            manifest,
            path,
            all,
        } => {
            run_ls(&manifest, &path, all)?;
        }
        Command::Search {
            manifest,
            text,
            path,
            case_sensitive,
            exact,
            sort,
        } => {
            let options = SearchOptions::default()
                .case_sensitive(case_sensitive)
                .exact_match(exact)
                .sort(sort);
            run_search(&manifest, &text, &path, &options)?;
        }
        Command::Show {
            manifest,
            path,
            format,
        } => {
            run_show(&manifest, &path, format)?;
        }
    }

    Ok(())
}

/// Walk the inputs and write the manifest.
fn run_create(
    output: &Path,
    inputs: &[PathBuf],
    config: CreateConfig,
    writer_config: WriterConfig,
) -> Result<()> {
    let file = File::create(output)
        .with_context(|| format!("Cannot create {}", output.display()))?;
    let mut sink = WriterSink::new(EntryWriter::new(BufWriter::new(file), writer_config));

    eprintln!("Cataloging {} input(s)...", inputs.len());

    let creator = Creator::new(config, CancelToken::new());
    let summary = creator.create(inputs, &mut sink).context("Create failed")?;

    for rejection in sink.rejections() {
        eprintln!("warning: skipped {rejection}");
    }
    sink.into_writer()
        .into_inner()
        .with_context(|| format!("Cannot write {}", output.display()))?;

    println!(
        "{} files, {} directories, {} bytes in {:.2}s",
        summary.files,
        summary.directories,
        summary.bytes,
        summary.elapsed.as_secs_f64()
    );
    eprintln!("Wrote {}", output.display());

    if summary.rejected > 0 {
        bail!("{} input(s) or node(s) could not be cataloged", summary.rejected);
    }
    Ok(())
}

/// Prints mismatches as they are found.
#[derive(Default)]
struct MismatchReporter {
    reported: u64,
}

impl ValidateEvents for MismatchReporter {
    fn on_entry_finish(&mut self, entry: &Entry, outcome: &Outcome) -> Result<(), VerifyError> {
        if !outcome.is_success() {
            self.reported += 1;
            eprintln!("{}: {}", entry.path(), outcome);
        }
        Ok(())
    }
}

/// Check the files below `base_dir` against the manifest.
fn run_validate(manifest: &Path, base_dir: &Path, path: Option<&str>) -> Result<()> {
    let base = base_dir.canonicalize().context("Invalid base directory")?;
    let cancel = CancelToken::new();
    let mut reporter = MismatchReporter::default();

    eprintln!("Validating {} against {}...", base.display(), manifest.display());

    let summary = match path {
        // A subtree needs the tree to find its members.
        Some(path) => {
            let vfs = load(manifest)?;
            let start = parse_path(path)?;
            TreeValidator::new(&vfs, &base, cancel)?
                .validate(&start, &mut reporter)
                .context("Validation failed")?
        }
        None => {
            let file = File::open(manifest)
                .with_context(|| format!("Cannot open {}", manifest.display()))?;
            validate_manifest(
                EntryReader::new(BufReader::new(file)),
                &base,
                &mut reporter,
                cancel,
            )
            .context("Validation failed")?
        }
    };

    println!("{}", summary.summary());
    if !summary.all_passed() {
        bail!("{} entries do not match the manifest", reporter.reported);
    }
    Ok(())
}

/// List one manifest directory.
fn run_ls(manifest: &Path, path: &str, all: bool) -> Result<()> {
    let mut vfs = load(manifest)?;
    vfs.recompute_aggregates();
    let path = parse_path(path)?;

    let Some(children) = vfs.list_files(&path, all) else {
        bail!("{path} is not a directory in {}", manifest.display());
    };

    for child in children {
        let name = child.name().unwrap_or("/");
        match vfs.get_entry(&child) {
            Some(entry) if !child.has_special_links() => println!(
                "{:<12} {:>14} {}{}",
                entry.entry_type().to_string(),
                entry.size,
                name,
                if entry.is_dir() { "/" } else { "" }
            ),
            _ => println!("{:<12} {:>14} {}", "", "", name),
        }
    }
    Ok(())
}

/// Print matching paths, one per line.
fn run_search(manifest: &Path, text: &str, path: &str, options: &SearchOptions) -> Result<()> {
    let vfs = load(manifest)?;
    let path = parse_path(path)?;

    let Some(hits) = vfs.search(&path, text, options) else {
        bail!("{path} does not exist in {}", manifest.display());
    };

    for hit in &hits {
        println!("{hit}");
    }
    eprintln!("{} match(es)", hits.len());
    Ok(())
}

/// Print every recorded field of one entry.
fn run_show(manifest: &Path, path: &str, format: OutputFormat) -> Result<()> {
    let vfs = load(manifest)?;
    let path = parse_path(path)?;

    let Some(entry) = vfs.get_entry(&path) else {
        if vfs.exists(&path) {
            bail!("{path} has no entry of its own in {}", manifest.display());
        }
        bail!("{path} does not exist in {}", manifest.display());
    };

    match format {
        OutputFormat::Text => {
            println!("{}", "─".repeat(60));
            println!(" {}", entry.path());
            println!("{}", "─".repeat(60));
            println!(" type         {}", entry.entry_type());
            println!(" created      {}", format_millis(entry.created));
            println!(" modified     {}", format_millis(entry.modified));
            println!(" size         {}", entry.size);
            if entry.is_dir() {
                println!(" files        {}", entry.files);
                println!(" directories  {}", entry.directories);
            }
            if let Some(digest) = entry.sha256() {
                println!(" sha256       {digest}");
            }
            if let Some(sample) = entry.sample() {
                println!(" sample       {}", hex::encode(sample));
            }
            if !entry.metadata.is_empty() {
                println!(" meta         {}", meta::format(&entry.metadata));
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(entry)?);
        }
    }

    Ok(())
}

/// Read a manifest into a tree.
fn load(manifest: &Path) -> Result<VirtualFileSystem> {
    let file =
        File::open(manifest).with_context(|| format!("Cannot open {}", manifest.display()))?;
    let vfs = VirtualFileSystem::from_reader(EntryReader::new(BufReader::new(file)), |entry, accepted| {
        if !accepted {
            eprintln!("warning: ignoring conflicting entry {}", entry.path());
        }
    })
    .with_context(|| format!("Cannot read {}", manifest.display()))?;
    Ok(vfs)
}

/// Parse a manifest path given on the command line.
fn parse_path(text: &str) -> Result<ContentPath> {
    ContentPath::parse(text).with_context(|| format!("Invalid manifest path {text:?}"))
}

/// Format epoch milliseconds as a UTC timestamp; 0 means unknown.
fn format_millis(millis: i64) -> String {
    if millis == 0 {
        return "-".to_string();
    }
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|time| time.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string())
        .unwrap_or_else(|| millis.to_string())
}
