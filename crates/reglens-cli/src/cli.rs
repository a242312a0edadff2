//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use reglens_domain::DocumentKey;
use std::path::PathBuf;

/// Reglens - change and relationship detection for regulatory documents.
#[derive(Debug, Parser)]
#[command(name = "reglens")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database path
    #[arg(long, global = true, env = "REGLENS_DB")]
    pub db: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (keys and counts only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Import documents from a JSON file, storing new and changed versions
    Import(ImportArgs),

    /// Classify a proposed version of one document without storing it
    DetectChange(DetectChangeArgs),

    /// Word-set similarity of two text files
    Similarity(SimilarityArgs),

    /// Classify the relationship between two stored documents
    Classify(ClassifyArgs),

    /// List relationship candidates in one partition without persisting
    Detect(DetectArgs),

    /// Detect and persist relationships across partitions
    Bulk(BulkArgs),

    /// Find near-duplicate documents
    Duplicates(DuplicatesArgs),

    /// Conflict summary, or the relationships of one document
    Summary(SummaryArgs),

    /// Documents updated in a recent period
    Report(ReportArgs),

    /// Recent changes of one document
    History(HistoryArgs),

    /// Conflicts touching one document
    Conflicts(ConflictsArgs),

    /// Run bulk detection on a schedule
    Watch(WatchArgs),
}

/// Arguments for the import command.
#[derive(Debug, Parser)]
pub struct ImportArgs {
    /// JSON file holding an array of documents
    pub file: PathBuf,

    /// Classify only; store nothing
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the detect-change command.
#[derive(Debug, Parser)]
pub struct DetectChangeArgs {
    /// Partition (1-50)
    #[arg(short, long)]
    pub partition: i64,

    /// Part number within the partition
    #[arg(long)]
    pub part: String,

    /// Proposed title
    #[arg(short, long)]
    pub title: String,

    /// Proposed agency name
    #[arg(short, long)]
    pub agency: String,

    /// File holding the proposed content
    #[arg(long)]
    pub content_file: PathBuf,
}

/// Arguments for the similarity command.
#[derive(Debug, Parser)]
pub struct SimilarityArgs {
    /// First text file
    pub file_a: PathBuf,

    /// Second text file
    pub file_b: PathBuf,
}

/// Arguments for the classify command.
#[derive(Debug, Parser)]
pub struct ClassifyArgs {
    /// First document (format: partition:part)
    pub first: DocumentKey,

    /// Second document (format: partition:part)
    pub second: DocumentKey,
}

/// Arguments for the detect command.
#[derive(Debug, Parser)]
pub struct DetectArgs {
    /// Partition (1-50)
    pub partition: i64,
}

/// Arguments for the bulk command.
#[derive(Debug, Parser)]
pub struct BulkArgs {
    /// Partitions to process (default: configured partitions, or all)
    pub partitions: Vec<i64>,

    /// Partitions processed at the same time
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Classify only; persist nothing
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the duplicates command.
#[derive(Debug, Parser)]
pub struct DuplicatesArgs {
    /// Restrict the scan to one partition
    #[arg(short, long)]
    pub partition: Option<i64>,

    /// Minimum similarity (0.0-1.0)
    #[arg(short, long, default_value = "0.8")]
    pub threshold: f64,
}

/// Arguments for the summary command.
#[derive(Debug, Parser)]
pub struct SummaryArgs {
    /// Summarize one document (format: partition:part)
    #[arg(short, long)]
    pub document: Option<DocumentKey>,
}

/// Arguments for the report command.
#[derive(Debug, Parser)]
pub struct ReportArgs {
    /// Length of the period in days
    #[arg(short, long, default_value = "7")]
    pub since_days: u64,
}

/// Arguments for the history command.
#[derive(Debug, Parser)]
pub struct HistoryArgs {
    /// Document (format: partition:part)
    pub document: DocumentKey,

    /// Length of the period in days
    #[arg(short, long, default_value = "30")]
    pub since_days: u64,
}

/// Arguments for the conflicts command.
#[derive(Debug, Parser)]
pub struct ConflictsArgs {
    /// Document (format: partition:part)
    pub document: DocumentKey,
}

/// Arguments for the watch command.
#[derive(Debug, Parser)]
pub struct WatchArgs {
    /// Stop after this many sweeps (default: run until Ctrl+C)
    #[arg(long)]
    pub cycles: Option<usize>,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}
