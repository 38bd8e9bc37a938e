//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use dealsignal_domain::SourceKind;
use std::path::PathBuf;

/// Dealsignal - Turn research files, pitch decks and firm websites into investment signals.
#[derive(Debug, Parser)]
#[command(name = "dealsignal")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "DEALSIGNAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database file path (overrides the configuration)
    #[arg(long, global = true, env = "DEALSIGNAL_DB")]
    pub db: Option<PathBuf>,

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
    /// Quiet format (IDs only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage the configuration file
    Config(ConfigArgs),

    #[command(flatten)]
    Data(DataCommand),
}

/// Commands that run against the signal database.
#[derive(Debug, Subcommand)]
pub enum DataCommand {
    /// Ingest a text file as a pending document
    Ingest(IngestArgs),

    /// Extract signals from one document
    Process(ProcessArgs),

    /// Extract signals from every pending document
    ProcessAll,

    /// Process pending documents on a schedule until Ctrl+C
    Watch(WatchArgs),

    /// Show signal counts by type and sector
    Summary,

    /// Show the most recent signals
    Recent(RecentArgs),

    /// Show the signals of one document
    Signals(SignalsArgs),

    /// Crawl a firm website and update its profile
    Enrich(EnrichArgs),

    /// Show a stored firm profile
    Profile(ProfileArgs),
}

/// Document origin.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum KindArg {
    /// Research report or market study
    ResearchFile,
    /// Startup pitch deck
    PitchDeck,
    /// Saved web page
    WebPage,
}

impl From<KindArg> for SourceKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::ResearchFile => SourceKind::ResearchFile,
            KindArg::PitchDeck => SourceKind::PitchDeck,
            KindArg::WebPage => SourceKind::WebPage,
        }
    }
}

/// Arguments for the ingest command.
#[derive(Debug, Parser)]
pub struct IngestArgs {
    /// Text file to ingest
    pub file: PathBuf,

    /// Document origin
    #[arg(short, long, value_enum, default_value = "research-file")]
    pub kind: KindArg,

    /// Source weight (0.0-1.0); defaults to the kind's weight
    #[arg(short, long)]
    pub weight: Option<f64>,

    /// Document title; defaults to the file name
    #[arg(short, long)]
    pub title: Option<String>,
}

/// Arguments for the process command.
#[derive(Debug, Parser)]
pub struct ProcessArgs {
    /// Document ID
    pub id: String,
}

/// Arguments for the watch command.
#[derive(Debug, Parser)]
pub struct WatchArgs {
    /// Stop after this many batches
    #[arg(long)]
    pub cycles: Option<usize>,
}

/// Arguments for the recent command.
#[derive(Debug, Parser)]
pub struct RecentArgs {
    /// Maximum number of results
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for the signals command.
#[derive(Debug, Parser)]
pub struct SignalsArgs {
    /// Document ID
    #[arg(short, long)]
    pub document: String,
}

/// Arguments for the enrich command.
#[derive(Debug, Parser)]
pub struct EnrichArgs {
    /// Profile key (slug or domain)
    pub firm: String,

    /// Website to crawl
    pub url: String,

    /// Do not store the crawled text as a document
    #[arg(long)]
    pub no_ingest: bool,
}

/// Arguments for the profile command.
#[derive(Debug, Parser)]
pub struct ProfileArgs {
    /// Profile key
    pub firm: String,
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
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
