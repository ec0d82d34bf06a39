//! Command-line interface for Sibyl

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Verbosity level for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd)]
pub enum Verbosity {
    /// Quiet mode - only show errors
    Quiet = 0,

    /// Normal mode - show errors and warnings
    Normal = 1,

    /// Verbose mode - show errors, warnings, and info
    Verbose = 2,

    /// Debug mode - show everything including debug info
    Debug = 3,
}

impl Default for Verbosity {
    fn default() -> Self {
        Self::Normal
    }
}

impl From<u8> for Verbosity {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Quiet,
            1 => Self::Normal,
            2 => Self::Verbose,
            _ => Self::Debug,
        }
    }
}

/// Sibyl - Prophetic code analysis with AI-powered insight
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "🔮 Sibyl - Prophetic code analysis with AI-powered insight",
    long_about = "Sibyl consults large language models about your code the way the ancients consulted oracles - except this one answers in structured JSON. Point it at files or directories and it delivers prophecies about code quality, architecture, performance, and security, falling back to built-in heuristics when no model is reachable."
)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Files or directories to analyze
    #[arg(name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Verbosity level (-q=quiet, -v=verbose, -vv=very verbose)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (no output unless there are errors)
    #[arg(short, long)]
    pub quiet: bool,

    /// Custom configuration file
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable emoji in output
    #[arg(long)]
    pub no_emoji: bool,
}

/// Commands that Sibyl can execute
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze code (default command)
    #[command(visible_alias = "scan")]
    Analyze(AnalyzeArgs),

    /// Show the configured model chain and estimated costs
    #[command(visible_alias = "chain")]
    Models(ModelsArgs),
}

/// Arguments for the analyze command
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Analysis to run (code_quality, architecture, performance, security, or all)
    #[arg(short = 't', long = "type", default_value = "code_quality")]
    pub analysis_type: String,

    /// How deep the analysis should go (basic, standard, comprehensive, expert)
    #[arg(short, long, default_value = "standard")]
    pub depth: String,

    /// Rule to focus on (repeatable)
    #[arg(short = 'r', long = "rule")]
    pub rules: Vec<String>,

    /// Project kind hint passed to the analyzer
    #[arg(long)]
    pub project: Option<String>,

    /// Output format
    #[arg(long, default_value = "pretty")]
    pub format: String,

    /// Skip the result cache
    #[arg(long)]
    pub no_cache: bool,

    /// Files or directories to analyze
    #[arg(name = "PATH")]
    pub paths: Vec<PathBuf>,
}

/// Arguments for the models command
#[derive(Args, Debug)]
pub struct ModelsArgs {
    /// Depth used for cost estimates (basic, standard, comprehensive, expert)
    #[arg(short, long, default_value = "standard")]
    pub depth: String,

    /// Output format
    #[arg(long, default_value = "pretty")]
    pub format: String,

    /// Files or directories to estimate costs for
    #[arg(name = "PATH")]
    pub paths: Vec<PathBuf>,
}
