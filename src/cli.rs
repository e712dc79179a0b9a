//! Command-line interface definitions
//!
//! Git-like subcommands for converting documents, fixing delimiters in
//! existing Markdown, validating, and probing the environment.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Convert Word manuscripts to Markdown+LaTeX
#[derive(Debug, Parser)]
#[command(name = "mathdown", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Convert a .docx document to Markdown+LaTeX
    Convert(ConvertArgs),
    /// Convert every .docx in a directory
    Batch(BatchArgs),
    /// Normalize math delimiters in a Markdown file
    #[command(name = "fix-delimiters")]
    FixDelimiters(FixDelimitersArgs),
    /// Check math delimiters in a Markdown file
    Validate(ValidateArgs),
    /// Show tool and environment information
    Info,
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Input .docx file
    pub input: PathBuf,

    /// Output Markdown file (defaults to the input name with .md)
    pub output: Option<PathBuf>,

    /// Path to a YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Skip the delimiter fix pass
    #[arg(long)]
    pub no_fix: bool,

    /// Skip media extraction
    #[arg(long)]
    pub no_images: bool,

    /// Skip pipe-table tidying
    #[arg(long)]
    pub no_tables: bool,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all progress output
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// Directory containing .docx files
    pub input_dir: PathBuf,

    /// Output directory (defaults to the input directory)
    pub output_dir: Option<PathBuf>,

    /// Path to a YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Worker thread cap
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// Suppress the summary
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Args)]
pub struct FixDelimitersArgs {
    /// Markdown file to fix
    pub input: PathBuf,

    /// Output file (defaults to overwriting the input)
    pub output: Option<PathBuf>,

    /// Inline math delimiters as "open,close"
    #[arg(long, value_parser = parse_delimiter_pair)]
    pub inline_delimiters: Option<(String, String)>,

    /// Display math delimiters as "open,close"
    #[arg(long, value_parser = parse_delimiter_pair)]
    pub display_delimiters: Option<(String, String)>,

    /// Path to a YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Markdown file to check
    pub input: PathBuf,

    /// Path to a YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Emit diagnostics as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Treat warnings as failures too
    #[arg(long)]
    pub strict: bool,

    /// Require bare environments to be wrapped in display math
    #[arg(long)]
    pub require_wrapped: bool,
}

/// Parse an "open,close" delimiter pair
fn parse_delimiter_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once(',') {
        Some((open, close)) if !open.is_empty() && !close.is_empty() => {
            Ok((open.to_string(), close.to_string()))
        }
        _ => Err(format!(
            "expected \"open,close\" (e.g. \"$,$\"), got \"{raw}\""
        )),
    }
}

// ============================================================
// Tests
// ============================================================
