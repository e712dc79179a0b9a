//! mathdown - Convert Word manuscripts to Markdown+LaTeX
//!
//! Wraps the external `pandoc` converter and post-processes its Markdown
//! output: math delimiter normalization and validation, pipe-table
//! tidying, and extracted-media optimization.
//!
//! The heart of the crate is [`engine`], a total, config-driven
//! scanner/normalizer/validator for LaTeX math delimiters in Markdown.

pub mod batch;
pub mod cli;
pub mod config;
pub mod convert;
pub mod engine;
pub mod progress;

// Re-export public API
pub use batch::{run_batch, BatchOutcome};
pub use cli::{BatchArgs, Cli, Commands, ConvertArgs, FixDelimitersArgs, ValidateArgs};
pub use config::{CliOverrides, Config, ConfigError};
pub use convert::{ConversionReport, ConvertError, DocumentConverter};
pub use engine::{
    check, fix, DelimiterConfig, Diagnostic, DiagnosticKind, FixOutcome, Severity,
};
pub use progress::{OutputMode, ProcessingStage, ProgressTracker};

/// Process exit codes used by the CLI
pub mod exit_codes {
    /// Successful completion
    pub const SUCCESS: i32 = 0;
    /// Unspecified failure
    pub const GENERAL_ERROR: i32 = 1;
    /// Input file or directory not found
    pub const INPUT_NOT_FOUND: i32 = 2;
    /// Validation found Error-severity diagnostics
    pub const VALIDATION_FAILED: i32 = 3;
}
