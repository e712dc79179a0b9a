//! Common types for the conversion pipeline

use std::path::PathBuf;
use thiserror::Error;

use crate::engine::Diagnostic;

// ============================================================
// Error Types
// ============================================================

/// Conversion pipeline error types
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("input file not found: {0}")]
    InputNotFound(PathBuf),

    #[error("input is not a .docx file: {0}")]
    InvalidInput(PathBuf),

    #[error("pandoc executable not found on PATH")]
    PandocMissing,

    #[error("pandoc failed: {0}")]
    PandocFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConvertError>;

// ============================================================
// Conversion report
// ============================================================

/// Statistics and findings from converting one document
#[derive(Debug)]
pub struct ConversionReport {
    /// Source document
    pub input: PathBuf,
    /// Written Markdown file
    pub output: PathBuf,
    /// Inline math regions rewritten to the canonical delimiters
    pub inline_fixed: usize,
    /// Display math regions rewritten to the canonical delimiters
    pub display_fixed: usize,
    /// Structural problems that survived the fix pass
    pub diagnostics: Vec<Diagnostic>,
    /// Pipe tables re-aligned
    pub tables_tidied: usize,
    /// Media files downscaled
    pub images_optimized: usize,
    /// Wall-clock conversion time
    pub elapsed_seconds: f64,
}

impl ConversionReport {
    /// Total math regions rewritten
    pub fn equations_fixed(&self) -> usize {
        self.inline_fixed + self.display_fixed
    }
}
