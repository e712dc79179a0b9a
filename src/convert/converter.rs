//! Document conversion pipeline
//!
//! Main entry point for DOCX to Markdown conversion: pandoc first, then
//! the post-processing passes (delimiter fixing, table tidying, media
//! optimization), each gated by configuration.

use std::path::{Path, PathBuf};
use std::time::Instant;

use super::images::{optimize_media, relativize_media_paths};
use super::pandoc::Pandoc;
use super::tables::tidy_pipe_tables;
use super::types::{ConversionReport, ConvertError, Result};
use crate::config::Config;
use crate::engine;
use crate::progress::{OutputMode, ProcessingStage, ProgressTracker};

/// Converts one document at a time; holds no cross-document state, so a
/// single instance may be shared across batch workers.
pub struct DocumentConverter {
    config: Config,
}

impl DocumentConverter {
    /// Create a converter with the given configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Access the resolved configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Derive the output path for an input file: same stem, `.md`
    pub fn output_path(&self, input: &Path, output_dir: &Path) -> PathBuf {
        let stem = input.file_stem().unwrap_or_default();
        output_dir.join(stem).with_extension("md")
    }

    /// Convert a document without progress output
    pub fn convert(&self, input: &Path, output: &Path) -> Result<ConversionReport> {
        let mut progress = ProgressTracker::new(1, OutputMode::Quiet);
        self.convert_with_progress(input, output, &mut progress)
    }

    /// Convert a document, reporting stages through the tracker
    pub fn convert_with_progress(
        &self,
        input: &Path,
        output: &Path,
        progress: &mut ProgressTracker,
    ) -> Result<ConversionReport> {
        let started = Instant::now();

        if !input.exists() {
            return Err(ConvertError::InputNotFound(input.to_path_buf()));
        }
        let is_docx = input
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("docx"));
        if !is_docx {
            return Err(ConvertError::InvalidInput(input.to_path_buf()));
        }

        let output_dir = output.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(output_dir)?;

        // Step 1: pandoc
        progress.set_stage(ProcessingStage::Converting);
        let pandoc = Pandoc::locate()?;
        let media_root = output_dir.join(&self.config.images.extract_path);
        let media_dir = self
            .config
            .processing
            .extract_images
            .then_some(media_root.as_path());
        let mut markdown =
            pandoc.docx_to_markdown(input, media_dir, &self.config.pandoc.extra_args)?;
        if media_dir.is_some() {
            let (rewritten, relinked) = relativize_media_paths(&markdown, output_dir);
            markdown = rewritten;
            if relinked > 0 {
                tracing::debug!("rewrote {} media references", relinked);
            }
        }

        // Step 2: math delimiters
        let mut inline_fixed = 0;
        let mut display_fixed = 0;
        let mut diagnostics = Vec::new();
        if self.config.processing.fix_delimiters {
            progress.set_stage(ProcessingStage::FixingDelimiters);
            let outcome = engine::fix(&markdown, &self.config.delimiter_config());
            inline_fixed = outcome.stats.inline_rewritten;
            display_fixed = outcome.stats.display_rewritten;
            diagnostics = outcome.diagnostics;
            markdown = outcome.text;
            for diagnostic in &diagnostics {
                tracing::warn!("{}", diagnostic.render(&input.display().to_string()));
            }
        }

        // Step 3: tables
        let mut tables_tidied = 0;
        if self.config.processing.process_tables {
            progress.set_stage(ProcessingStage::TidyingTables);
            let (rewritten, count) = tidy_pipe_tables(&markdown, &self.config.tables);
            markdown = rewritten;
            tables_tidied = count;
        }

        // Step 4: media optimization
        let mut images_optimized = 0;
        if self.config.processing.extract_images && self.config.images.optimize {
            progress.set_stage(ProcessingStage::OptimizingImages);
            let stats = optimize_media(
                &media_root,
                self.config.images.max_width,
                self.config.images.max_height,
            )?;
            images_optimized = stats.resized;
        }

        // Step 5: write
        progress.set_stage(ProcessingStage::Writing);
        std::fs::write(output, &markdown)?;
        progress.set_stage(ProcessingStage::Completed);

        let report = ConversionReport {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            inline_fixed,
            display_fixed,
            diagnostics,
            tables_tidied,
            images_optimized,
            elapsed_seconds: started.elapsed().as_secs_f64(),
        };
        tracing::info!(
            "converted {} -> {} ({} equations fixed, {:.2}s)",
            input.display(),
            output.display(),
            report.equations_fixed(),
            report.elapsed_seconds
        );
        Ok(report)
    }
}

// ============================================================
// Tests
// ============================================================
