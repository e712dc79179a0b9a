//! Parallel batch conversion
//!
//! Converts every `.docx` beneath an input directory with a shared
//! immutable configuration. Documents are fully independent, so the
//! batch fans out over a rayon pool; one file's failure is recorded and
//! never aborts the rest.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::config::Config;
use crate::convert::{ConversionReport, ConvertError, DocumentConverter, Result};

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Files attempted
    pub processed: usize,
    /// Successful conversions, in input order
    pub reports: Vec<ConversionReport>,
    /// Failures as (input path, error text), in input order
    pub failures: Vec<(PathBuf, String)>,
}

impl BatchOutcome {
    /// Number of files that converted successfully
    pub fn succeeded(&self) -> usize {
        self.reports.len()
    }

    /// Number of files that failed
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Collect `.docx` files under `input`, sorted for deterministic order
pub fn collect_docx_files(input: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![input.to_path_buf()];

    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                if recursive {
                    pending.push(path);
                }
            } else if path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("docx"))
            {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Convert every `.docx` under `input_dir` into `output_dir`, mirroring
/// the directory layout, in parallel.
pub fn run_batch(
    input_dir: &Path,
    output_dir: &Path,
    config: &Config,
    recursive: bool,
) -> Result<BatchOutcome> {
    if !input_dir.is_dir() {
        return Err(ConvertError::InputNotFound(input_dir.to_path_buf()));
    }
    std::fs::create_dir_all(output_dir)?;

    let files = collect_docx_files(input_dir, recursive)?;
    if files.is_empty() {
        tracing::warn!("no .docx files found in {}", input_dir.display());
        return Ok(BatchOutcome::default());
    }
    tracing::info!("converting {} files from {}", files.len(), input_dir.display());

    let threads = config
        .processing
        .threads
        .unwrap_or_else(num_cpus::get)
        .max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| ConvertError::Io(std::io::Error::other(e)))?;

    let converter = DocumentConverter::new(config.clone());
    let bar = ProgressBar::new(files.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
            .expect("static template parses"),
    );

    // Results are pushed from worker threads and re-ordered afterward
    let results: Mutex<Vec<(usize, std::result::Result<ConversionReport, String>)>> =
        Mutex::new(Vec::with_capacity(files.len()));

    pool.install(|| {
        files.par_iter().enumerate().for_each(|(idx, input)| {
            let output = output_path_for(input, input_dir, output_dir);
            let result = std::fs::create_dir_all(
                output.parent().unwrap_or_else(|| Path::new(".")),
            )
            .map_err(ConvertError::Io)
            .and_then(|_| converter.convert(input, &output))
            .map_err(|e| e.to_string());

            if let Err(message) = &result {
                tracing::error!("failed to convert {}: {}", input.display(), message);
            }
            bar.set_message(
                input
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            );
            bar.inc(1);
            results.lock().expect("no panics while holding lock").push((idx, result));
        });
    });
    bar.finish_and_clear();

    let mut indexed = results.into_inner().expect("workers finished");
    indexed.sort_by_key(|(idx, _)| *idx);

    let mut outcome = BatchOutcome {
        processed: files.len(),
        ..Default::default()
    };
    for (idx, result) in indexed {
        match result {
            Ok(report) => outcome.reports.push(report),
            Err(message) => outcome.failures.push((files[idx].clone(), message)),
        }
    }
    Ok(outcome)
}

/// Map an input file to its output path, preserving the relative layout
fn output_path_for(input: &Path, input_dir: &Path, output_dir: &Path) -> PathBuf {
    let relative = input.strip_prefix(input_dir).unwrap_or(input);
    output_dir.join(relative).with_extension("md")
}

// ============================================================
// Tests
// ============================================================
