//! Progress tracking for document conversion
//!
//! Structured stage display for single conversions and the batch
//! summary printer. Batch-level progress bars live in the batch module;
//! this tracker only narrates one file at a time.

use std::fmt;
use std::time::Instant;

/// Pipeline stages for one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingStage {
    /// Waiting to start
    #[default]
    Initializing,
    /// Running pandoc
    Converting,
    /// Normalizing and validating math delimiters
    FixingDelimiters,
    /// Re-aligning pipe tables
    TidyingTables,
    /// Downscaling extracted media
    OptimizingImages,
    /// Writing the Markdown output
    Writing,
    /// Done
    Completed,
}

impl ProcessingStage {
    /// Get the display name of the stage
    pub fn name(&self) -> &'static str {
        match self {
            ProcessingStage::Initializing => "Initializing",
            ProcessingStage::Converting => "Converting",
            ProcessingStage::FixingDelimiters => "Fixing delimiters",
            ProcessingStage::TidyingTables => "Tidying tables",
            ProcessingStage::OptimizingImages => "Optimizing images",
            ProcessingStage::Writing => "Writing",
            ProcessingStage::Completed => "Completed",
        }
    }
}

impl fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Output verbosity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// No output
    Quiet,
    /// File-level output
    #[default]
    Normal,
    /// Stage-level output
    Verbose,
}

impl OutputMode {
    /// Create OutputMode from a verbosity level
    pub fn from_verbosity(level: u8) -> Self {
        match level {
            0 => OutputMode::Normal,
            _ => OutputMode::Verbose,
        }
    }

    /// Check if output should be shown at this mode
    pub fn should_show(&self, required: OutputMode) -> bool {
        use OutputMode::*;
        match (self, required) {
            (Quiet, _) => false,
            (Normal, Quiet | Normal) => true,
            (Verbose, _) => true,
            _ => false,
        }
    }
}

/// Progress tracker for document conversion
#[derive(Debug)]
pub struct ProgressTracker {
    /// Current file number (1-based)
    pub current_file: usize,
    /// Total number of files
    pub total_files: usize,
    /// Current filename
    pub current_filename: String,
    /// Current pipeline stage
    pub current_stage: ProcessingStage,
    /// Start time of the current file
    start_time: Instant,
    /// Output mode
    output_mode: OutputMode,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(1, OutputMode::Normal)
    }
}

impl ProgressTracker {
    /// Create a new progress tracker
    pub fn new(total_files: usize, output_mode: OutputMode) -> Self {
        Self {
            current_file: 0,
            total_files,
            current_filename: String::new(),
            current_stage: ProcessingStage::Initializing,
            start_time: Instant::now(),
            output_mode,
        }
    }

    /// Start processing a new file
    pub fn start_file(&mut self, file_number: usize, filename: &str) {
        self.current_file = file_number;
        self.current_filename = filename.to_string();
        self.current_stage = ProcessingStage::Initializing;
        self.start_time = Instant::now();

        if self.output_mode.should_show(OutputMode::Normal) {
            println!(
                "[{}/{}] Converting: {}",
                self.current_file, self.total_files, self.current_filename
            );
        }
    }

    /// Set the current pipeline stage
    pub fn set_stage(&mut self, stage: ProcessingStage) {
        self.current_stage = stage;
        if stage != ProcessingStage::Completed && self.output_mode.should_show(OutputMode::Verbose)
        {
            println!("  {}", stage);
        }
    }

    /// Mark the current file as complete
    pub fn complete_file(&mut self) {
        self.current_stage = ProcessingStage::Completed;
        if self.output_mode.should_show(OutputMode::Normal) {
            println!("  Completed in {:.2}s", self.elapsed_secs());
        }
    }

    /// Get elapsed time in seconds for the current file
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    /// Print final batch summary
    pub fn print_summary(total_files: usize, ok_count: usize, error_count: usize) {
        println!();
        println!("{}", "=".repeat(60));
        println!("Conversion Summary");
        println!("{}", "=".repeat(60));
        println!("  Total files:  {}", total_files);
        println!("  Succeeded:    {}", ok_count);
        println!("  Errors:       {}", error_count);
        println!("{}", "=".repeat(60));
    }
}
