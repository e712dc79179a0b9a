//! DOCX to Markdown conversion
//!
//! Thin glue around the external pandoc converter: invocation, media
//! extraction and optimization, table tidying, and the per-document
//! pipeline that threads the math-delimiter engine over pandoc's output.

mod converter;
mod images;
mod pandoc;
mod tables;
mod types;

// Re-export public API
pub use converter::DocumentConverter;
pub use images::{optimize_media, relativize_media_paths, ImageStats};
pub use pandoc::Pandoc;
pub use tables::tidy_pipe_tables;
pub use types::{ConversionReport, ConvertError, Result};
