//! Extracted-media post-processing
//!
//! Downscales oversized images pandoc extracted from the document and
//! rewrites their absolute references in the Markdown to paths relative
//! to the output file.

use std::path::Path;

use super::types::Result;

/// Counts from an optimization pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageStats {
    /// Image files inspected
    pub processed: usize,
    /// Files actually downscaled
    pub resized: usize,
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "tiff", "webp"];

/// Downscale every image under `dir` that exceeds the given bounds,
/// preserving aspect ratio and overwriting in place.
///
/// Unreadable or unsupported files are skipped with a log line; a bad
/// image never fails the conversion.
pub fn optimize_media(dir: &Path, max_width: u32, max_height: u32) -> Result<ImageStats> {
    let mut stats = ImageStats::default();
    if !dir.exists() {
        return Ok(stats);
    }
    optimize_dir(dir, max_width, max_height, &mut stats)?;
    Ok(stats)
}

fn optimize_dir(dir: &Path, max_width: u32, max_height: u32, stats: &mut ImageStats) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            optimize_dir(&path, max_width, max_height, stats)?;
            continue;
        }
        let is_image = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
        if !is_image {
            continue;
        }

        stats.processed += 1;
        let img = match image::open(&path) {
            Ok(img) => img,
            Err(e) => {
                tracing::warn!("skipping unreadable image {}: {}", path.display(), e);
                continue;
            }
        };

        if img.width() <= max_width && img.height() <= max_height {
            continue;
        }

        let scaled = img.thumbnail(max_width, max_height);
        match scaled.save(&path) {
            Ok(()) => {
                tracing::debug!(
                    "resized {} from {}x{} to {}x{}",
                    path.display(),
                    img.width(),
                    img.height(),
                    scaled.width(),
                    scaled.height()
                );
                stats.resized += 1;
            }
            Err(e) => tracing::warn!("failed to rewrite image {}: {}", path.display(), e),
        }
    }
    Ok(())
}

/// Rewrite references under `base` to paths relative to it, returning the
/// rewritten Markdown and the number of references changed.
///
/// Pandoc's `--extract-media` embeds the extraction directory verbatim in
/// every link; stripping it keeps the output portable.
pub fn relativize_media_paths(markdown: &str, base: &Path) -> (String, usize) {
    let mut prefix = base.display().to_string();
    if !prefix.ends_with('/') {
        prefix.push('/');
    }
    let count = markdown.matches(&prefix).count();
    (markdown.replace(&prefix, ""), count)
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_optimize_missing_dir_is_noop() {
        let stats = optimize_media(Path::new("/nonexistent/media"), 100, 100).unwrap();
        assert_eq!(stats, ImageStats::default());
    }

    #[test]
    fn test_optimize_skips_non_images() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not an image").unwrap();
        let stats = optimize_media(dir.path(), 100, 100).unwrap();
        assert_eq!(stats.processed, 0);
        assert_eq!(stats.resized, 0);
    }

    #[test]
    fn test_optimize_resizes_oversized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.png");
        let img = image::RgbImage::from_pixel(400, 200, image::Rgb([10, 20, 30]));
        img.save(&path).unwrap();

        let stats = optimize_media(dir.path(), 100, 100).unwrap();
        assert_eq!(stats.processed, 1);
        assert_eq!(stats.resized, 1);

        let reopened = image::open(&path).unwrap();
        assert!(reopened.width() <= 100);
        assert!(reopened.height() <= 100);
    }

    #[test]
    fn test_optimize_leaves_small_images() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.png");
        image::RgbImage::from_pixel(50, 40, image::Rgb([0, 0, 0]))
            .save(&path)
            .unwrap();

        let stats = optimize_media(dir.path(), 100, 100).unwrap();
        assert_eq!(stats.processed, 1);
        assert_eq!(stats.resized, 0);
    }

    #[test]
    fn test_relativize_media_paths() {
        let base = PathBuf::from("/tmp/out");
        let markdown = "![a](/tmp/out/media/image1.png) and ![b](/tmp/out/media/image2.png)";
        let (rewritten, count) = relativize_media_paths(markdown, &base);
        assert_eq!(
            rewritten,
            "![a](media/image1.png) and ![b](media/image2.png)"
        );
        assert_eq!(count, 2);
    }

    #[test]
    fn test_relativize_no_matches() {
        let (rewritten, count) =
            relativize_media_paths("plain text", Path::new("/tmp/out"));
        assert_eq!(rewritten, "plain text");
        assert_eq!(count, 0);
    }
}
