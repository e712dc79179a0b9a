//! Delimiter normalizer
//!
//! Rewrites the opening and closing markers of every math segment to the
//! configured canonical pair, leaving segment bodies and all non-math
//! segments untouched. Applying the pass twice yields the same output as
//! applying it once, because the canonical delimiters are themselves
//! delimiters the scanner recognizes.

use super::types::{DelimiterConfig, DelimiterFamily, Segment};

/// Counts of regions whose delimiters were actually rewritten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    /// Inline regions rewritten to the canonical inline pair
    pub inline_rewritten: usize,
    /// Display regions rewritten to the canonical display pair
    pub display_rewritten: usize,
}

impl NormalizeStats {
    /// Total regions rewritten
    pub fn total(&self) -> usize {
        self.inline_rewritten + self.display_rewritten
    }
}

/// Reassemble the document with every math region's delimiters replaced
/// by the canonical pair for its kind.
///
/// Regions that are unterminated, mismatched, or bare environments are
/// reproduced as found; the validator owns reporting them.
pub fn normalize(document: &str, segments: &[Segment], config: &DelimiterConfig) -> String {
    normalize_with_stats(document, segments, config).0
}

/// Like [`normalize`], also reporting how many regions changed.
pub fn normalize_with_stats(
    document: &str,
    segments: &[Segment],
    config: &DelimiterConfig,
) -> (String, NormalizeStats) {
    let mut out = String::with_capacity(document.len());
    let mut stats = NormalizeStats::default();

    for segment in segments {
        let region = match &segment.math {
            Some(region) => region,
            None => {
                out.push_str(segment.text(document));
                continue;
            }
        };

        let rewritable = region.is_terminated()
            && !region.closer_mismatch(document)
            && region.family != DelimiterFamily::Environment;
        if !rewritable {
            out.push_str(segment.text(document));
            continue;
        }

        let (open, close) = config.canonical_pair(region.family);
        let close_span = region.close.expect("rewritable region is terminated");
        let changed =
            region.open.text(document) != open || close_span.text(document) != close;
        if changed {
            if region.family.is_display() {
                stats.display_rewritten += 1;
            } else {
                stats.inline_rewritten += 1;
            }
        }

        out.push_str(open);
        out.push_str(region.body.text(document));
        out.push_str(close);
    }

    (out, stats)
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scanner::scan;

    fn fix_once(doc: &str) -> (String, NormalizeStats) {
        let config = DelimiterConfig::default();
        let segments = scan(doc, &config);
        normalize_with_stats(doc, &segments, &config)
    }

    #[test]
    fn test_tex_inline_to_dollar() {
        let (out, stats) = fix_once("sum \\(a+b\\) here");
        assert_eq!(out, "sum $a+b$ here");
        assert_eq!(stats.inline_rewritten, 1);
        assert_eq!(stats.display_rewritten, 0);
    }

    #[test]
    fn test_tex_display_to_double_dollar() {
        let (out, stats) = fix_once("\\[\\frac{1}{2}\\]");
        assert_eq!(out, "$$\\frac{1}{2}$$");
        assert_eq!(stats.display_rewritten, 1);
    }

    #[test]
    fn test_already_canonical_is_untouched() {
        let doc = "a $x$ b $$y$$ c";
        let (out, stats) = fix_once(doc);
        assert_eq!(out, doc);
        assert_eq!(stats.total(), 0);
    }

    #[test]
    fn test_code_and_plain_untouched() {
        let doc = "`\\(a\\)` and\n```\n\\[b\\]\n```\ntext";
        let (out, stats) = fix_once(doc);
        assert_eq!(out, doc);
        assert_eq!(stats.total(), 0);
    }

    #[test]
    fn test_bare_environment_untouched() {
        let doc = "\\begin{aligned}x &= y\\end{aligned}";
        let (out, stats) = fix_once(doc);
        assert_eq!(out, doc);
        assert_eq!(stats.total(), 0);
    }

    #[test]
    fn test_unterminated_left_as_found() {
        let doc = "broken \\(a+b";
        let (out, _) = fix_once(doc);
        assert_eq!(out, doc);
    }

    #[test]
    fn test_mismatched_pair_left_as_found() {
        let doc = "$x$$";
        let (out, stats) = fix_once(doc);
        assert_eq!(out, doc);
        assert_eq!(stats.total(), 0);
    }

    #[test]
    fn test_idempotent() {
        let doc = "mix \\(a\\) and \\[b\\] and $c$ and\n\\begin{pmatrix}1\\end{pmatrix}\n";
        let (once, _) = fix_once(doc);
        let (twice, stats) = fix_once(&once);
        assert_eq!(once, twice);
        assert_eq!(stats.total(), 0);
    }

    #[test]
    fn test_tex_canonical_config() {
        let config = DelimiterConfig {
            inline_open: "\\(".to_string(),
            inline_close: "\\)".to_string(),
            display_open: "\\[".to_string(),
            display_close: "\\]".to_string(),
            ..Default::default()
        };
        let doc = "a $x$ and $$y$$";
        let segments = scan(doc, &config);
        let (out, stats) = normalize_with_stats(doc, &segments, &config);
        assert_eq!(out, "a \\(x\\) and \\[y\\]");
        assert_eq!(stats.inline_rewritten, 1);
        assert_eq!(stats.display_rewritten, 1);

        // Round trip back through the scanner stays stable
        let segments2 = scan(&out, &config);
        let (out2, stats2) = normalize_with_stats(&out, &segments2, &config);
        assert_eq!(out2, out);
        assert_eq!(stats2.total(), 0);
    }
}
