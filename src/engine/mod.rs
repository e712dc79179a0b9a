//! Math-delimiter engine
//!
//! The scanning, normalization and validation core. A document is
//! tokenized once into an ordered segment stream; the normalizer and
//! validator are independent read-only consumers of that stream, and
//! this module composes them into the two operations the CLI and the
//! conversion pipeline use.
//!
//! Both operations are total over any text input: malformed math never
//! raises, it degrades to diagnostics.

mod normalizer;
mod scanner;
mod types;
mod validator;

pub use normalizer::{normalize, normalize_with_stats, NormalizeStats};
pub use scanner::scan;
pub use types::{
    DelimiterConfig, DelimiterFamily, Diagnostic, DiagnosticKind, LineIndex, MathRegion, Segment,
    SegmentKind, Severity, Span, DEFAULT_ENVIRONMENTS,
};
pub use validator::validate;

/// Result of a fix pass: the rewritten text plus the diagnostics that
/// survive it.
#[derive(Debug)]
pub struct FixOutcome {
    /// Document text with canonical delimiters
    pub text: String,
    /// Diagnostics against the rewritten text
    pub diagnostics: Vec<Diagnostic>,
    /// How many regions were rewritten
    pub stats: NormalizeStats,
}

impl FixOutcome {
    /// Check whether any Error-severity diagnostic survived
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }
}

/// Rewrite every math region to the canonical delimiters, then validate
/// the result.
///
/// The scanner runs a second time on the rewritten text so the reported
/// diagnostics always describe the post-fix state: a reader sees only
/// the problems normalization could not repair.
pub fn fix(document: &str, config: &DelimiterConfig) -> FixOutcome {
    let segments = scan(document, config);
    let (text, stats) = normalize_with_stats(document, &segments, config);

    let rescanned = scan(&text, config);
    let diagnostics = validate(&text, &rescanned, config);

    FixOutcome {
        text,
        diagnostics,
        stats,
    }
}

/// Validate a document without rewriting anything.
pub fn check(document: &str, config: &DelimiterConfig) -> Vec<Diagnostic> {
    let segments = scan(document, config);
    validate(document, &segments, config)
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_normalizes_and_reports_clean() {
        let config = DelimiterConfig::default();
        let outcome = fix("sum \\(a+b\\) and \\[c\\]", &config);
        assert_eq!(outcome.text, "sum $a+b$ and $$c$$");
        assert!(outcome.diagnostics.is_empty());
        assert!(!outcome.has_errors());
        assert_eq!(outcome.stats.total(), 2);
    }

    #[test]
    fn test_fix_idempotent() {
        let config = DelimiterConfig::default();
        let doc = "a \\(x\\) b $$y$$ c `$\\(q\\)$`\n```\n\\[z\\]\n```\n";
        let first = fix(doc, &config);
        let second = fix(&first.text, &config);
        assert_eq!(first.text, second.text);
        assert_eq!(second.stats.total(), 0);
        assert_eq!(first.diagnostics, second.diagnostics);
    }

    #[test]
    fn test_fix_reports_surviving_problems() {
        let config = DelimiterConfig::default();
        let outcome = fix("good \\(a\\) bad $\\frac{1", &config);
        assert_eq!(outcome.text, "good $a$ bad $\\frac{1");
        assert!(outcome.has_errors());
        let kinds: Vec<_> = outcome.diagnostics.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DiagnosticKind::Unterminated,
                DiagnosticKind::UnbalancedGrouping
            ]
        );
        // Offsets point into the rewritten text
        assert_eq!(outcome.diagnostics[0].offset, 13);
    }

    #[test]
    fn test_check_never_rewrites() {
        let config = DelimiterConfig::default();
        let doc = "\\(a+b\\)";
        let diags = check(doc, &config);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_check_total_on_arbitrary_input() {
        let config = DelimiterConfig::default();
        for doc in ["", "$", "$$", "\\", "\\begin{", "```", "`", "\u{1F600}$"] {
            let _ = check(doc, &config);
            let _ = fix(doc, &config);
        }
    }
}
