//! Structural validator
//!
//! Read-only pass over the segment stream that checks each math region
//! for structural problems: unterminated regions, mismatched delimiter
//! pairs, unbalanced grouping, unknown environments, and empty bodies.
//! Validation never mutates the document or the segments.

use super::types::{
    DelimiterConfig, DelimiterFamily, Diagnostic, DiagnosticKind, LineIndex, MathRegion, Segment,
    Severity,
};

/// Validate every math region, returning diagnostics ordered by byte
/// offset, with errors before warnings at equal positions.
pub fn validate(
    document: &str,
    segments: &[Segment],
    config: &DelimiterConfig,
) -> Vec<Diagnostic> {
    let index = LineIndex::new(document);
    let mut diagnostics = Vec::new();

    for segment in segments {
        let region = match &segment.math {
            Some(region) => region,
            None => continue,
        };
        check_region(document, segment, region, config, &index, &mut diagnostics);
    }

    diagnostics.sort_by(|a, b| {
        a.offset
            .cmp(&b.offset)
            .then(a.severity.cmp(&b.severity))
            .then(a.kind.cmp(&b.kind))
    });
    diagnostics
}

/// Run every check against one region, each contributing at most one
/// diagnostic. All diagnostics anchor at the opening delimiter.
fn check_region(
    document: &str,
    segment: &Segment,
    region: &MathRegion,
    config: &DelimiterConfig,
    index: &LineIndex,
    out: &mut Vec<Diagnostic>,
) {
    let offset = region.open.start;
    let (line, column) = index.position(document, offset);
    let mut emit = |severity: Severity, kind: DiagnosticKind, message: String| {
        out.push(Diagnostic {
            severity,
            kind,
            line,
            column,
            offset,
            message,
        });
    };

    let body = region.body.text(document);

    if !region.is_terminated() {
        // An unclosed single dollar in front of a digit is far more
        // likely a currency amount than broken math; demote it.
        let currency_like = region.family == DelimiterFamily::Dollar
            && body.as_bytes().first().is_some_and(u8::is_ascii_digit);
        if currency_like {
            emit(
                Severity::Warning,
                DiagnosticKind::Unterminated,
                format!(
                    "unclosed `$` before a digit looks like a currency amount: `{}`",
                    snippet(segment.text(document))
                ),
            );
        } else {
            emit(
                Severity::Error,
                DiagnosticKind::Unterminated,
                format!(
                    "math region opened with `{}` is never closed",
                    region.open.text(document)
                ),
            );
        }
    }

    if region.closer_mismatch(document) {
        emit(
            Severity::Error,
            DiagnosticKind::DelimiterMismatch,
            format!(
                "delimiter mismatch: opened with `{}` but closed with `{}`",
                region.open.text(document),
                region.close.expect("mismatch implies closer").text(document)
            ),
        );
    }

    let (opens, closes) = brace_counts(body);
    if opens != closes {
        emit(
            Severity::Error,
            DiagnosticKind::UnbalancedGrouping,
            format!("unbalanced braces in math body: {opens} `{{` vs {closes} `}}`"),
        );
    }

    if let Some(name) = segment.environment_name() {
        if !config.recognizes(name) {
            emit(
                Severity::Warning,
                DiagnosticKind::UnknownEnvironment,
                format!("unknown LaTeX environment `{name}`"),
            );
        }
    }

    if region.is_terminated() && body.trim().is_empty() {
        emit(
            Severity::Warning,
            DiagnosticKind::EmptyRegion,
            "empty math region".to_string(),
        );
    }

    if config.require_math_wrapper && region.family == DelimiterFamily::Environment {
        let name = segment.environment_name().unwrap_or_default();
        emit(
            Severity::Warning,
            DiagnosticKind::MissingWrapper,
            format!("`\\begin{{{name}}}` block lacks enclosing display math delimiters"),
        );
    }
}

/// Count unescaped `{` and `}` in a math body.
fn brace_counts(body: &str) -> (usize, usize) {
    let bytes = body.as_bytes();
    let (mut opens, mut closes) = (0, 0);
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'{' => {
                opens += 1;
                i += 1;
            }
            b'}' => {
                closes += 1;
                i += 1;
            }
            _ => i += 1,
        }
    }
    (opens, closes)
}

/// Shorten a region's raw text for display in a message.
fn snippet(text: &str) -> String {
    const MAX: usize = 30;
    let trimmed = text.trim_end();
    if trimmed.chars().count() <= MAX {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(MAX).collect();
        format!("{cut}...")
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scanner::scan;

    fn check_doc(doc: &str) -> Vec<Diagnostic> {
        let config = DelimiterConfig::default();
        let segments = scan(doc, &config);
        validate(doc, &segments, &config)
    }

    #[test]
    fn test_clean_document_no_diagnostics() {
        let diags = check_doc("a $x+y$ and $$\\frac{1}{2}$$ and `$code$`");
        assert!(diags.is_empty());
    }

    #[test]
    fn test_unterminated_is_error() {
        let diags = check_doc("broken \\(a+b");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Error);
        assert_eq!(diags[0].kind, DiagnosticKind::Unterminated);
        assert_eq!(diags[0].offset, 7);
    }

    #[test]
    fn test_currency_like_unterminated_is_warning() {
        let diags = check_doc("Cost is $5 forever");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Warning);
        assert_eq!(diags[0].kind, DiagnosticKind::Unterminated);
        assert!(diags[0].message.contains("currency"));
    }

    #[test]
    fn test_delimiter_mismatch() {
        let diags = check_doc("$x$$");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::DelimiterMismatch);
        assert_eq!(diags[0].severity, Severity::Error);
    }

    #[test]
    fn test_unbalanced_braces_at_opener_offset() {
        let diags = check_doc("eq $\\frac{1}{2$");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::UnbalancedGrouping);
        assert_eq!(diags[0].severity, Severity::Error);
        assert_eq!(diags[0].offset, 3);
        assert_eq!((diags[0].line, diags[0].column), (1, 4));
    }

    #[test]
    fn test_escaped_braces_not_counted() {
        let diags = check_doc("$\\{a\\}$");
        assert!(diags.is_empty());
    }

    #[test]
    fn test_known_environment_clean() {
        let diags = check_doc("\\begin{aligned}\nx &= y\n\\end{aligned}");
        assert!(diags.is_empty());
    }

    #[test]
    fn test_unknown_environment_warning() {
        let mut config = DelimiterConfig::default();
        config.recognized_environments.remove("aligned");
        let doc = "\\begin{aligned}\nx &= y\n\\end{aligned}";
        let segments = scan(doc, &config);
        let diags = validate(doc, &segments, &config);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Warning);
        assert_eq!(diags[0].kind, DiagnosticKind::UnknownEnvironment);
    }

    #[test]
    fn test_empty_region_warning() {
        let diags = check_doc("x $$ $$ y");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::EmptyRegion);
        assert_eq!(diags[0].severity, Severity::Warning);
    }

    #[test]
    fn test_missing_wrapper_warning_when_required() {
        let config = DelimiterConfig {
            require_math_wrapper: true,
            ..Default::default()
        };
        let doc = "\\begin{aligned}x\\end{aligned}";
        let segments = scan(doc, &config);
        let diags = validate(doc, &segments, &config);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::MissingWrapper);

        // Wrapped in display dollars the same block is fine
        let doc = "$$\\begin{aligned}x\\end{aligned}$$";
        let segments = scan(doc, &config);
        assert!(validate(doc, &segments, &config).is_empty());
    }

    #[test]
    fn test_ordering_offset_then_severity() {
        // Two regions: the later one carries errors, the earlier a warning
        let doc = "$$  $$ then $\\frac{1";
        let diags = check_doc(doc);
        assert_eq!(diags.len(), 3);
        assert_eq!(diags[0].kind, DiagnosticKind::EmptyRegion);
        // Second region: unterminated error sorts before its brace error
        assert_eq!(diags[1].kind, DiagnosticKind::Unterminated);
        assert_eq!(diags[2].kind, DiagnosticKind::UnbalancedGrouping);
        assert!(diags[0].offset < diags[1].offset);
        assert_eq!(diags[1].offset, diags[2].offset);
    }

    #[test]
    fn test_validation_is_pure() {
        let doc = "a $b$ c";
        let config = DelimiterConfig::default();
        let segments = scan(doc, &config);
        let before = segments.clone();
        let _ = validate(doc, &segments, &config);
        assert_eq!(segments, before);
    }
}
