//! Engine property tests
//!
//! Cross-cutting guarantees of the delimiter engine, exercised through
//! the public API on realistic documents.

use mathdown::engine::{check, fix, scan, DelimiterConfig, SegmentKind};

const MANUSCRIPT: &str = r#"# Relativistic energy

The classic result \(E = mc^2\) follows from the expansion

\[
E = \gamma m c^2 = m c^2 + \frac{1}{2} m v^2 + \cdots
\]

with \(\gamma = (1 - v^2/c^2)^{-1/2}\). In code, write `$E$` as
`energy()`:

```python
def energy(m, v):
    return m * C**2  # $ and \[ mean nothing here
```

The system

\begin{aligned}
x + y &= 2 \\
x - y &= 0
\end{aligned}

costs \$3 per run. Chemistry uses \begin{ce}H2O\end{ce} blocks.
"#;

#[test]
fn segment_coverage_reconstructs_document() {
    let config = DelimiterConfig::default();
    let segments = scan(MANUSCRIPT, &config);

    let rebuilt: String = segments.iter().map(|s| s.text(MANUSCRIPT)).collect();
    assert_eq!(rebuilt, MANUSCRIPT);

    let mut cursor = 0;
    for segment in &segments {
        assert_eq!(segment.span.start, cursor, "gap or overlap at {cursor}");
        cursor = segment.span.end;
    }
    assert_eq!(cursor, MANUSCRIPT.len());
}

#[test]
fn code_immunity() {
    let config = DelimiterConfig::default();
    let segments = scan(MANUSCRIPT, &config);

    let code_spans: Vec<_> = segments
        .iter()
        .filter(|s| matches!(s.kind, SegmentKind::FencedCode | SegmentKind::InlineCode))
        .map(|s| s.span)
        .collect();
    assert!(!code_spans.is_empty());

    for segment in segments.iter().filter(|s| s.kind.is_math()) {
        for code in &code_spans {
            let overlaps = segment.span.start < code.end && code.start < segment.span.end;
            assert!(!overlaps, "math region overlaps code at {:?}", segment.span);
        }
    }
}

#[test]
fn fix_is_idempotent_on_manuscript() {
    let config = DelimiterConfig::default();
    let first = fix(MANUSCRIPT, &config);
    let second = fix(&first.text, &config);

    assert_eq!(first.text, second.text);
    assert_eq!(second.stats.total(), 0);
    assert_eq!(first.diagnostics, second.diagnostics);
}

#[test]
fn fix_normalizes_manuscript_math() {
    let config = DelimiterConfig::default();
    let outcome = fix(MANUSCRIPT, &config);

    assert!(outcome.text.contains("$E = mc^2$"));
    assert!(outcome.text.contains("$$\nE = \\gamma m c^2"));
    // Code and environments are untouched
    assert!(outcome.text.contains("`$E$`"));
    assert!(outcome.text.contains("# $ and \\[ mean nothing here"));
    assert!(outcome.text.contains("\\begin{aligned}"));
    // The escaped currency dollar is not math and the document is clean
    assert!(outcome.text.contains("costs \\$3 per run"));
    assert!(outcome.diagnostics.is_empty());
}

#[test]
fn unbalanced_brace_fixture() {
    let config = DelimiterConfig::default();
    let diags = check("x $\\frac{1}{2$ y", &config);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].offset, 2);
    assert_eq!(format!("{}", diags[0].severity), "error");
}

#[test]
fn diagnostics_count_severity_split() {
    let config = DelimiterConfig::default();
    // One warning (empty region), one error (unterminated display)
    let diags = check("a $$ $$ b\n\nthen $$\\alpha", &config);
    assert_eq!(diags.len(), 2);
    assert!(diags[0].offset < diags[1].offset);
}
