//! Common types for the math-delimiter engine

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

// ============================================================
// Spans and segments
// ============================================================

/// A half-open byte range `[start, end)` into a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if the span is empty
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Slice the span out of its document
    pub fn text<'d>(&self, document: &'d str) -> &'d str {
        &document[self.start..self.end]
    }
}

/// Classification of a document segment.
///
/// Segments partition the document exactly: no gaps, no overlaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    /// Ordinary prose or markup with no special meaning here
    Plain,
    /// A fenced code block, including its fence lines
    FencedCode,
    /// An inline code span, including its backticks
    InlineCode,
    /// Inline mathematics (`$...$` or `\(...\)`)
    MathInline,
    /// Display mathematics (`$$...$$` or `\[...\]`)
    MathDisplay,
    /// A bare LaTeX environment block, carrying its name
    MathEnvironment(String),
}

impl SegmentKind {
    /// Check whether this kind denotes mathematics
    pub fn is_math(&self) -> bool {
        matches!(
            self,
            SegmentKind::MathInline | SegmentKind::MathDisplay | SegmentKind::MathEnvironment(_)
        )
    }
}

/// The delimiter style a math region was opened with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimiterFamily {
    /// `$ ... $`
    Dollar,
    /// `$$ ... $$`
    DoubleDollar,
    /// `\( ... \)`
    Paren,
    /// `\[ ... \]`
    Bracket,
    /// `\begin{name} ... \end{name}`
    Environment,
}

impl DelimiterFamily {
    /// The closing delimiter text this family pairs with.
    ///
    /// Environments have no fixed closer (it embeds the name); they
    /// return an empty string.
    pub fn expected_closer(&self) -> &'static str {
        match self {
            DelimiterFamily::Dollar => "$",
            DelimiterFamily::DoubleDollar => "$$",
            DelimiterFamily::Paren => "\\)",
            DelimiterFamily::Bracket => "\\]",
            DelimiterFamily::Environment => "",
        }
    }

    /// Check whether this family denotes display (block) math
    pub fn is_display(&self) -> bool {
        matches!(self, DelimiterFamily::DoubleDollar | DelimiterFamily::Bracket)
    }
}

/// Delimiter bookkeeping for a math segment.
///
/// The opening and closing delimiters are recorded *as found*, distinct
/// from whatever canonical pair the normalizer may rewrite them to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathRegion {
    /// Family of the opening delimiter
    pub family: DelimiterFamily,
    /// Span of the opening delimiter text
    pub open: Span,
    /// Span of the closing delimiter text; `None` when the region was cut
    /// at a fence boundary or end of input
    pub close: Option<Span>,
    /// Span of the content between the delimiters
    pub body: Span,
}

impl MathRegion {
    /// Check whether a matching closer was found
    pub fn is_terminated(&self) -> bool {
        self.close.is_some()
    }

    /// Check whether the closer found belongs to a different delimiter
    /// family than the opener (e.g. `$x$$`).
    pub fn closer_mismatch(&self, document: &str) -> bool {
        match self.close {
            Some(close) if self.family != DelimiterFamily::Environment => {
                close.text(document) != self.family.expected_closer()
            }
            _ => false,
        }
    }
}

/// A contiguous, classified span of document text.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Classification
    pub kind: SegmentKind,
    /// Full extent of the segment, delimiters included
    pub span: Span,
    /// Delimiter bookkeeping; present exactly when `kind` is math
    pub math: Option<MathRegion>,
}

impl Segment {
    /// Create a non-math segment
    pub fn non_math(kind: SegmentKind, span: Span) -> Self {
        Self { kind, span, math: None }
    }

    /// Create a math segment
    pub fn math(kind: SegmentKind, span: Span, region: MathRegion) -> Self {
        Self { kind, span, math: Some(region) }
    }

    /// Slice this segment's raw text out of the document
    pub fn text<'d>(&self, document: &'d str) -> &'d str {
        self.span.text(document)
    }

    /// Environment name, for `MathEnvironment` segments
    pub fn environment_name(&self) -> Option<&str> {
        match &self.kind {
            SegmentKind::MathEnvironment(name) => Some(name),
            _ => None,
        }
    }
}

// ============================================================
// Diagnostics
// ============================================================

/// Diagnostic severity.
///
/// Ordering matters: `Error` sorts before `Warning` at equal offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// The structural condition a diagnostic reports.
///
/// Ordering matches the order the checks run; it breaks ties between
/// diagnostics at the same offset and severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// Opener with no matching closer before document or fence end
    Unterminated,
    /// Opener and closer belong to different delimiter families
    DelimiterMismatch,
    /// Unescaped `{` and `}` counts differ inside the body
    UnbalancedGrouping,
    /// `\begin{name}` with a name outside the recognized set
    UnknownEnvironment,
    /// Delimiters with no body between them
    EmptyRegion,
    /// Bare environment without an enclosing math delimiter
    MissingWrapper,
}

/// A structural problem found in a math region.
///
/// Diagnostics are produced, never mutated, and are ordered by document
/// position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Severity of the finding
    pub severity: Severity,
    /// Condition reported
    pub kind: DiagnosticKind,
    /// 1-based line of the region's opening delimiter
    pub line: usize,
    /// 1-based column (in characters) of the opening delimiter
    pub column: usize,
    /// Byte offset of the opening delimiter
    pub offset: usize,
    /// Human-readable description
    pub message: String,
}

impl Diagnostic {
    /// Render as `path:line:col: severity: message`
    pub fn render(&self, path: &str) -> String {
        format!(
            "{}:{}:{}: {}: {}",
            path, self.line, self.column, self.severity, self.message
        )
    }
}

/// Line-start table for mapping byte offsets to line/column positions.
#[derive(Debug)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Build the index for a document
    pub fn new(document: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in document.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// Map a byte offset to a 1-based (line, column) pair.
    ///
    /// Columns count characters, not bytes, from the line start.
    pub fn position(&self, document: &str, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let line_start = self.line_starts[line];
        let column = document[line_start..offset.min(document.len())].chars().count() + 1;
        (line + 1, column)
    }
}

// ============================================================
// Engine configuration
// ============================================================

/// Immutable delimiter settings resolved once per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimiterConfig {
    /// Canonical opening delimiter for inline math
    pub inline_open: String,
    /// Canonical closing delimiter for inline math
    pub inline_close: String,
    /// Canonical opening delimiter for display math
    pub display_open: String,
    /// Canonical closing delimiter for display math
    pub display_close: String,
    /// Environment names the validator accepts without a warning
    pub recognized_environments: BTreeSet<String>,
    /// Warn on bare environments that lack a display-math wrapper
    pub require_math_wrapper: bool,
}

/// Environment names accepted by default.
pub const DEFAULT_ENVIRONMENTS: &[&str] = &[
    "align",
    "align*",
    "alignat",
    "aligned",
    "array",
    "bmatrix",
    "Bmatrix",
    "cases",
    "ce",
    "eqnarray",
    "gather",
    "gather*",
    "gathered",
    "matrix",
    "multline",
    "pmatrix",
    "smallmatrix",
    "split",
    "vmatrix",
    "Vmatrix",
];

impl Default for DelimiterConfig {
    fn default() -> Self {
        Self {
            inline_open: "$".to_string(),
            inline_close: "$".to_string(),
            display_open: "$$".to_string(),
            display_close: "$$".to_string(),
            recognized_environments: DEFAULT_ENVIRONMENTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            require_math_wrapper: false,
        }
    }
}

impl DelimiterConfig {
    /// Canonical delimiter pair for a region of the given family.
    ///
    /// Environments have no canonical pair; callers must not rewrite them.
    pub fn canonical_pair(&self, family: DelimiterFamily) -> (&str, &str) {
        if family.is_display() {
            (&self.display_open, &self.display_close)
        } else {
            (&self.inline_open, &self.inline_close)
        }
    }

    /// Check whether an environment name is recognized
    pub fn recognizes(&self, name: &str) -> bool {
        self.recognized_environments.contains(name)
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_text() {
        let doc = "hello world";
        let span = Span::new(6, 11);
        assert_eq!(span.text(doc), "world");
        assert_eq!(span.len(), 5);
        assert!(!span.is_empty());
    }

    #[test]
    fn test_segment_kind_is_math() {
        assert!(SegmentKind::MathInline.is_math());
        assert!(SegmentKind::MathDisplay.is_math());
        assert!(SegmentKind::MathEnvironment("aligned".into()).is_math());
        assert!(!SegmentKind::Plain.is_math());
        assert!(!SegmentKind::FencedCode.is_math());
        assert!(!SegmentKind::InlineCode.is_math());
    }

    #[test]
    fn test_family_expected_closer() {
        assert_eq!(DelimiterFamily::Dollar.expected_closer(), "$");
        assert_eq!(DelimiterFamily::DoubleDollar.expected_closer(), "$$");
        assert_eq!(DelimiterFamily::Paren.expected_closer(), "\\)");
        assert_eq!(DelimiterFamily::Bracket.expected_closer(), "\\]");
    }

    #[test]
    fn test_closer_mismatch() {
        let doc = "$x$$";
        let region = MathRegion {
            family: DelimiterFamily::Dollar,
            open: Span::new(0, 1),
            close: Some(Span::new(2, 4)),
            body: Span::new(1, 2),
        };
        assert!(region.closer_mismatch(doc));

        let doc = "$x$";
        let region = MathRegion {
            family: DelimiterFamily::Dollar,
            open: Span::new(0, 1),
            close: Some(Span::new(2, 3)),
            body: Span::new(1, 2),
        };
        assert!(!region.closer_mismatch(doc));
    }

    #[test]
    fn test_line_index_positions() {
        let doc = "first\nsecond\nthird";
        let index = LineIndex::new(doc);
        assert_eq!(index.position(doc, 0), (1, 1));
        assert_eq!(index.position(doc, 5), (1, 6));
        assert_eq!(index.position(doc, 6), (2, 1));
        assert_eq!(index.position(doc, 13), (3, 1));
        assert_eq!(index.position(doc, 18), (3, 6));
    }

    #[test]
    fn test_line_index_multibyte_columns() {
        let doc = "α + β\n$x$";
        let index = LineIndex::new(doc);
        // "α + β" is 5 characters but 7 bytes; the next line starts at byte 8
        assert_eq!(index.position(doc, 8), (2, 1));
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Error < Severity::Warning);
    }

    #[test]
    fn test_diagnostic_render() {
        let diag = Diagnostic {
            severity: Severity::Error,
            kind: DiagnosticKind::Unterminated,
            line: 3,
            column: 7,
            offset: 42,
            message: "math region opened with `$` is never closed".to_string(),
        };
        assert_eq!(
            diag.render("doc.md"),
            "doc.md:3:7: error: math region opened with `$` is never closed"
        );
    }

    #[test]
    fn test_default_config() {
        let config = DelimiterConfig::default();
        assert_eq!(config.inline_open, "$");
        assert_eq!(config.display_open, "$$");
        assert!(config.recognizes("aligned"));
        assert!(config.recognizes("pmatrix"));
        assert!(config.recognizes("ce"));
        assert!(!config.recognizes("nonexistent"));
        assert!(!config.require_math_wrapper);
    }

    #[test]
    fn test_canonical_pair() {
        let config = DelimiterConfig::default();
        assert_eq!(config.canonical_pair(DelimiterFamily::Dollar), ("$", "$"));
        assert_eq!(config.canonical_pair(DelimiterFamily::Paren), ("$", "$"));
        assert_eq!(
            config.canonical_pair(DelimiterFamily::DoubleDollar),
            ("$$", "$$")
        );
        assert_eq!(
            config.canonical_pair(DelimiterFamily::Bracket),
            ("$$", "$$")
        );
    }
}
