//! Single-pass segment scanner
//!
//! Tokenizes raw Markdown into a sequence of disjoint, ordered segments:
//! plain prose, fenced code, inline code, and the three math region kinds.
//! The pass is total: any text that cannot be classified as code or math
//! remains plain, so scanning never fails.

use super::types::{DelimiterConfig, DelimiterFamily, MathRegion, Segment, SegmentKind, Span};

/// Tokenize a document into an ordered, gap-free segment sequence.
///
/// Concatenating the segments' raw text reproduces the document verbatim.
/// The configuration is accepted for parity with the other engine passes;
/// every candidate delimiter style is always recognized.
pub fn scan(document: &str, _config: &DelimiterConfig) -> Vec<Segment> {
    Scanner::new(document).run()
}

/// Outcome of a closer search.
enum Search {
    /// Closer found at this byte offset
    Found(usize),
    /// Region cut at a fence boundary (offset of the fence line start)
    Boundary(usize),
    /// Region runs to end of input
    Eof,
}

struct Scanner<'d> {
    doc: &'d str,
    bytes: &'d [u8],
    segments: Vec<Segment>,
    /// Start of the current unflushed plain run
    plain_start: usize,
    pos: usize,
}

impl<'d> Scanner<'d> {
    fn new(doc: &'d str) -> Self {
        Self {
            doc,
            bytes: doc.as_bytes(),
            segments: Vec::new(),
            plain_start: 0,
            pos: 0,
        }
    }

    fn run(mut self) -> Vec<Segment> {
        let len = self.bytes.len();
        while self.pos < len {
            let at_line_start = self.pos == 0 || self.bytes[self.pos - 1] == b'\n';
            if at_line_start && fence_run(self.bytes, self.pos).is_some() {
                self.fenced_block();
                continue;
            }
            match self.bytes[self.pos] {
                b'\\' => self.backslash(),
                b'`' => self.backtick_span(),
                b'$' => self.dollar(),
                _ => self.pos += 1,
            }
        }
        self.flush_plain(len);
        self.segments
    }

    /// Emit the pending plain run up to `end`, if any.
    fn flush_plain(&mut self, end: usize) {
        if self.plain_start < end {
            self.segments.push(Segment::non_math(
                SegmentKind::Plain,
                Span::new(self.plain_start, end),
            ));
        }
    }

    /// Emit a classified segment and resume scanning after it.
    fn push(&mut self, segment: Segment) {
        self.flush_plain(segment.span.start);
        self.pos = segment.span.end;
        self.plain_start = segment.span.end;
        self.segments.push(segment);
    }

    /// Step over one character without classifying it.
    fn step(&mut self) {
        let width = self.doc[self.pos..]
            .chars()
            .next()
            .map_or(1, char::len_utf8);
        self.pos += width;
    }

    // ------------------------------------------------------------
    // Fenced code
    // ------------------------------------------------------------

    /// Consume a whole fenced block, opening fence through closing fence
    /// (or end of input when the fence is never closed).
    fn fenced_block(&mut self) {
        let start = self.pos;
        let (fence_char, fence_len) = fence_run(self.bytes, start).expect("caller checked fence");

        // Skip the rest of the opening fence line
        let mut i = line_end(self.bytes, start + fence_len);

        let end = loop {
            if i >= self.bytes.len() {
                break self.bytes.len();
            }
            let run = count_run(self.bytes, i, fence_char);
            if run >= fence_len && blank_after(self.bytes, i + run) {
                break line_end(self.bytes, i + run);
            }
            i = line_end(self.bytes, i);
        };

        self.push(Segment::non_math(SegmentKind::FencedCode, Span::new(start, end)));
    }

    // ------------------------------------------------------------
    // Backslash: TeX-style openers, otherwise an escape
    // ------------------------------------------------------------

    fn backslash(&mut self) {
        let rest = &self.doc[self.pos..];
        if rest.starts_with("\\(") {
            self.tex_pair(DelimiterFamily::Paren, SegmentKind::MathInline);
        } else if rest.starts_with("\\[") {
            self.tex_pair(DelimiterFamily::Bracket, SegmentKind::MathDisplay);
        } else if let Some(name) = parse_begin_name(rest) {
            self.environment(name);
        } else {
            // The backslash escapes the very next character, so that
            // character can neither open nor close a delimiter.
            self.pos += 1;
            if self.pos < self.bytes.len() {
                self.step();
            }
        }
    }

    /// Scan a `\(...\)` or `\[...\]` region.
    fn tex_pair(&mut self, family: DelimiterFamily, kind: SegmentKind) {
        let start = self.pos;
        let body_start = start + 2;
        let closer = family.expected_closer();

        let mut j = body_start;
        let outcome = loop {
            if j >= self.bytes.len() {
                break Search::Eof;
            }
            match self.bytes[j] {
                b'\\' => {
                    if self.doc[j..].starts_with(closer) {
                        break Search::Found(j);
                    }
                    j += 2;
                }
                b'\n' => {
                    if fence_run(self.bytes, j + 1).is_some() {
                        break Search::Boundary(j + 1);
                    }
                    j += 1;
                }
                _ => j += 1,
            }
        };

        match outcome {
            Search::Found(j) => self.push(Segment::math(
                kind,
                Span::new(start, j + 2),
                MathRegion {
                    family,
                    open: Span::new(start, body_start),
                    close: Some(Span::new(j, j + 2)),
                    body: Span::new(body_start, j),
                },
            )),
            Search::Boundary(b) => self.unterminated(kind, family, start, body_start, b),
            Search::Eof => {
                self.unterminated(kind, family, start, body_start, self.bytes.len())
            }
        }
    }

    /// Scan a `\begin{name}...\end{name}` block, balancing nested
    /// occurrences of the same name.
    fn environment(&mut self, name: String) {
        let start = self.pos;
        let begin_tok = format!("\\begin{{{name}}}");
        let end_tok = format!("\\end{{{name}}}");
        let body_start = start + begin_tok.len();

        let mut depth = 1usize;
        let mut j = body_start;
        let outcome = loop {
            if j >= self.bytes.len() {
                break Search::Eof;
            }
            match self.bytes[j] {
                b'\\' => {
                    if self.doc[j..].starts_with(&begin_tok) {
                        depth += 1;
                        j += begin_tok.len();
                    } else if self.doc[j..].starts_with(&end_tok) {
                        depth -= 1;
                        if depth == 0 {
                            break Search::Found(j);
                        }
                        j += end_tok.len();
                    } else {
                        j += 2;
                    }
                }
                b'\n' => {
                    if fence_run(self.bytes, j + 1).is_some() {
                        break Search::Boundary(j + 1);
                    }
                    j += 1;
                }
                _ => j += 1,
            }
        };

        let kind = SegmentKind::MathEnvironment(name);
        match outcome {
            Search::Found(j) => {
                let end = j + end_tok.len();
                self.push(Segment::math(
                    kind,
                    Span::new(start, end),
                    MathRegion {
                        family: DelimiterFamily::Environment,
                        open: Span::new(start, body_start),
                        close: Some(Span::new(j, end)),
                        body: Span::new(body_start, j),
                    },
                ));
            }
            Search::Boundary(b) => {
                self.unterminated(kind, DelimiterFamily::Environment, start, body_start, b)
            }
            Search::Eof => self.unterminated(
                kind,
                DelimiterFamily::Environment,
                start,
                body_start,
                self.bytes.len(),
            ),
        }
    }

    // ------------------------------------------------------------
    // Inline code
    // ------------------------------------------------------------

    /// Scan an inline code span: a backtick run closed by a run of the
    /// same length. An unmatched run is literal text and stays plain.
    fn backtick_span(&mut self) {
        let start = self.pos;
        let open_len = count_run(self.bytes, start, b'`');

        let mut j = start + open_len;
        while j < self.bytes.len() {
            match self.bytes[j] {
                b'`' => {
                    let run = count_run(self.bytes, j, b'`');
                    if run == open_len {
                        self.push(Segment::non_math(
                            SegmentKind::InlineCode,
                            Span::new(start, j + run),
                        ));
                        return;
                    }
                    j += run;
                }
                b'\n' => {
                    if fence_run(self.bytes, j + 1).is_some() {
                        break;
                    }
                    j += 1;
                }
                _ => j += 1,
            }
        }

        // No matching run: the backticks are literal
        self.pos = start + open_len;
    }

    // ------------------------------------------------------------
    // Dollar math
    // ------------------------------------------------------------

    fn dollar(&mut self) {
        if self.doc[self.pos..].starts_with("$$") {
            self.display_dollar();
        } else {
            self.inline_dollar();
        }
    }

    fn display_dollar(&mut self) {
        let start = self.pos;
        let body_start = start + 2;

        let mut j = body_start;
        let outcome = loop {
            if j >= self.bytes.len() {
                break Search::Eof;
            }
            match self.bytes[j] {
                b'\\' => j += 2,
                b'$' => {
                    if j + 1 < self.bytes.len() && self.bytes[j + 1] == b'$' {
                        break Search::Found(j);
                    }
                    j += 1;
                }
                b'\n' => {
                    if fence_run(self.bytes, j + 1).is_some() {
                        break Search::Boundary(j + 1);
                    }
                    j += 1;
                }
                _ => j += 1,
            }
        };

        match outcome {
            Search::Found(j) => self.push(Segment::math(
                SegmentKind::MathDisplay,
                Span::new(start, j + 2),
                MathRegion {
                    family: DelimiterFamily::DoubleDollar,
                    open: Span::new(start, body_start),
                    close: Some(Span::new(j, j + 2)),
                    body: Span::new(body_start, j),
                },
            )),
            Search::Boundary(b) => self.unterminated(
                SegmentKind::MathDisplay,
                DelimiterFamily::DoubleDollar,
                start,
                body_start,
                b,
            ),
            Search::Eof => self.unterminated(
                SegmentKind::MathDisplay,
                DelimiterFamily::DoubleDollar,
                start,
                body_start,
                self.bytes.len(),
            ),
        }
    }

    /// Scan a single-dollar inline region.
    ///
    /// A `$` opens a candidate region only when followed by a non-space
    /// character, and a `$` closes one only when preceded by a non-space
    /// character. A candidate whose first `$` is not a valid closer is
    /// abandoned: its opener stays plain and scanning resumes right after
    /// it, so currency amounts like `$5 and` do not swallow later math.
    fn inline_dollar(&mut self) {
        let start = self.pos;
        let body_start = start + 1;

        if body_start >= self.bytes.len() || self.bytes[body_start].is_ascii_whitespace() {
            self.pos += 1;
            return;
        }

        let mut j = body_start;
        let outcome = loop {
            if j >= self.bytes.len() {
                break Search::Eof;
            }
            match self.bytes[j] {
                b'\\' => j += 2,
                b'$' => break Search::Found(j),
                b'\n' => {
                    if fence_run(self.bytes, j + 1).is_some() {
                        break Search::Boundary(j + 1);
                    }
                    j += 1;
                }
                _ => j += 1,
            }
        };

        match outcome {
            Search::Found(j) => {
                if self.bytes[j - 1].is_ascii_whitespace() {
                    // Not a valid closer: abandon the candidate
                    self.pos += 1;
                    return;
                }
                // Adjacent `$$` at the close is consumed whole and recorded
                // as found; the validator reports the family mismatch.
                let close_len = if j + 1 < self.bytes.len() && self.bytes[j + 1] == b'$' {
                    2
                } else {
                    1
                };
                self.push(Segment::math(
                    SegmentKind::MathInline,
                    Span::new(start, j + close_len),
                    MathRegion {
                        family: DelimiterFamily::Dollar,
                        open: Span::new(start, body_start),
                        close: Some(Span::new(j, j + close_len)),
                        body: Span::new(body_start, j),
                    },
                ));
            }
            Search::Boundary(b) => self.unterminated(
                SegmentKind::MathInline,
                DelimiterFamily::Dollar,
                start,
                body_start,
                b,
            ),
            Search::Eof => self.unterminated(
                SegmentKind::MathInline,
                DelimiterFamily::Dollar,
                start,
                body_start,
                self.bytes.len(),
            ),
        }
    }

    /// Emit a region cut at a fence boundary or end of input.
    fn unterminated(
        &mut self,
        kind: SegmentKind,
        family: DelimiterFamily,
        start: usize,
        body_start: usize,
        end: usize,
    ) {
        self.push(Segment::math(
            kind,
            Span::new(start, end),
            MathRegion {
                family,
                open: Span::new(start, body_start),
                close: None,
                body: Span::new(body_start.min(end), end),
            },
        ));
    }
}

// ============================================================
// Byte helpers
// ============================================================

/// Length of the run of `ch` starting at `pos`.
fn count_run(bytes: &[u8], pos: usize, ch: u8) -> usize {
    bytes[pos..].iter().take_while(|&&b| b == ch).count()
}

/// Detect a code fence (three or more backticks or tildes) at `pos`.
/// Returns the fence character and run length.
fn fence_run(bytes: &[u8], pos: usize) -> Option<(u8, usize)> {
    if pos >= bytes.len() {
        return None;
    }
    let ch = bytes[pos];
    if ch != b'`' && ch != b'~' {
        return None;
    }
    let run = count_run(bytes, pos, ch);
    (run >= 3).then_some((ch, run))
}

/// Offset just past the newline that ends the line containing `pos`
/// (or the end of input).
fn line_end(bytes: &[u8], pos: usize) -> usize {
    match bytes[pos.min(bytes.len())..].iter().position(|&b| b == b'\n') {
        Some(i) => pos + i + 1,
        None => bytes.len(),
    }
}

/// Check that only spaces or tabs remain between `pos` and the end of
/// its line, as required of a closing fence.
fn blank_after(bytes: &[u8], pos: usize) -> bool {
    bytes[pos..]
        .iter()
        .take_while(|&&b| b != b'\n')
        .all(|&b| b == b' ' || b == b'\t')
}

/// Parse the environment name out of a leading `\begin{name}`.
/// Names are ASCII alphanumerics with an optional trailing `*`.
fn parse_begin_name(rest: &str) -> Option<String> {
    let after = rest.strip_prefix("\\begin{")?;
    let close = after.find('}')?;
    let name = &after[..close];
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '*');
    valid.then(|| name.to_string())
}

// ============================================================
// Tests
// ============================================================
