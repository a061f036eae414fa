//! Fenced code block detection.
//!
//! Every pass over document text needs to know whether a line is prose or sits
//! inside a fenced code block, so fence tracking lives here once.

/// An opening code fence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fence {
    /// Fence character (`` ` `` or `~`)
    pub marker: char,

    /// Number of fence characters in the opening run
    pub len: usize,

    /// Info string after the fence (language tag and attributes)
    pub info: String,
}

impl Fence {
    /// Parse a line as an opening code fence.
    ///
    /// Supports up to three spaces of indentation and runs of three or more
    /// backticks or tildes. Backtick fences cannot carry a backtick in their
    /// info string.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\n', '\r']);
        let indent = line.len() - line.trim_start_matches(' ').len();
        if indent > 3 {
            return None;
        }

        let rest = &line[indent..];
        let marker = rest.chars().next().filter(|c| *c == '`' || *c == '~')?;
        let len = rest.chars().take_while(|c| *c == marker).count();
        if len < 3 {
            return None;
        }

        let info = rest[len..].trim();
        if marker == '`' && info.contains('`') {
            return None;
        }

        Some(Self {
            marker,
            len,
            info: info.to_string(),
        })
    }

    /// Language tag from the info string, if any.
    pub fn language(&self) -> Option<&str> {
        self.info.split_whitespace().next()
    }

    /// Check whether `line` closes this fence.
    pub fn is_closed_by(&self, line: &str) -> bool {
        let line = line.trim_end_matches(['\n', '\r']);
        let indent = line.len() - line.trim_start_matches(' ').len();
        if indent > 3 {
            return false;
        }

        let rest = &line[indent..];
        let run = rest.chars().take_while(|c| *c == self.marker).count();
        run >= self.len && rest[run * self.marker.len_utf8()..].trim().is_empty()
    }
}

/// Where a line sits relative to fenced code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Ordinary prose
    Prose,
    /// Opening fence line
    Open,
    /// Line inside a fenced block
    Code,
    /// Closing fence line
    Close,
}

/// Line-by-line code fence state machine.
#[derive(Debug, Default)]
pub struct FenceTracker {
    open: Option<Fence>,
}

impl FenceTracker {
    /// Create a tracker positioned outside any fence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify the next line and advance the state.
    pub fn advance(&mut self, line: &str) -> LineKind {
        match &self.open {
            Some(fence) => {
                if fence.is_closed_by(line) {
                    self.open = None;
                    LineKind::Close
                } else {
                    LineKind::Code
                }
            }
            None => match Fence::parse(line) {
                Some(fence) => {
                    self.open = Some(fence);
                    LineKind::Open
                }
                None => LineKind::Prose,
            },
        }
    }

    /// Check whether the tracker is currently inside a fence.
    pub fn in_code(&self) -> bool {
        self.open.is_some()
    }
}

/// Kind of a document segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Prose,
    Code,
}

/// A run of consecutive lines that are all prose or all one fenced block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub kind: SegmentKind,
    /// Segment text, line terminators included
    pub text: &'a str,
}

/// Split text into alternating prose and fenced code segments.
///
/// A code segment spans its opening fence through its closing fence. An
/// unclosed fence runs to the end of the document. Concatenating the segment
/// texts reproduces the input exactly.
pub fn split_fenced(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut tracker = FenceTracker::new();
    let mut start = 0;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        match tracker.advance(line) {
            LineKind::Open => {
                if offset > start {
                    segments.push(Segment {
                        kind: SegmentKind::Prose,
                        text: &text[start..offset],
                    });
                }
                start = offset;
            }
            LineKind::Close => {
                let end = offset + line.len();
                segments.push(Segment {
                    kind: SegmentKind::Code,
                    text: &text[start..end],
                });
                start = end;
            }
            LineKind::Prose | LineKind::Code => {}
        }
        offset += line.len();
    }

    if offset > start {
        let kind = if tracker.in_code() {
            SegmentKind::Code
        } else {
            SegmentKind::Prose
        };
        segments.push(Segment {
            kind,
            text: &text[start..offset],
        });
    }

    segments
}
