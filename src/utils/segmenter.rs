//! Splits a long markdown-formatted response into ordered segments that each
//! fit within a single Discord message, without ever truncating a code fence
//! mid-block or emitting malformed markdown.

/// Marker that opens or closes a fenced code block.
const FENCE_MARKER: &str = "```";

/// Characters reserved while inside an open fence so a synthetic `"\n```"`
/// close always fits without pushing a segment past the ceiling.
const CLOSE_RESERVE: usize = 4;

/// Scanner state for fenced code blocks: whether the current position is
/// inside an open fence, and the language tag to restore when a forced
/// split reopens it.
#[derive(Debug, Default)]
struct FenceState {
    open: bool,
    lang: String,
}

impl FenceState {
    /// The marker line that reopens this fence in a fresh segment.
    fn reopen_line(&self) -> String {
        format!("{FENCE_MARKER}{}", self.lang)
    }
}

/// Accumulates the segment-in-progress and the completed segments.
/// Tracks the buffer length in `char`s so lines never need rescanning.
struct SegmentWriter {
    segments: Vec<String>,
    buf: String,
    buf_chars: usize,
}

impl SegmentWriter {
    fn new() -> Self {
        Self {
            segments: Vec::new(),
            buf: String::new(),
            buf_chars: 0,
        }
    }

    /// Separator cost of appending one more line to the buffer.
    fn sep(&self) -> usize {
        usize::from(!self.buf.is_empty())
    }

    /// Whether a line of `line_chars` characters still fits under `budget`.
    fn fits(&self, line_chars: usize, budget: usize) -> bool {
        self.buf_chars + self.sep() + line_chars <= budget
    }

    fn push_line(&mut self, line: &str) {
        if !self.buf.is_empty() {
            self.buf.push('\n');
            self.buf_chars += 1;
        }
        self.buf.push_str(line);
        self.buf_chars += line.chars().count();
    }

    /// Drops trailing blank padding so a synthetic close lands directly
    /// after the last content line.
    fn trim_end(&mut self) {
        let trimmed = self.buf.trim_end().len();
        self.buf.truncate(trimmed);
        self.buf_chars = self.buf.chars().count();
    }

    /// Completes the segment-in-progress. Leading and trailing blank
    /// padding is trimmed; a buffer of only whitespace emits nothing.
    fn flush(&mut self) {
        let segment = self.buf.trim();
        if !segment.is_empty() {
            self.segments.push(segment.to_string());
        }
        self.buf.clear();
        self.buf_chars = 0;
    }
}

/// Splits `text` into an ordered sequence of segments of at most `max_len`
/// characters each. Segments reassemble to the input's content modulo
/// whitespace trimming at the boundaries; a code fence split across two
/// segments is closed in the first and reopened, with its language tag, in
/// the second. An unterminated fence in the source is self-healed with a
/// closing marker on the final segment.
///
/// Pure and total: no input can make it fail.
pub fn segment(text: &str, max_len: usize) -> Vec<String> {
    let mut writer = SegmentWriter::new();
    if max_len == 0 || text.is_empty() {
        return writer.segments;
    }

    let mut fence = FenceState::default();

    for line in text.split('\n') {
        let trimmed = line.trim();
        let line_chars = line.chars().count();

        if let Some(tag) = trimmed.strip_prefix(FENCE_MARKER) {
            if fence.open {
                // Leaving the fence. Keep the raw marker line when it fits;
                // the reserved synthetic close stands in for it otherwise.
                if writer.fits(line_chars, max_len) {
                    writer.push_line(line);
                } else {
                    writer.push_line(FENCE_MARKER);
                }
                fence.open = false;
            } else {
                fence.lang = tag.trim().to_string();
                fence.open = true;
                if !writer.fits(line_chars, fenced_budget(max_len)) {
                    writer.flush();
                }
                writer.push_line(line);
            }
            continue;
        }

        let budget = if fence.open {
            fenced_budget(max_len)
        } else {
            max_len
        };

        if writer.fits(line_chars, budget) {
            writer.push_line(line);
        } else if fence.open {
            split_fenced(&mut writer, &fence, line, max_len);
        } else {
            writer.flush();
            if line_chars <= max_len {
                writer.push_line(line);
            } else {
                // A single line longer than the ceiling: hard-split it,
                // preferring word boundaries. Every piece but the last is a
                // finished segment; the last seeds the new buffer.
                let mut pieces = split_words(line, max_len);
                if let Some(last) = pieces.pop() {
                    writer.segments.extend(pieces);
                    writer.push_line(&last);
                }
            }
        }
    }

    if fence.open && !writer.buf.is_empty() {
        // Self-heal an unterminated fence from the source text.
        writer.trim_end();
        writer.push_line(FENCE_MARKER);
    }
    writer.flush();
    writer.segments
}

/// Buffer budget while inside an open fence.
fn fenced_budget(max_len: usize) -> usize {
    max_len.saturating_sub(CLOSE_RESERVE)
}

/// Handles a fenced line that no longer fits: close out the full segment
/// and continue the fence, with the same language tag, in the next one.
/// A single fenced line longer than the limit is split at character
/// boundaries, fencing every piece.
fn split_fenced(writer: &mut SegmentWriter, fence: &FenceState, line: &str, max_len: usize) {
    let budget = fenced_budget(max_len);
    let reopen = fence.reopen_line();

    // Close out the buffer unless it holds nothing but the opening marker,
    // which would leave an empty code block behind.
    let only_marker =
        !writer.buf.contains('\n') && writer.buf.trim_start().starts_with(FENCE_MARKER);
    if !only_marker {
        writer.push_line(FENCE_MARKER);
        writer.flush();
        writer.push_line(&reopen);
    }

    if writer.fits(line.chars().count(), budget) {
        writer.push_line(line);
        return;
    }

    let mut remaining = line;
    loop {
        let avail = budget
            .saturating_sub(writer.buf_chars + writer.sep())
            .max(1);
        let (piece, rest) = take_chars(remaining, avail);
        writer.push_line(piece);
        remaining = rest;
        if remaining.is_empty() {
            break;
        }
        writer.push_line(FENCE_MARKER);
        writer.flush();
        writer.push_line(&reopen);
    }
}

/// Splits `s` after at most `n` characters, on a character boundary.
fn take_chars(s: &str, n: usize) -> (&str, &str) {
    match s.char_indices().nth(n) {
        Some((idx, _)) => s.split_at(idx),
        None => (s, ""),
    }
}

/// Greedy word-boundary split of a single overlong line. Words stay whole
/// unless one word alone exceeds `max_len`, in which case it is broken at
/// character boundaries as a last resort. Runs of whitespace collapse to
/// single spaces, which the segment contract allows.
fn split_words(line: &str, max_len: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;

    for word in line.split_whitespace() {
        let word_chars = word.chars().count();
        let sep = usize::from(!current.is_empty());

        if current_chars + sep + word_chars <= max_len {
            if sep == 1 {
                current.push(' ');
            }
            current.push_str(word);
            current_chars += sep + word_chars;
            continue;
        }

        if !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
            current_chars = 0;
        }

        if word_chars <= max_len {
            current.push_str(word);
            current_chars = word_chars;
        } else {
            let mut chunks = split_chars(word, max_len);
            if let Some(last) = chunks.pop() {
                pieces.extend(chunks);
                current_chars = last.chars().count();
                current = last;
            }
        }
    }

    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Splits `s` into chunks of at most `max_chars` characters, on character
/// boundaries.
fn split_chars(s: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0usize;

    for ch in s.chars() {
        if count == max_chars {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(ch);
        count += 1;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
