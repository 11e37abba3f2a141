//! Fenced block detection.
//!
//! Splits markdown into plain text and fenced blocks carrying a given label
//! (` ```embed `). Fences with other labels are passed through untouched,
//! including any labeled-looking fences nested inside them.

/// A run of lines from a split document.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    /// Lines outside labeled blocks, fence lines of other blocks included.
    Text(Vec<&'a str>),
    /// Body lines of a labeled block, without its fence lines.
    Block(Vec<&'a str>),
}

/// Fence line seen by [`FenceTracker::update`].
#[derive(Debug, PartialEq, Eq)]
enum Fence<'l> {
    Open { info: &'l str },
    Close,
}

/// Tracks code fence state during line-by-line processing.
///
/// Code fences in `CommonMark` can use backticks or tildes (three or more).
/// The closing fence must use the same character and be at least as long
/// as the opening fence.
#[derive(Debug, Default)]
struct FenceTracker {
    /// Character used for the current fence (backtick or tilde).
    fence_char: Option<char>,
    /// Length of the opening fence (minimum length for closing).
    fence_len: usize,
}

impl FenceTracker {
    fn update<'l>(&mut self, line: &'l str) -> Option<Fence<'l>> {
        let trimmed = line.trim_start();

        if let Some(fence_char) = self.fence_char {
            if is_closing_fence(trimmed, fence_char, self.fence_len) {
                self.fence_char = None;
                self.fence_len = 0;
                return Some(Fence::Close);
            }
            return None;
        }

        let (ch, len) = detect_fence(trimmed)?;
        self.fence_char = Some(ch);
        self.fence_len = len;
        Some(Fence::Open {
            info: trimmed[len..].trim(),
        })
    }
}

/// Detect if a line starts a code fence.
///
/// Returns the fence character and length if found.
fn detect_fence(trimmed: &str) -> Option<(char, usize)> {
    let first = trimmed.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }

    let count = trimmed.chars().take_while(|&c| c == first).count();
    (count >= 3).then_some((first, count))
}

/// Closing fence: same character, at least as long, nothing after but
/// whitespace.
fn is_closing_fence(trimmed: &str, expected_char: char, min_len: usize) -> bool {
    if !trimmed.starts_with(expected_char) {
        return false;
    }

    let count = trimmed.chars().take_while(|&c| c == expected_char).count();
    count >= min_len && trimmed[count..].chars().all(char::is_whitespace)
}

fn has_label(info: &str, label: &str) -> bool {
    info.split_whitespace().next() == Some(label)
}

/// Split `content` into text runs and bodies of blocks labeled `label`.
///
/// A labeled block left open runs to the end of the content.
pub(crate) fn split_blocks<'a>(content: &'a str, label: &str) -> Vec<Segment<'a>> {
    let mut tracker = FenceTracker::default();
    let mut segments = Vec::new();
    let mut text = Vec::new();
    let mut block: Option<Vec<&'a str>> = None;

    for line in content.lines() {
        match (tracker.update(line), block.take()) {
            (Some(Fence::Open { info }), None) if has_label(info, label) => {
                if !text.is_empty() {
                    segments.push(Segment::Text(std::mem::take(&mut text)));
                }
                block = Some(Vec::new());
            }
            (Some(Fence::Close), Some(lines)) => segments.push(Segment::Block(lines)),
            (_, Some(mut lines)) => {
                lines.push(line);
                block = Some(lines);
            }
            (_, None) => text.push(line),
        }
    }

    if let Some(lines) = block {
        segments.push(Segment::Block(lines));
    }
    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }
    segments
}
