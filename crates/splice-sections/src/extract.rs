//! Section lookup and extraction.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::entities::decode_html_entities;
use crate::fence::FenceToggle;

/// Any ATX header: 1-6 `#` followed by whitespace.
static ANY_HEADER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(#{1,6})\s").unwrap());

/// Markup characters dropped from requested section names.
const STRIPPED_MARKUP: &[char] = &['*', '_', '~', '`', '[', ']'];

/// Error from section extraction.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SectionError {
    /// No header outside code fences matches the name.
    #[error("Section '{section}' not found")]
    NotFound {
        /// Requested section name.
        section: String,
    },
    /// The header exists but the section holds no text.
    #[error("Section '{section}' is empty")]
    Empty {
        /// Requested section name.
        section: String,
    },
}

/// Location of a section inside a document.
///
/// Line indices are zero-based and refer to the document after line ending
/// normalization and entity decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionMatch {
    /// Line of the matched header.
    pub start_line: usize,
    /// First line past the section (exclusive).
    pub end_line: usize,
    /// Number of `#` markers on the header line (1-6).
    pub header_level: usize,
}

/// Normalize a requested section name for matching.
///
/// Applies NFKC and drops inline markup characters (`*`, `_`, `~`,
/// backticks, `[`, `]`). Whitespace runs collapse to one space.
#[must_use]
pub fn normalize_section_name(name: &str) -> String {
    let stripped: String = name
        .nfkc()
        .filter(|c| !STRIPPED_MARKUP.contains(c))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize line endings and decode HTML entities.
fn prepare(content: &str) -> Cow<'_, str> {
    if content.contains('\r') {
        let unified = content.replace("\r\n", "\n");
        Cow::Owned(decode_html_entities(&unified).into_owned())
    } else {
        decode_html_entities(content)
    }
}

/// Build the case-insensitive header pattern for a normalized name.
///
/// Spaces in the name match any whitespace run in the header.
fn header_pattern(normalized: &str) -> Option<Regex> {
    let name = normalized
        .split(' ')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    Regex::new(&format!(r"(?i)^(#{{1,6}})\s*(?:\*\*)?{name}(?:\*\*)?\s*$")).ok()
}

fn locate(lines: &[&str], section_name: &str, occurrence: usize) -> Option<SectionMatch> {
    let raw = section_name.trim();
    let normalized = normalize_section_name(raw);
    if normalized.is_empty() {
        return None;
    }
    let header = header_pattern(&normalized)?;
    let occurrence = occurrence.max(1);

    let mut fence = FenceToggle::new(raw);
    let (start_line, header_level) = lines
        .iter()
        .enumerate()
        .filter_map(|(index, line)| {
            let trimmed = line.trim();
            if fence.update(trimmed) || fence.in_fence() {
                return None;
            }
            header.captures(trimmed).map(|caps| (index, caps[1].len()))
        })
        .nth(occurrence - 1)?;

    let mut fence = FenceToggle::new(raw);
    let end_line = lines
        .iter()
        .enumerate()
        .skip(start_line + 1)
        .find(|(_, line)| {
            let trimmed = line.trim();
            if fence.update(trimmed) || fence.in_fence() {
                return false;
            }
            ANY_HEADER
                .captures(trimmed)
                .is_some_and(|caps| caps[1].len() <= header_level)
        })
        .map_or(lines.len(), |(index, _)| index);

    Some(SectionMatch {
        start_line,
        end_line,
        header_level,
    })
}

/// Find the bounds of the `occurrence`-th section named `section_name`.
///
/// Occurrences count from 1; 0 is treated as 1. Returns `None` when no header
/// outside code fences matches.
#[must_use]
pub fn find_section(content: &str, section_name: &str, occurrence: usize) -> Option<SectionMatch> {
    let prepared = prepare(content);
    let lines: Vec<&str> = prepared.lines().collect();
    locate(&lines, section_name, occurrence)
}

/// Extract the text of a section.
///
/// The section runs from its header to the next header of the same or a
/// higher level (or the end of the document). With `include_header` false the
/// header line itself is left out. The result is trimmed.
///
/// # Errors
///
/// Returns [`SectionError::NotFound`] if no header matches and
/// [`SectionError::Empty`] if the section holds only whitespace.
pub fn extract(
    content: &str,
    section_name: &str,
    include_header: bool,
    occurrence: usize,
) -> Result<String, SectionError> {
    let prepared = prepare(content);
    let lines: Vec<&str> = prepared.lines().collect();
    let section = section_name.trim().to_owned();

    let Some(found) = locate(&lines, section_name, occurrence) else {
        tracing::debug!(section = %section, occurrence, "Section header not found");
        return Err(SectionError::NotFound { section });
    };

    let start = if include_header {
        found.start_line
    } else {
        found.start_line + 1
    };
    let text = lines[start..found.end_line].join("\n");
    let text = text.trim();

    if text.is_empty() {
        return Err(SectionError::Empty { section });
    }

    tracing::debug!(
        section = %section,
        start_line = found.start_line,
        end_line = found.end_line,
        level = found.header_level,
        "Extracted section"
    );
    Ok(text.to_owned())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const NOTE: &str = "## Intro\nworld\n## Next\nx";

    #[test]
    fn test_extract_excludes_header_and_next_section() {
        assert_eq!(extract(NOTE, "Intro", false, 1).unwrap(), "world");
    }

    #[test]
    fn test_extract_includes_header() {
        assert_eq!(extract(NOTE, "Intro", true, 1).unwrap(), "## Intro\nworld");
    }

    #[test]
    fn test_extract_last_section_runs_to_end() {
        assert_eq!(extract(NOTE, "Next", false, 1).unwrap(), "x");
    }

    #[test]
    fn test_extract_keeps_subsections() {
        let doc = "# Guide\n## Setup\nsteps\n### Detail\nd\n## Usage\nu";

        assert_eq!(
            extract(doc, "Setup", false, 1).unwrap(),
            "steps\n### Detail\nd"
        );
    }

    #[test]
    fn test_extract_stops_at_higher_level() {
        let doc = "### Deep\nd\n# Top\nt";

        assert_eq!(extract(doc, "Deep", false, 1).unwrap(), "d");
    }

    #[test]
    fn test_extract_occurrence() {
        let doc = "## Notes\nfirst\n## Notes\nsecond";

        assert_eq!(extract(doc, "Notes", false, 1).unwrap(), "first");
        assert_eq!(extract(doc, "Notes", false, 2).unwrap(), "second");
        assert_eq!(extract(doc, "Notes", false, 0).unwrap(), "first");
        assert_eq!(
            extract(doc, "Notes", false, 3),
            Err(SectionError::NotFound {
                section: "Notes".to_owned()
            })
        );
    }

    #[test]
    fn test_extract_case_insensitive() {
        assert_eq!(extract("## INTRO\nbody", "intro", false, 1).unwrap(), "body");
    }

    #[test]
    fn test_extract_bold_header() {
        assert_eq!(extract("## **Intro**\nbody", "Intro", false, 1).unwrap(), "body");
    }

    #[test]
    fn test_extract_name_markup_is_ignored() {
        let doc = "## Install Guide\nbody";

        assert_eq!(
            extract(doc, "*Install*   `Guide`", false, 1).unwrap(),
            "body"
        );
    }

    #[test]
    fn test_extract_header_whitespace_runs() {
        let doc = "##   Intro   Part  \nbody";

        assert_eq!(extract(doc, "Intro Part", false, 1).unwrap(), "body");
    }

    #[test]
    fn test_extract_decodes_entities() {
        let doc = "## &lt;T&gt; usage\nuse &amp;T";

        assert_eq!(extract(doc, "<T> usage", false, 1).unwrap(), "use &T");
        assert_eq!(
            extract(doc, "<T> usage", true, 1).unwrap(),
            "## <T> usage\nuse &T"
        );
    }

    #[test]
    fn test_extract_crlf() {
        let doc = "## Intro\r\nworld\r\n## Next\r\nx";

        assert_eq!(extract(doc, "Intro", false, 1).unwrap(), "world");
    }

    #[test]
    fn test_extract_skips_headers_in_fence() {
        let doc = "```\n## Intro\nfake\n```\n## Intro\nreal";

        assert_eq!(extract(doc, "Intro", false, 1).unwrap(), "real");
    }

    #[test]
    fn test_extract_fence_inside_section_does_not_end_it() {
        let doc = "## Intro\ntext\n```bash\n# comment\n```\nmore\n## Next\nx";

        assert_eq!(
            extract(doc, "Intro", false, 1).unwrap(),
            "text\n```bash\n# comment\n```\nmore"
        );
    }

    #[test]
    fn test_extract_fence_line_with_section_text_does_not_toggle() {
        let doc = "```## Intro\n## Intro\nbody";

        assert_eq!(extract(doc, "Intro", false, 1).unwrap(), "body");
    }

    #[test]
    fn test_extract_not_found() {
        assert_eq!(
            extract(NOTE, "Missing", false, 1),
            Err(SectionError::NotFound {
                section: "Missing".to_owned()
            })
        );
    }

    #[test]
    fn test_extract_empty_section() {
        assert_eq!(
            extract("## A\n## B", "A", false, 1),
            Err(SectionError::Empty {
                section: "A".to_owned()
            })
        );
        assert_eq!(extract("## A\n## B", "A", true, 1).unwrap(), "## A");
    }

    #[test]
    fn test_extract_blank_name_not_found() {
        assert!(matches!(
            extract(NOTE, " ** ", false, 1),
            Err(SectionError::NotFound { .. })
        ));
    }

    #[test]
    fn test_seven_hashes_is_not_a_header() {
        let doc = "## Intro\nbody\n####### tag\nmore";

        assert_eq!(
            extract(doc, "Intro", false, 1).unwrap(),
            "body\n####### tag\nmore"
        );
    }

    #[test]
    fn test_find_section_bounds() {
        assert_eq!(
            find_section(NOTE, "Intro", 1),
            Some(SectionMatch {
                start_line: 0,
                end_line: 2,
                header_level: 2,
            })
        );
        assert_eq!(find_section(NOTE, "Nope", 1), None);
    }

    #[test]
    fn test_normalize_section_name() {
        assert_eq!(normalize_section_name("  **Fancy**  _Name_ "), "Fancy Name");
        assert_eq!(normalize_section_name("[[Link]] ~~old~~"), "Link old");
        assert_eq!(normalize_section_name("\u{FF29}\u{FF4E}tro"), "Intro");
        assert_eq!(normalize_section_name("\u{FB01}le"), "file");
    }

    #[test]
    fn test_error_messages() {
        let not_found = SectionError::NotFound {
            section: "Intro".to_owned(),
        };
        let empty = SectionError::Empty {
            section: "Intro".to_owned(),
        };

        assert_eq!(not_found.to_string(), "Section 'Intro' not found");
        assert_eq!(empty.to_string(), "Section 'Intro' is empty");
    }
}
