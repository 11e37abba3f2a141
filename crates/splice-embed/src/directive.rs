//! Directive source parsing.
//!
//! A directive block holds either wikilinks or a prefix request:
//!
//! ```text
//! [[NoteA]]
//! [[NoteB#Intro]]
//! [[NoteC#Usage!]]
//! ```
//!
//! ```text
//! prefix: Proj-
//! sort: modified
//! ```
//!
//! Lines starting with `#` or `//` are comments. Parsing never fails: anything
//! that does not form a valid request is dropped.

use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::sort::SortOrder;

/// Any `[[...]]` without nested brackets.
static WIKILINK_SYNTAX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[[^\[\]]+?\]\]").unwrap());

/// Wikilink with optional section and header-exclusion marker.
static WIKILINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[(?<file>[^\[\]#]+)(?:#(?<section>[^\[\]!]*))?(?<exclude>!?)\]\]").unwrap()
});

const PREFIX_KEY: &str = "prefix:";
const SORT_KEY: &str = "sort:";

/// A single request for embedded content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedRequest {
    /// Embed one document, or one section of it.
    File {
        /// Document name as written in the link.
        name: String,
        /// Section to narrow to; `None` embeds the whole document.
        section: Option<String>,
        /// Keep the section's header line.
        include_header: bool,
    },
    /// Embed every document whose file name starts with a prefix.
    Prefix {
        /// File name prefix, case-sensitive.
        prefix: String,
        /// Concatenation order.
        sort: SortOrder,
    },
}

impl EmbedRequest {
    /// Create a whole-document request.
    #[must_use]
    pub fn file(name: impl Into<String>) -> Self {
        Self::File {
            name: name.into(),
            section: None,
            include_header: true,
        }
    }

    /// Create a section request.
    #[must_use]
    pub fn section(name: impl Into<String>, section: impl Into<String>, include_header: bool) -> Self {
        Self::File {
            name: name.into(),
            section: Some(section.into()),
            include_header,
        }
    }

    /// Create a prefix group request.
    #[must_use]
    pub fn prefix(prefix: impl Into<String>, sort: SortOrder) -> Self {
        Self::Prefix {
            prefix: prefix.into(),
            sort,
        }
    }

    /// The document name or prefix that identifies the request.
    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            Self::File { name, .. } => name,
            Self::Prefix { prefix, .. } => prefix,
        }
    }

    /// A request is valid when its identifying field is not blank.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.target().trim().is_empty()
    }
}

impl fmt::Display for EmbedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File {
                name,
                section: None,
                ..
            } => write!(f, "[[{name}]]"),
            Self::File {
                name,
                section: Some(section),
                include_header,
            } => {
                let marker = if *include_header { "" } else { "!" };
                write!(f, "[[{name}#{section}{marker}]]")
            }
            Self::Prefix { prefix, .. } => write!(f, "prefix:{prefix}"),
        }
    }
}

/// Syntax class of a directive block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    /// One or more `[[...]]` links.
    Wikilink,
    /// A `prefix:` line.
    Prefix,
}

/// Check whether a trimmed line is a comment.
pub(crate) fn is_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with('#') || trimmed.starts_with("//")
}

/// Remove full-line comments.
#[must_use]
pub fn strip_comments(source: &str) -> String {
    source
        .lines()
        .filter(|line| !is_comment(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pick the syntax class of comment-free source.
///
/// Wikilinks win: a block containing any `[[...]]` is never a prefix block.
#[must_use]
pub fn detect_syntax(source: &str) -> Option<Syntax> {
    let trimmed = source.trim();
    if WIKILINK_SYNTAX.is_match(trimmed) {
        Some(Syntax::Wikilink)
    } else if trimmed.starts_with(PREFIX_KEY) {
        Some(Syntax::Prefix)
    } else {
        None
    }
}

/// Parse a directive block using the natural sort order for prefix groups.
#[must_use]
pub fn parse(source: &str) -> Vec<EmbedRequest> {
    parse_with_sort(source, SortOrder::default())
}

/// Parse a directive block.
///
/// `default_sort` applies to a prefix block without a `sort:` line.
#[must_use]
pub fn parse_with_sort(source: &str, default_sort: SortOrder) -> Vec<EmbedRequest> {
    let filtered = strip_comments(source);
    match detect_syntax(&filtered) {
        Some(Syntax::Wikilink) => parse_wikilinks(&filtered),
        Some(Syntax::Prefix) => parse_prefix(&filtered, default_sort).into_iter().collect(),
        None => Vec::new(),
    }
}

fn request_from(caps: &Captures<'_>) -> Option<EmbedRequest> {
    let name = caps["file"].trim();
    if name.is_empty() {
        tracing::warn!(link = &caps[0], "Skipping link without a file name");
        return None;
    }

    let section = caps
        .name("section")
        .map(|s| s.as_str().trim())
        .filter(|s| !s.is_empty());
    let include_header = caps["exclude"].is_empty();

    Some(match section {
        Some(section) => EmbedRequest::section(name, section, include_header),
        None => EmbedRequest::file(name),
    })
}

fn parse_wikilinks(source: &str) -> Vec<EmbedRequest> {
    WIKILINK
        .captures_iter(source)
        .filter_map(|caps| request_from(&caps))
        .collect()
}

/// Find wikilinks along with their byte ranges.
///
/// Links with a blank file name yield `None` so callers can report them in
/// place.
pub(crate) fn wikilinks(source: &str) -> Vec<(Range<usize>, Option<EmbedRequest>)> {
    WIKILINK
        .captures_iter(source)
        .filter_map(|caps| {
            let range = caps.get(0)?.range();
            Some((range, request_from(&caps)))
        })
        .collect()
}

fn parse_prefix(source: &str, default_sort: SortOrder) -> Option<EmbedRequest> {
    let mut lines = source.trim().lines();
    let prefix = lines.next()?.trim().strip_prefix(PREFIX_KEY)?.trim();
    if prefix.is_empty() {
        tracing::warn!("Skipping empty prefix request");
        return None;
    }

    let mut sort = default_sort;
    for line in lines {
        let Some(keyword) = line.trim().strip_prefix(SORT_KEY) else {
            continue;
        };
        match keyword.parse() {
            Ok(order) => sort = order,
            Err(err) => {
                tracing::warn!(prefix, error = %err, "Discarding prefix request");
                return None;
            }
        }
    }

    Some(EmbedRequest::prefix(prefix, sort))
}
