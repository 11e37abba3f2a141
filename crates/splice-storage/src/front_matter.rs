//! YAML front matter handling.

/// Drop a leading YAML front matter block.
///
/// A document starting with `---` whose block is closed by a later line
/// beginning with `---` loses everything up to and including that closing
/// marker; the remainder is trimmed. Content without a closed block is
/// returned unchanged.
#[must_use]
pub fn strip_front_matter(content: &str) -> &str {
    if !content.starts_with("---") {
        return content;
    }

    match content[3..].find("\n---") {
        Some(pos) => content[3 + pos + 4..].trim(),
        None => content,
    }
}
