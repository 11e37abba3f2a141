//! Markdown section extraction for Splice.
//!
//! Given a document's full text and a section name, [`extract`] returns the
//! text of that section: from its header line down to the next header of the
//! same or a higher level. Matching tolerates the ways section names drift
//! between a link and the header it points at:
//!
//! - HTML-escaped markup in stored content (`&lt;T&gt;` matches `<T>`)
//! - markdown emphasis, code spans and brackets in the requested name
//! - letter case and repeated whitespace
//! - header text wrapped in `**bold**`
//!
//! Header-looking lines inside fenced code blocks are ignored.
//!
//! # Example
//!
//! ```
//! use splice_sections::extract;
//!
//! let doc = "## Intro\nworld\n## Next\nx";
//!
//! assert_eq!(extract(doc, "Intro", false, 1).unwrap(), "world");
//! assert_eq!(extract(doc, "intro", true, 1).unwrap(), "## Intro\nworld");
//! ```

mod entities;
mod extract;
mod fence;

pub use entities::decode_html_entities;
pub use extract::{SectionError, SectionMatch, extract, find_section, normalize_section_name};
