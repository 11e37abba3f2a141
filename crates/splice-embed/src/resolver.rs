//! Request resolution against storage.
//!
//! Requests of one block are resolved in parallel on the rayon pool and come
//! back in source order. A resolved document may itself contain nested embed
//! regions (fenced blocks carrying the nested label); links inside them are
//! resolved recursively with a depth counter, so self-embeds and cycles end
//! in a [`EmbedError::DepthExceeded`] marker instead of looping.

use rayon::prelude::*;
use splice_sections::{SectionError, extract};
use splice_storage::{Document, Storage, strip_front_matter};

use crate::aggregate::{ResolvedFragment, push_item};
use crate::block::{Segment, split_blocks};
use crate::directive::{EmbedRequest, is_comment, wikilinks};
use crate::engine::EmbedConfig;
use crate::error::{EmbedError, Missing};
use crate::sort::SortOrder;

/// Resolves embed requests to text.
///
/// Borrowed view over a storage backend and the engine settings; cheap to
/// create per block.
#[derive(Clone, Copy)]
pub struct EmbedResolver<'a> {
    storage: &'a dyn Storage,
    config: &'a EmbedConfig,
}

impl<'a> EmbedResolver<'a> {
    /// Create a resolver.
    #[must_use]
    pub fn new(storage: &'a dyn Storage, config: &'a EmbedConfig) -> Self {
        Self { storage, config }
    }

    /// Resolve every request, keeping source order.
    ///
    /// A failed request never affects its siblings.
    #[must_use]
    pub fn resolve(&self, requests: &[EmbedRequest]) -> Vec<ResolvedFragment> {
        requests
            .par_iter()
            .map(|request| ResolvedFragment {
                request: request.clone(),
                outcome: self.resolve_one(request),
            })
            .collect()
    }

    /// Resolve a single top-level request.
    ///
    /// # Errors
    ///
    /// Returns [`EmbedError`] describing why the request produced no text.
    pub fn resolve_one(&self, request: &EmbedRequest) -> Result<String, EmbedError> {
        self.resolve_at(request, 0)
    }

    fn resolve_at(&self, request: &EmbedRequest, depth: usize) -> Result<String, EmbedError> {
        if !request.is_valid() {
            return Err(EmbedError::InvalidRequest(request.to_string()));
        }

        match request {
            EmbedRequest::File {
                name,
                section,
                include_header,
            } => self.embed_file(name, section.as_deref(), *include_header, depth),
            EmbedRequest::Prefix { prefix, sort } => self.embed_prefix(prefix, *sort, depth),
        }
    }

    fn read(&self, name: &str, document: &Document) -> Result<String, EmbedError> {
        let content = self
            .storage
            .read(document)
            .map_err(|e| EmbedError::storage(name, e))?;

        if self.config.strip_front_matter {
            Ok(strip_front_matter(&content).to_owned())
        } else {
            Ok(content)
        }
    }

    fn embed_file(
        &self,
        name: &str,
        section: Option<&str>,
        include_header: bool,
        depth: usize,
    ) -> Result<String, EmbedError> {
        if depth > self.config.max_depth {
            tracing::warn!(name, max_depth = self.config.max_depth, "Embed depth exceeded");
            return Err(EmbedError::DepthExceeded {
                name: name.to_owned(),
                max_depth: self.config.max_depth,
            });
        }

        let document = self
            .storage
            .find_by_name(name)
            .map_err(|e| EmbedError::storage(name, e))?
            .ok_or_else(|| Missing::File(name.to_owned()))?;

        if !document.is_textual() {
            return Err(EmbedError::WrongType(name.to_owned()));
        }

        let content = self.read(name, &document)?;
        let content = match section {
            Some(section) => {
                extract(&content, section, include_header, 1).map_err(|err| match err {
                    SectionError::NotFound { section } => EmbedError::from(Missing::Section {
                        file: name.to_owned(),
                        section,
                    }),
                    SectionError::Empty { section } => EmbedError::EmptySection {
                        file: name.to_owned(),
                        section,
                    },
                })?
            }
            None => content,
        };

        tracing::debug!(
            name,
            path = %document.path.display(),
            section,
            depth,
            "Resolved document"
        );
        Ok(self.expand_nested(&content, depth))
    }

    /// Concatenate every document of a prefix group.
    ///
    /// A document that cannot be read is replaced by its error marker.
    fn embed_prefix(
        &self,
        prefix: &str,
        sort: SortOrder,
        depth: usize,
    ) -> Result<String, EmbedError> {
        let mut documents = self
            .storage
            .find_by_prefix(prefix)
            .map_err(|e| EmbedError::storage(prefix, e))?;

        if documents.is_empty() {
            return Err(Missing::Prefix(prefix.to_owned()).into());
        }

        sort.apply(&mut documents);

        let contents: Vec<String> = documents
            .par_iter()
            .map(|document| match self.read(&document.name, document) {
                Ok(content) => self.expand_nested(&content, depth),
                Err(err) => {
                    tracing::warn!(
                        prefix,
                        name = %document.name,
                        error = %err,
                        "Could not read prefix group document"
                    );
                    err.marker()
                }
            })
            .collect();

        let mut text = String::new();
        for content in &contents {
            push_item(&mut text, content);
        }

        tracing::debug!(prefix, %sort, count = documents.len(), "Resolved prefix group");
        Ok(text)
    }

    /// Replace nested embed regions with their resolved content.
    ///
    /// Region fence lines and comment lines are dropped; links are replaced
    /// in place, failed ones by their error marker.
    fn expand_nested(&self, content: &str, depth: usize) -> String {
        let segments = split_blocks(content, &self.config.nested_label);
        if !segments
            .iter()
            .any(|segment| matches!(segment, Segment::Block(_)))
        {
            return content.to_owned();
        }

        segments
            .iter()
            .map(|segment| match segment {
                Segment::Text(lines) => lines.join("\n"),
                Segment::Block(lines) => self.resolve_region(lines, depth),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn resolve_region(&self, lines: &[&str], depth: usize) -> String {
        let region = lines
            .iter()
            .filter(|line| !is_comment(line))
            .copied()
            .collect::<Vec<_>>()
            .join("\n");
        let links = wikilinks(&region);

        let resolved: Vec<String> = links
            .par_iter()
            .map(|(range, request)| {
                let outcome = match request {
                    Some(request) => self.resolve_at(request, depth + 1),
                    None => Err(EmbedError::InvalidRequest(region[range.clone()].to_owned())),
                };
                outcome.unwrap_or_else(|err| err.marker())
            })
            .collect();

        let mut out = String::with_capacity(region.len());
        let mut cursor = 0;
        for ((range, _), text) in links.iter().zip(&resolved) {
            out.push_str(&region[cursor..range.start]);
            out.push_str(text);
            cursor = range.end;
        }
        out.push_str(&region[cursor..]);
        out
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use splice_storage::MockStorage;

    use super::*;

    fn resolve(storage: &MockStorage, request: &EmbedRequest) -> Result<String, EmbedError> {
        let config = EmbedConfig::default();
        EmbedResolver::new(storage, &config).resolve_one(request)
    }

    fn resolve_with(
        storage: &MockStorage,
        config: &EmbedConfig,
        request: &EmbedRequest,
    ) -> Result<String, EmbedError> {
        EmbedResolver::new(storage, config).resolve_one(request)
    }

    #[test]
    fn test_whole_file() {
        let storage = MockStorage::new().with_file("NoteA.md", "hello");

        assert_eq!(resolve(&storage, &EmbedRequest::file("NoteA")).unwrap(), "hello");
    }

    #[test]
    fn test_file_by_path() {
        let storage = MockStorage::new().with_file("projects/NoteA.md", "hello");

        assert_eq!(
            resolve(&storage, &EmbedRequest::file("projects/NoteA")).unwrap(),
            "hello"
        );
    }

    #[test]
    fn test_file_not_found() {
        let storage = MockStorage::new();

        let err = resolve(&storage, &EmbedRequest::file("Gone")).unwrap_err();

        assert_eq!(err.to_string(), "File 'Gone' not found");
    }

    #[test]
    fn test_wrong_type() {
        let storage = MockStorage::new().with_binary("diagram.png");

        let err = resolve(&storage, &EmbedRequest::file("diagram.png")).unwrap_err();

        assert!(matches!(err, EmbedError::WrongType(ref name) if name == "diagram.png"));
    }

    #[test]
    fn test_unreadable_document() {
        let storage = MockStorage::new().with_unreadable("Broken.md");

        let err = resolve(&storage, &EmbedRequest::file("Broken")).unwrap_err();

        assert!(matches!(err, EmbedError::Storage { ref name, .. } if name == "Broken"));
    }

    #[test]
    fn test_section() {
        let storage = MockStorage::new().with_file("NoteB.md", "## Intro\nworld\n## Next\nx");

        assert_eq!(
            resolve(&storage, &EmbedRequest::section("NoteB", "Intro", true)).unwrap(),
            "## Intro\nworld"
        );
        assert_eq!(
            resolve(&storage, &EmbedRequest::section("NoteB", "Intro", false)).unwrap(),
            "world"
        );
    }

    #[test]
    fn test_section_errors_are_distinct() {
        let storage = MockStorage::new().with_file("NoteB.md", "## A\n## B");

        let missing = resolve(&storage, &EmbedRequest::section("NoteB", "C", true)).unwrap_err();
        let empty = resolve(&storage, &EmbedRequest::section("NoteB", "A", false)).unwrap_err();

        assert_eq!(missing.to_string(), "Section 'C' not found in 'NoteB'");
        assert_eq!(empty.to_string(), "Section 'A' in 'NoteB' is empty");
    }

    #[test]
    fn test_front_matter_stripped() {
        let storage = MockStorage::new().with_file("NoteA.md", "---\ntags: [x]\n---\n\nbody");

        assert_eq!(resolve(&storage, &EmbedRequest::file("NoteA")).unwrap(), "body");
    }

    #[test]
    fn test_front_matter_kept_when_disabled() {
        let storage = MockStorage::new().with_file("NoteA.md", "---\ntags: [x]\n---\nbody");
        let config = EmbedConfig {
            strip_front_matter: false,
            ..EmbedConfig::default()
        };

        assert_eq!(
            resolve_with(&storage, &config, &EmbedRequest::file("NoteA")).unwrap(),
            "---\ntags: [x]\n---\nbody"
        );
    }

    #[test]
    fn test_invalid_request() {
        let storage = MockStorage::new();

        let err = resolve(&storage, &EmbedRequest::file("  ")).unwrap_err();

        assert!(matches!(err, EmbedError::InvalidRequest(_)));
    }

    #[test]
    fn test_prefix_group() {
        let storage = MockStorage::new()
            .with_file("Proj-B.md", "beta")
            .with_file("Proj-A.md", "alpha")
            .with_binary("Proj-logo.png")
            .with_file("Other.md", "other");

        let text = resolve(&storage, &EmbedRequest::prefix("Proj-", SortOrder::Name)).unwrap();

        assert_eq!(text, "\n\nalpha\n\n---\n\n\n\nbeta\n\n---\n\n");
    }

    #[test]
    fn test_prefix_group_by_modified() {
        let storage = MockStorage::new()
            .with_file("Proj-A.md", "alpha")
            .with_file("Proj-B.md", "beta")
            .with_times("Proj-A.md", 1.0, 20.0)
            .with_times("Proj-B.md", 2.0, 10.0);

        let text = resolve(
            &storage,
            &EmbedRequest::prefix("Proj-", SortOrder::Modified),
        )
        .unwrap();

        assert!(text.find("beta").unwrap() < text.find("alpha").unwrap());
    }

    #[test]
    fn test_prefix_group_empty() {
        let storage = MockStorage::new().with_file("Other.md", "x");

        let err = resolve(&storage, &EmbedRequest::prefix("Proj-", SortOrder::Natural)).unwrap_err();

        assert_eq!(err.to_string(), "No markdown files found with prefix 'Proj-'");
    }

    #[test]
    fn test_prefix_group_resolves_nested_regions() {
        let storage = MockStorage::new()
            .with_file("Proj-A.md", "a\n```embed\n[[Leaf]]\n```")
            .with_file("Leaf.md", "leaf");

        let text = resolve(&storage, &EmbedRequest::prefix("Proj-", SortOrder::Natural)).unwrap();

        assert_eq!(text, "\n\na\nleaf\n\n---\n\n");
    }

    #[test]
    fn test_prefix_group_self_embed_stops_at_max_depth() {
        let storage = MockStorage::new().with_file("Proj-A.md", "a\n```embed\n[[Proj-A]]\n```");
        let config = EmbedConfig {
            max_depth: 1,
            ..EmbedConfig::default()
        };

        let text = resolve_with(
            &storage,
            &config,
            &EmbedRequest::prefix("Proj-", SortOrder::Natural),
        )
        .unwrap();

        assert_eq!(
            text,
            "\n\na\na\n**Error:** Maximum embed depth (1) exceeded for 'Proj-A'.\n\n---\n\n"
        );
    }

    #[test]
    fn test_prefix_group_keeps_readable_siblings() {
        let storage = MockStorage::new()
            .with_file("Proj-A.md", "alpha")
            .with_unreadable("Proj-B.md");

        let text = resolve(&storage, &EmbedRequest::prefix("Proj-", SortOrder::Name)).unwrap();

        assert!(text.starts_with("\n\nalpha\n\n---\n\n\n\n**Error:** Could not read 'Proj-B.md': "));
        assert!(text.ends_with(".\n\n---\n\n"));
    }

    #[test]
    fn test_nested_region_is_resolved() {
        let storage = MockStorage::new()
            .with_file(
                "Hub.md",
                "Intro\n```embed\n# pulled in below\n[[Leaf#Part!]]\n```\nAfter",
            )
            .with_file("Leaf.md", "## Part\nleaf text\n## Other\nno");

        assert_eq!(
            resolve(&storage, &EmbedRequest::file("Hub")).unwrap(),
            "Intro\nleaf text\nAfter"
        );
    }

    #[test]
    fn test_nested_failures_become_markers() {
        let storage = MockStorage::new().with_file("Hub.md", "```embed\n[[Gone]] and [[ ]]\n```");

        assert_eq!(
            resolve(&storage, &EmbedRequest::file("Hub")).unwrap(),
            "**Error:** File 'Gone' not found. and **Error:** Invalid embed request '[[ ]]'."
        );
    }

    #[test]
    fn test_links_outside_regions_untouched() {
        let storage = MockStorage::new()
            .with_file("Hub.md", "See [[Leaf]]\n```rust\n[[Leaf]]\n```")
            .with_file("Leaf.md", "leaf");

        assert_eq!(
            resolve(&storage, &EmbedRequest::file("Hub")).unwrap(),
            "See [[Leaf]]\n```rust\n[[Leaf]]\n```"
        );
    }

    #[test]
    fn test_custom_nested_label() {
        let storage = MockStorage::new()
            .with_file("Hub.md", "```embed\n[[Leaf]]\n```\n```include\n[[Leaf]]\n```")
            .with_file("Leaf.md", "leaf");
        let config = EmbedConfig {
            nested_label: "include".to_owned(),
            ..EmbedConfig::default()
        };

        assert_eq!(
            resolve_with(&storage, &config, &EmbedRequest::file("Hub")).unwrap(),
            "```embed\n[[Leaf]]\n```\nleaf"
        );
    }

    #[test]
    fn test_self_embed_stops_at_max_depth() {
        let storage = MockStorage::new().with_file("Loop.md", "start\n```embed\n[[Loop]]\n```");
        let config = EmbedConfig {
            max_depth: 2,
            ..EmbedConfig::default()
        };

        let text = resolve_with(&storage, &config, &EmbedRequest::file("Loop")).unwrap();

        assert_eq!(
            text,
            "start\nstart\nstart\n**Error:** Maximum embed depth (2) exceeded for 'Loop'."
        );
    }

    #[test]
    fn test_cycle_terminates_with_default_depth() {
        let storage = MockStorage::new()
            .with_file("A.md", "a\n```embed\n[[B]]\n```")
            .with_file("B.md", "b\n```embed\n[[A]]\n```");

        let text = resolve(&storage, &EmbedRequest::file("A")).unwrap();

        assert!(text.starts_with("a\nb\na\nb"));
        assert!(text.ends_with("**Error:** Maximum embed depth (5) exceeded for 'A'."));
    }

    #[test]
    fn test_resolve_keeps_source_order() {
        let mut storage = MockStorage::new();
        let mut requests = Vec::new();
        for i in 0..32 {
            storage = storage.with_file(format!("Note{i}.md"), format!("text {i}"));
            requests.push(EmbedRequest::file(format!("Note{i}")));
        }
        let config = EmbedConfig::default();

        let fragments = EmbedResolver::new(&storage, &config).resolve(&requests);

        for (i, fragment) in fragments.iter().enumerate() {
            assert_eq!(fragment.request, requests[i]);
            assert_eq!(fragment.outcome.as_ref().unwrap(), &format!("text {i}"));
        }
    }
}
