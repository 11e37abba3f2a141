//! Block-level entry points.

use std::sync::Arc;

use splice_storage::Storage;

use crate::aggregate::{AggregateResult, aggregate};
use crate::block::{Segment, split_blocks};
use crate::directive::{EmbedRequest, parse_with_sort, strip_comments};
use crate::error::BlockError;
use crate::resolver::EmbedResolver;
use crate::sort::SortOrder;

/// Default bound on nested embed depth.
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Default fenced block keyword and nested region label.
pub const DEFAULT_KEYWORD: &str = "embed";

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedConfig {
    /// Label of fenced blocks rewritten by [`EmbedEngine::process_document`].
    pub keyword: String,
    /// Label of nested embed regions inside embedded documents.
    pub nested_label: String,
    /// Deepest nesting level that is still resolved.
    pub max_depth: usize,
    /// Order of prefix groups without a `sort:` line.
    pub default_sort: SortOrder,
    /// Drop leading YAML front matter from documents.
    pub strip_front_matter: bool,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            keyword: DEFAULT_KEYWORD.to_owned(),
            nested_label: DEFAULT_KEYWORD.to_owned(),
            max_depth: DEFAULT_MAX_DEPTH,
            default_sort: SortOrder::default(),
            strip_front_matter: true,
        }
    }
}

/// Embed engine over a storage backend.
///
/// Stateless between calls; one engine can serve any number of blocks and
/// documents, from any thread.
pub struct EmbedEngine {
    storage: Arc<dyn Storage>,
    config: EmbedConfig,
}

impl EmbedEngine {
    /// Create an engine.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, config: EmbedConfig) -> Self {
        Self { storage, config }
    }

    /// Engine settings.
    #[must_use]
    pub fn config(&self) -> &EmbedConfig {
        &self.config
    }

    /// Resolver bound to this engine's storage and settings.
    #[must_use]
    pub fn resolver(&self) -> EmbedResolver<'_> {
        EmbedResolver::new(self.storage.as_ref(), &self.config)
    }

    /// Parse a directive block with the configured default sort order.
    #[must_use]
    pub fn parse(&self, block: &str) -> Vec<EmbedRequest> {
        parse_with_sort(block, self.config.default_sort)
    }

    /// Resolve a directive block to its aggregate text.
    ///
    /// # Errors
    ///
    /// Returns [`BlockError`] when the block holds only comments, holds no
    /// valid request, or every request failed.
    pub fn resolve(&self, block: &str) -> Result<AggregateResult, BlockError> {
        if strip_comments(block).trim().is_empty() {
            return Err(BlockError::NoRequests);
        }

        let requests = self.parse(block);
        if requests.is_empty() {
            return Err(BlockError::InvalidFormat);
        }

        let fragments = self.resolver().resolve(&requests);
        let result = aggregate(&fragments);
        tracing::debug!(
            requests = requests.len(),
            failed = fragments.iter().filter(|f| f.outcome.is_err()).count(),
            "Resolved embed block"
        );

        if result.is_empty {
            return Err(BlockError::NoContent);
        }
        Ok(result)
    }

    /// Resolve a block, falling back to the block error message.
    #[must_use]
    pub fn render_block(&self, block: &str) -> String {
        match self.resolve(block) {
            Ok(result) => result.text,
            Err(err) => err.to_string(),
        }
    }

    /// Replace every embed block of a markdown document with its content.
    ///
    /// Blocks are fenced code blocks labeled with the configured keyword.
    /// Blocks that fail as a whole become a `text` block with the message.
    #[must_use]
    pub fn process_document(&self, markdown: &str) -> String {
        let segments = split_blocks(markdown, &self.config.keyword);
        let mut blocks = 0_usize;

        let parts: Vec<String> = segments
            .iter()
            .map(|segment| match segment {
                Segment::Text(lines) => lines.join("\n"),
                Segment::Block(lines) => {
                    blocks += 1;
                    self.replace_block(&lines.join("\n"))
                }
            })
            .collect();

        tracing::debug!(blocks, "Processed document");

        let mut output = parts.join("\n");
        if markdown.ends_with('\n') {
            output.push('\n');
        }
        output
    }

    fn replace_block(&self, block: &str) -> String {
        match self.resolve(block) {
            Ok(result) => format!("\n{}\n", result.text.trim_matches('\n')),
            Err(err) => {
                tracing::warn!(error = %err, "Embed block failed");
                format!("```text\nEmbed error: {err}\n```")
            }
        }
    }
}
