//! Concatenation of resolved fragments.

use crate::directive::EmbedRequest;
use crate::error::EmbedError;

/// Outcome of resolving one request.
#[derive(Debug)]
pub struct ResolvedFragment {
    /// The request this fragment answers.
    pub request: EmbedRequest,
    /// Resolved text, or the reason resolution failed.
    pub outcome: Result<String, EmbedError>,
}

impl ResolvedFragment {
    /// Check whether the fragment contributes no content.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        !self
            .outcome
            .as_ref()
            .is_ok_and(|text| !text.trim().is_empty())
    }

    /// Text to splice into the aggregate.
    #[must_use]
    pub fn render(&self) -> String {
        match &self.outcome {
            Ok(text) => text.clone(),
            Err(err) => err.marker(),
        }
    }
}

/// Aggregated text of one directive block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateResult {
    /// Fragments in source order, each followed by a separator.
    pub text: String,
    /// True when every fragment failed or resolved to blank text.
    pub is_empty: bool,
}

/// Wrap one item with the standard separator.
pub(crate) fn push_item(out: &mut String, item: &str) {
    out.push_str("\n\n");
    out.push_str(item);
    out.push_str("\n\n---\n\n");
}

/// Concatenate fragments in order.
///
/// Failed fragments contribute their error marker so that one broken link
/// does not hide its siblings.
#[must_use]
pub fn aggregate(fragments: &[ResolvedFragment]) -> AggregateResult {
    let mut text = String::new();
    for fragment in fragments {
        push_item(&mut text, &fragment.render());
    }

    AggregateResult {
        text,
        is_empty: fragments.iter().all(ResolvedFragment::is_blank),
    }
}
