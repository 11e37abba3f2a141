//! HTML entity decoding for stored markdown.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static ENTITY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(lt|gt|amp|quot|#39);").unwrap());

fn decode_once(text: &str) -> Cow<'_, str> {
    ENTITY_PATTERN.replace_all(text, |caps: &Captures<'_>| match &caps[1] {
        "lt" => "<",
        "gt" => ">",
        "amp" => "&",
        "quot" => "\"",
        _ => "'",
    })
}

/// Decode the five standard HTML entities (`&lt; &gt; &amp; &quot; &#39;`).
///
/// Decoding repeats until no entity is left, so doubly escaped text such as
/// `&amp;lt;` also comes out as `<`. Applying the function to its own output
/// is a no-op.
#[must_use]
pub fn decode_html_entities(text: &str) -> Cow<'_, str> {
    let Cow::Owned(mut decoded) = decode_once(text) else {
        return Cow::Borrowed(text);
    };
    // Every pass that changes the text makes it shorter, so this terminates.
    loop {
        let next = match decode_once(&decoded) {
            Cow::Owned(next) => next,
            Cow::Borrowed(_) => break,
        };
        decoded = next;
    }
    Cow::Owned(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_all_entities() {
        assert_eq!(
            decode_html_entities("&lt;b&gt; &amp; &quot;q&quot; &#39;s&#39;"),
            "<b> & \"q\" 's'"
        );
    }

    #[test]
    fn test_plain_text_is_borrowed() {
        let decoded = decode_html_entities("no entities here");

        assert!(matches!(decoded, Cow::Borrowed(_)));
    }

    #[test]
    fn test_double_escaped() {
        assert_eq!(decode_html_entities("&amp;lt;tag&amp;gt;"), "<tag>");
    }

    #[test]
    fn test_decoding_is_idempotent() {
        let inputs = [
            "&amp;amp;lt;",
            "Fish &amp; Chips",
            "a &lt; b &gt; c",
            "&unknown; &#40;",
        ];

        for input in inputs {
            let once = decode_html_entities(input).into_owned();
            let twice = decode_html_entities(&once).into_owned();
            assert_eq!(once, twice, "input: {input}");
        }
    }

    #[test]
    fn test_unknown_entities_untouched() {
        assert_eq!(decode_html_entities("&nbsp; &#40;"), "&nbsp; &#40;");
    }
}
