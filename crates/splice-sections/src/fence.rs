//! Code fence tracking for section scanning.
//!
//! Tracks whether we're inside a fenced code block so that `#` lines in code
//! samples are not taken for section headers.

/// Backtick fence marker.
const FENCE: &str = "```";

/// Tracks code fence state during line-by-line scanning.
///
/// Any line starting with three backticks toggles the state, whatever its
/// info string. A fence line that contains the section text being searched
/// for does not toggle: notes often show an example of a header inside a
/// fence opener, and such a line must not swallow the rest of the document.
#[derive(Debug)]
pub(crate) struct FenceToggle<'a> {
    /// Raw section text that suppresses toggling.
    section: &'a str,
    in_fence: bool,
}

impl<'a> FenceToggle<'a> {
    /// Create a tracker for a scan looking for `section`.
    pub(crate) fn new(section: &'a str) -> Self {
        Self {
            section,
            in_fence: false,
        }
    }

    /// Check if currently inside a fenced code block.
    pub(crate) fn in_fence(&self) -> bool {
        self.in_fence
    }

    /// Update fence state based on a trimmed line.
    ///
    /// Returns `true` if the line toggled the state. Toggling lines are fence
    /// markers and never headers.
    pub(crate) fn update(&mut self, trimmed: &str) -> bool {
        if trimmed.starts_with(FENCE) && !trimmed.contains(self.section) {
            self.in_fence = !self.in_fence;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_fence_initially() {
        let toggle = FenceToggle::new("Intro");

        assert!(!toggle.in_fence());
    }

    #[test]
    fn test_backtick_fence() {
        let mut toggle = FenceToggle::new("Intro");

        assert!(toggle.update("```bash"));
        assert!(toggle.in_fence());

        assert!(!toggle.update("# not a header"));
        assert!(toggle.in_fence());

        assert!(toggle.update("```"));
        assert!(!toggle.in_fence());
    }

    #[test]
    fn test_fence_with_section_text_does_not_toggle() {
        let mut toggle = FenceToggle::new("Intro");

        assert!(!toggle.update("```## Intro"));
        assert!(!toggle.in_fence());
    }

    #[test]
    fn test_two_backticks_not_fence() {
        let mut toggle = FenceToggle::new("Intro");

        assert!(!toggle.update("``inline code``"));
        assert!(!toggle.in_fence());
    }

    #[test]
    fn test_tilde_is_not_a_fence() {
        let mut toggle = FenceToggle::new("Intro");

        assert!(!toggle.update("~~~"));
        assert!(!toggle.in_fence());
    }
}
