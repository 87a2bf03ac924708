use lazy_static::lazy_static;
use regex_lite::Regex;

lazy_static! {
    static ref MARKUP_REGEX: Regex =
        Regex::new(r"(?s)<.*?>").unwrap_or_else(|_| std::process::abort());
}

/// True when `text` is whitespace-only once `<...>` markup is stripped.
pub fn is_blank(text: &str) -> bool {
    MARKUP_REGEX.replace_all(text, "").trim().is_empty()
}

/// Render-driving state derived from the engine.
///
/// Only engine change notifications and the toolbar toggle mutate this;
/// prop changes never do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComposerViewState {
    plain_text: String,
    toolbar_visible: bool,
}

impl Default for ComposerViewState {
    fn default() -> Self {
        Self {
            plain_text: String::new(),
            toolbar_visible: true,
        }
    }
}

impl ComposerViewState {
    pub fn plain_text(&self) -> &str {
        &self.plain_text
    }

    pub fn is_empty(&self) -> bool {
        is_blank(&self.plain_text)
    }

    pub fn toolbar_visible(&self) -> bool {
        self.toolbar_visible
    }

    pub(crate) fn set_plain_text(&mut self, text: &str) {
        if self.plain_text != text {
            self.plain_text.clear();
            self.plain_text.push_str(text);
        }
    }

    /// Flips toolbar visibility and returns the new value.
    pub(crate) fn toggle_toolbar(&mut self) -> bool {
        self.toolbar_visible = !self.toolbar_visible;
        self.toolbar_visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn blank_detection_strips_markup_and_whitespace() {
        assert!(is_blank(""));
        assert!(is_blank("<p></p>"));
        assert!(is_blank("<p><br></p>\n"));
        assert!(is_blank("   \n\t "));
        assert!(is_blank("<p\nclass=\"x\">  </p>"));
        assert!(!is_blank("hello"));
        assert!(!is_blank("<p>hi</p>"));
        assert!(!is_blank("  a  "));
    }

    #[test]
    fn toolbar_starts_visible_and_toggles() {
        let mut state = ComposerViewState::default();
        assert!(state.toolbar_visible());
        assert!(!state.toggle_toolbar());
        assert!(state.toggle_toolbar());
    }

    #[test]
    fn emptiness_tracks_plain_text() {
        let mut state = ComposerViewState::default();
        assert!(state.is_empty());

        state.set_plain_text("hello\n");
        assert_eq!(state.plain_text(), "hello\n");
        assert!(!state.is_empty());

        state.set_plain_text("\n");
        assert!(state.is_empty());
    }
}
