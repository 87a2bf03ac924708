//! A plain-text editing engine for the terminal.
//!
//! `TextAreaEngine` keeps the document as a `String` plus a caret measured in
//! characters. Formatting is not modeled; the toolbar is rendered for parity
//! with richer engines and its visibility is driven by the composer through
//! the `hidden` class on the toolbar node.

use huddle_composer::ChangeListener;
use huddle_composer::ChangeListeners;
use huddle_composer::Delta;
use huddle_composer::EditorEngine;
use huddle_composer::EditorOps;
use huddle_composer::EngineError;
use huddle_composer::EngineFactory;
use huddle_composer::EngineOptions;
use huddle_composer::Key;
use huddle_composer::KeyEvent;
use huddle_composer::Keymap;
use huddle_composer::ListenerId;
use huddle_composer::Modifiers;
use huddle_composer::Propagation;
use huddle_composer::Selection;
use huddle_composer::Theme;
use huddle_composer::ToolbarItem;
use huddle_composer::dom::Node;
use unicode_width::UnicodeWidthStr;

const TOOLBAR_TAG: &str = "toolbar";

pub struct TextAreaEngine {
    text: String,
    /// Caret position in characters.
    cursor: usize,
    focused: bool,
    placeholder: String,
    keymap: Keymap,
    listeners: ChangeListeners,
    toolbar_items: Vec<Vec<ToolbarItem>>,
    toolbar_node: Option<Node>,
    destroyed: bool,
}

impl TextAreaEngine {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn toolbar_items(&self) -> &[Vec<ToolbarItem>] {
        &self.toolbar_items
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }

    pub fn line_count(&self) -> usize {
        self.lines().count()
    }

    /// Caret as (line, display column).
    pub fn cursor_display_pos(&self) -> (usize, usize) {
        let (line, col) = line_col(&self.text, self.cursor);
        let width = self
            .lines()
            .nth(line)
            .map(|text| {
                let end = byte_index(text, col);
                text[..end].width()
            })
            .unwrap_or(0);
        (line, width)
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    fn changed(&self) {
        self.listeners.emit(&self.text);
    }

    fn delete_range(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        let start_byte = byte_index(&self.text, start);
        let end_byte = byte_index(&self.text, end);
        self.text.replace_range(start_byte..end_byte, "");
        self.cursor = start;
        self.changed();
    }

    fn move_vertically(&mut self, down: bool) {
        let (line, col) = line_col(&self.text, self.cursor);
        self.cursor = if down {
            if line + 1 < self.line_count() {
                index_of(&self.text, line + 1, col)
            } else {
                self.len()
            }
        } else if line == 0 {
            0
        } else {
            index_of(&self.text, line - 1, col)
        };
    }

    fn edit(&mut self, event: KeyEvent) {
        let cursor = self.cursor;
        let chord = event.modifiers.contains(Modifiers::CONTROL)
            || event.modifiers.contains(Modifiers::ALT)
            || event.modifiers.contains(Modifiers::META);
        match event.key {
            Key::Char(ch) if !chord => self.insert_text(cursor, &ch.to_string()),
            Key::Enter => self.insert_text(cursor, "\n"),
            Key::Tab if !chord => self.insert_text(cursor, "\t"),
            Key::Backspace if cursor > 0 => self.delete_range(cursor - 1, cursor),
            Key::Delete => self.delete_range(cursor, (cursor + 1).min(self.len())),
            Key::Left => self.cursor = cursor.saturating_sub(1),
            Key::Right => self.cursor = (cursor + 1).min(self.len()),
            Key::Up => self.move_vertically(false),
            Key::Down => self.move_vertically(true),
            Key::Home => {
                let (line, _) = line_col(&self.text, cursor);
                self.cursor = index_of(&self.text, line, 0);
            }
            Key::End => {
                let (line, _) = line_col(&self.text, cursor);
                self.cursor = index_of(&self.text, line, usize::MAX);
            }
            _ => {}
        }
    }
}

impl EditorOps for TextAreaEngine {
    fn set_content(&mut self, content: &Delta) {
        self.text = content.plain_text();
        self.cursor = self.len();
        self.changed();
    }

    fn plain_text(&self) -> String {
        self.text.clone()
    }

    fn focus(&mut self) {
        self.focused = true;
    }

    fn insert_text(&mut self, index: usize, text: &str) {
        let index = index.min(self.len());
        let byte = byte_index(&self.text, index);
        self.text.insert_str(byte, text);
        self.cursor = index + text.chars().count();
        self.changed();
    }

    fn selection(&self) -> Option<Selection> {
        self.focused.then(|| Selection::caret(self.cursor))
    }
}

impl EditorEngine for TextAreaEngine {
    fn on_change(&mut self, listener: ChangeListener) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    fn off_change(&mut self, id: ListenerId) {
        self.listeners.unsubscribe(id);
    }

    fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn handle_key(&mut self, event: KeyEvent) {
        if self.destroyed {
            return;
        }
        if let Some(handler) = self.keymap.lookup(&event)
            && handler(self) == Propagation::Stop
        {
            return;
        }
        self.edit(event);
    }

    fn toolbar(&self) -> Option<Node> {
        self.toolbar_node.clone()
    }

    fn destroy(&mut self) {
        self.listeners.clear();
        self.keymap = Keymap::new();
        if let Some(toolbar) = self.toolbar_node.take()
            && let Some(parent) = toolbar.parent()
        {
            parent.remove_child(&toolbar);
        }
        self.focused = false;
        self.destroyed = true;
    }
}

/// Builds [`TextAreaEngine`]s. The snow theme renders a toolbar node as the
/// editor node's previous sibling; the bubble theme renders none.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextAreaFactory;

impl EngineFactory for TextAreaFactory {
    type Engine = TextAreaEngine;

    fn construct(
        &self,
        node: &Node,
        options: EngineOptions,
    ) -> Result<TextAreaEngine, EngineError> {
        if !node.is_connected() {
            return Err(EngineError::DetachedContainer);
        }
        let EngineOptions {
            theme,
            toolbar,
            placeholder,
            keymap,
        } = options;

        let toolbar_node = match theme {
            Theme::Snow if !toolbar.is_empty() => {
                let parent = node.parent().ok_or_else(|| {
                    EngineError::Construction("editor node has no parent".to_string())
                })?;
                Some(parent.insert_before(&Node::element(TOOLBAR_TAG), node))
            }
            Theme::Snow | Theme::Bubble => None,
        };

        Ok(TextAreaEngine {
            text: String::new(),
            cursor: 0,
            focused: false,
            placeholder,
            keymap,
            listeners: ChangeListeners::new(),
            toolbar_items: toolbar,
            toolbar_node,
            destroyed: false,
        })
    }
}

fn byte_index(text: &str, index: usize) -> usize {
    text.char_indices()
        .nth(index)
        .map_or(text.len(), |(byte, _)| byte)
}

fn line_col(text: &str, index: usize) -> (usize, usize) {
    text.chars()
        .take(index)
        .fold((0, 0), |(line, col), ch| {
            if ch == '\n' {
                (line + 1, 0)
            } else {
                (line, col + 1)
            }
        })
}

/// Character index of `col` on `line`, clamped to the line's end.
fn index_of(text: &str, line: usize, col: usize) -> usize {
    let mut start = 0;
    for (current, line_text) in text.split('\n').enumerate() {
        let len = line_text.chars().count();
        if current == line {
            return start + col.min(len);
        }
        start += len + 1;
    }
    text.chars().count()
}
