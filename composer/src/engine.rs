//! The command surface the composer uses to drive an editing engine.
//!
//! The engine owns its document model and rendering; the composer only ever
//! sets content, reads plain text, focuses, inserts text at an index, and
//! listens for changes. Indexes are in characters, not bytes.

use std::rc::Rc;

use crate::delta::Delta;
use crate::dom::Node;
use crate::keymap::KeyEvent;
use crate::keymap::Keymap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    pub index: usize,
    pub length: usize,
}

impl Selection {
    pub const fn caret(index: usize) -> Self {
        Self { index, length: 0 }
    }
}

/// Operations available to key handlers and to holders of an
/// [`crate::EditorHandle`]. Deliberately excludes teardown.
pub trait EditorOps {
    /// Replaces the whole document.
    fn set_content(&mut self, content: &Delta);

    fn plain_text(&self) -> String;

    fn focus(&mut self);

    fn insert_text(&mut self, index: usize, text: &str);

    fn selection(&self) -> Option<Selection>;
}

pub type ChangeListener = Rc<dyn Fn(&str)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub trait EditorEngine: EditorOps {
    /// Registers a listener called with the current plain text after every
    /// content change.
    fn on_change(&mut self, listener: ChangeListener) -> ListenerId;

    fn off_change(&mut self, id: ListenerId);

    fn listener_count(&self) -> usize;

    /// Feeds a key press through the engine's keymap and, unless a binding
    /// stopped it, the engine's own editing behavior.
    fn handle_key(&mut self, event: KeyEvent);

    /// The formatting toolbar the engine rendered, if it has one.
    fn toolbar(&self) -> Option<Node>;

    /// Releases engine resources. The engine is not used afterwards.
    fn destroy(&mut self);
}

pub trait EngineFactory {
    type Engine: EditorEngine + 'static;

    /// Builds an engine bound to `node`, which must be connected.
    fn construct(
        &self,
        node: &Node,
        options: EngineOptions,
    ) -> Result<Self::Engine, EngineError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("editor container is not attached to a document")]
    DetachedContainer,

    #[error("failed to construct editor: {0}")]
    Construction(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Snow,
    Bubble,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolbarItem {
    Bold,
    Italic,
    Strike,
    Link,
    OrderedList,
    BulletList,
}

impl ToolbarItem {
    pub fn label(self) -> &'static str {
        match self {
            ToolbarItem::Bold => "B",
            ToolbarItem::Italic => "I",
            ToolbarItem::Strike => "S",
            ToolbarItem::Link => "Link",
            ToolbarItem::OrderedList => "1.",
            ToolbarItem::BulletList => "•",
        }
    }
}

/// Bold/italic/strike, link, ordered/bullet list.
pub fn default_toolbar() -> Vec<Vec<ToolbarItem>> {
    vec![
        vec![ToolbarItem::Bold, ToolbarItem::Italic, ToolbarItem::Strike],
        vec![ToolbarItem::Link],
        vec![ToolbarItem::OrderedList, ToolbarItem::BulletList],
    ]
}

#[derive(Clone, Debug)]
pub struct EngineOptions {
    pub theme: Theme,
    /// Groups of toolbar controls, rendered with separators between groups.
    pub toolbar: Vec<Vec<ToolbarItem>>,
    pub placeholder: String,
    pub keymap: Keymap,
}

impl EngineOptions {
    pub fn new(placeholder: impl Into<String>, keymap: Keymap) -> Self {
        Self {
            theme: Theme::default(),
            toolbar: default_toolbar(),
            placeholder: placeholder.into(),
            keymap,
        }
    }
}

/// Listener registry for engine implementations.
#[derive(Default)]
pub struct ChangeListeners {
    next_id: u64,
    listeners: Vec<(ListenerId, ChangeListener)>,
}

impl ChangeListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: ChangeListener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        before != self.listeners.len()
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn emit(&self, text: &str) {
        let snapshot: Vec<ChangeListener> = self
            .listeners
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in snapshot {
            listener(text);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for ChangeListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeListeners")
            .field("len", &self.listeners.len())
            .finish()
    }
}
