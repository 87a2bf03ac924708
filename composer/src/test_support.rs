//! In-memory engine used by the unit tests.

use std::cell::RefCell;
use std::rc::Rc;

use crate::delta::Delta;
use crate::dom::Node;
use crate::engine::ChangeListener;
use crate::engine::ChangeListeners;
use crate::engine::EditorEngine;
use crate::engine::EditorOps;
use crate::engine::EngineError;
use crate::engine::EngineFactory;
use crate::engine::EngineOptions;
use crate::engine::ListenerId;
use crate::engine::Selection;
use crate::keymap::Key;
use crate::keymap::KeyEvent;
use crate::keymap::Keymap;
use crate::keymap::Propagation;

/// Counters shared between a factory and every engine it built.
#[derive(Debug, Default)]
pub(crate) struct Probe {
    pub(crate) constructed: usize,
    pub(crate) destroyed: usize,
    pub(crate) listeners: usize,
    pub(crate) placeholders: Vec<String>,
    pub(crate) focused: usize,
}

pub(crate) struct FakeEngine {
    text: String,
    cursor: Option<usize>,
    keymap: Keymap,
    listeners: ChangeListeners,
    toolbar: Option<Node>,
    probe: Rc<RefCell<Probe>>,
}

impl FakeEngine {
    pub(crate) fn with_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            cursor: Some(text.chars().count()),
            keymap: Keymap::new(),
            listeners: ChangeListeners::new(),
            toolbar: None,
            probe: Rc::default(),
        }
    }

    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn set_cursor(&mut self, index: usize) {
        self.cursor = Some(index);
    }

    pub(crate) fn clear_selection(&mut self) {
        self.cursor = None;
    }

    fn byte_index(&self, index: usize) -> usize {
        self.text
            .char_indices()
            .nth(index)
            .map_or(self.text.len(), |(byte, _)| byte)
    }

    fn changed(&self) {
        self.listeners.emit(&self.text);
    }
}

impl EditorOps for FakeEngine {
    fn set_content(&mut self, content: &Delta) {
        self.text = content.plain_text();
        self.cursor = Some(self.text.chars().count());
        self.changed();
    }

    fn plain_text(&self) -> String {
        self.text.clone()
    }

    fn focus(&mut self) {
        self.probe.borrow_mut().focused += 1;
    }

    fn insert_text(&mut self, index: usize, text: &str) {
        let len = self.text.chars().count();
        let index = index.min(len);
        let byte = self.byte_index(index);
        self.text.insert_str(byte, text);
        self.cursor = Some(index + text.chars().count());
        self.changed();
    }

    fn selection(&self) -> Option<Selection> {
        self.cursor.map(Selection::caret)
    }
}

impl EditorEngine for FakeEngine {
    fn on_change(&mut self, listener: ChangeListener) -> ListenerId {
        self.probe.borrow_mut().listeners += 1;
        self.listeners.subscribe(listener)
    }

    fn off_change(&mut self, id: ListenerId) {
        if self.listeners.unsubscribe(id) {
            self.probe.borrow_mut().listeners -= 1;
        }
    }

    fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn handle_key(&mut self, event: KeyEvent) {
        if let Some(handler) = self.keymap.lookup(&event)
            && handler(self) == Propagation::Stop
        {
            return;
        }
        let cursor = self.cursor.unwrap_or(0);
        match event.key {
            Key::Char(ch) => self.insert_text(cursor, &ch.to_string()),
            Key::Enter => self.insert_text(cursor, "\n"),
            Key::Backspace if cursor > 0 => {
                let start = self.byte_index(cursor - 1);
                let end = self.byte_index(cursor);
                self.text.replace_range(start..end, "");
                self.cursor = Some(cursor - 1);
                self.changed();
            }
            _ => {}
        }
    }

    fn toolbar(&self) -> Option<Node> {
        self.toolbar.clone()
    }

    fn destroy(&mut self) {
        self.probe.borrow_mut().destroyed += 1;
    }
}

#[derive(Default)]
pub(crate) struct FakeFactory {
    pub(crate) probe: Rc<RefCell<Probe>>,
    pub(crate) fail: bool,
}

impl FakeFactory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl EngineFactory for FakeFactory {
    type Engine = FakeEngine;

    fn construct(&self, node: &Node, options: EngineOptions) -> Result<FakeEngine, EngineError> {
        if self.fail {
            return Err(EngineError::Construction("fake failure".to_string()));
        }
        if !node.is_connected() {
            return Err(EngineError::DetachedContainer);
        }
        let toolbar = node
            .parent()
            .map(|parent| parent.insert_before(&Node::element("toolbar"), node));
        {
            let mut probe = self.probe.borrow_mut();
            probe.constructed += 1;
            probe.placeholders.push(options.placeholder.clone());
        }
        Ok(FakeEngine {
            text: String::new(),
            cursor: Some(0),
            keymap: options.keymap,
            listeners: ChangeListeners::new(),
            toolbar,
            probe: Rc::clone(&self.probe),
        })
    }
}
