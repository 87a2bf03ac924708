//! Key overrides registered on the engine, and the intent classification
//! behind them.
//!
//! Only Enter is intercepted. Plain Enter becomes a submit request and never
//! reaches the engine's newline handling; Shift+Enter inserts exactly one
//! literal newline at the cursor. Every other chord, including Enter with
//! Ctrl/Alt, falls through to the engine's native behavior.

use std::cell::Cell;
use std::rc::Rc;

use bitflags::bitflags;

use crate::engine::EditorOps;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    Esc,
}

bitflags! {
    /// Modifier keys held during a press. Bindings compare them exactly.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const NONE = 0;
        const SHIFT = 1;
        const CONTROL = 1 << 1;
        const ALT = 1 << 2;
        const META = 1 << 3;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub const fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub const fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::empty())
    }
}

/// What a key press means to the composer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    Submit,
    InsertNewline,
    Edit,
}

impl Intent {
    pub fn classify(event: &KeyEvent) -> Intent {
        match event.key {
            Key::Enter if event.modifiers.is_empty() => Intent::Submit,
            Key::Enter if event.modifiers == Modifiers::SHIFT => Intent::InsertNewline,
            _ => Intent::Edit,
        }
    }
}

/// Whether the engine should continue with its own handling after a binding
/// ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Propagation {
    Stop,
    Continue,
}

pub type KeyHandler = Rc<dyn Fn(&mut dyn EditorOps) -> Propagation>;

#[derive(Clone)]
pub struct KeyBinding {
    pub key: Key,
    /// Matched exactly: a binding for `NONE` does not fire for Shift+key.
    pub modifiers: Modifiers,
    pub handler: KeyHandler,
}

impl std::fmt::Debug for KeyBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyBinding")
            .field("key", &self.key)
            .field("modifiers", &self.modifiers)
            .finish_non_exhaustive()
    }
}

/// Ordered key overrides handed to the engine at construction.
#[derive(Clone, Debug, Default)]
pub struct Keymap {
    bindings: Vec<KeyBinding>,
}

impl Keymap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(
        mut self,
        key: Key,
        modifiers: Modifiers,
        handler: impl Fn(&mut dyn EditorOps) -> Propagation + 'static,
    ) -> Self {
        self.bindings.push(KeyBinding {
            key,
            modifiers,
            handler: Rc::new(handler),
        });
        self
    }

    /// First binding matching the event, cloned so the caller can run it
    /// while holding `&mut` to the engine that owns this keymap.
    pub fn lookup(&self, event: &KeyEvent) -> Option<KeyHandler> {
        self.bindings
            .iter()
            .find(|binding| binding.key == event.key && binding.modifiers == event.modifiers)
            .map(|binding| Rc::clone(&binding.handler))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Flag set by the Enter binding and drained by the composer once the engine
/// has returned from key dispatch.
#[derive(Clone, Debug, Default)]
pub struct SubmitRequest {
    requested: Rc<Cell<bool>>,
}

impl SubmitRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.requested.set(true);
    }

    pub fn take(&self) -> bool {
        self.requested.replace(false)
    }
}

/// The Enter / Shift+Enter overrides installed on every engine.
pub fn intent_bindings(submit: SubmitRequest) -> Keymap {
    Keymap::new()
        .bind(Key::Enter, Modifiers::NONE, move |_editor| {
            submit.request();
            Propagation::Stop
        })
        .bind(Key::Enter, Modifiers::SHIFT, |editor| {
            let index = editor.selection().map_or(0, |selection| selection.index);
            editor.insert_text(index, "\n");
            Propagation::Stop
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeEngine;
    use pretty_assertions::assert_eq;

    #[test]
    fn modifier_sets_compare_exactly() {
        let chord = Modifiers::SHIFT | Modifiers::ALT;
        assert!(chord.contains(Modifiers::SHIFT));
        assert!(!chord.contains(Modifiers::CONTROL));
        assert_ne!(chord, Modifiers::SHIFT);
        assert!(Modifiers::NONE.is_empty());
        assert_eq!(KeyEvent::plain(Key::Tab).modifiers, Modifiers::NONE);
    }

    #[test]
    fn classify_covers_enter_chords() {
        assert_eq!(
            Intent::classify(&KeyEvent::plain(Key::Enter)),
            Intent::Submit
        );
        assert_eq!(
            Intent::classify(&KeyEvent::new(Key::Enter, Modifiers::SHIFT)),
            Intent::InsertNewline
        );
        assert_eq!(
            Intent::classify(&KeyEvent::new(Key::Enter, Modifiers::CONTROL)),
            Intent::Edit
        );
        assert_eq!(
            Intent::classify(&KeyEvent::new(
                Key::Enter,
                Modifiers::SHIFT | Modifiers::ALT
            )),
            Intent::Edit
        );
        assert_eq!(
            Intent::classify(&KeyEvent::plain(Key::Char('a'))),
            Intent::Edit
        );
    }

    #[test]
    fn lookup_matches_modifiers_exactly() {
        let keymap = intent_bindings(SubmitRequest::new());
        assert_eq!(keymap.len(), 2);
        assert!(keymap.lookup(&KeyEvent::plain(Key::Enter)).is_some());
        assert!(
            keymap
                .lookup(&KeyEvent::new(Key::Enter, Modifiers::SHIFT))
                .is_some()
        );
        assert!(
            keymap
                .lookup(&KeyEvent::new(Key::Enter, Modifiers::CONTROL))
                .is_none()
        );
        assert!(keymap.lookup(&KeyEvent::plain(Key::Char('x'))).is_none());
    }

    #[test]
    fn enter_requests_submit_without_touching_content() {
        let submit = SubmitRequest::new();
        let keymap = intent_bindings(submit.clone());
        let mut editor = FakeEngine::with_text("hello");

        let handler = keymap
            .lookup(&KeyEvent::plain(Key::Enter))
            .expect("enter binding");
        assert_eq!(handler(&mut editor), Propagation::Stop);

        assert!(submit.take());
        assert!(!submit.take(), "request is drained by take");
        assert_eq!(editor.text(), "hello");
    }

    #[test]
    fn shift_enter_inserts_one_newline_at_cursor() {
        let submit = SubmitRequest::new();
        let keymap = intent_bindings(submit.clone());
        let mut editor = FakeEngine::with_text("helloworld");
        editor.set_cursor(5);

        let handler = keymap
            .lookup(&KeyEvent::new(Key::Enter, Modifiers::SHIFT))
            .expect("shift+enter binding");
        assert_eq!(handler(&mut editor), Propagation::Stop);

        assert_eq!(editor.text(), "hello\nworld");
        assert!(!submit.take());
    }

    #[test]
    fn shift_enter_without_selection_inserts_at_start() {
        let keymap = intent_bindings(SubmitRequest::new());
        let mut editor = FakeEngine::with_text("abc");
        editor.clear_selection();

        let handler = keymap
            .lookup(&KeyEvent::new(Key::Enter, Modifiers::SHIFT))
            .expect("shift+enter binding");
        handler(&mut editor);

        assert_eq!(editor.text(), "\nabc");
    }
}
