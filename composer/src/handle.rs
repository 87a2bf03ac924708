use std::cell::RefCell;
use std::rc::Rc;
use std::rc::Weak;

use crate::delta::Delta;
use crate::engine::EditorEngine;
use crate::engine::EditorOps;
use crate::engine::Selection;

/// Non-owning reference to a live engine.
///
/// Only the lifecycle controller can destroy the engine; a handle exposes
/// [`EditorOps`] and quietly does nothing once the engine is gone.
pub struct EditorHandle<E> {
    engine: Weak<RefCell<E>>,
}

impl<E: EditorEngine> EditorHandle<E> {
    pub(crate) fn new(engine: &Rc<RefCell<E>>) -> Self {
        Self {
            engine: Rc::downgrade(engine),
        }
    }

    /// Runs `f` against the engine. Returns `None` if the engine has been
    /// torn down or is already borrowed further up the stack.
    pub fn with<R>(&self, f: impl FnOnce(&mut dyn EditorOps) -> R) -> Option<R> {
        let engine = self.engine.upgrade()?;
        let mut engine = engine.try_borrow_mut().ok()?;
        Some(f(&mut *engine))
    }

    pub fn is_alive(&self) -> bool {
        self.engine.strong_count() > 0
    }

    pub fn set_content(&self, content: &Delta) -> bool {
        self.with(|editor| editor.set_content(content)).is_some()
    }

    pub fn plain_text(&self) -> Option<String> {
        self.with(|editor| editor.plain_text())
    }

    pub fn focus(&self) -> bool {
        self.with(|editor| editor.focus()).is_some()
    }

    pub fn insert_text(&self, index: usize, text: &str) -> bool {
        self.with(|editor| editor.insert_text(index, text)).is_some()
    }

    /// Inserts at the current selection, or at the start when there is none.
    pub fn insert_at_cursor(&self, text: &str) -> bool {
        self.with(|editor| {
            let index = editor.selection().map_or(0, |selection| selection.index);
            editor.insert_text(index, text);
        })
        .is_some()
    }

    pub fn selection(&self) -> Option<Selection> {
        self.with(|editor| editor.selection()).flatten()
    }

    pub(crate) fn points_to(&self, engine: &Rc<RefCell<E>>) -> bool {
        std::ptr::eq(self.engine.as_ptr(), Rc::as_ptr(engine))
    }
}

impl<E> Clone for EditorHandle<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Weak::clone(&self.engine),
        }
    }
}

impl<E> std::fmt::Debug for EditorHandle<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorHandle")
            .field("alive", &(self.engine.strong_count() > 0))
            .finish()
    }
}

/// Caller-owned slot the composer publishes its live handle into.
///
/// The slot's identity (not its contents) is the composer's identity: handing
/// the composer a different slot tears the old engine down and creates a new
/// one. Clones share identity.
pub struct HandleSlot<E> {
    slot: Rc<RefCell<Option<EditorHandle<E>>>>,
}

impl<E> HandleSlot<E> {
    pub fn new() -> Self {
        Self {
            slot: Rc::new(RefCell::new(None)),
        }
    }

    pub fn get(&self) -> Option<EditorHandle<E>> {
        self.slot.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.borrow().is_none()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.slot, &other.slot)
    }

    pub(crate) fn publish(&self, handle: EditorHandle<E>) {
        *self.slot.borrow_mut() = Some(handle);
    }

    pub(crate) fn clear(&self) {
        self.slot.borrow_mut().take();
    }

    /// Compares optional slots by identity; two absent slots are the same.
    pub(crate) fn same_identity(a: Option<&Self>, b: Option<&Self>) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl<E> Default for HandleSlot<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for HandleSlot<E> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<E> std::fmt::Debug for HandleSlot<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandleSlot")
            .field("filled", &self.slot.borrow().is_some())
            .finish()
    }
}
