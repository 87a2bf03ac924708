//! Creation and teardown of the engine behind a composer.
//!
//! The controller keeps at most one engine alive. It builds one the first
//! time it is synced against a connected container, and rebuilds only when
//! the caller hands it a handle slot with a different identity. Option
//! changes (placeholder, content, disabled) never reach this module; they are
//! read live from [`crate::Latest`] cells by the composer.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;
use tracing::error;
use tracing::warn;

use crate::delta::Delta;
use crate::dom::Node;
use crate::engine::EditorEngine;
use crate::engine::EditorOps;
use crate::engine::EngineFactory;
use crate::engine::EngineOptions;
use crate::engine::ListenerId;
use crate::handle::EditorHandle;
use crate::handle::HandleSlot;
use crate::keymap::Keymap;
use crate::view_state::ComposerViewState;

/// Snapshot of the values an engine is created with.
pub struct EditorSetup {
    pub placeholder: String,
    pub content: Delta,
    pub keymap: Keymap,
    pub view_state: Rc<RefCell<ComposerViewState>>,
}

pub struct EditorLifecycle<F: EngineFactory> {
    factory: F,
    live: Option<LiveEditor<F::Engine>>,
    instances_created: usize,
}

struct LiveEditor<E> {
    engine: Rc<RefCell<E>>,
    listener: ListenerId,
    container: Node,
    /// The slot this instance was created for; its identity decides reuse.
    slot: Option<HandleSlot<E>>,
}

impl<F: EngineFactory> EditorLifecycle<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            live: None,
            instances_created: 0,
        }
    }

    /// Brings the controller in line with the current container and slot.
    ///
    /// Returns true when a new engine was created. `setup` is only evaluated
    /// when creating.
    pub fn sync(
        &mut self,
        container: &Node,
        slot: Option<&HandleSlot<F::Engine>>,
        setup: impl FnOnce() -> EditorSetup,
    ) -> bool {
        if let Some(live) = &self.live {
            if HandleSlot::same_identity(live.slot.as_ref(), slot) {
                return false;
            }
            debug!("handle slot changed; recreating editor");
            self.teardown();
        }

        if !container.is_connected() {
            debug!("editor container not attached yet; deferring creation");
            return false;
        }

        self.create(container, slot, setup())
    }

    fn create(
        &mut self,
        container: &Node,
        slot: Option<&HandleSlot<F::Engine>>,
        setup: EditorSetup,
    ) -> bool {
        let EditorSetup {
            placeholder,
            content,
            keymap,
            view_state,
        } = setup;

        let editor_node = container.append_child(&Node::element("div"));
        let engine = match self
            .factory
            .construct(&editor_node, EngineOptions::new(placeholder, keymap))
        {
            Ok(engine) => engine,
            Err(err) => {
                error!("failed to create editor: {err}");
                container.remove_children();
                return false;
            }
        };
        let engine = Rc::new(RefCell::new(engine));

        let listener = {
            let mut editor = engine.borrow_mut();
            editor.focus();
            editor.set_content(&content);
            view_state.borrow_mut().set_plain_text(&editor.plain_text());
            let view_state = Rc::clone(&view_state);
            editor.on_change(Rc::new(move |text: &str| {
                view_state.borrow_mut().set_plain_text(text);
            }))
        };

        if let Some(slot) = slot {
            slot.publish(EditorHandle::new(&engine));
        }

        self.instances_created += 1;
        debug!(instance = self.instances_created, "editor created");
        self.live = Some(LiveEditor {
            engine,
            listener,
            container: container.clone(),
            slot: slot.cloned(),
        });
        true
    }

    /// Unsubscribes, destroys the engine, clears the container and empties
    /// the caller's slot. Safe to call when nothing is live.
    pub fn teardown(&mut self) {
        let Some(live) = self.live.take() else {
            return;
        };

        match live.engine.try_borrow_mut() {
            Ok(mut engine) => {
                engine.off_change(live.listener);
                engine.destroy();
            }
            Err(_) => warn!("editor busy during teardown; skipping engine cleanup"),
        }
        live.container.remove_children();

        if let Some(slot) = &live.slot
            && slot
                .get()
                .is_some_and(|handle| handle.points_to(&live.engine))
        {
            slot.clear();
        }
        debug!("editor torn down");
    }

    pub fn engine(&self) -> Option<&Rc<RefCell<F::Engine>>> {
        self.live.as_ref().map(|live| &live.engine)
    }

    pub fn handle(&self) -> Option<EditorHandle<F::Engine>> {
        self.engine().map(EditorHandle::new)
    }

    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }

    pub fn instances_created(&self) -> usize {
        self.instances_created
    }
}

impl<F: EngineFactory> Drop for EditorLifecycle<F> {
    fn drop(&mut self) {
        self.teardown();
    }
}
