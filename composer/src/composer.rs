//! The composer component: props in, view out, actions in between.
//!
//! # Render cycle
//!
//! Hosts call [`Composer::render`] on every pass with freshly built
//! [`ComposerProps`]. Each pass:
//!
//! 1. writes the volatile props into [`Latest`] cells,
//! 2. syncs the [`EditorLifecycle`] (which creates or recreates the engine
//!    only when needed), and
//! 3. returns a [`ComposerView`] derived from the view state.
//!
//! # Actions
//!
//! Submit and cancel read callbacks and the disabled flag from the `Latest`
//! cells, so they see the most recent render even though the engine and its
//! key bindings were created with an older snapshot. Enter reaches submit by
//! way of a [`SubmitRequest`] raised inside the engine's keymap and drained
//! here once the engine has finished handling the key.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;
use tracing::warn;

use crate::delta::Attachment;
use crate::delta::InitialContent;
use crate::dom::HIDDEN_CLASS;
use crate::dom::Node;
use crate::engine::EditorEngine;
use crate::engine::EditorOps;
use crate::engine::EngineFactory;
use crate::handle::EditorHandle;
use crate::handle::HandleSlot;
use crate::keymap::Intent;
use crate::keymap::KeyEvent;
use crate::keymap::SubmitRequest;
use crate::keymap::intent_bindings;
use crate::latest::Latest;
use crate::lifecycle::EditorLifecycle;
use crate::lifecycle::EditorSetup;
use crate::view_state::ComposerViewState;

pub const DEFAULT_PLACEHOLDER: &str = "Write something...";

const HIDE_FORMATTING: &str = "Hide formatting";
const SHOW_FORMATTING: &str = "Show formatting";

pub type SubmitCallback = Rc<dyn Fn(SubmitValue)>;
pub type CancelCallback = Rc<dyn Fn()>;

/// What the composer hands to the submit callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitValue {
    pub text: String,
    pub attachment: Option<Attachment>,
}

/// Which flavor of composer is rendered.
#[derive(Clone, Default)]
pub enum ComposerMode {
    /// Writing a new message.
    #[default]
    Create,
    /// Editing an existing message; carries the cancel callback.
    Update { on_cancel: CancelCallback },
}

impl ComposerMode {
    pub fn update(on_cancel: impl Fn() + 'static) -> Self {
        ComposerMode::Update {
            on_cancel: Rc::new(on_cancel),
        }
    }
}

impl std::fmt::Debug for ComposerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComposerMode::Create => f.write_str("Create"),
            ComposerMode::Update { .. } => f.write_str("Update"),
        }
    }
}

pub struct ComposerProps<E> {
    pub placeholder: String,
    /// Only read when an engine is created.
    pub initial_content: InitialContent,
    pub disabled: bool,
    pub mode: ComposerMode,
    pub on_submit: SubmitCallback,
    pub handle_slot: Option<HandleSlot<E>>,
}

impl<E> ComposerProps<E> {
    pub fn new(on_submit: impl Fn(SubmitValue) + 'static) -> Self {
        Self {
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            initial_content: InitialContent::default(),
            disabled: false,
            mode: ComposerMode::Create,
            on_submit: Rc::new(on_submit),
            handle_slot: None,
        }
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn initial_content(mut self, content: impl Into<InitialContent>) -> Self {
        self.initial_content = content.into();
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn mode(mut self, mode: ComposerMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn handle_slot(mut self, slot: HandleSlot<E>) -> Self {
        self.handle_slot = Some(slot);
        self
    }
}

/// Enabled flags for the buttons each mode renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComposerActions {
    Create {
        toggle_toolbar: bool,
        emoji: bool,
        attach: bool,
        send: bool,
    },
    Update {
        toggle_toolbar: bool,
        emoji: bool,
        cancel: bool,
        save: bool,
    },
}

impl ComposerActions {
    pub fn can_submit(&self) -> bool {
        match *self {
            ComposerActions::Create { send, .. } => send,
            ComposerActions::Update { save, .. } => save,
        }
    }

    pub fn can_cancel(&self) -> bool {
        match *self {
            ComposerActions::Create { .. } => false,
            ComposerActions::Update { cancel, .. } => cancel,
        }
    }

    pub fn can_toggle_toolbar(&self) -> bool {
        match *self {
            ComposerActions::Create { toggle_toolbar, .. }
            | ComposerActions::Update { toggle_toolbar, .. } => toggle_toolbar,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComposerView {
    pub plain_text: String,
    pub is_empty: bool,
    pub toolbar_visible: bool,
    pub toolbar_hint: &'static str,
    pub placeholder: String,
    pub actions: ComposerActions,
}

pub struct Composer<F: EngineFactory> {
    container: Node,
    lifecycle: EditorLifecycle<F>,
    view_state: Rc<RefCell<ComposerViewState>>,
    submit_request: SubmitRequest,
    on_submit: Latest<SubmitCallback>,
    placeholder: Latest<String>,
    initial_content: Latest<InitialContent>,
    disabled: Latest<bool>,
    mode: Latest<ComposerMode>,
}

impl<F: EngineFactory> Composer<F> {
    pub fn new(factory: F) -> Self {
        let noop: SubmitCallback = Rc::new(|_| {});
        Self {
            container: Node::element("div"),
            lifecycle: EditorLifecycle::new(factory),
            view_state: Rc::new(RefCell::new(ComposerViewState::default())),
            submit_request: SubmitRequest::new(),
            on_submit: Latest::new(noop),
            placeholder: Latest::new(DEFAULT_PLACEHOLDER.to_string()),
            initial_content: Latest::default(),
            disabled: Latest::new(false),
            mode: Latest::default(),
        }
    }

    /// The node the host must attach to its document before the engine can
    /// be created.
    pub fn container(&self) -> &Node {
        &self.container
    }

    pub fn render(&mut self, props: ComposerProps<F::Engine>) -> ComposerView {
        let ComposerProps {
            placeholder,
            initial_content,
            disabled,
            mode,
            on_submit,
            handle_slot,
        } = props;

        self.on_submit.set(on_submit);
        self.placeholder.set(placeholder);
        self.initial_content.set(initial_content);
        self.disabled.set(disabled);
        self.mode.set(mode);

        let created = self
            .lifecycle
            .sync(&self.container, handle_slot.as_ref(), || EditorSetup {
                placeholder: self.placeholder.get(),
                content: self.initial_content.with(InitialContent::to_delta),
                keymap: intent_bindings(self.submit_request.clone()),
                view_state: Rc::clone(&self.view_state),
            });
        if created {
            self.apply_toolbar_visibility();
        }

        self.view()
    }

    /// The view as of the last render plus any engine changes since.
    pub fn view(&self) -> ComposerView {
        let state = self.view_state.borrow();
        let disabled = self.disabled.get();
        let is_empty = state.is_empty();
        let enabled = !disabled;
        let can_submit = enabled && !is_empty;
        let actions = match &*self.mode.borrow() {
            ComposerMode::Create => ComposerActions::Create {
                toggle_toolbar: enabled,
                emoji: enabled,
                attach: enabled,
                send: can_submit,
            },
            ComposerMode::Update { .. } => ComposerActions::Update {
                toggle_toolbar: enabled,
                emoji: enabled,
                cancel: true,
                save: can_submit,
            },
        };
        ComposerView {
            plain_text: state.plain_text().to_string(),
            is_empty,
            toolbar_visible: state.toolbar_visible(),
            toolbar_hint: if state.toolbar_visible() {
                HIDE_FORMATTING
            } else {
                SHOW_FORMATTING
            },
            placeholder: self.placeholder.get(),
            actions,
        }
    }

    /// Routes a key press through the engine and runs submit when the Enter
    /// override asked for it.
    pub fn handle_key(&mut self, event: KeyEvent) -> Intent {
        let intent = Intent::classify(&event);
        let Some(engine) = self.lifecycle.engine().map(Rc::clone) else {
            return intent;
        };
        match engine.try_borrow_mut() {
            Ok(mut engine) => engine.handle_key(event),
            Err(_) => {
                warn!("editor busy; dropping key event");
                return intent;
            }
        }
        if self.submit_request.take() {
            self.submit();
        }
        intent
    }

    /// Invokes the latest submit callback with the current text. No-op while
    /// disabled or empty. Content is left in place for the caller to reset.
    pub fn submit(&mut self) -> bool {
        if self.disabled.get() {
            debug!("submit ignored: composer disabled");
            return false;
        }
        if self.view_state.borrow().is_empty() {
            debug!("submit ignored: composer empty");
            return false;
        }
        let Some(text) = self.with_engine(EditorOps::plain_text) else {
            return false;
        };
        let on_submit = self.on_submit.get();
        on_submit(SubmitValue {
            text,
            attachment: None,
        });
        true
    }

    /// Invokes the latest cancel callback. Only update mode has one.
    pub fn cancel(&mut self) -> bool {
        let on_cancel = match &*self.mode.borrow() {
            ComposerMode::Update { on_cancel } => Rc::clone(on_cancel),
            ComposerMode::Create => return false,
        };
        on_cancel();
        true
    }

    /// Shows or hides the engine's formatting toolbar. Ignored while
    /// disabled.
    pub fn toggle_toolbar(&mut self) -> bool {
        if self.disabled.get() {
            return false;
        }
        self.view_state.borrow_mut().toggle_toolbar();
        self.apply_toolbar_visibility();
        true
    }

    fn apply_toolbar_visibility(&self) {
        let visible = self.view_state.borrow().toolbar_visible();
        let Some(toolbar) = self.with_engine(EditorEngine::toolbar).flatten() else {
            return;
        };
        if visible {
            toolbar.remove_class(HIDDEN_CLASS);
        } else {
            toolbar.add_class(HIDDEN_CLASS);
        }
    }

    /// Read-only access to the live engine, for hosts that draw it.
    pub fn with_engine<R>(&self, f: impl FnOnce(&F::Engine) -> R) -> Option<R> {
        let engine = self.lifecycle.engine()?;
        let engine = engine.try_borrow().ok()?;
        Some(f(&engine))
    }

    /// Internal handle, available whether or not the caller supplied a slot.
    pub fn handle(&self) -> Option<EditorHandle<F::Engine>> {
        self.lifecycle.handle()
    }

    pub fn is_mounted(&self) -> bool {
        self.lifecycle.is_live()
    }

    pub fn instances_created(&self) -> usize {
        self.lifecycle.instances_created()
    }

    /// Tears the engine down. Rendering again recreates it.
    pub fn unmount(&mut self) {
        self.lifecycle.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta::Delta;
    use crate::delta::Op;
    use crate::keymap::Key;
    use crate::keymap::Modifiers;
    use crate::test_support::FakeEngine;
    use crate::test_support::FakeFactory;
    use crate::test_support::Probe;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    struct Harness {
        _document: Node,
        composer: Composer<FakeFactory>,
        probe: Rc<RefCell<Probe>>,
        submitted: Rc<RefCell<Vec<SubmitValue>>>,
    }

    impl Harness {
        fn new() -> Self {
            let factory = FakeFactory::new();
            let probe = Rc::clone(&factory.probe);
            let composer = Composer::new(factory);
            let document = Node::document();
            document.append_child(composer.container());
            Self {
                _document: document,
                composer,
                probe,
                submitted: Rc::default(),
            }
        }

        fn props(&self) -> ComposerProps<FakeEngine> {
            let submitted = Rc::clone(&self.submitted);
            ComposerProps::new(move |value| submitted.borrow_mut().push(value))
        }

        fn type_text(&mut self, text: &str) {
            for ch in text.chars() {
                self.composer.handle_key(KeyEvent::plain(Key::Char(ch)));
            }
        }
    }

    #[test]
    fn rerenders_with_new_props_keep_one_engine() {
        let mut h = Harness::new();
        let slot = HandleSlot::new();

        for round in 0..5 {
            let props = h
                .props()
                .placeholder(format!("placeholder {round}"))
                .disabled(round % 2 == 0)
                .handle_slot(slot.clone());
            h.composer.render(props);
        }

        assert_eq!(h.composer.instances_created(), 1);
        assert_eq!(h.probe.borrow().constructed, 1);
        assert_eq!(h.probe.borrow().destroyed, 0);
        assert_eq!(
            h.probe.borrow().placeholders,
            vec!["placeholder 0".to_string()]
        );
        assert_eq!(h.composer.view().placeholder, "placeholder 4");
    }

    #[test]
    fn new_slot_identity_recreates_engine() {
        let mut h = Harness::new();
        let first = HandleSlot::new();
        let second = HandleSlot::new();

        h.composer.render(h.props().handle_slot(first.clone()));
        h.composer.render(h.props().handle_slot(first.clone()));
        h.composer.render(h.props().handle_slot(second.clone()));

        assert_eq!(h.composer.instances_created(), 2);
        assert_eq!(h.probe.borrow().destroyed, 1);
        assert!(first.is_empty());
        assert!(!second.is_empty());
    }

    #[test]
    fn typing_updates_text_and_emptiness() {
        let mut h = Harness::new();
        let view = h.composer.render(h.props().initial_content(Vec::<Op>::new()));
        assert!(view.is_empty);

        h.type_text("hello");
        let view = h.composer.view();
        assert_eq!(view.plain_text, "hello");
        assert!(!view.is_empty);

        for _ in 0..5 {
            h.composer.handle_key(KeyEvent::plain(Key::Backspace));
        }
        assert!(h.composer.view().is_empty);
    }

    #[test]
    fn initial_content_seeds_view() {
        let mut h = Harness::new();
        let view = h
            .composer
            .render(h.props().initial_content(Delta::from_text("draft")));
        assert_eq!(view.plain_text, "draft");
        assert!(!view.is_empty);
    }

    #[test]
    fn enter_submits_once_without_inserting_newline() {
        let mut h = Harness::new();
        h.composer.render(h.props());
        h.type_text("hi");

        let intent = h.composer.handle_key(KeyEvent::plain(Key::Enter));

        assert_eq!(intent, Intent::Submit);
        assert_eq!(
            *h.submitted.borrow(),
            vec![SubmitValue {
                text: "hi".to_string(),
                attachment: None,
            }]
        );
        assert_eq!(h.composer.view().plain_text, "hi");
    }

    #[test]
    fn shift_enter_inserts_newline_and_never_submits() {
        let mut h = Harness::new();
        h.composer.render(h.props());
        h.type_text("ab");
        h.composer.handle_key(KeyEvent::plain(Key::Backspace));
        h.type_text("b");
        let handle = h.composer.handle().expect("live");
        let before = handle.selection().expect("caret").index;

        let intent = h
            .composer
            .handle_key(KeyEvent::new(Key::Enter, Modifiers::SHIFT));

        assert_eq!(intent, Intent::InsertNewline);
        assert_eq!(h.composer.view().plain_text, "ab\n");
        assert_eq!(before, 2);
        assert!(h.submitted.borrow().is_empty());
    }

    #[test]
    fn enter_on_empty_composer_does_nothing() {
        let mut h = Harness::new();
        h.composer.render(h.props());
        h.type_text("   ");

        h.composer.handle_key(KeyEvent::plain(Key::Enter));

        assert!(h.submitted.borrow().is_empty());
        assert_eq!(h.composer.view().plain_text, "   ");
    }

    #[test]
    fn submit_is_noop_while_disabled() {
        let mut h = Harness::new();
        h.composer.render(
            h.props()
                .disabled(true)
                .initial_content(Delta::from_text("ready")),
        );

        assert!(!h.composer.submit());
        h.composer.handle_key(KeyEvent::plain(Key::Enter));
        assert!(h.submitted.borrow().is_empty());

        h.composer.render(h.props().disabled(false));
        assert!(h.composer.submit());
        assert_eq!(h.submitted.borrow().len(), 1);
    }

    #[test]
    fn submit_uses_latest_callback() {
        let mut h = Harness::new();
        let first_calls = Rc::new(Cell::new(0));
        let second_calls = Rc::new(Cell::new(0));
        {
            let first_calls = Rc::clone(&first_calls);
            h.composer.render(
                ComposerProps::new(move |_| first_calls.set(first_calls.get() + 1))
                    .initial_content(Delta::from_text("x")),
            );
        }
        {
            let second_calls = Rc::clone(&second_calls);
            h.composer.render(ComposerProps::new(move |_| {
                second_calls.set(second_calls.get() + 1)
            }));
        }

        h.composer.handle_key(KeyEvent::plain(Key::Enter));

        assert_eq!(first_calls.get(), 0);
        assert_eq!(second_calls.get(), 1);
        assert_eq!(h.composer.instances_created(), 1);
    }

    #[test]
    fn submit_callback_may_reset_content_through_slot() {
        let mut h = Harness::new();
        let slot: HandleSlot<FakeEngine> = HandleSlot::new();
        let reset_slot = slot.clone();
        let props = ComposerProps::new(move |_| {
            if let Some(handle) = reset_slot.get() {
                handle.set_content(&Delta::default());
            }
        })
        .handle_slot(slot.clone());
        h.composer.render(props);
        h.type_text("bye");

        h.composer.handle_key(KeyEvent::plain(Key::Enter));

        assert!(h.composer.view().is_empty);
    }

    #[test]
    fn update_mode_disabled_keeps_cancel_enabled() {
        let mut h = Harness::new();
        let cancelled = Rc::new(Cell::new(false));
        let flag = Rc::clone(&cancelled);
        let view = h.composer.render(
            h.props()
                .mode(ComposerMode::update(move || flag.set(true)))
                .disabled(true)
                .initial_content(Delta::from_text("edit me")),
        );

        assert_eq!(
            view.actions,
            ComposerActions::Update {
                toggle_toolbar: false,
                emoji: false,
                cancel: true,
                save: false,
            }
        );
        assert!(!h.composer.submit());
        assert!(h.composer.cancel());
        assert!(cancelled.get());
    }

    #[test]
    fn cancel_in_create_mode_is_noop() {
        let mut h = Harness::new();
        let view = h.composer.render(h.props());
        assert!(!view.actions.can_cancel());
        assert!(!h.composer.cancel());
    }

    #[test]
    fn mode_switch_keeps_engine() {
        let mut h = Harness::new();
        h.composer.render(h.props());
        h.type_text("keep");
        let view = h.composer.render(h.props().mode(ComposerMode::update(|| {})));

        assert_eq!(h.composer.instances_created(), 1);
        assert_eq!(view.plain_text, "keep");
        assert!(view.actions.can_submit());
    }

    #[test]
    fn toggle_toolbar_flips_state_and_scoped_node() {
        let mut h = Harness::new();
        let view = h.composer.render(h.props());
        assert!(view.toolbar_visible);
        assert_eq!(view.toolbar_hint, "Hide formatting");
        let toolbar = h
            .composer
            .with_engine(EditorEngine::toolbar)
            .flatten()
            .expect("toolbar node");

        assert!(h.composer.toggle_toolbar());
        let view = h.composer.view();
        assert!(!view.toolbar_visible);
        assert_eq!(view.toolbar_hint, "Show formatting");
        assert!(toolbar.is_hidden());

        h.composer.toggle_toolbar();
        assert!(!toolbar.is_hidden());
        assert_eq!(h.composer.view().plain_text, "");
    }

    #[test]
    fn toolbar_state_carries_over_to_recreated_engine() {
        let mut h = Harness::new();
        h.composer.render(h.props().handle_slot(HandleSlot::new()));
        h.composer.toggle_toolbar();

        h.composer.render(h.props().handle_slot(HandleSlot::new()));

        let toolbar = h
            .composer
            .with_engine(EditorEngine::toolbar)
            .flatten()
            .expect("toolbar node");
        assert!(toolbar.is_hidden());
    }

    #[test]
    fn two_composers_toggle_independently() {
        let mut a = Harness::new();
        let mut b = Harness::new();
        a.composer.render(a.props());
        b.composer.render(b.props());

        a.composer.toggle_toolbar();

        let toolbar_b = b
            .composer
            .with_engine(EditorEngine::toolbar)
            .flatten()
            .expect("toolbar node");
        assert!(!toolbar_b.is_hidden());
    }

    #[test]
    fn unmount_removes_listeners_and_empties_slot() {
        let mut h = Harness::new();
        let slot = HandleSlot::new();
        h.composer.render(h.props().handle_slot(slot.clone()));
        assert_eq!(h.probe.borrow().listeners, 1);

        h.composer.unmount();

        assert_eq!(h.probe.borrow().listeners, 0);
        assert!(slot.is_empty());
        assert_eq!(h.composer.container().child_count(), 0);
        assert!(!h.composer.is_mounted());
    }

    #[test]
    fn dropping_composer_tears_down() {
        let h = Harness::new();
        let probe = Rc::clone(&h.probe);
        let slot = HandleSlot::new();
        let Harness {
            _document,
            mut composer,
            ..
        } = h;
        composer.render(ComposerProps::new(|_| {}).handle_slot(slot.clone()));
        drop(composer);

        assert_eq!(probe.borrow().destroyed, 1);
        assert_eq!(probe.borrow().listeners, 0);
        assert!(slot.is_empty());
    }

    #[test]
    fn detached_composer_defers_engine() {
        let factory = FakeFactory::new();
        let mut composer = Composer::new(factory);
        let view = composer.render(ComposerProps::new(|_| {}));

        assert!(!composer.is_mounted());
        assert!(view.is_empty);
        assert!(!composer.submit());

        let document = Node::document();
        document.append_child(composer.container());
        composer.render(ComposerProps::new(|_| {}));
        assert!(composer.is_mounted());
    }
}
