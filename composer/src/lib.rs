//! Rich-text message composer that drives an opaque editing engine from a
//! declarative, frequently re-rendering host.
//!
//! A host owns a [`Composer`] and calls [`Composer::render`] with fresh
//! [`ComposerProps`] on every pass. The composer keeps exactly one engine
//! instance alive per composer identity (the identity of the caller's
//! [`HandleSlot`]), reads callbacks and options through [`Latest`] cells so
//! that configuration churn never recreates the engine, and routes Enter /
//! Shift+Enter to submit / literal newline through the engine's keymap.
//!
//! The engine itself is reached only through [`EditorOps`] and
//! [`EditorEngine`]; hosts provide an [`EngineFactory`] for their concrete
//! editor.

mod composer;
mod confirm;
mod delta;
pub mod dom;
mod engine;
mod handle;
mod keymap;
mod latest;
mod lifecycle;
mod view_state;

#[cfg(test)]
mod test_support;

pub use composer::CancelCallback;
pub use composer::Composer;
pub use composer::ComposerActions;
pub use composer::ComposerMode;
pub use composer::ComposerProps;
pub use composer::ComposerView;
pub use composer::DEFAULT_PLACEHOLDER;
pub use composer::SubmitCallback;
pub use composer::SubmitValue;
pub use confirm::Confirm;
pub use confirm::ConfirmDialog;
pub use confirm::ConfirmError;
pub use confirm::Confirmation;
pub use delta::Attachment;
pub use delta::Delta;
pub use delta::InitialContent;
pub use delta::Op;
pub use engine::ChangeListener;
pub use engine::ChangeListeners;
pub use engine::EditorEngine;
pub use engine::EditorOps;
pub use engine::EngineError;
pub use engine::EngineFactory;
pub use engine::EngineOptions;
pub use engine::ListenerId;
pub use engine::Selection;
pub use engine::Theme;
pub use engine::ToolbarItem;
pub use engine::default_toolbar;
pub use handle::EditorHandle;
pub use handle::HandleSlot;
pub use keymap::Intent;
pub use keymap::Key;
pub use keymap::KeyBinding;
pub use keymap::KeyEvent;
pub use keymap::KeyHandler;
pub use keymap::Keymap;
pub use keymap::Modifiers;
pub use keymap::Propagation;
pub use keymap::SubmitRequest;
pub use keymap::intent_bindings;
pub use latest::Latest;
pub use lifecycle::EditorLifecycle;
pub use lifecycle::EditorSetup;
pub use view_state::ComposerViewState;
pub use view_state::is_blank;
