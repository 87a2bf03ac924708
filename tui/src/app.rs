//! The chat screen: an in-memory message list, the main composer, an edit
//! composer for existing messages and the delete confirmation.
//!
//! Both composers are driven the same way a declarative host drives them:
//! fresh props on every pass through [`App::handle_event`]. The main composer
//! keeps one engine for the life of the app. The edit composer gets a new
//! [`HandleSlot`] for every message it edits, which is what makes it rebuild
//! its engine with that message's text.

use crossterm::event::Event;
use crossterm::event::EventStream;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use huddle_composer::Composer;
use huddle_composer::ComposerMode;
use huddle_composer::ComposerProps;
use huddle_composer::Confirm;
use huddle_composer::Confirmation;
use huddle_composer::Delta;
use huddle_composer::EditorHandle;
use huddle_composer::HandleSlot;
use huddle_composer::SubmitValue;
use huddle_composer::dom::Node;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Constraint;
use ratatui::layout::Layout;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Widget;
use tokio::select;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_stream::StreamExt;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::app_event::AppEvent;
use crate::app_event_sender::AppEventSender;
use crate::composer_widget::ComposerWidget;
use crate::composer_widget::EditorSnapshot;
use crate::config::Config;
use crate::confirm_dialog::ConfirmDialogWidget;
use crate::confirm_dialog::choice_for_key;
use crate::key::to_composer_key;
use crate::render::Renderable;
use crate::text_engine::TextAreaEngine;
use crate::text_engine::TextAreaFactory;
use crate::tui::Terminal;

pub(crate) type MessageId = u64;

const MESSAGE_NOT_FOUND: &str = "Message not found";
const EDIT_PLACEHOLDER: &str = "Edit message";
const EDIT_TITLE: &str = "Editing message";
const DELETE_TITLE: &str = "Delete message";
const DELETE_PROMPT: &str = "Are you sure you want to delete this message?";
const READ_ONLY: &str = "Read-only session";

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Message {
    pub(crate) id: MessageId,
    pub(crate) author: String,
    pub(crate) text: String,
}

struct EditTarget {
    message_id: MessageId,
    slot: HandleSlot<TextAreaEngine>,
}

struct PendingDelete {
    message_id: MessageId,
    confirmation: Confirmation,
}

pub(crate) struct App {
    document: Node,
    messages: Vec<Message>,
    next_id: MessageId,
    selected: Option<usize>,

    display_name: String,
    placeholder: String,
    read_only: bool,
    confirm_delete: bool,

    main: Composer<TextAreaFactory>,
    main_slot: HandleSlot<TextAreaEngine>,
    edit: Composer<TextAreaFactory>,
    editing: Option<EditTarget>,

    confirm: Confirm,
    pending_delete: Option<PendingDelete>,
    notice: Option<String>,

    app_event_tx: AppEventSender,
    exit: bool,
}

impl App {
    pub(crate) fn new(config: &Config, app_event_tx: AppEventSender) -> Self {
        let document = Node::document();
        let main = Composer::new(TextAreaFactory);
        document.append_child(main.container());

        let mut app = Self {
            document,
            messages: Vec::new(),
            next_id: 1,
            selected: None,
            display_name: config.display_name.clone(),
            placeholder: config.placeholder.clone(),
            read_only: config.read_only,
            confirm_delete: config.confirm_delete,
            main,
            main_slot: HandleSlot::new(),
            edit: Composer::new(TextAreaFactory),
            editing: None,
            confirm: Confirm::new(DELETE_TITLE, DELETE_PROMPT),
            pending_delete: None,
            notice: None,
            app_event_tx,
            exit: false,
        };
        app.render_composers();
        app
    }

    pub(crate) async fn run(
        &mut self,
        terminal: &mut Terminal,
        app_event_rx: &mut UnboundedReceiver<AppEvent>,
    ) -> color_eyre::Result<()> {
        let mut tui_events = EventStream::new();
        terminal.draw(|frame| self.draw(frame))?;
        while !self.should_exit() {
            select! {
                Some(event) = app_event_rx.recv() => self.handle_event(event),
                event = tui_events.next() => match event {
                    Some(Ok(event)) => self.handle_tui_event(event),
                    Some(Err(err)) => {
                        error!("failed to read terminal event: {err}");
                        self.exit = true;
                    }
                    None => self.exit = true,
                },
            }
            if !self.should_exit() {
                terminal.draw(|frame| self.draw(frame))?;
            }
        }
        Ok(())
    }

    pub(crate) fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::SubmitMessage(value) => self.post_message(value),
            AppEvent::SaveEdit { message_id, value } => self.save_edit(message_id, value),
            AppEvent::CancelEdit => self.end_edit(),
        }
        self.render_composers();
    }

    pub(crate) fn handle_tui_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key_event(key),
            Event::Paste(text) => self.handle_paste(&text),
            _ => {}
        }
        self.render_composers();
    }

    pub(crate) fn should_exit(&self) -> bool {
        self.exit
    }

    fn main_props(&self) -> ComposerProps<TextAreaEngine> {
        let tx = self.app_event_tx.clone();
        ComposerProps::new(move |value| tx.send(AppEvent::SubmitMessage(value)))
            .placeholder(self.placeholder.clone())
            .disabled(self.read_only)
            .handle_slot(self.main_slot.clone())
    }

    fn edit_props(&self, target: &EditTarget) -> ComposerProps<TextAreaEngine> {
        let message_id = target.message_id;
        let save_tx = self.app_event_tx.clone();
        let cancel_tx = self.app_event_tx.clone();
        let text = self
            .message(message_id)
            .map(|message| message.text.clone())
            .unwrap_or_default();
        ComposerProps::new(move |value| save_tx.send(AppEvent::SaveEdit { message_id, value }))
            .placeholder(EDIT_PLACEHOLDER)
            .disabled(self.read_only)
            .initial_content(Delta::from_text(text))
            .mode(ComposerMode::update(move || {
                cancel_tx.send(AppEvent::CancelEdit);
            }))
            .handle_slot(target.slot.clone())
    }

    fn render_composers(&mut self) {
        let props = self.main_props();
        self.main.render(props);
        if let Some(target) = &self.editing {
            let props = self.edit_props(target);
            self.edit.render(props);
        }
    }

    fn active_composer(&mut self) -> &mut Composer<TextAreaFactory> {
        if self.editing.is_some() {
            &mut self.edit
        } else {
            &mut self.main
        }
    }

    fn active_handle(&self) -> Option<EditorHandle<TextAreaEngine>> {
        if self.editing.is_some() {
            self.edit.handle()
        } else {
            self.main.handle()
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        if self.confirm.is_open() {
            if let Some(answer) = choice_for_key(&key) {
                if answer {
                    self.confirm.handle_confirm();
                } else {
                    self.confirm.handle_cancel();
                }
                self.resolve_pending_delete();
            }
            return;
        }
        self.notice = None;

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => self.exit = true,
            KeyCode::Char('t') if ctrl => {
                self.active_composer().toggle_toolbar();
            }
            KeyCode::Char('e') if ctrl => self.start_edit(),
            KeyCode::Char('d') if ctrl => self.request_delete(),
            KeyCode::PageUp => self.move_selection(true),
            KeyCode::PageDown => self.move_selection(false),
            KeyCode::Esc if self.editing.is_some() => {
                self.edit.cancel();
            }
            _ => {
                if let Some(event) = to_composer_key(&key) {
                    self.active_composer().handle_key(event);
                }
            }
        }
    }

    fn handle_paste(&mut self, pasted: &str) {
        // Many terminals convert newlines to \r when pasting.
        let pasted = pasted.replace("\r\n", "\n").replace('\r', "\n");
        if let Some(handle) = self.active_handle() {
            handle.insert_at_cursor(&pasted);
        }
    }

    fn message(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|message| message.id == id)
    }

    fn selected_message_id(&self) -> Option<MessageId> {
        self.selected
            .and_then(|index| self.messages.get(index))
            .map(|message| message.id)
    }

    fn move_selection(&mut self, up: bool) {
        let Some(last) = self.messages.len().checked_sub(1) else {
            return;
        };
        let current = self.selected.unwrap_or(last);
        self.selected = Some(if up {
            current.saturating_sub(1)
        } else {
            (current + 1).min(last)
        });
    }

    fn post_message(&mut self, value: SubmitValue) {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(Message {
            id,
            author: self.display_name.clone(),
            text: value.text,
        });
        self.selected = Some(self.messages.len() - 1);
        if let Some(handle) = self.main_slot.get() {
            handle.set_content(&Delta::default());
        }
        info!(message_id = id, "message posted");
    }

    fn start_edit(&mut self) {
        let Some(message_id) = self.selected_message_id() else {
            self.notice = Some(MESSAGE_NOT_FOUND.to_string());
            return;
        };
        if self
            .editing
            .as_ref()
            .is_some_and(|target| target.message_id == message_id)
        {
            return;
        }
        self.document.append_child(self.edit.container());
        self.editing = Some(EditTarget {
            message_id,
            slot: HandleSlot::new(),
        });
        debug!(message_id, "editing message");
    }

    fn save_edit(&mut self, message_id: MessageId, value: SubmitValue) {
        match self
            .messages
            .iter_mut()
            .find(|message| message.id == message_id)
        {
            Some(message) => {
                message.text = value.text;
                info!(message_id, "message updated");
            }
            None => {
                warn!(message_id, "edited message no longer exists");
                self.notice = Some(MESSAGE_NOT_FOUND.to_string());
            }
        }
        if self
            .editing
            .as_ref()
            .is_some_and(|target| target.message_id == message_id)
        {
            self.end_edit();
        }
    }

    fn end_edit(&mut self) {
        if self.editing.take().is_some() {
            self.edit.unmount();
            self.document.remove_child(self.edit.container());
        }
    }

    fn request_delete(&mut self) {
        if self.read_only {
            self.notice = Some(READ_ONLY.to_string());
            return;
        }
        let Some(message_id) = self.selected_message_id() else {
            self.notice = Some(MESSAGE_NOT_FOUND.to_string());
            return;
        };
        if !self.confirm_delete {
            self.delete_message(message_id);
            return;
        }
        let confirmation = self.confirm.confirm();
        self.pending_delete = Some(PendingDelete {
            message_id,
            confirmation,
        });
    }

    fn resolve_pending_delete(&mut self) {
        let Some(mut pending) = self.pending_delete.take() else {
            return;
        };
        match pending.confirmation.try_outcome() {
            None => self.pending_delete = Some(pending),
            Some(Ok(true)) => self.delete_message(pending.message_id),
            Some(Ok(false)) => debug!(message_id = pending.message_id, "delete cancelled"),
            Some(Err(err)) => warn!(message_id = pending.message_id, "delete not confirmed: {err}"),
        }
    }

    fn delete_message(&mut self, message_id: MessageId) {
        let before = self.messages.len();
        self.messages.retain(|message| message.id != message_id);
        if self.messages.len() == before {
            self.notice = Some(MESSAGE_NOT_FOUND.to_string());
            return;
        }
        if self
            .editing
            .as_ref()
            .is_some_and(|target| target.message_id == message_id)
        {
            self.end_edit();
        }
        self.selected = self
            .messages
            .len()
            .checked_sub(1)
            .map(|last| self.selected.unwrap_or(last).min(last));
        info!(message_id, "message deleted");
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let main_view = self.main.view();
        let edit_view = self.editing.as_ref().map(|_| self.edit.view());
        let composer = match &edit_view {
            Some(view) => ComposerWidget::new(view, self.edit.with_engine(EditorSnapshot::capture))
                .title(EDIT_TITLE),
            None => ComposerWidget::new(&main_view, self.main.with_engine(EditorSnapshot::capture)),
        };

        let composer_height = composer.desired_height(area.width).min(area.height);
        let notice_height = u16::from(self.notice.is_some());
        let [messages_area, notice_area, composer_area] = Layout::vertical([
            Constraint::Min(0),
            Constraint::Length(notice_height),
            Constraint::Length(composer_height),
        ])
        .areas(area);

        self.render_messages(messages_area, frame.buffer_mut());
        if let Some(notice) = &self.notice {
            Paragraph::new(Line::from(Span::from(notice.clone()).red()))
                .render(notice_area, frame.buffer_mut());
        }
        composer.render(composer_area, frame.buffer_mut());

        let dialog = self.confirm.dialog();
        if dialog.open {
            let widget = ConfirmDialogWidget::new(&dialog);
            let popup = widget.popup_area(area);
            widget.render(popup, frame.buffer_mut());
        } else if let Some(position) = composer.cursor_pos(composer_area) {
            frame.set_cursor_position(position);
        }
    }

    fn render_messages(&self, area: Rect, buf: &mut Buffer) {
        if self.messages.is_empty() {
            Paragraph::new(Line::from("No messages yet".dim())).render(area, buf);
            return;
        }
        let mut lines: Vec<Line<'static>> = Vec::new();
        for (index, message) in self.messages.iter().enumerate() {
            let marker = if self.selected == Some(index) {
                "› ".cyan()
            } else {
                "  ".into()
            };
            let mut text_lines = message.text.split('\n');
            let first = text_lines.next().unwrap_or_default();
            lines.push(Line::from(vec![
                marker,
                Span::from(message.author.clone()).bold(),
                ": ".into(),
                Span::from(first.to_string()),
            ]));
            for rest in text_lines {
                lines.push(Line::from(format!("    {rest}")));
            }
        }
        let skip = lines.len().saturating_sub(usize::from(area.height));
        Paragraph::new(lines.split_off(skip)).render(area, buf);
    }
}
