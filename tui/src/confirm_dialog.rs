//! Modal yes/no popup drawn over the chat while a [`huddle_composer::Confirm`]
//! request is pending.

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;
use huddle_composer::ConfirmDialog;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Clear;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Widget;
use ratatui::widgets::Wrap;

use crate::render::Renderable;

const MAX_WIDTH: u16 = 60;

pub(crate) struct ConfirmDialogWidget<'a> {
    dialog: &'a ConfirmDialog,
}

impl<'a> ConfirmDialogWidget<'a> {
    pub(crate) fn new(dialog: &'a ConfirmDialog) -> Self {
        Self { dialog }
    }

    /// Centered rect the popup occupies inside `area`.
    pub(crate) fn popup_area(&self, area: Rect) -> Rect {
        let width = area.width.min(MAX_WIDTH);
        let height = self.desired_height(width).min(area.height);
        Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        )
    }
}

impl Renderable for ConfirmDialogWidget<'_> {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        if !self.dialog.open {
            return;
        }
        Clear.render(area, buf);
        let block = Block::bordered().title(Span::from(self.dialog.title.clone()).bold());
        let lines = vec![
            Line::from(self.dialog.message.clone()),
            Line::default(),
            Line::from(vec![
                "[y] ".cyan().bold(),
                "Confirm".into(),
                "   ".into(),
                "[n] ".dim(),
                "Cancel".dim(),
            ]),
        ];
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(block)
            .render(area, buf);
    }

    fn desired_height(&self, width: u16) -> u16 {
        if !self.dialog.open {
            return 0;
        }
        let inner = usize::from(width.saturating_sub(2).max(1));
        let message_rows = self
            .dialog
            .message
            .len()
            .div_ceil(inner)
            .max(1);
        // borders + message + spacer + buttons
        2 + u16::try_from(message_rows).unwrap_or(u16::MAX) + 2
    }
}

/// Maps a key press to the user's answer, if it is one.
pub(crate) fn choice_for_key(event: &KeyEvent) -> Option<bool> {
    if event.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return None;
    }
    match event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Some(true),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn dialog(open: bool) -> ConfirmDialog {
        ConfirmDialog {
            open,
            title: "Delete message".to_string(),
            message: "Are you sure you want to delete this message?".to_string(),
        }
    }

    #[test]
    fn open_dialog_renders_title_message_and_choices() {
        let dialog = dialog(true);
        let widget = ConfirmDialogWidget::new(&dialog);
        assert_eq!(widget.desired_height(60), 5);
        let mut terminal = Terminal::new(TestBackend::new(60, 5)).expect("terminal");

        terminal
            .draw(|frame| widget.render(frame.area(), frame.buffer_mut()))
            .expect("draw");

        insta::assert_snapshot!("open_delete_dialog", terminal.backend());
    }

    #[test]
    fn closed_dialog_takes_no_space() {
        let dialog = dialog(false);
        let widget = ConfirmDialogWidget::new(&dialog);
        assert_eq!(widget.desired_height(60), 0);
    }

    #[test]
    fn popup_is_centered() {
        let dialog = dialog(true);
        let widget = ConfirmDialogWidget::new(&dialog);
        assert_eq!(
            widget.popup_area(Rect::new(0, 0, 100, 25)),
            Rect::new(20, 10, 60, 5)
        );
    }

    #[test]
    fn keys_map_to_answers() {
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(choice_for_key(&key(KeyCode::Char('y'))), Some(true));
        assert_eq!(choice_for_key(&key(KeyCode::Enter)), Some(true));
        assert_eq!(choice_for_key(&key(KeyCode::Esc)), Some(false));
        assert_eq!(choice_for_key(&key(KeyCode::Char('x'))), None);
        assert_eq!(
            choice_for_key(&KeyEvent::new(KeyCode::Char('y'), KeyModifiers::CONTROL)),
            None
        );
    }
}
