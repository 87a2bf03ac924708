//! Draws a composer: formatting toolbar, editor text (or placeholder), the
//! action buttons for the current mode and the newline hint.

use huddle_composer::ComposerActions;
use huddle_composer::ComposerView;
use huddle_composer::EditorEngine;
use huddle_composer::ToolbarItem;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Widget;

use crate::render::Renderable;
use crate::text_engine::TextAreaEngine;

pub(crate) const NEWLINE_HINT: &str = "Shift + Enter to add a new line";

/// What the widget needs from the live engine for one frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct EditorSnapshot {
    lines: Vec<String>,
    cursor: (usize, usize),
    /// `None` when the engine has no toolbar or it is hidden.
    toolbar: Option<Vec<Vec<ToolbarItem>>>,
    focused: bool,
}

impl EditorSnapshot {
    pub(crate) fn capture(engine: &TextAreaEngine) -> Self {
        let toolbar_shown = engine.toolbar().is_some_and(|node| !node.is_hidden());
        Self {
            lines: engine.lines().map(str::to_string).collect(),
            cursor: engine.cursor_display_pos(),
            toolbar: toolbar_shown.then(|| engine.toolbar_items().to_vec()),
            focused: engine.is_focused(),
        }
    }
}

pub(crate) struct ComposerWidget<'a> {
    view: &'a ComposerView,
    editor: Option<EditorSnapshot>,
    title: Option<&'a str>,
}

impl<'a> ComposerWidget<'a> {
    pub(crate) fn new(view: &'a ComposerView, editor: Option<EditorSnapshot>) -> Self {
        Self {
            view,
            editor,
            title: None,
        }
    }

    pub(crate) fn title(mut self, title: &'a str) -> Self {
        self.title = Some(title);
        self
    }

    fn toolbar_rows(&self) -> u16 {
        match self.editor.as_ref().and_then(|editor| editor.toolbar.as_ref()) {
            Some(_) => 1,
            None => 0,
        }
    }

    fn text_rows(&self) -> u16 {
        let lines = self.editor.as_ref().map_or(1, |editor| editor.lines.len());
        u16::try_from(lines.max(1)).unwrap_or(u16::MAX)
    }

    fn shows_placeholder(&self) -> bool {
        self.view.plain_text.is_empty()
    }

    fn toolbar_line(groups: &[Vec<ToolbarItem>]) -> Line<'static> {
        let mut spans: Vec<Span<'static>> = Vec::new();
        for (index, group) in groups.iter().enumerate() {
            if index > 0 {
                spans.push(" │ ".dim());
            }
            let labels: Vec<&str> = group.iter().copied().map(ToolbarItem::label).collect();
            spans.push(Span::from(labels.join(" ")).bold());
        }
        Line::from(spans)
    }

    fn text_lines(&self) -> Vec<Line<'static>> {
        if self.shows_placeholder() {
            return vec![Line::from(
                Span::from(self.view.placeholder.clone()).dim().italic(),
            )];
        }
        match &self.editor {
            Some(editor) => editor.lines.iter().cloned().map(Line::from).collect(),
            None => self
                .view
                .plain_text
                .split('\n')
                .map(|line| Line::from(line.to_string()))
                .collect(),
        }
    }

    fn actions_line(&self) -> Line<'static> {
        let hint = self.view.toolbar_hint;
        let buttons = match self.view.actions {
            ComposerActions::Create {
                toggle_toolbar,
                emoji,
                attach,
                send,
            } => vec![
                button(format!("^T {hint}"), toggle_toolbar),
                button("Emoji".to_string(), emoji),
                button("Attach".to_string(), attach),
                primary_button("⏎ Send", send),
            ],
            ComposerActions::Update {
                toggle_toolbar,
                emoji,
                cancel,
                save,
            } => vec![
                button(format!("^T {hint}"), toggle_toolbar),
                button("Emoji".to_string(), emoji),
                button("Esc Cancel".to_string(), cancel),
                primary_button("⏎ Save", save),
            ],
        };
        let mut spans = Vec::new();
        for (index, span) in buttons.into_iter().enumerate() {
            if index > 0 {
                spans.push("  ".into());
            }
            spans.push(span);
        }
        Line::from(spans)
    }
}

fn button(label: String, enabled: bool) -> Span<'static> {
    let span = Span::from(format!("[{label}]"));
    if enabled { span } else { span.dim() }
}

fn primary_button(label: &str, enabled: bool) -> Span<'static> {
    let span = Span::from(format!("[{label}]"));
    if enabled {
        span.cyan().bold()
    } else {
        span.dim()
    }
}

impl Renderable for ComposerWidget<'_> {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        let mut block = Block::bordered();
        if let Some(title) = self.title {
            block = block.title(title.bold());
        }
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = Vec::new();
        if let Some(groups) = self.editor.as_ref().and_then(|editor| editor.toolbar.as_ref()) {
            lines.push(Self::toolbar_line(groups));
        }
        lines.extend(self.text_lines());
        lines.push(self.actions_line());
        lines.push(Line::from(NEWLINE_HINT.dim()));

        Paragraph::new(lines).render(inner, buf);
    }

    fn desired_height(&self, _width: u16) -> u16 {
        // borders + toolbar + text + actions + hint
        2 + self.toolbar_rows() + self.text_rows() + 2
    }

    fn cursor_pos(&self, area: Rect) -> Option<(u16, u16)> {
        let editor = self.editor.as_ref().filter(|editor| editor.focused)?;
        let (line, col) = editor.cursor;
        let x = area
            .x
            .saturating_add(1)
            .saturating_add(u16::try_from(col).ok()?);
        let y = area
            .y
            .saturating_add(1)
            .saturating_add(self.toolbar_rows())
            .saturating_add(u16::try_from(line).ok()?);
        (x < area.right().saturating_sub(1) && y < area.bottom().saturating_sub(1))
            .then_some((x, y))
    }
}
