use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

/// A widget that can report how much room it wants and where the terminal
/// cursor belongs.
pub(crate) trait Renderable {
    fn render(&self, area: Rect, buf: &mut Buffer);

    fn desired_height(&self, width: u16) -> u16;

    fn cursor_pos(&self, _area: Rect) -> Option<(u16, u16)> {
        None
    }
}
