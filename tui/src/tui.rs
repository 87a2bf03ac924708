use std::io::IsTerminal;
use std::io::Result;
use std::io::Stdout;
use std::io::stdin;
use std::io::stdout;
use std::panic;

use crossterm::cursor::Show;
use crossterm::event::DisableBracketedPaste;
use crossterm::event::EnableBracketedPaste;
use crossterm::event::KeyboardEnhancementFlags;
use crossterm::event::PopKeyboardEnhancementFlags;
use crossterm::event::PushKeyboardEnhancementFlags;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::disable_raw_mode;
use ratatui::crossterm::terminal::enable_raw_mode;
use tracing::error;

pub type Terminal = ratatui::Terminal<CrosstermBackend<Stdout>>;

/// Keyboard protocol needed for Shift+Enter to arrive as its own chord.
const KEYBOARD_FLAGS: KeyboardEnhancementFlags = KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
    .union(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
    .union(KeyboardEnhancementFlags::REPORT_ALTERNATE_KEYS);

fn enter_composer_modes() -> Result<()> {
    enable_raw_mode()?;
    execute!(stdout(), EnableBracketedPaste, EnterAlternateScreen)?;
    // Unsupported on some terminals; Shift+Enter then reads as Enter.
    if let Err(err) = execute!(stdout(), PushKeyboardEnhancementFlags(KEYBOARD_FLAGS)) {
        tracing::debug!("keyboard enhancement unavailable: {err}");
    }
    Ok(())
}

/// Undoes [`enter_composer_modes`].
pub fn restore() -> Result<()> {
    let _ = execute!(stdout(), PopKeyboardEnhancementFlags);
    execute!(stdout(), DisableBracketedPaste, LeaveAlternateScreen)?;
    disable_raw_mode()?;
    let _ = execute!(stdout(), Show);
    Ok(())
}

pub fn init() -> Result<Terminal> {
    if !(stdin().is_terminal() && stdout().is_terminal()) {
        return Err(std::io::Error::other("huddle-tui needs an interactive terminal"));
    }
    enter_composer_modes()?;
    install_panic_hook();
    ratatui::Terminal::new(CrosstermBackend::new(stdout()))
}

/// Puts the terminal back and records the panic in the log before the
/// previously installed report runs.
fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = restore();
        error!("panic: {info}");
        previous(info);
    }));
}
