use crossterm::event::KeyCode;
use crossterm::event::KeyEvent as CrosstermKeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use huddle_composer::Key;
use huddle_composer::KeyEvent;
use huddle_composer::Modifiers;

/// Translates a terminal key press into the composer's key model. Releases
/// and keys the composer has no use for map to `None`.
pub(crate) fn to_composer_key(event: &CrosstermKeyEvent) -> Option<KeyEvent> {
    if event.kind == KeyEventKind::Release {
        return None;
    }
    let key = match event.code {
        KeyCode::Char(ch) => Key::Char(ch),
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Esc => Key::Esc,
        _ => return None,
    };
    Some(KeyEvent::new(key, to_modifiers(event.modifiers)))
}

fn to_modifiers(modifiers: KeyModifiers) -> Modifiers {
    let mut out = Modifiers::empty();
    out.set(Modifiers::SHIFT, modifiers.contains(KeyModifiers::SHIFT));
    out.set(Modifiers::CONTROL, modifiers.contains(KeyModifiers::CONTROL));
    out.set(Modifiers::ALT, modifiers.contains(KeyModifiers::ALT));
    if modifiers.intersects(KeyModifiers::SUPER | KeyModifiers::META) {
        out.insert(Modifiers::META);
    }
    out
}
