use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// A keystroke the session engine accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Keystroke {
    Char(char),
    Backspace,
}

impl Keystroke {
    /// Maps a terminal key event onto the accepted set.
    ///
    /// Only key presses of a single printable character and backspace get
    /// through. Shift is allowed, and so is Ctrl+Alt, which is how terminals
    /// report AltGr on Windows-style layouts. Other chords, navigation keys,
    /// function keys and key releases come back as `None`.
    pub fn from_key_event(key: &KeyEvent) -> Option<Self> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        match key.code {
            KeyCode::Backspace if key.modifiers.is_empty() => Some(Keystroke::Backspace),
            KeyCode::Char(c) if !c.is_control() && is_text_modifier(key.modifiers) => {
                Some(Keystroke::Char(c))
            }
            _ => None,
        }
    }

    /// Whether the engine should look at this keystroke at all
    pub fn is_accepted(&self) -> bool {
        match self {
            Keystroke::Char(c) => !c.is_control(),
            Keystroke::Backspace => true,
        }
    }
}

fn is_text_modifier(modifiers: KeyModifiers) -> bool {
    let rest = modifiers.difference(KeyModifiers::SHIFT);
    rest.is_empty() || rest == KeyModifiers::CONTROL | KeyModifiers::ALT
}
