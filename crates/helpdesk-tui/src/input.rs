//! Canonical key input consumed by the dashboard view-models.

/// Canonical key set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Tab,
    Backspace,
    Up,
    Down,
}

/// Canonical keyboard modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    #[must_use]
    pub const fn none() -> Self {
        Self {
            shift: false,
            ctrl: false,
            alt: false,
        }
    }
}

/// Canonical key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    #[must_use]
    pub const fn plain(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::none(),
        }
    }

    #[must_use]
    pub const fn ctrl(ch: char) -> Self {
        Self {
            key: Key::Char(ch),
            modifiers: Modifiers {
                shift: false,
                ctrl: true,
                alt: false,
            },
        }
    }
}

/// Parses a textual key description such as `n`, `ctrl+k`, `esc` or `down`.
pub fn parse_key(raw: &str) -> Result<KeyEvent, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("empty key".into());
    }
    let mut modifiers = Modifiers::none();
    let mut parts: Vec<&str> = raw.split('+').collect();
    let key_part = parts.pop().unwrap_or_default();
    for part in parts {
        match part.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => modifiers.ctrl = true,
            "alt" | "meta" => modifiers.alt = true,
            "shift" => modifiers.shift = true,
            other => return Err(format!("unknown modifier {other:?}")),
        }
    }
    let key = match key_part.to_ascii_lowercase().as_str() {
        "enter" | "return" => Key::Enter,
        "esc" | "escape" => Key::Escape,
        "tab" => Key::Tab,
        "backspace" => Key::Backspace,
        "up" => Key::Up,
        "down" => Key::Down,
        _ => {
            let mut chars = key_part.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => Key::Char(ch),
                _ => return Err(format!("unknown key {key_part:?}")),
            }
        }
    };
    Ok(KeyEvent { key, modifiers })
}
