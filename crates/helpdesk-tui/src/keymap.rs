//! Shared keyboard shortcut dispatcher.
//!
//! Provides:
//! - scoped key resolution (command bar, menu navigation, global)
//! - explicit subscribe/unsubscribe tied to a view's mounted lifetime
//! - collision detection and diagnostics rendering

use std::collections::HashMap;

use crate::input::{Key, KeyEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyScope {
    Global,
    /// Command bar open on its main page with an empty query.
    CommandBar,
    /// Command bar open on any page.
    MenuNavigation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyToken {
    Char(char),
    Enter,
    Escape,
    Tab,
    Backspace,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub token: KeyToken,
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl KeyChord {
    #[must_use]
    pub const fn plain(token: KeyToken) -> Self {
        Self {
            token,
            shift: false,
            ctrl: false,
            alt: false,
        }
    }

    /// Letters match case-insensitively, so `N` and `n` are the same chord.
    #[must_use]
    pub fn from_event(event: KeyEvent) -> Self {
        Self {
            token: match event.key {
                Key::Char(ch) => KeyToken::Char(ch.to_ascii_lowercase()),
                Key::Enter => KeyToken::Enter,
                Key::Escape => KeyToken::Escape,
                Key::Tab => KeyToken::Tab,
                Key::Backspace => KeyToken::Backspace,
                Key::Up => KeyToken::Up,
                Key::Down => KeyToken::Down,
            },
            shift: false,
            ctrl: event.modifiers.ctrl,
            alt: event.modifiers.alt,
        }
    }

    #[must_use]
    pub fn display(self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl".to_owned());
        }
        if self.alt {
            parts.push("Alt".to_owned());
        }
        if self.shift {
            parts.push("Shift".to_owned());
        }
        let key = match self.token {
            KeyToken::Char(ch) => ch.to_ascii_uppercase().to_string(),
            KeyToken::Enter => "Enter".to_owned(),
            KeyToken::Escape => "Esc".to_owned(),
            KeyToken::Tab => "Tab".to_owned(),
            KeyToken::Backspace => "Backspace".to_owned(),
            KeyToken::Up => "Up".to_owned(),
            KeyToken::Down => "Down".to_owned(),
        };
        parts.push(key);
        parts.join("+")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCommand {
    /// Open the command bar straight onto the notes page.
    OpenNotes,
    /// Activate a fixed command bar item by id.
    SelectItem(&'static str),
    CloseMenu,
    MoveSelectionNext,
    MoveSelectionPrev,
    ExecuteSelection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    pub scope: KeyScope,
    pub chord: KeyChord,
    pub command: KeyCommand,
    pub description: &'static str,
    /// Swallow the host's default handling of the chord.
    pub prevent_default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyConflict {
    pub scope: KeyScope,
    pub chord: KeyChord,
    pub commands: Vec<KeyCommand>,
}

/// Handle returned by [`Keymap::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Result of dispatching one key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShortcutOutcome {
    pub command: Option<KeyCommand>,
    pub prevent_default: bool,
}

impl ShortcutOutcome {
    #[must_use]
    pub fn handled(&self) -> bool {
        self.command.is_some()
    }
}

#[derive(Debug, Clone)]
struct Subscription {
    id: SubscriptionId,
    binding: KeyBinding,
}

/// Process-wide shortcut registry. Views subscribe on mount and
/// unsubscribe on unmount.
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    next_id: u64,
    subscriptions: Vec<Subscription>,
}

impl Keymap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, binding: KeyBinding) -> SubscriptionId {
        self.next_id = self.next_id.saturating_add(1);
        let id = SubscriptionId(self.next_id);
        self.subscriptions.push(Subscription { id, binding });
        id
    }

    /// Returns false when the id was already released.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|sub| sub.id != id);
        self.subscriptions.len() != before
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    pub fn bindings(&self) -> impl Iterator<Item = &KeyBinding> {
        self.subscriptions.iter().map(|sub| &sub.binding)
    }

    /// First matching binding wins, scanning `scopes` in order. Within a
    /// scope the most recent subscription takes precedence.
    #[must_use]
    pub fn resolve(&self, scopes: &[KeyScope], chord: KeyChord) -> Option<&KeyBinding> {
        for scope in scopes {
            if let Some(sub) = self
                .subscriptions
                .iter()
                .rev()
                .find(|sub| sub.binding.scope == *scope && sub.binding.chord == chord)
            {
                return Some(&sub.binding);
            }
        }
        None
    }

    #[must_use]
    pub fn dispatch(&self, scopes: &[KeyScope], event: KeyEvent) -> ShortcutOutcome {
        match self.resolve(scopes, KeyChord::from_event(event)) {
            Some(binding) => ShortcutOutcome {
                command: Some(binding.command),
                prevent_default: binding.prevent_default,
            },
            None => ShortcutOutcome::default(),
        }
    }

    #[must_use]
    pub fn conflicts(&self) -> Vec<KeyConflict> {
        let mut by_scope_chord: HashMap<(KeyScope, KeyChord), Vec<KeyCommand>> = HashMap::new();
        for binding in self.bindings() {
            by_scope_chord
                .entry((binding.scope, binding.chord))
                .or_default()
                .push(binding.command);
        }
        let mut conflicts: Vec<KeyConflict> = by_scope_chord
            .into_iter()
            .filter_map(|((scope, chord), commands)| {
                if commands.len() > 1 {
                    Some(KeyConflict {
                        scope,
                        chord,
                        commands,
                    })
                } else {
                    None
                }
            })
            .collect();
        conflicts.sort_by(|a, b| {
            a.scope
                .cmp(&b.scope)
                .then(a.chord.display().cmp(&b.chord.display()))
        });
        conflicts
    }

    #[must_use]
    pub fn conflict_diagnostics_lines(&self, width: usize, max_rows: usize) -> Vec<String> {
        if max_rows == 0 {
            return Vec::new();
        }
        let conflicts = self.conflicts();
        let mut lines = vec![truncate("Keymap diagnostics", width)];
        if lines.len() >= max_rows {
            return lines;
        }
        if conflicts.is_empty() {
            lines.push(truncate("  no conflicts detected", width));
            return lines;
        }
        lines.push(truncate(
            &format!("  {} conflict(s) detected", conflicts.len()),
            width,
        ));
        for conflict in conflicts {
            if lines.len() >= max_rows {
                break;
            }
            let actions = conflict
                .commands
                .iter()
                .map(|command| format!("{command:?}"))
                .collect::<Vec<String>>()
                .join(",");
            let row = format!(
                "  {:?} {} -> {}",
                conflict.scope,
                conflict.chord.display(),
                actions
            );
            lines.push(truncate(&row, width));
        }
        lines
    }
}

#[must_use]
pub fn bind(
    scope: KeyScope,
    chord: KeyChord,
    command: KeyCommand,
    description: &'static str,
) -> KeyBinding {
    KeyBinding {
        scope,
        chord,
        command,
        description,
        prevent_default: false,
    }
}

pub(crate) fn truncate(value: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    value.chars().take(width).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::{bind, KeyChord, KeyCommand, KeyScope, KeyToken, Keymap};
    use crate::input::{Key, KeyEvent};

    fn notes_binding() -> super::KeyBinding {
        let mut binding = bind(
            KeyScope::Global,
            KeyChord::plain(KeyToken::Char('n')),
            KeyCommand::OpenNotes,
            "open notes",
        );
        binding.prevent_default = true;
        binding
    }

    #[test]
    fn subscribe_and_unsubscribe_control_dispatch() {
        let mut map = Keymap::new();
        let id = map.subscribe(notes_binding());
        let outcome = map.dispatch(&[KeyScope::Global], KeyEvent::plain(Key::Char('n')));
        assert_eq!(outcome.command, Some(KeyCommand::OpenNotes));
        assert!(outcome.prevent_default);

        assert!(map.unsubscribe(id));
        assert!(!map.unsubscribe(id));
        let outcome = map.dispatch(&[KeyScope::Global], KeyEvent::plain(Key::Char('n')));
        assert!(!outcome.handled());
        assert!(!outcome.prevent_default);
    }

    #[test]
    fn letters_match_case_insensitively() {
        let mut map = Keymap::new();
        map.subscribe(notes_binding());
        let outcome = map.dispatch(&[KeyScope::Global], KeyEvent::plain(Key::Char('N')));
        assert_eq!(outcome.command, Some(KeyCommand::OpenNotes));
    }

    #[test]
    fn modifiers_distinguish_chords() {
        let mut map = Keymap::new();
        map.subscribe(notes_binding());
        let outcome = map.dispatch(&[KeyScope::Global], KeyEvent::ctrl('n'));
        assert!(!outcome.handled());
    }

    #[test]
    fn resolves_with_scope_precedence_snapshot() {
        let mut map = Keymap::new();
        map.subscribe(notes_binding());
        map.subscribe(bind(
            KeyScope::CommandBar,
            KeyChord::plain(KeyToken::Char('n')),
            KeyCommand::SelectItem("add-note"),
            "add note",
        ));
        map.subscribe(bind(
            KeyScope::CommandBar,
            KeyChord::plain(KeyToken::Escape),
            KeyCommand::CloseMenu,
            "close",
        ));

        let lines = [
            (vec![KeyScope::CommandBar, KeyScope::Global], 'n'),
            (vec![KeyScope::Global], 'n'),
            (vec![KeyScope::CommandBar, KeyScope::Global], 'q'),
        ]
        .iter()
        .map(|(scopes, ch)| {
            let chord = KeyChord::plain(KeyToken::Char(*ch));
            let command = map.resolve(scopes, chord).map(|b| b.command);
            format!("{} => {:?}", chord.display(), command)
        })
        .collect::<Vec<String>>()
        .join("\n");

        let expected = [
            "N => Some(SelectItem(\"add-note\"))",
            "N => Some(OpenNotes)",
            "Q => None",
        ]
        .join("\n");
        assert_eq!(lines, expected);
    }

    #[test]
    fn conflict_detector_reports_duplicates() {
        let mut map = Keymap::new();
        map.subscribe(notes_binding());
        map.subscribe(bind(
            KeyScope::Global,
            KeyChord::plain(KeyToken::Char('n')),
            KeyCommand::CloseMenu,
            "duplicate for test",
        ));
        let conflicts = map.conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].scope, KeyScope::Global);
        let lines = map.conflict_diagnostics_lines(80, 4);
        assert_eq!(lines[1], "  1 conflict(s) detected");
        assert!(lines[2].contains("Global N -> OpenNotes,CloseMenu"));
    }

    #[test]
    fn conflict_diagnostics_panel_snapshot() {
        let mut map = Keymap::new();
        map.subscribe(notes_binding());
        assert_eq!(
            map.conflict_diagnostics_lines(80, 4).join("\n"),
            "Keymap diagnostics\n  no conflicts detected"
        );
    }
}
