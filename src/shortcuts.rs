//! Keyboard chord to editor intent mapping.

use std::collections::HashMap;

/// Modifier keys held during a pointer or key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    /// Cmd on macOS. Treated as Ctrl for shortcut lookup.
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    /// Whether a click with these modifiers toggles selection membership.
    pub fn toggles_selection(&self) -> bool {
        self.shift || self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable key. Letters are matched case-insensitively.
    Char(char),
    Delete,
    Backspace,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub key: Key,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyChord {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        let key = match key {
            Key::Char(c) => Key::Char(c.to_ascii_lowercase()),
            other => other,
        };
        Self {
            key,
            ctrl: modifiers.ctrl || modifiers.meta,
            shift: modifiers.shift,
            alt: modifiers.alt,
        }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    pub fn ctrl(c: char) -> Self {
        Self::new(Key::Char(c), Modifiers::ctrl())
    }

    pub fn ctrl_shift(c: char) -> Self {
        Self::new(
            Key::Char(c),
            Modifiers {
                shift: true,
                ..Modifiers::ctrl()
            },
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutIntent {
    Undo,
    Redo,
    Delete,
    Escape,
    SelectAll,
    Save,
    ZoomIn,
    ZoomOut,
    ResetZoom,
    ToggleDeactivate,
}

#[derive(Debug, Clone)]
pub struct ShortcutTable {
    bindings: HashMap<KeyChord, ShortcutIntent>,
}

impl Default for ShortcutTable {
    fn default() -> Self {
        use ShortcutIntent::*;
        let mut table = Self::empty();
        table
            .bind(KeyChord::ctrl('z'), Undo)
            .bind(KeyChord::ctrl_shift('z'), Redo)
            .bind(KeyChord::ctrl('y'), Redo)
            .bind(KeyChord::plain(Key::Delete), Delete)
            .bind(KeyChord::plain(Key::Backspace), Delete)
            .bind(KeyChord::plain(Key::Escape), Escape)
            .bind(KeyChord::ctrl('a'), SelectAll)
            .bind(KeyChord::ctrl('s'), Save)
            .bind(KeyChord::ctrl('='), ZoomIn)
            .bind(KeyChord::ctrl('+'), ZoomIn)
            .bind(KeyChord::ctrl_shift('='), ZoomIn)
            .bind(KeyChord::ctrl('-'), ZoomOut)
            .bind(KeyChord::ctrl('0'), ResetZoom)
            .bind(KeyChord::plain(Key::Char('d')), ToggleDeactivate);
        table
    }
}

impl ShortcutTable {
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Bind (or rebind) a chord.
    pub fn bind(&mut self, chord: KeyChord, intent: ShortcutIntent) -> &mut Self {
        self.bindings.insert(chord, intent);
        self
    }

    pub fn unbind(&mut self, chord: &KeyChord) -> Option<ShortcutIntent> {
        self.bindings.remove(chord)
    }

    pub fn lookup(&self, chord: &KeyChord) -> Option<ShortcutIntent> {
        self.bindings.get(chord).copied()
    }
}
