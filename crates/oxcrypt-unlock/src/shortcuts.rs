//! Key chords for the dialog's tab-cycling shortcuts
//!
//! Chords are written the way menus show them, e.g. `Ctrl+PageDown` or
//! `Ctrl+Shift+Tab`. Modifier names are case-insensitive; `Control`, `Cmd`
//! and `Super` are accepted as aliases.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ShortcutError;

/// Modifier keys held with a chord
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        alt: false,
        meta: false,
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };

    pub fn is_empty(self) -> bool {
        self == Modifiers::NONE
    }
}

/// Non-modifier key of a chord
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    PageUp,
    PageDown,
    Tab,
    Home,
    End,
    Left,
    Right,
    Up,
    Down,
    /// Function key `F1`..=`F24`
    F(u8),
    /// Printable character, stored uppercased
    Char(char),
}

impl Key {
    fn parse(token: &str) -> Result<Self, ShortcutError> {
        let named = match token.to_ascii_lowercase().as_str() {
            "pageup" | "pgup" => Some(Key::PageUp),
            "pagedown" | "pgdown" | "pgdn" => Some(Key::PageDown),
            "tab" => Some(Key::Tab),
            "home" => Some(Key::Home),
            "end" => Some(Key::End),
            "left" => Some(Key::Left),
            "right" => Some(Key::Right),
            "up" => Some(Key::Up),
            "down" => Some(Key::Down),
            _ => None,
        };
        if let Some(key) = named {
            return Ok(key);
        }

        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_whitespace() => Ok(Key::Char(c.to_ascii_uppercase())),
            (Some('F' | 'f'), Some(_)) => token[1..]
                .parse::<u8>()
                .ok()
                .filter(|n| (1..=24).contains(n))
                .map(Key::F)
                .ok_or_else(|| ShortcutError::UnknownKey(token.to_string())),
            _ => Err(ShortcutError::UnknownKey(token.to_string())),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::PageUp => f.write_str("PageUp"),
            Key::PageDown => f.write_str("PageDown"),
            Key::Tab => f.write_str("Tab"),
            Key::Home => f.write_str("Home"),
            Key::End => f.write_str("End"),
            Key::Left => f.write_str("Left"),
            Key::Right => f.write_str("Right"),
            Key::Up => f.write_str("Up"),
            Key::Down => f.write_str("Down"),
            Key::F(n) => write!(f, "F{n}"),
            Key::Char(c) => write!(f, "{c}"),
        }
    }
}

/// A key together with its modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyChord {
    pub modifiers: Modifiers,
    pub key: Key,
}

impl KeyChord {
    pub const fn new(modifiers: Modifiers, key: Key) -> Self {
        Self { modifiers, key }
    }

    /// Key with Ctrl held
    pub const fn ctrl(key: Key) -> Self {
        Self::new(Modifiers::CTRL, key)
    }
}

impl FromStr for KeyChord {
    type Err = ShortcutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ShortcutError::Empty);
        }

        // A trailing '+' is the plus key itself ("Ctrl++", or "+" alone)
        let (head, key_token) = match s.strip_suffix("++") {
            Some(head) => (head, "+"),
            None if s == "+" => ("", "+"),
            None => match s.rsplit_once('+') {
                Some((head, key)) => (head, key.trim()),
                None => ("", s),
            },
        };
        if key_token.is_empty() {
            return Err(ShortcutError::MissingKey(s.to_string()));
        }

        let mut modifiers = Modifiers::NONE;
        for token in head.split('+').map(str::trim).filter(|t| !t.is_empty()) {
            match token.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => modifiers.ctrl = true,
                "shift" => modifiers.shift = true,
                "alt" | "option" => modifiers.alt = true,
                "meta" | "cmd" | "super" => modifiers.meta = true,
                _ => return Err(ShortcutError::UnknownModifier(token.to_string())),
            }
        }

        Ok(KeyChord::new(modifiers, Key::parse(key_token)?))
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Modifiers {
            ctrl,
            shift,
            alt,
            meta,
        } = self.modifiers;
        if ctrl {
            f.write_str("Ctrl+")?;
        }
        if shift {
            f.write_str("Shift+")?;
        }
        if alt {
            f.write_str("Alt+")?;
        }
        if meta {
            f.write_str("Meta+")?;
        }
        write!(f, "{}", self.key)
    }
}

impl TryFrom<String> for KeyChord {
    type Error = ShortcutError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<KeyChord> for String {
    fn from(chord: KeyChord) -> Self {
        chord.to_string()
    }
}

/// The two shortcuts that cycle the dialog's tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabShortcuts {
    pub previous: KeyChord,
    pub next: KeyChord,
}

impl Default for TabShortcuts {
    fn default() -> Self {
        Self {
            previous: KeyChord::ctrl(Key::PageUp),
            next: KeyChord::ctrl(Key::PageDown),
        }
    }
}

impl TabShortcuts {
    /// Tab offset bound to `chord`, if any
    pub fn offset_for(&self, chord: &KeyChord) -> Option<isize> {
        if *chord == self.previous {
            Some(-1)
        } else if *chord == self.next {
            Some(1)
        } else {
            None
        }
    }
}
