//! Keyboard input handling.
//!
//! This module provides types for representing keyboard events delivered to a
//! focused input: editing keys, navigation keys and regular character input.

use std::fmt;
use std::str::FromStr;

/// Keyboard key event message.
///
/// KeyMsg is sent to the model's update function when a key is pressed.
///
/// # Example
///
/// ```rust
/// use lookup_runtime::{KeyMsg, KeyType};
///
/// fn describe(key: &KeyMsg) -> String {
///     match key.key_type {
///         KeyType::Enter => "select".to_string(),
///         KeyType::Runes => format!("typed {}", key),
///         _ => key.to_string(),
///     }
/// }
///
/// assert_eq!(describe(&KeyMsg::from_char('a')), "typed a");
/// assert_eq!(describe(&KeyMsg::from_type(KeyType::Down)), "down");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMsg {
    /// The type of key pressed.
    pub key_type: KeyType,
    /// For KeyType::Runes, the characters typed.
    pub runes: Vec<char>,
    /// Whether Alt was held.
    pub alt: bool,
    /// Whether this came from a paste operation.
    pub paste: bool,
}

impl KeyMsg {
    /// Create a new key message from a key type.
    pub fn from_type(key_type: KeyType) -> Self {
        Self {
            key_type,
            runes: Vec::new(),
            alt: false,
            paste: false,
        }
    }

    /// Create a new key message from a character.
    ///
    /// A space is reported as [`KeyType::Space`] so that bindings can match it.
    pub fn from_char(c: char) -> Self {
        if c == ' ' {
            return Self::from_type(KeyType::Space);
        }
        Self {
            key_type: KeyType::Runes,
            runes: vec![c],
            alt: false,
            paste: false,
        }
    }

    /// Create a new key message from multiple characters (e.g., from IME).
    pub fn from_runes(runes: Vec<char>) -> Self {
        Self {
            key_type: KeyType::Runes,
            runes,
            alt: false,
            paste: false,
        }
    }

    /// Create a pasted key message.
    pub fn paste(text: &str) -> Self {
        Self::from_runes(text.chars().collect()).with_paste()
    }

    /// Set the alt modifier.
    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    /// Set the paste flag.
    pub fn with_paste(mut self) -> Self {
        self.paste = true;
        self
    }

    /// Returns the text this key inserts into an input, if any.
    ///
    /// Alt-modified keys never insert text.
    pub fn text(&self) -> Option<String> {
        if self.alt {
            return None;
        }
        match self.key_type {
            KeyType::Runes if !self.runes.is_empty() => Some(self.runes.iter().collect()),
            KeyType::Space => Some(" ".to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for KeyMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.alt {
            write!(f, "alt+")?;
        }
        if self.key_type == KeyType::Runes {
            if self.paste {
                write!(f, "[")?;
            }
            for c in &self.runes {
                write!(f, "{}", c)?;
            }
            if self.paste {
                write!(f, "]")?;
            }
        } else {
            write!(f, "{}", self.key_type)?;
        }
        Ok(())
    }
}

/// Key type enumeration.
///
/// Covers the keys a single-line input reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// Regular character input.
    Runes,
    /// Space bar.
    Space,
    /// Enter / Return.
    Enter,
    /// Tab.
    Tab,
    /// Shift+Tab.
    ShiftTab,
    /// Escape.
    Esc,
    /// Backspace.
    Backspace,
    /// Delete.
    Delete,
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Home.
    Home,
    /// End.
    End,
    /// Page up.
    PgUp,
    /// Page down.
    PgDown,
    /// Break/Interrupt (Ctrl+C).
    CtrlC,
    /// Ctrl+N.
    CtrlN,
    /// Ctrl+P.
    CtrlP,
    /// Ctrl+U (kill line).
    CtrlU,
    /// Ctrl+W (kill word).
    CtrlW,
}

impl KeyType {
    const ALL: [KeyType; 21] = [
        KeyType::Runes,
        KeyType::Space,
        KeyType::Enter,
        KeyType::Tab,
        KeyType::ShiftTab,
        KeyType::Esc,
        KeyType::Backspace,
        KeyType::Delete,
        KeyType::Up,
        KeyType::Down,
        KeyType::Left,
        KeyType::Right,
        KeyType::Home,
        KeyType::End,
        KeyType::PgUp,
        KeyType::PgDown,
        KeyType::CtrlC,
        KeyType::CtrlN,
        KeyType::CtrlP,
        KeyType::CtrlU,
        KeyType::CtrlW,
    ];

    /// The canonical name used by key bindings.
    pub fn name(self) -> &'static str {
        match self {
            KeyType::Runes => "runes",
            KeyType::Space => " ",
            KeyType::Enter => "enter",
            KeyType::Tab => "tab",
            KeyType::ShiftTab => "shift+tab",
            KeyType::Esc => "esc",
            KeyType::Backspace => "backspace",
            KeyType::Delete => "delete",
            KeyType::Up => "up",
            KeyType::Down => "down",
            KeyType::Left => "left",
            KeyType::Right => "right",
            KeyType::Home => "home",
            KeyType::End => "end",
            KeyType::PgUp => "pgup",
            KeyType::PgDown => "pgdown",
            KeyType::CtrlC => "ctrl+c",
            KeyType::CtrlN => "ctrl+n",
            KeyType::CtrlP => "ctrl+p",
            KeyType::CtrlU => "ctrl+u",
            KeyType::CtrlW => "ctrl+w",
        }
    }

    /// Check if this is a cursor movement key.
    pub fn is_cursor(&self) -> bool {
        matches!(
            self,
            KeyType::Up
                | KeyType::Down
                | KeyType::Left
                | KeyType::Right
                | KeyType::Home
                | KeyType::End
                | KeyType::PgUp
                | KeyType::PgDown
        )
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a key name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown key name: {0:?}")]
pub struct UnknownKey(pub String);

impl FromStr for KeyType {
    type Err = UnknownKey;

    /// Parses binding names such as `"down"`, `"ctrl+n"` or `"space"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let alias = match lowered.as_str() {
            "space" => Some(KeyType::Space),
            "escape" => Some(KeyType::Esc),
            "return" => Some(KeyType::Enter),
            "arrowup" => Some(KeyType::Up),
            "arrowdown" => Some(KeyType::Down),
            _ => None,
        };
        alias
            .or_else(|| KeyType::ALL.into_iter().find(|k| k.name() == lowered))
            .ok_or_else(|| UnknownKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_msg_display() {
        let key = KeyMsg::from_char('a');
        assert_eq!(key.to_string(), "a");

        let key = KeyMsg::from_type(KeyType::Enter);
        assert_eq!(key.to_string(), "enter");

        let key = KeyMsg::from_char('x').with_alt();
        assert_eq!(key.to_string(), "alt+x");

        let key = KeyMsg::paste("hi");
        assert_eq!(key.to_string(), "[hi]");
    }

    #[test]
    fn test_space_is_its_own_key_type() {
        let key = KeyMsg::from_char(' ');
        assert_eq!(key.key_type, KeyType::Space);
        assert_eq!(key.text().as_deref(), Some(" "));
    }

    #[test]
    fn test_text_for_runes_and_navigation() {
        assert_eq!(KeyMsg::from_char('q').text().as_deref(), Some("q"));
        assert_eq!(KeyMsg::paste("abc").text().as_deref(), Some("abc"));
        assert_eq!(KeyMsg::from_type(KeyType::Down).text(), None);
        assert_eq!(KeyMsg::from_char('q').with_alt().text(), None);
        assert_eq!(KeyMsg::from_runes(Vec::new()).text(), None);
    }

    #[test]
    fn test_key_type_names_round_trip_through_from_str() {
        for key in KeyType::ALL {
            if key == KeyType::Space {
                continue;
            }
            assert_eq!(key.name().parse::<KeyType>(), Ok(key));
        }
    }

    #[test]
    fn test_key_type_aliases() {
        assert_eq!("space".parse::<KeyType>(), Ok(KeyType::Space));
        assert_eq!("Escape".parse::<KeyType>(), Ok(KeyType::Esc));
        assert_eq!("ArrowDown".parse::<KeyType>(), Ok(KeyType::Down));
        assert!("hyper".parse::<KeyType>().is_err());
    }

    #[test]
    fn test_key_type_is_cursor() {
        assert!(KeyType::Up.is_cursor());
        assert!(KeyType::PgDown.is_cursor());
        assert!(!KeyType::Enter.is_cursor());
    }
}
