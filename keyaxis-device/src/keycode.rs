//! HID keycode utilities
//!
//! Analog drivers address keys by their USB HID usage id (page 0x07),
//! e.g. `W` = 26, `A` = 4.

use std::fmt;
use std::str::FromStr;

/// A physical key, identified by its HID usage id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct KeyCode(pub u16);

/// Named keys outside the letter/digit/function ranges
const NAMED_KEYS: &[(u16, &str)] = &[
    (0x28, "Enter"),
    (0x29, "Esc"),
    (0x2A, "Backspace"),
    (0x2B, "Tab"),
    (0x2C, "Space"),
    (0x2D, "Minus"),
    (0x2E, "Equal"),
    (0x2F, "LBracket"),
    (0x30, "RBracket"),
    (0x31, "Backslash"),
    (0x33, "Semicolon"),
    (0x34, "Quote"),
    (0x35, "Grave"),
    (0x36, "Comma"),
    (0x37, "Period"),
    (0x38, "Slash"),
    (0x39, "Caps"),
    (0x4F, "Right"),
    (0x50, "Left"),
    (0x51, "Down"),
    (0x52, "Up"),
    (0xE0, "LCtrl"),
    (0xE1, "LShift"),
    (0xE2, "LAlt"),
    (0xE4, "RCtrl"),
    (0xE5, "RShift"),
    (0xE6, "RAlt"),
];

const LETTERS: &[&str] = &[
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R", "S",
    "T", "U", "V", "W", "X", "Y", "Z",
];
const DIGITS: &[&str] = &["1", "2", "3", "4", "5", "6", "7", "8", "9", "0"];
const FUNCTION_KEYS: &[&str] = &[
    "F1", "F2", "F3", "F4", "F5", "F6", "F7", "F8", "F9", "F10", "F11", "F12",
];

impl KeyCode {
    pub const A: KeyCode = KeyCode(0x04);
    pub const D: KeyCode = KeyCode(0x07);
    pub const S: KeyCode = KeyCode(0x16);
    pub const W: KeyCode = KeyCode(0x1A);

    /// Key name, if this usage id has one
    pub fn name(self) -> Option<&'static str> {
        let code = self.0;
        match code {
            0x04..=0x1D => Some(LETTERS[(code - 0x04) as usize]),
            0x1E..=0x27 => Some(DIGITS[(code - 0x1E) as usize]),
            0x3A..=0x45 => Some(FUNCTION_KEYS[(code - 0x3A) as usize]),
            _ => NAMED_KEYS
                .iter()
                .find(|(c, _)| *c == code)
                .map(|(_, name)| *name),
        }
    }

    /// Resolve a key name (case-insensitive), e.g. `"W"`, `"space"`, `"F3"`
    pub fn from_name(name: &str) -> Option<Self> {
        let lookup = |table: &[&str], base: u16| {
            table
                .iter()
                .position(|n| n.eq_ignore_ascii_case(name))
                .map(|i| KeyCode(base + i as u16))
        };

        lookup(LETTERS, 0x04)
            .or_else(|| lookup(DIGITS, 0x1E))
            .or_else(|| lookup(FUNCTION_KEYS, 0x3A))
            .or_else(|| {
                NAMED_KEYS
                    .iter()
                    .find(|(_, n)| n.eq_ignore_ascii_case(name))
                    .map(|(c, _)| KeyCode(*c))
            })
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Error returned when a key string is neither a known name nor a usage id
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown key: \"{0}\"")]
pub struct UnknownKey(pub String);

impl FromStr for KeyCode {
    type Err = UnknownKey;

    /// Accepts a key name or a numeric usage id. Digit names win over
    /// numbers for single characters, so `"1"` is the `1` key (30).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(key) = Self::from_name(s) {
            return Ok(key);
        }
        s.parse::<u16>()
            .map(KeyCode)
            .map_err(|_| UnknownKey(s.to_string()))
    }
}

impl From<u16> for KeyCode {
    fn from(code: u16) -> Self {
        KeyCode(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wasd_codes() {
        assert_eq!(KeyCode::from_name("W"), Some(KeyCode(26)));
        assert_eq!(KeyCode::from_name("s"), Some(KeyCode(22)));
        assert_eq!(KeyCode::from_name("A"), Some(KeyCode(4)));
        assert_eq!(KeyCode::from_name("d"), Some(KeyCode(7)));
        assert_eq!(KeyCode::W.name(), Some("W"));
    }

    #[test]
    fn test_name_ranges() {
        assert_eq!(KeyCode(0x1D).name(), Some("Z"));
        assert_eq!(KeyCode(0x1E).name(), Some("1"));
        assert_eq!(KeyCode(0x27).name(), Some("0"));
        assert_eq!(KeyCode(0x45).name(), Some("F12"));
        assert_eq!(KeyCode(0x2C).name(), Some("Space"));
        assert_eq!(KeyCode(0x03).name(), None);
    }

    #[test]
    fn test_display_falls_back_to_number() {
        assert_eq!(KeyCode::W.to_string(), "W");
        assert_eq!(KeyCode(0x200).to_string(), "512");
    }

    #[test]
    fn test_parse_name_or_number() {
        assert_eq!("W".parse::<KeyCode>(), Ok(KeyCode(26)));
        assert_eq!("26".parse::<KeyCode>(), Ok(KeyCode(26)));
        assert_eq!(" lshift ".parse::<KeyCode>(), Ok(KeyCode(0xE1)));
        // Single digits are key names, not usage ids
        assert_eq!("1".parse::<KeyCode>(), Ok(KeyCode(0x1E)));
        assert_eq!(
            "Hyper".parse::<KeyCode>(),
            Err(UnknownKey("Hyper".to_string()))
        );
    }
}
