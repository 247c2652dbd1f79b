//! US keyboard layout: key names → HID keycode chords.
//!
//! The named scancode table identifies keys the way they are printed
//! (`"a"`, `"+"`, `"PGUP"`).  Printable characters that need Shift on a
//! US layout resolve to a two-key chord.

use super::keycode::{self as kc, Keycode};
use super::{KeyChord, KeyId};
use crate::scancode::KeyName;

impl KeyId for KeyName {
    fn chord(self) -> Option<KeyChord> {
        us_chord(self.0)
    }
}

/// Resolve a key name through the US layout.
pub fn us_chord(name: &str) -> Option<KeyChord> {
    if let Some(key) = named_key(name) {
        return Some(KeyChord::single(key));
    }

    let mut chars = name.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    match c {
        'a'..='z' => Some(KeyChord::single(Keycode(kc::A.0 + (c as u8 - b'a')))),
        '1'..='9' => Some(KeyChord::single(Keycode(kc::ONE.0 + (c as u8 - b'1')))),
        '0' => Some(KeyChord::single(kc::ZERO)),
        '+' => Some(KeyChord::shifted(kc::EQUALS)),
        '*' => Some(KeyChord::shifted(kc::EIGHT)),
        _ => punctuation(c).map(KeyChord::single),
    }
}

fn punctuation(c: char) -> Option<Keycode> {
    Some(match c {
        ' ' => kc::SPACE,
        '`' => kc::GRAVE_ACCENT,
        '-' => kc::MINUS,
        '=' => kc::EQUALS,
        '[' => kc::LEFT_BRACKET,
        ']' => kc::RIGHT_BRACKET,
        '\\' => kc::BACKSLASH,
        ';' => kc::SEMICOLON,
        '\'' => kc::QUOTE,
        ',' => kc::COMMA,
        '.' => kc::PERIOD,
        '/' => kc::FORWARD_SLASH,
        _ => return None,
    })
}

fn named_key(name: &str) -> Option<Keycode> {
    if let Some(n) = name.strip_prefix('F').and_then(|n| n.parse::<u8>().ok()) {
        return (1..=12).contains(&n).then(|| Keycode(kc::F1.0 + n - 1));
    }

    Some(match name {
        "TAB" => kc::TAB,
        "ENTER" => kc::ENTER,
        "ESC" => kc::ESCAPE,
        "BKSP" => kc::BACKSPACE,
        "CAPSLOCK" => kc::CAPS_LOCK,
        "SCROLLLOCK" => kc::SCROLL_LOCK,
        "NUMLOCK" => kc::KEYPAD_NUMLOCK,
        "LSHIFT" => kc::LEFT_SHIFT,
        "RSHIFT" => kc::RIGHT_SHIFT,
        "LCTRL" => kc::LEFT_CONTROL,
        "RCTRL" => kc::RIGHT_CONTROL,
        "LALT" => kc::LEFT_ALT,
        "RALT" => kc::RIGHT_ALT,
        "LGUI" => kc::LEFT_GUI,
        "RGUI" => kc::RIGHT_GUI,
        "APPS" => kc::APPLICATION,
        "KP/" => kc::KEYPAD_FORWARD_SLASH,
        "KPENTER" => kc::KEYPAD_ENTER,
        "LEFT" => kc::LEFT_ARROW,
        "RIGHT" => kc::RIGHT_ARROW,
        "UP" => kc::UP_ARROW,
        "DOWN" => kc::DOWN_ARROW,
        "HOME" => kc::HOME,
        "END" => kc::END,
        "INSERT" => kc::INSERT,
        "DELETE" => kc::DELETE,
        "PGUP" => kc::PAGE_UP,
        "PGDN" => kc::PAGE_DOWN,
        _ => return None,
    })
}
