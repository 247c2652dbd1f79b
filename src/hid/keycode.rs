//! USB HID keyboard usage IDs (usage page 0x07).
//!
//! Only the keys a 101/102-key PS/2 keyboard can produce through the
//! scancode tables are listed.

/// A HID keyboard/keypad usage ID.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Keycode(pub u8);

impl Keycode {
    /// Usage ID as sent in a report.
    pub const fn usage(self) -> u8 {
        self.0
    }

    /// `true` for the eight modifier usages (0xE0..=0xE7).
    pub const fn is_modifier(self) -> bool {
        self.0 >= LEFT_CONTROL.0 && self.0 <= RIGHT_GUI.0
    }

    /// Bit in the report's modifier byte, if this is a modifier.
    pub const fn modifier_bit(self) -> Option<u8> {
        if self.is_modifier() {
            Some(1 << (self.0 - LEFT_CONTROL.0))
        } else {
            None
        }
    }
}

pub const A: Keycode = Keycode(0x04);
pub const B: Keycode = Keycode(0x05);
pub const C: Keycode = Keycode(0x06);
pub const D: Keycode = Keycode(0x07);
pub const E: Keycode = Keycode(0x08);
pub const F: Keycode = Keycode(0x09);
pub const G: Keycode = Keycode(0x0A);
pub const H: Keycode = Keycode(0x0B);
pub const I: Keycode = Keycode(0x0C);
pub const J: Keycode = Keycode(0x0D);
pub const K: Keycode = Keycode(0x0E);
pub const L: Keycode = Keycode(0x0F);
pub const M: Keycode = Keycode(0x10);
pub const N: Keycode = Keycode(0x11);
pub const O: Keycode = Keycode(0x12);
pub const P: Keycode = Keycode(0x13);
pub const Q: Keycode = Keycode(0x14);
pub const R: Keycode = Keycode(0x15);
pub const S: Keycode = Keycode(0x16);
pub const T: Keycode = Keycode(0x17);
pub const U: Keycode = Keycode(0x18);
pub const V: Keycode = Keycode(0x19);
pub const W: Keycode = Keycode(0x1A);
pub const X: Keycode = Keycode(0x1B);
pub const Y: Keycode = Keycode(0x1C);
pub const Z: Keycode = Keycode(0x1D);

pub const ONE: Keycode = Keycode(0x1E);
pub const TWO: Keycode = Keycode(0x1F);
pub const THREE: Keycode = Keycode(0x20);
pub const FOUR: Keycode = Keycode(0x21);
pub const FIVE: Keycode = Keycode(0x22);
pub const SIX: Keycode = Keycode(0x23);
pub const SEVEN: Keycode = Keycode(0x24);
pub const EIGHT: Keycode = Keycode(0x25);
pub const NINE: Keycode = Keycode(0x26);
pub const ZERO: Keycode = Keycode(0x27);

pub const ENTER: Keycode = Keycode(0x28);
pub const ESCAPE: Keycode = Keycode(0x29);
pub const BACKSPACE: Keycode = Keycode(0x2A);
pub const TAB: Keycode = Keycode(0x2B);
pub const SPACE: Keycode = Keycode(0x2C);
pub const MINUS: Keycode = Keycode(0x2D);
pub const EQUALS: Keycode = Keycode(0x2E);
pub const LEFT_BRACKET: Keycode = Keycode(0x2F);
pub const RIGHT_BRACKET: Keycode = Keycode(0x30);
pub const BACKSLASH: Keycode = Keycode(0x31);
pub const SEMICOLON: Keycode = Keycode(0x33);
pub const QUOTE: Keycode = Keycode(0x34);
pub const GRAVE_ACCENT: Keycode = Keycode(0x35);
pub const COMMA: Keycode = Keycode(0x36);
pub const PERIOD: Keycode = Keycode(0x37);
pub const FORWARD_SLASH: Keycode = Keycode(0x38);
pub const CAPS_LOCK: Keycode = Keycode(0x39);

pub const F1: Keycode = Keycode(0x3A);
pub const F2: Keycode = Keycode(0x3B);
pub const F3: Keycode = Keycode(0x3C);
pub const F4: Keycode = Keycode(0x3D);
pub const F5: Keycode = Keycode(0x3E);
pub const F6: Keycode = Keycode(0x3F);
pub const F7: Keycode = Keycode(0x40);
pub const F8: Keycode = Keycode(0x41);
pub const F9: Keycode = Keycode(0x42);
pub const F10: Keycode = Keycode(0x43);
pub const F11: Keycode = Keycode(0x44);
pub const F12: Keycode = Keycode(0x45);

pub const SCROLL_LOCK: Keycode = Keycode(0x47);
pub const INSERT: Keycode = Keycode(0x49);
pub const HOME: Keycode = Keycode(0x4A);
pub const PAGE_UP: Keycode = Keycode(0x4B);
pub const DELETE: Keycode = Keycode(0x4C);
pub const END: Keycode = Keycode(0x4D);
pub const PAGE_DOWN: Keycode = Keycode(0x4E);
pub const RIGHT_ARROW: Keycode = Keycode(0x4F);
pub const LEFT_ARROW: Keycode = Keycode(0x50);
pub const DOWN_ARROW: Keycode = Keycode(0x51);
pub const UP_ARROW: Keycode = Keycode(0x52);

pub const KEYPAD_NUMLOCK: Keycode = Keycode(0x53);
pub const KEYPAD_FORWARD_SLASH: Keycode = Keycode(0x54);
pub const KEYPAD_ASTERISK: Keycode = Keycode(0x55);
pub const KEYPAD_MINUS: Keycode = Keycode(0x56);
pub const KEYPAD_PLUS: Keycode = Keycode(0x57);
pub const KEYPAD_ENTER: Keycode = Keycode(0x58);
pub const KEYPAD_ONE: Keycode = Keycode(0x59);
pub const KEYPAD_TWO: Keycode = Keycode(0x5A);
pub const KEYPAD_THREE: Keycode = Keycode(0x5B);
pub const KEYPAD_FOUR: Keycode = Keycode(0x5C);
pub const KEYPAD_FIVE: Keycode = Keycode(0x5D);
pub const KEYPAD_SIX: Keycode = Keycode(0x5E);
pub const KEYPAD_SEVEN: Keycode = Keycode(0x5F);
pub const KEYPAD_EIGHT: Keycode = Keycode(0x60);
pub const KEYPAD_NINE: Keycode = Keycode(0x61);
pub const KEYPAD_ZERO: Keycode = Keycode(0x62);
pub const KEYPAD_PERIOD: Keycode = Keycode(0x63);
pub const APPLICATION: Keycode = Keycode(0x65);

pub const LEFT_CONTROL: Keycode = Keycode(0xE0);
pub const LEFT_SHIFT: Keycode = Keycode(0xE1);
pub const LEFT_ALT: Keycode = Keycode(0xE2);
pub const LEFT_GUI: Keycode = Keycode(0xE3);
pub const RIGHT_CONTROL: Keycode = Keycode(0xE4);
pub const RIGHT_SHIFT: Keycode = Keycode(0xE5);
pub const RIGHT_ALT: Keycode = Keycode(0xE6);
pub const RIGHT_GUI: Keycode = Keycode(0xE7);
