//! Scancode set 2 → printed key name (US 101/102-key).
//!
//! Keypad digits and operators carry the character printed on the key,
//! so a layout resolves them like their main-block counterparts.

use super::{KeyName, ScancodeTable, SCANCODE_TABLE_LEN};

const __: Option<KeyName> = None;

const fn n(name: &'static str) -> Option<KeyName> {
    Some(KeyName(name))
}

#[rustfmt::skip]
const CODES: [Option<KeyName>; SCANCODE_TABLE_LEN] = [
    // 00-0F
    __, n("F9"), __, n("F5"), n("F3"), n("F1"), n("F2"), n("F12"), __, n("F10"), n("F8"), n("F6"), n("F4"), n("TAB"), n("`"), __,
    // 10-1F
    __, n("LALT"), n("LSHIFT"), __, n("LCTRL"), n("q"), n("1"), __, __, __, n("z"), n("s"), n("a"), n("w"), n("2"), __,
    // 20-2F
    __, n("c"), n("x"), n("d"), n("e"), n("4"), n("3"), __, __, n(" "), n("v"), n("f"), n("t"), n("r"), n("5"), __,
    // 30-3F
    __, n("n"), n("b"), n("h"), n("g"), n("y"), n("6"), __, __, __, n("m"), n("j"), n("u"), n("7"), n("8"), __,
    // 40-4F
    __, n(","), n("k"), n("i"), n("o"), n("0"), n("9"), __, __, n("."), n("/"), n("l"), n(";"), n("p"), n("-"), __,
    // 50-5F
    __, __, n("'"), __, n("["), n("="), __, __, n("CAPSLOCK"), n("RSHIFT"), n("ENTER"), n("]"), __, n("\\"), __, __,
    // 60-6F
    __, __, __, __, __, __, n("BKSP"), __, __, n("1"), __, n("4"), n("7"), __, __, __,
    // 70-7F
    n("0"), n("."), n("2"), n("5"), n("6"), n("8"), n("ESC"), __, n("F11"), n("+"), n("3"), n("-"), n("*"), n("9"), __, __,
    // 80-8F
    __, __, __, n("F7"), __, __, __, __, __, __, __, __, __, __, __, __,
];

const EXTENDED: &[(u8, KeyName)] = &[
    (0x11, KeyName("RALT")),
    (0x14, KeyName("RCTRL")),
    (0x1F, KeyName("LGUI")),
    (0x27, KeyName("RGUI")),
    (0x2F, KeyName("APPS")),
    (0x4A, KeyName("KP/")),
    (0x5A, KeyName("KPENTER")),
    (0x6B, KeyName("LEFT")),
    (0x74, KeyName("RIGHT")),
    (0x75, KeyName("UP")),
    (0x72, KeyName("DOWN")),
    (0x69, KeyName("END")),
    (0x6C, KeyName("HOME")),
    (0x70, KeyName("INSERT")),
    (0x71, KeyName("DELETE")),
    (0x7A, KeyName("PGDN")),
    (0x7D, KeyName("PGUP")),
    (0x7E, KeyName("SCROLLLOCK")),
    (0x77, KeyName("NUMLOCK")),
];

/// Layout-aware table: the decoder yields key names.
pub static SET2_NAMES: ScancodeTable<KeyName> = ScancodeTable::new(CODES, EXTENDED);
